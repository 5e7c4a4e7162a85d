//! CPU-bound work delegated to the runtime's blocking thread pool
//!
//! The pool itself only awaits outcomes; the heavy lifting (a key-stretching
//! loop of iterated SHA-512 rounds) runs on tokio's blocking pool via
//! `spawn_blocking`. The blocking pool size comes from the
//! `MUSHER_BLOCKING_THREADS` env var (default 4); with 8 stretch tasks and 4
//! blocking threads, per-task latency roughly doubles once the pool
//! saturates, which is the point of the probe.

use std::time::Instant;

use musher::{async_trait, AsyncTask, ExecutorConfig, MusherExecutor};
use sha2::{Digest, Sha512};

const STRETCH_ROUNDS: u32 = 100_000;

/// One key-stretching unit: measures its own wall-clock milliseconds
#[derive(Debug)]
struct StretchKey {
    id: usize,
}

#[async_trait]
impl AsyncTask for StretchKey {
    type Output = u128;
    type Error = String;

    async fn execute(&self) -> Result<Self::Output, Self::Error> {
        let started = Instant::now();
        let _derived = tokio::task::spawn_blocking(|| {
            let mut digest = Sha512::digest(b"password:salt");
            for _ in 1..STRETCH_ROUNDS {
                digest = Sha512::digest(digest);
            }
            digest
        })
        .await
        .map_err(|err| format!("blocking task failed: {err}"))?;
        Ok(started.elapsed().as_millis())
    }

    fn name(&self) -> String {
        format!("stretch({})", self.id)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let iterations: usize = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(8);
    let blocking_threads: usize = std::env::var("MUSHER_BLOCKING_THREADS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(4);

    println!("MUSHER_BLOCKING_THREADS = {}", blocking_threads);
    println!("doing {} key-stretch tasks", iterations);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .max_blocking_threads(blocking_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let tasks: Vec<_> = (0..iterations).map(|id| StretchKey { id }).collect();

        // One worker per task: the contention under test is the blocking
        // pool, not the musher pool.
        let config = ExecutorConfig::new().with_concurrency(iterations.max(1))?;
        let executor = MusherExecutor::with_config(config)?;

        let start = Instant::now();
        let results = executor.execute(tasks).await?;

        let per_task: Vec<_> = results
            .iter()
            .filter_map(|outcome| outcome.success().copied())
            .collect();
        println!("individual ms: {:?}", per_task);
        println!("total elapsed ms {}", start.elapsed().as_millis());

        Ok::<_, Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
