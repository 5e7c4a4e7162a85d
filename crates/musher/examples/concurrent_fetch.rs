//! Reference demo for the bounded pool
//!
//! Fires 20 simulated requests, each resolving after a random delay, through
//! a pool of workers. The concurrency comes from the first CLI argument
//! (default 4). With 20 requests averaging ~300ms each, the serial cost
//! would be ~6s; watch the elapsed time shrink as you raise the worker
//! count.

use std::time::{Duration, Instant};

use musher::{async_trait, AsyncTask, ExecutorConfig, MusherExecutor};
use rand::Rng;

/// A pretend network call: sleeps 100-500ms, then answers
#[derive(Debug)]
struct FakeRequest {
    id: usize,
}

#[async_trait]
impl AsyncTask for FakeRequest {
    type Output = String;
    type Error = String;

    async fn execute(&self) -> Result<Self::Output, Self::Error> {
        let delay: u64 = 100 + rand::thread_rng().gen_range(0..400);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(format!("ok:{}", self.id))
    }

    fn name(&self) -> String {
        format!("request({})", self.id)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let concurrency = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(4);

    let tasks: Vec<_> = (0..20).map(|i| FakeRequest { id: i + 1 }).collect();
    let total = tasks.len();

    let config = ExecutorConfig::new().with_concurrency(concurrency)?;
    let executor = MusherExecutor::with_config(config)?;

    println!("running {} requests with concurrency {}", total, concurrency);
    let start = Instant::now();
    let results = executor.execute(tasks).await?;
    let elapsed = start.elapsed();

    println!("elapsed ms {}", elapsed.as_millis());
    for outcome in results.iter().take(5) {
        println!("  {:?}", outcome);
    }
    println!("  ... total {}", results.len());

    Ok(())
}
