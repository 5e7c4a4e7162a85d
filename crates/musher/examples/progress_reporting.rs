//! Progress event stream and console reporter demo
//!
//! Runs a mixed success/failure batch with `execute_with_progress` and
//! replays the buffered event stream into a `ConsoleReporter` once the
//! batch has joined.

use std::time::Duration;

use musher::{
    async_trait, replay, AsyncTask, ConsoleReporter, ExecutionReporter, ExecutorConfig,
    MusherExecutor,
};

#[derive(Debug)]
enum Step {
    Build { name: &'static str, ms: u64 },
    Flaky { name: &'static str },
}

#[async_trait]
impl AsyncTask for Step {
    type Output = &'static str;
    type Error = String;

    async fn execute(&self) -> Result<Self::Output, Self::Error> {
        match self {
            Step::Build { name, ms } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(*name)
            }
            Step::Flaky { name } => {
                tokio::time::sleep(Duration::from_millis(30)).await;
                Err(format!("{name}: upstream unavailable"))
            }
        }
    }

    fn name(&self) -> String {
        match self {
            Step::Build { name, .. } | Step::Flaky { name } => (*name).to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let tasks = vec![
        Step::Build { name: "compile", ms: 120 },
        Step::Build { name: "lint", ms: 40 },
        Step::Flaky { name: "fetch-deps" },
        Step::Build { name: "test", ms: 200 },
        Step::Build { name: "package", ms: 60 },
    ];

    let config = ExecutorConfig::new().with_concurrency(2)?;
    let executor = MusherExecutor::with_config(config)?;

    let (results, events) = executor.execute_with_progress(tasks).await?;

    let mut reporter = ConsoleReporter::new();
    reporter.set_context("pipeline".to_string());
    replay(events, &mut reporter).await;

    println!();
    for (index, outcome) in results.iter().enumerate() {
        match outcome.success() {
            Some(step) => println!("step {} -> {}", index, step),
            None => println!("step {} -> {}", index, outcome.failure().unwrap()),
        }
    }

    Ok(())
}
