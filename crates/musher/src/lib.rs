//! Musher - Bounded-Concurrency Task Pool
//!
//! A small async execution engine that runs an ordered batch of tasks over a
//! fixed number of concurrent workers and hands back the outcomes in input
//! order.
//!
//! # Overview
//!
//! Musher provides a fan-out/fan-in primitive where:
//! - Each task is an asynchronous operation scheduled by the host runtime
//! - A shared dispatcher hands every worker the next unclaimed task index
//! - A failing task is captured in its result slot and never aborts the batch
//! - Results always come back in the order the tasks were submitted,
//!   regardless of completion order
//!
//! Workers are logical units of concurrency, not OS threads: they are plain
//! futures polled concurrently inside a single `execute` call, so the pool
//! works on any runtime that can poll the returned future. CPU-bound work
//! inside a task can still be delegated to the runtime's blocking pool; the
//! pool only awaits the task's eventual outcome.
//!
//! There is no cancellation, retry, or timeout machinery: each task is
//! attempted exactly once, and a task that never resolves stalls its worker
//! and, transitively, the whole `execute` call. Callers that need deadlines
//! should enforce them inside the task itself.
//!
//! # Example
//!
//! ```rust
//! use musher::{AsyncTask, ExecutorConfig, MusherExecutor};
//!
//! #[derive(Debug)]
//! struct FetchPage {
//!     url: String,
//! }
//!
//! #[async_trait::async_trait]
//! impl AsyncTask for FetchPage {
//!     type Output = String;
//!     type Error = String;
//!
//!     async fn execute(&self) -> Result<Self::Output, Self::Error> {
//!         Ok(format!("contents of {}", self.url))
//!     }
//!
//!     fn name(&self) -> String {
//!         format!("fetch({})", self.url)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tasks: Vec<FetchPage> = (0..20)
//!         .map(|i| FetchPage { url: format!("https://example.com/{i}") })
//!         .collect();
//!
//!     let config = ExecutorConfig::new().with_concurrency(4)?;
//!     let executor = MusherExecutor::with_config(config)?;
//!
//!     let results = executor.execute(tasks).await?;
//!     assert_eq!(results.len(), 20);
//!     assert!(results[7].success().unwrap().ends_with("/7"));
//!     Ok(())
//! }
//! ```

pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod reporter;
pub mod task;
pub mod types;

pub use dispatcher::Dispatcher;
pub use error::{ConfigError, ConfigResult, MusherError, MusherResult};
pub use executor::MusherExecutor;
pub use reporter::{
    replay, ConsoleReporter, ExecutionReporter, MultiReporter, NoOpReporter, TaskExecutionEvent,
};
pub use task::{task_fn, AsyncTask, CapturedFailure, FnTask, TaskOutcome};
pub use types::{ExecutionStats, ExecutorConfig};

use std::future::Future;
use std::pin::Pin;

/// A boxed future that is Send and can be used across thread boundaries
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
