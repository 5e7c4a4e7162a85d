//! The bounded-concurrency pool executor

use std::sync::OnceLock;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::debug;

use crate::dispatcher::Dispatcher;
use crate::error::MusherResult;
use crate::reporter::TaskExecutionEvent;
use crate::task::{AsyncTask, CapturedFailure, TaskOutcome};
use crate::types::{ExecutionStats, ExecutorConfig};

/// Runs ordered batches of asynchronous tasks over a fixed number of workers
///
/// Each call to [`execute`](MusherExecutor::execute) owns its own dispatcher
/// and result slots; independent calls share no state and may run
/// concurrently. Workers are plain futures polled inside the call, so the
/// executor itself spawns nothing on the host runtime.
#[derive(Debug)]
pub struct MusherExecutor {
    config: ExecutorConfig,
}

impl Default for MusherExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MusherExecutor {
    /// Create a new executor with default configuration
    pub fn new() -> Self {
        Self {
            config: ExecutorConfig::default(),
        }
    }

    /// Create a new executor with custom configuration
    pub fn with_config(config: ExecutorConfig) -> MusherResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Execute a batch of tasks and return their outcomes in input order
    ///
    /// Outcome `i` always corresponds to `tasks[i]`, whatever order the
    /// underlying operations complete in. A failing task is captured in its
    /// slot and never aborts the rest of the batch; the call itself only
    /// fails on a configuration precondition, before any task runs.
    ///
    /// The call resolves once every worker has terminated. A task that never
    /// resolves therefore stalls the whole batch; there is no timeout or
    /// cancellation machinery in the pool.
    pub async fn execute<T: AsyncTask>(
        &self,
        tasks: Vec<T>,
    ) -> MusherResult<Vec<TaskOutcome<T::Output, T::Error>>> {
        let (outcomes, _events) = self.execute_with_progress(tasks).await?;
        Ok(outcomes)
    }

    /// Execute a batch of tasks, additionally returning the progress events
    ///
    /// Same semantics as [`execute`](MusherExecutor::execute). The returned
    /// receiver holds the buffered [`TaskExecutionEvent`] stream for the
    /// batch, ending with a `Completed` event carrying the batch statistics.
    /// Events are diagnostics only; outcomes are never observable before the
    /// full join.
    pub async fn execute_with_progress<T: AsyncTask>(
        &self,
        tasks: Vec<T>,
    ) -> MusherResult<(
        Vec<TaskOutcome<T::Output, T::Error>>,
        mpsc::UnboundedReceiver<TaskExecutionEvent>,
    )> {
        self.config.validate()?;

        let started = Instant::now();
        let total_tasks = tasks.len();
        let (events, receiver) = mpsc::unbounded_channel();
        let _ = events.send(TaskExecutionEvent::Started { total_tasks });

        let dispatcher = Dispatcher::new(total_tasks);
        let slots: Vec<OnceLock<TaskOutcome<T::Output, T::Error>>> =
            (0..total_tasks).map(|_| OnceLock::new()).collect();

        let workers = (0..self.config.concurrency)
            .map(|worker| run_worker(worker, &dispatcher, &tasks, &slots, events.clone()));
        let tasks_per_worker = join_all(workers).await;

        let mut stats = ExecutionStats {
            total_tasks,
            workers_engaged: tasks_per_worker.iter().filter(|&&ran| ran > 0).count(),
            ..ExecutionStats::default()
        };

        let mut outcomes = Vec::with_capacity(total_tasks);
        for slot in slots {
            let outcome = slot
                .into_inner()
                .expect("joined workers populate every slot");
            match &outcome {
                TaskOutcome::Success(_) => stats.successful_tasks += 1,
                TaskOutcome::Failed(_) => stats.failed_tasks += 1,
            }
            outcomes.push(outcome);
        }

        stats.total_duration = started.elapsed();
        let elapsed = stats.total_duration.as_secs_f64();
        if elapsed > 0.0 {
            stats.tasks_per_second = (stats.successful_tasks + stats.failed_tasks) as f64 / elapsed;
        }

        debug!(
            total = stats.total_tasks,
            failed = stats.failed_tasks,
            workers = stats.workers_engaged,
            elapsed = ?stats.total_duration,
            "batch complete"
        );
        let _ = events.send(TaskExecutionEvent::Completed { stats });

        Ok((outcomes, receiver))
    }
}

/// One logical worker: claims indices until the dispatcher is exhausted
///
/// Returns the number of tasks this worker ran. The await on
/// `task.execute()` is the worker's only suspension point; the claim itself
/// never suspends.
async fn run_worker<T: AsyncTask>(
    worker: usize,
    dispatcher: &Dispatcher,
    tasks: &[T],
    slots: &[OnceLock<TaskOutcome<T::Output, T::Error>>],
    events: mpsc::UnboundedSender<TaskExecutionEvent>,
) -> usize {
    let mut ran = 0;
    while let Some(index) = dispatcher.claim() {
        ran += 1;
        let task = &tasks[index];
        let task_name = task.name();
        let _ = events.send(TaskExecutionEvent::TaskStarted {
            index,
            worker,
            task_name: task_name.clone(),
        });

        let task_started = Instant::now();
        let outcome = match task.execute().await {
            Ok(output) => {
                let _ = events.send(TaskExecutionEvent::TaskCompleted {
                    index,
                    task_name,
                    duration: task_started.elapsed(),
                });
                TaskOutcome::Success(output)
            }
            Err(error) => {
                debug!(index, task = %task_name, error = ?error, "task failed, outcome captured");
                let _ = events.send(TaskExecutionEvent::TaskFailed {
                    index,
                    task_name: task_name.clone(),
                    error: format!("{:?}", error),
                    duration: task_started.elapsed(),
                });
                TaskOutcome::Failed(CapturedFailure::new(task_name, error))
            }
        };

        let stored = slots[index].set(outcome);
        debug_assert!(stored.is_ok(), "result slot {index} written twice");
    }
    ran
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, MusherError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Debug)]
    struct TestTask {
        id: usize,
        delay_ms: u64,
        should_fail: bool,
    }

    #[async_trait::async_trait]
    impl AsyncTask for TestTask {
        type Output = String;
        type Error = String;

        async fn execute(&self) -> Result<Self::Output, Self::Error> {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

            if self.should_fail {
                Err(format!("task {} failed", self.id))
            } else {
                Ok(format!("ok:{}", self.id))
            }
        }

        fn name(&self) -> String {
            format!("TestTask({})", self.id)
        }
    }

    /// Pushes its index into a shared log when it runs.
    #[derive(Debug)]
    struct LogTask {
        index: usize,
        should_fail: bool,
        log: Arc<Mutex<Vec<usize>>>,
    }

    #[async_trait::async_trait]
    impl AsyncTask for LogTask {
        type Output = usize;
        type Error = String;

        async fn execute(&self) -> Result<Self::Output, Self::Error> {
            self.log.lock().unwrap().push(self.index);
            if self.should_fail {
                Err(format!("log task {} failed", self.index))
            } else {
                Ok(self.index)
            }
        }
    }

    fn executor(concurrency: usize) -> MusherExecutor {
        MusherExecutor::with_config(ExecutorConfig { concurrency }).unwrap()
    }

    #[tokio::test]
    async fn test_results_in_input_order() {
        // Even-indexed tasks are slow, so completion order differs from
        // input order; the fan-in must restore it.
        let tasks: Vec<_> = (0..20)
            .map(|i| TestTask {
                id: i + 1,
                delay_ms: if i % 2 == 0 { 40 } else { 10 },
                should_fail: false,
            })
            .collect();

        let results = executor(4).execute(tasks).await.unwrap();

        assert_eq!(results.len(), 20);
        for (i, outcome) in results.iter().enumerate() {
            assert_eq!(outcome.success().unwrap(), &format!("ok:{}", i + 1));
        }
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let (results, mut events) = executor(5)
            .execute_with_progress(Vec::<TestTask>::new())
            .await
            .unwrap();

        assert!(results.is_empty());

        let mut seen = Vec::new();
        while let Some(event) = events.recv().await {
            seen.push(event);
        }
        assert_eq!(seen.len(), 2);
        assert!(matches!(
            seen[0],
            TaskExecutionEvent::Started { total_tasks: 0 }
        ));
        assert!(matches!(&seen[1], TaskExecutionEvent::Completed { stats }
            if stats.total_tasks == 0 && stats.workers_engaged == 0));
    }

    #[tokio::test]
    async fn test_serial_execution_runs_in_index_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tasks: Vec<_> = [false, true, false]
            .into_iter()
            .enumerate()
            .map(|(index, should_fail)| LogTask {
                index,
                should_fail,
                log: log.clone(),
            })
            .collect();

        let results = executor(1).execute(tasks).await.unwrap();

        assert_eq!(results[0].success(), Some(&0));
        assert!(results[1].is_failed());
        assert_eq!(results[2].success(), Some(&2));
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_failure_isolation() {
        let tasks: Vec<_> = (0..8)
            .map(|i| TestTask {
                id: i,
                delay_ms: 5,
                should_fail: i == 3 || i == 5,
            })
            .collect();

        let results = executor(4).execute(tasks).await.unwrap();

        for (i, outcome) in results.iter().enumerate() {
            if i == 3 || i == 5 {
                let failure = outcome.failure().unwrap();
                assert_eq!(failure.task, format!("TestTask({})", i));
                assert_eq!(failure.error, format!("task {} failed", i));
            } else {
                assert_eq!(outcome.success().unwrap(), &format!("ok:{}", i));
            }
        }
    }

    #[tokio::test]
    async fn test_each_task_runs_exactly_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tasks: Vec<_> = (0..50)
            .map(|index| LogTask {
                index,
                should_fail: false,
                log: log.clone(),
            })
            .collect();

        let results = executor(7).execute(tasks).await.unwrap();

        assert_eq!(results.len(), 50);
        let mut ran = log.lock().unwrap().clone();
        ran.sort_unstable();
        assert_eq!(ran, (0..50).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_excess_workers_are_no_ops() {
        let tasks: Vec<_> = (0..3)
            .map(|i| TestTask {
                id: i,
                delay_ms: 5,
                should_fail: false,
            })
            .collect();

        let (results, mut events) = executor(100).execute_with_progress(tasks).await.unwrap();

        assert_eq!(results.len(), 3);
        let mut stats = None;
        while let Some(event) = events.recv().await {
            if let TaskExecutionEvent::Completed { stats: s } = event {
                stats = Some(s);
            }
        }
        // Only 3 of the 100 workers ever claim a task.
        assert_eq!(stats.unwrap().workers_engaged, 3);
    }

    /// Records the peak number of concurrently running tasks.
    #[derive(Debug)]
    struct GaugeTask {
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl AsyncTask for GaugeTask {
        type Output = ();
        type Error = String;

        async fn execute(&self) -> Result<Self::Output, Self::Error> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_concurrency_bound_is_respected() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let tasks: Vec<_> = (0..6)
            .map(|_| GaugeTask {
                active: active.clone(),
                peak: peak.clone(),
            })
            .collect();

        executor(2).execute(tasks).await.unwrap();

        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_concurrency_fails_before_any_work() {
        assert!(matches!(
            MusherExecutor::with_config(ExecutorConfig { concurrency: 0 }),
            Err(MusherError::Config(ConfigError::InvalidConcurrency {
                value: 0
            }))
        ));

        let log = Arc::new(Mutex::new(Vec::new()));
        let tasks = vec![LogTask {
            index: 0,
            should_fail: false,
            log: log.clone(),
        }];

        let broken = MusherExecutor {
            config: ExecutorConfig { concurrency: 0 },
        };
        let result = broken.execute(tasks).await;

        assert!(matches!(
            result,
            Err(MusherError::Config(ConfigError::InvalidConcurrency {
                value: 0
            }))
        ));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_progress_event_stream() {
        let tasks: Vec<_> = (0..4)
            .map(|i| TestTask {
                id: i,
                delay_ms: 5,
                should_fail: i == 2,
            })
            .collect();

        let (_, mut events) = executor(2).execute_with_progress(tasks).await.unwrap();

        let mut seen = Vec::new();
        while let Some(event) = events.recv().await {
            seen.push(event);
        }

        assert!(matches!(
            seen.first(),
            Some(TaskExecutionEvent::Started { total_tasks: 4 })
        ));
        assert!(matches!(&seen[seen.len() - 1], TaskExecutionEvent::Completed { stats }
            if stats.total_tasks == 4
                && stats.successful_tasks == 3
                && stats.failed_tasks == 1
                && stats.workers_engaged == 2));

        let started = seen
            .iter()
            .filter(|e| matches!(e, TaskExecutionEvent::TaskStarted { .. }))
            .count();
        let completed = seen
            .iter()
            .filter(|e| matches!(e, TaskExecutionEvent::TaskCompleted { .. }))
            .count();
        let failed = seen
            .iter()
            .filter(|e| matches!(e, TaskExecutionEvent::TaskFailed { .. }))
            .count();
        assert_eq!((started, completed, failed), (4, 3, 1));
    }

    #[tokio::test]
    async fn test_concurrent_batches_share_no_state() {
        let executor = executor(3);

        let batch = |offset: usize| {
            (0..10)
                .map(|i| TestTask {
                    id: offset + i,
                    delay_ms: 5,
                    should_fail: false,
                })
                .collect::<Vec<_>>()
        };

        let (first, second) =
            tokio::join!(executor.execute(batch(0)), executor.execute(batch(100)));

        let first = first.unwrap();
        let second = second.unwrap();
        for i in 0..10 {
            assert_eq!(first[i].success().unwrap(), &format!("ok:{}", i));
            assert_eq!(second[i].success().unwrap(), &format!("ok:{}", 100 + i));
        }
    }
}
