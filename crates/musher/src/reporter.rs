//! Progress reporting for pool execution
//!
//! The executor streams [`TaskExecutionEvent`]s over an unbounded channel
//! while a batch runs. This module provides a reporter trait and
//! implementations for consuming that stream, so external progress systems
//! can be plugged in without the pool knowing about them.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::types::ExecutionStats;

/// Event types emitted during batch execution
///
/// Events are diagnostics: they never expose a task's output value, and the
/// ordered outcome sequence is only returned after the whole batch has
/// joined.
#[derive(Debug, Clone)]
pub enum TaskExecutionEvent {
    /// Batch execution started
    Started { total_tasks: usize },
    /// A worker claimed a task and began executing it
    TaskStarted {
        index: usize,
        worker: usize,
        task_name: String,
    },
    /// Task completed successfully
    TaskCompleted {
        index: usize,
        task_name: String,
        duration: Duration,
    },
    /// Task failed; its error was captured in the result slot
    TaskFailed {
        index: usize,
        task_name: String,
        error: String,
        duration: Duration,
    },
    /// Batch execution completed
    Completed { stats: ExecutionStats },
}

/// Trait for reporting task execution progress
///
/// Implement this to integrate with an external progress system; pair it
/// with [`replay`] to drain an event stream into it.
pub trait ExecutionReporter: Send {
    /// Report a task execution event
    fn report_event(&mut self, event: TaskExecutionEvent);

    /// Set context for the current execution batch
    fn set_context(&mut self, context: String) {
        let _ = context; // Default implementation ignores context
    }

    /// Called when the reporter is no longer needed
    fn finish(&mut self) {
        // Default implementation does nothing
    }
}

/// Drain a progress receiver into a reporter, then finish it
pub async fn replay(
    mut receiver: mpsc::UnboundedReceiver<TaskExecutionEvent>,
    reporter: &mut dyn ExecutionReporter,
) {
    while let Some(event) = receiver.recv().await {
        reporter.report_event(event);
    }
    reporter.finish();
}

/// A no-op reporter that discards all events
#[derive(Debug, Default)]
pub struct NoOpReporter;

impl ExecutionReporter for NoOpReporter {
    fn report_event(&mut self, _event: TaskExecutionEvent) {
        // Do nothing
    }
}

/// A simple console reporter for debugging
#[derive(Debug)]
pub struct ConsoleReporter {
    context: Option<String>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self { context: None }
    }

    fn format_duration(duration: Duration) -> String {
        if duration.as_secs() > 0 {
            format!("{:.1}s", duration.as_secs_f32())
        } else {
            format!("{}ms", duration.as_millis())
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionReporter for ConsoleReporter {
    fn report_event(&mut self, event: TaskExecutionEvent) {
        let context_prefix = self
            .context
            .as_ref()
            .map(|c| format!("[{}] ", c))
            .unwrap_or_default();

        match event {
            TaskExecutionEvent::Started { total_tasks } => {
                println!(
                    "🎯 {}Starting execution of {} tasks",
                    context_prefix, total_tasks
                );
            }
            TaskExecutionEvent::TaskStarted {
                index,
                worker,
                task_name,
            } => {
                println!(
                    "🚀 {}Started {} (#{} on worker {})",
                    context_prefix, task_name, index, worker
                );
            }
            TaskExecutionEvent::TaskCompleted {
                task_name, duration, ..
            } => {
                println!(
                    "✅ {}Completed {} in {}",
                    context_prefix,
                    task_name,
                    Self::format_duration(duration)
                );
            }
            TaskExecutionEvent::TaskFailed {
                task_name,
                error,
                duration,
                ..
            } => {
                println!(
                    "❌ {}Failed {} after {} - {}",
                    context_prefix,
                    task_name,
                    Self::format_duration(duration),
                    error
                );
            }
            TaskExecutionEvent::Completed { stats } => {
                println!(
                    "🏁 {}Execution completed: {}/{} successful, {} failed in {}",
                    context_prefix,
                    stats.successful_tasks,
                    stats.total_tasks,
                    stats.failed_tasks,
                    Self::format_duration(stats.total_duration)
                );
            }
        }
    }

    fn set_context(&mut self, context: String) {
        self.context = Some(context);
    }
}

/// A multi-reporter that broadcasts events to multiple reporters
pub struct MultiReporter {
    reporters: Vec<Box<dyn ExecutionReporter>>,
}

impl MultiReporter {
    pub fn new() -> Self {
        Self {
            reporters: Vec::new(),
        }
    }

    pub fn add_reporter<R: ExecutionReporter + 'static>(mut self, reporter: R) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }
}

impl Default for MultiReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionReporter for MultiReporter {
    fn report_event(&mut self, event: TaskExecutionEvent) {
        for reporter in &mut self.reporters {
            reporter.report_event(event.clone());
        }
    }

    fn set_context(&mut self, context: String) {
        for reporter in &mut self.reporters {
            reporter.set_context(context.clone());
        }
    }

    fn finish(&mut self) {
        for reporter in &mut self.reporters {
            reporter.finish();
        }
    }
}
