//! Core task abstractions and outcome types

use std::fmt::{self, Debug, Display};

use crate::BoxFuture;

/// Core trait for a unit of asynchronous work submitted to the pool
///
/// A task is a zero-argument operation: invoking [`AsyncTask::execute`]
/// starts one unit of work and eventually yields either a success value or a
/// typed error. The pool identifies a task by its position in the submitted
/// batch; it only ever invokes the task, never stores or mutates it.
#[async_trait::async_trait]
pub trait AsyncTask: Debug + Send + Sync + 'static {
    /// The type of output produced by this task
    type Output: Send + Sync + 'static;

    /// The type of error this task can produce
    type Error: Debug + Send + Sync + 'static;

    /// Execute the task asynchronously
    async fn execute(&self) -> Result<Self::Output, Self::Error>;

    /// Get a human-readable name for this task (used for logging and events)
    fn name(&self) -> String {
        format!("{:?}", self)
    }
}

/// Outcome of one task in a batch
///
/// Every slot of the result sequence holds exactly one of these after
/// [`MusherExecutor::execute`](crate::MusherExecutor::execute) returns. There
/// is deliberately no aggregate "did everything succeed" signal; callers
/// inspect each slot to interpret partial failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<T, E> {
    /// Task completed successfully with output
    Success(T),
    /// Task failed; the error was captured without aborting the batch
    Failed(CapturedFailure<E>),
}

impl<T, E> TaskOutcome<T, E> {
    /// Check if the outcome is successful
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }

    /// Check if the outcome is a captured failure
    pub fn is_failed(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }

    /// Get the success value, if any
    pub fn success(&self) -> Option<&T> {
        match self {
            TaskOutcome::Success(output) => Some(output),
            TaskOutcome::Failed(_) => None,
        }
    }

    /// Get the captured failure, if any
    pub fn failure(&self) -> Option<&CapturedFailure<E>> {
        match self {
            TaskOutcome::Success(_) => None,
            TaskOutcome::Failed(failure) => Some(failure),
        }
    }

    /// Convert to a standard Result
    pub fn into_result(self) -> Result<T, CapturedFailure<E>> {
        match self {
            TaskOutcome::Success(output) => Ok(output),
            TaskOutcome::Failed(failure) => Err(failure),
        }
    }
}

/// A task failure recorded in place of a success value
///
/// Carries the typed cause rather than a stringified rendering, so callers
/// can distinguish failure kinds without parsing strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFailure<E> {
    /// Diagnostic name of the task that failed
    pub task: String,
    /// The error the task raised
    pub error: E,
}

impl<E> CapturedFailure<E> {
    /// Record a failure raised by the named task
    pub fn new<S: Into<String>>(task: S, error: E) -> Self {
        Self {
            task: task.into(),
            error,
        }
    }
}

impl<E: Debug> Display for CapturedFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task {} failed: {:?}", self.task, self.error)
    }
}

impl<E: Debug> std::error::Error for CapturedFailure<E> {}

/// An [`AsyncTask`] built from a closure
///
/// Bridges the call-site convention of handing the pool a list of task
/// producers (plain closures) without defining a task type per call.
pub struct FnTask<F> {
    name: String,
    producer: F,
}

/// Wrap a closure returning a boxed future into an [`AsyncTask`]
///
/// ```rust
/// use futures::FutureExt;
/// use musher::task_fn;
///
/// let task = task_fn("double", || async { Ok::<i32, String>(21 * 2) }.boxed());
/// ```
pub fn task_fn<F, T, E>(name: impl Into<String>, producer: F) -> FnTask<F>
where
    F: Fn() -> BoxFuture<Result<T, E>> + Send + Sync + 'static,
{
    FnTask {
        name: name.into(),
        producer,
    }
}

impl<F> Debug for FnTask<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTask").field("name", &self.name).finish()
    }
}

#[async_trait::async_trait]
impl<F, T, E> AsyncTask for FnTask<F>
where
    F: Fn() -> BoxFuture<Result<T, E>> + Send + Sync + 'static,
    T: Send + Sync + 'static,
    E: Debug + Send + Sync + 'static,
{
    type Output = T;
    type Error = E;

    async fn execute(&self) -> Result<T, E> {
        (self.producer)().await
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
