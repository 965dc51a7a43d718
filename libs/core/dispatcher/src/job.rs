//! Job and processor traits
//!
//! A [`Job`] is the unit of work a caller submits. A [`JobProcessor`] turns a
//! job into an output on a worker task. Business failures belong in the
//! output type; the dispatcher only reports transport-level failures.

use async_trait::async_trait;
use uuid::Uuid;

/// A unit of work accepted by the dispatcher
pub trait Job: Send + 'static {
    /// Short job kind used as a metric label (e.g. "insert")
    fn kind(&self) -> &'static str;
}

/// Processes jobs on worker tasks
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use dispatcher::{Job, JobProcessor};
/// use uuid::Uuid;
///
/// struct Shout(String);
///
/// impl Job for Shout {
///     fn kind(&self) -> &'static str { "shout" }
/// }
///
/// struct ShoutProcessor;
///
/// #[async_trait]
/// impl JobProcessor<Shout> for ShoutProcessor {
///     type Output = String;
///
///     async fn process(&self, _correlation_id: Uuid, job: Shout) -> String {
///         job.0.to_uppercase()
///     }
///
///     fn name(&self) -> &'static str { "shout_processor" }
/// }
/// ```
#[async_trait]
pub trait JobProcessor<J: Job>: Send + Sync + 'static {
    /// Result delivered back to the submitting caller
    type Output: Send + 'static;

    /// Process one job. `correlation_id` identifies the waiting caller.
    async fn process(&self, correlation_id: Uuid, job: J) -> Self::Output;

    /// Processor name for logging and metrics
    fn name(&self) -> &'static str;
}
