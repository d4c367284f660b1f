//! The admitter trait and its collaborator hooks.
//!
//! Methods are declared in the desugared `-> impl Future + Send` form so
//! that guards generic over an [`Admitter`] produce spawnable (`Send`)
//! futures. Implementations may use plain `async fn`.

use doorward_core::{AttemptContext, Error, Result};

/// A consequence handler for authorization outcomes.
///
/// The context passed to all three calls carries door, side, guard kind and
/// credential id as queryable metadata for logging. It is cancelled as soon
/// as the attempt concludes, regardless of result.
pub trait Admitter: Send + Sync {
    /// Called once after an authorization attempt is started.
    ///
    /// Implementations should return quickly; the caller runs members
    /// synchronously, so heavy work must be backgrounded by the member
    /// itself. The return value is ignored.
    fn interrogating(&self, ctx: &AttemptContext, message: &str)
    -> impl Future<Output = ()> + Send;

    /// Called if an attempt resulted in an explicit deny, or if an error
    /// occurred during authorization.
    ///
    /// The reason is the canonical [`Error::AccessDenied`] sentinel for a
    /// policy rejection, or the actual authorization error for an
    /// operational failure. The context may already be cancelled.
    ///
    /// # Errors
    ///
    /// An error return aborts the remainder of the notification chain and is
    /// fatal to the dispatching guard.
    fn deny(
        &self,
        ctx: &AttemptContext,
        message: &str,
        reason: &Error,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Called if an attempt was successful and the admittee should be let in.
    ///
    /// # Errors
    ///
    /// An error return aborts the remainder of the notification chain and is
    /// fatal to the dispatching guard.
    fn allow(&self, ctx: &AttemptContext, message: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Collaborator notified of unrecoverable physical-state failures.
///
/// The strike reports a failed lock write here, outside the normal error
/// path, because by the time the relock runs there is no caller left to
/// return an error to. Injected at construction; the default is
/// [`NoopFatal`], never global state.
pub trait FatalHook: Send + Sync {
    /// Report a fatal condition. The attempt metadata on `ctx` identifies
    /// the door concerned.
    fn fatal(&self, ctx: &AttemptContext, message: &str);
}

/// Default [`FatalHook`] that ignores reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFatal;

impl FatalHook for NoopFatal {
    fn fatal(&self, _ctx: &AttemptContext, _message: &str) {}
}
