//! The cancellable scope of one authorization exchange.
//!
//! An [`AttemptContext`] is created when a credential is first observed and
//! cancelled when the attempt concludes (success, explicit deny, error, or
//! abandonment) or when its deadline elapses. It carries immutable metadata
//! (door, side, guard kind, credential, attempt id) that every collaborator
//! touched by the attempt can query for logging.
//!
//! Exactly one context is active per credential guard at a time; clones are
//! cheap handles onto the same attempt and are handed to background tasks
//! (the light's interrogating watcher, the tag guard's presence monitor).
//!
//! # Cancellation
//!
//! Cancellation is cooperative: collaborators either select on
//! [`AttemptContext::cancelled`] themselves or wrap their work in
//! [`AttemptContext::run`], which races it against cancellation and maps the
//! loss to [`Error::Cancelled`] or [`Error::TimedOut`].
//!
//! ```
//! use std::time::Duration;
//! use doorward_core::{AttemptContext, AttemptMeta, Credential, DoorId, DoorSide, Error, GuardKind};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let meta = AttemptMeta::new(
//!     DoorId::new(1).unwrap(),
//!     DoorSide::A,
//!     GuardKind::Nfc,
//!     Credential::new("0001f680").unwrap(),
//! );
//! let ctx = AttemptContext::new(meta, Duration::from_secs(30));
//!
//! ctx.cancel();
//! assert!(matches!(ctx.err(), Some(Error::Cancelled)));
//! # }
//! ```

use crate::error::{Error, Result};
use crate::types::{Credential, DoorId, DoorSide, GuardKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Immutable metadata describing one authorization attempt.
#[derive(Debug, Clone)]
pub struct AttemptMeta {
    /// Unique id of this attempt, for log correlation.
    pub attempt_id: Uuid,
    /// The door being guarded.
    pub door: DoorId,
    /// The side of the door the credential was presented on.
    pub side: DoorSide,
    /// The input modality that observed the credential.
    pub guard: GuardKind,
    /// The credential under authorization. Not for display to the admittee.
    pub credential: Credential,
}

impl AttemptMeta {
    /// Create metadata for a fresh attempt with a new random attempt id.
    #[must_use]
    pub fn new(door: DoorId, side: DoorSide, guard: GuardKind, credential: Credential) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            door,
            side,
            guard,
            credential,
        }
    }
}

/// A cancellable, deadline-bounded execution scope for one authorization
/// attempt.
///
/// Cloning is cheap and clones observe the same cancellation. The deadline
/// watchdog runs as a detached task that exits as soon as the context is
/// cancelled by any means, so abandoned contexts do not linger past their
/// timeout.
#[derive(Debug, Clone)]
pub struct AttemptContext {
    meta: Arc<AttemptMeta>,
    token: CancellationToken,
    deadline: Instant,
}

impl AttemptContext {
    /// Create a context that auto-cancels after `timeout`.
    ///
    /// Must be called from within a Tokio runtime; the deadline watchdog is
    /// spawned immediately.
    #[must_use]
    pub fn new(meta: AttemptMeta, timeout: Duration) -> Self {
        let token = CancellationToken::new();
        let deadline = Instant::now() + timeout;

        let watchdog = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = watchdog.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => watchdog.cancel(),
            }
        });

        Self {
            meta: Arc::new(meta),
            token,
            deadline,
        }
    }

    /// The attempt metadata.
    #[must_use]
    pub fn meta(&self) -> &AttemptMeta {
        &self.meta
    }

    /// The door being guarded.
    #[must_use]
    pub fn door(&self) -> DoorId {
        self.meta.door
    }

    /// The side of the door.
    #[must_use]
    pub fn side(&self) -> DoorSide {
        self.meta.side
    }

    /// The guard modality that started the attempt.
    #[must_use]
    pub fn guard_kind(&self) -> GuardKind {
        self.meta.guard
    }

    /// The credential under authorization.
    #[must_use]
    pub fn credential(&self) -> &Credential {
        &self.meta.credential
    }

    /// Unique id of this attempt.
    #[must_use]
    pub fn attempt_id(&self) -> Uuid {
        self.meta.attempt_id
    }

    /// The instant at which the attempt auto-cancels.
    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Cancel the attempt. Idempotent; wakes every task selecting on
    /// [`cancelled`](Self::cancelled).
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the attempt has been cancelled or timed out.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when the attempt is cancelled or times out.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// The reason the attempt ended, if it has.
    ///
    /// Returns `Some(Error::TimedOut)` when the deadline has passed,
    /// `Some(Error::Cancelled)` for an explicit cancellation, `None` while
    /// the attempt is still live.
    #[must_use]
    pub fn err(&self) -> Option<Error> {
        if !self.is_cancelled() {
            return None;
        }
        if Instant::now() >= self.deadline {
            Some(Error::TimedOut)
        } else {
            Some(Error::Cancelled)
        }
    }

    /// Race a future against cancellation of this attempt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] or [`Error::TimedOut`] if the attempt
    /// ends before the future completes.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            out = fut => Ok(out),
            _ = self.token.cancelled() => Err(self.err().unwrap_or(Error::Cancelled)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> AttemptMeta {
        AttemptMeta::new(
            DoorId::new(7).unwrap(),
            DoorSide::B,
            GuardKind::Nfc,
            Credential::new("0001f680").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_metadata_accessors() {
        let ctx = AttemptContext::new(meta(), Duration::from_secs(30));
        assert_eq!(ctx.door().as_i32(), 7);
        assert_eq!(ctx.side(), DoorSide::B);
        assert_eq!(ctx.guard_kind(), GuardKind::Nfc);
        assert_eq!(ctx.credential().as_str(), "0001f680");
    }

    #[tokio::test]
    async fn test_clones_share_cancellation() {
        let ctx = AttemptContext::new(meta(), Duration::from_secs(30));
        let clone = ctx.clone();

        assert!(!clone.is_cancelled());
        ctx.cancel();
        assert!(clone.is_cancelled());
        assert_eq!(clone.attempt_id(), ctx.attempt_id());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_cancels_with_timed_out() {
        let ctx = AttemptContext::new(meta(), Duration::from_millis(50));

        assert!(ctx.err().is_none());
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(ctx.is_cancelled());
        assert!(matches!(ctx.err(), Some(Error::TimedOut)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_cancel_before_deadline() {
        let ctx = AttemptContext::new(meta(), Duration::from_secs(30));
        ctx.cancel();
        assert!(matches!(ctx.err(), Some(Error::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_completes_when_live() {
        let ctx = AttemptContext::new(meta(), Duration::from_secs(30));
        let value = ctx
            .run(async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                42
            })
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_unblocks_on_cancel() {
        let ctx = AttemptContext::new(meta(), Duration::from_secs(30));
        let clone = ctx.clone();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            clone.cancel();
        });

        let result: Result<()> = ctx.run(std::future::pending()).await;
        assert!(matches!(result, Err(Error::Cancelled)));

        canceller.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_maps_deadline_to_timed_out() {
        let ctx = AttemptContext::new(meta(), Duration::from_millis(20));
        let result: Result<()> = ctx.run(std::future::pending()).await;
        assert!(matches!(result, Err(Error::TimedOut)));
    }
}
