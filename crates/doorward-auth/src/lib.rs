//! Authorization boundary for the Doorward access controller.
//!
//! An [`Authorizer`] is the decision oracle a guard consults once it holds a
//! credential: allowed or not, plus an optional user-presentable message.
//! A [`PinChecker`] is the PIN terminal's variant of the same boundary,
//! returning only a message.
//!
//! Errors from either call are **non-fatal** to the guard loop — they become
//! a deny with the error as reason — but implementations must observe
//! cancellation of the attempt context and return promptly when it fires
//! (use [`AttemptContext::run`] or select on
//! [`AttemptContext::cancelled`]).
//!
//! Implementations:
//! - [`StaticAuth`] — fixed allowlist with an optional artificial delay,
//!   for bench testing a door without a backend
//! - [`DbAuthorizer`] — SQLite membership database with an audit trail
//! - [`MockAuthorizer`] — scriptable double for guard tests
//!
//! [`AttemptContext::run`]: doorward_core::AttemptContext::run
//! [`AttemptContext::cancelled`]: doorward_core::AttemptContext::cancelled

pub mod db;
pub mod mock;
pub mod static_auth;

pub use db::{Database, DatabaseConfig, DbAuthorizer};
pub use mock::MockAuthorizer;
pub use static_auth::StaticAuth;

use doorward_core::{AttemptContext, Credential, DoorId, DoorSide, Result};

/// The outcome of an authorization exchange.
///
/// `message` is user presentable; `None` (or empty) lets the guard
/// substitute its default wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Whether the bearer is to be admitted.
    pub allowed: bool,
    /// Optional user-presentable message from the backend.
    pub message: Option<String>,
}

impl Decision {
    /// An admission with a message.
    #[must_use]
    pub fn allow(message: impl Into<String>) -> Self {
        Self {
            allowed: true,
            message: Some(message.into()),
        }
    }

    /// An admission without a message.
    #[must_use]
    pub fn allow_silent() -> Self {
        Self {
            allowed: true,
            message: None,
        }
    }

    /// A rejection with a message.
    #[must_use]
    pub fn deny(message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            message: Some(message.into()),
        }
    }

    /// A rejection without a message.
    #[must_use]
    pub fn deny_silent() -> Self {
        Self {
            allowed: false,
            message: None,
        }
    }

    /// The message, or `default` when the backend supplied none (or an
    /// empty one).
    #[must_use]
    pub fn message_or(&self, default: &str) -> String {
        match self.message.as_deref() {
            Some(msg) if !msg.is_empty() => msg.to_string(),
            _ => default.to_string(),
        }
    }
}

/// The entity that says whether a given credential is granted access.
///
/// Declared in the desugared `-> impl Future + Send` form so guards generic
/// over an authorizer produce spawnable futures.
pub trait Authorizer: Send + Sync {
    /// Decide admission for `id` at `door`/`side`.
    ///
    /// # Errors
    ///
    /// Operational failures (backend unreachable, attempt cancelled or timed
    /// out). Non-fatal to the caller's loop.
    fn allowed(
        &self,
        ctx: &AttemptContext,
        door: DoorId,
        side: DoorSide,
        id: &Credential,
    ) -> impl Future<Output = Result<Decision>> + Send;
}

/// PIN-terminal variant of the authorization boundary.
///
/// Checks a PIN and returns a message to be displayed; whether the PIN was
/// good is part of the message, not the type, because the PIN terminal has
/// no consequences to drive.
pub trait PinChecker: Send + Sync {
    /// Check `pin` at `door`/`side` and return a display message.
    ///
    /// # Errors
    ///
    /// Operational failures only; a wrong PIN is an `Ok` with an unfriendly
    /// message.
    fn check_pin(
        &self,
        ctx: &AttemptContext,
        door: DoorId,
        side: DoorSide,
        pin: &Credential,
    ) -> impl Future<Output = Result<String>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_message_or() {
        assert_eq!(Decision::allow("Welcome").message_or("d"), "Welcome");
        assert_eq!(Decision::allow_silent().message_or("d"), "d");
        assert_eq!(Decision::deny("").message_or("d"), "d");
    }
}
