//! Scriptable authorizer double for guard tests.

use crate::{Authorizer, Decision, PinChecker};
use doorward_core::{AttemptContext, Credential, DoorId, DoorSide, Error, Result};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum Mode {
    Allow(Option<String>),
    Deny(Option<String>),
    Fail(String),
    /// Block until the attempt context is cancelled, then return its error.
    /// Exercises the cancellation paths.
    Hang,
}

#[derive(Debug)]
struct MockInner {
    mode: Mode,
    calls: Vec<(DoorId, DoorSide, Credential)>,
}

/// Recording, scriptable [`Authorizer`] and [`PinChecker`].
///
/// Clones share state: hand one clone to the guard under test and keep the
/// other for assertions.
#[derive(Debug, Clone)]
pub struct MockAuthorizer {
    inner: Arc<Mutex<MockInner>>,
}

impl MockAuthorizer {
    fn with_mode(mode: Mode) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockInner { mode, calls: Vec::new() })),
        }
    }

    /// Always allow, with the given backend message.
    #[must_use]
    pub fn allow_with(message: impl Into<String>) -> Self {
        Self::with_mode(Mode::Allow(Some(message.into())))
    }

    /// Always allow, with no backend message.
    #[must_use]
    pub fn allow_silent() -> Self {
        Self::with_mode(Mode::Allow(None))
    }

    /// Always deny, with the given backend message.
    #[must_use]
    pub fn deny_with(message: impl Into<String>) -> Self {
        Self::with_mode(Mode::Deny(Some(message.into())))
    }

    /// Always deny, with no backend message.
    #[must_use]
    pub fn deny_silent() -> Self {
        Self::with_mode(Mode::Deny(None))
    }

    /// Always fail with a backend error.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_mode(Mode::Fail(message.into()))
    }

    /// Block until the attempt is cancelled, then return the cancellation
    /// error.
    #[must_use]
    pub fn hanging() -> Self {
        Self::with_mode(Mode::Hang)
    }

    /// The (door, side, credential) triples this double was consulted with.
    #[must_use]
    pub fn calls(&self) -> Vec<(DoorId, DoorSide, Credential)> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn record(&self, door: DoorId, side: DoorSide, id: &Credential) -> Mode {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push((door, side, id.clone()));
        inner.mode.clone()
    }
}

impl Authorizer for MockAuthorizer {
    async fn allowed(
        &self,
        ctx: &AttemptContext,
        door: DoorId,
        side: DoorSide,
        id: &Credential,
    ) -> Result<Decision> {
        match self.record(door, side, id) {
            Mode::Allow(message) => Ok(Decision {
                allowed: true,
                message,
            }),
            Mode::Deny(message) => Ok(Decision {
                allowed: false,
                message,
            }),
            Mode::Fail(message) => Err(Error::backend(message)),
            Mode::Hang => {
                ctx.cancelled().await;
                Err(ctx.err().unwrap_or(Error::Cancelled))
            }
        }
    }
}

impl PinChecker for MockAuthorizer {
    async fn check_pin(
        &self,
        ctx: &AttemptContext,
        door: DoorId,
        side: DoorSide,
        pin: &Credential,
    ) -> Result<String> {
        match self.record(door, side, pin) {
            Mode::Allow(message) => Ok(message.unwrap_or_else(|| "Pin was good".to_string())),
            Mode::Deny(message) => Ok(message.unwrap_or_else(|| "Invalid pin".to_string())),
            Mode::Fail(message) => Err(Error::backend(message)),
            Mode::Hang => {
                ctx.cancelled().await;
                Err(ctx.err().unwrap_or(Error::Cancelled))
            }
        }
    }
}
