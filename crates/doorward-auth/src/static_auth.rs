//! A very basic authorizer for testing.
//!
//! Admits exactly the credentials it was constructed with, after an optional
//! artificial delay that simulates backend latency. The delay races against
//! attempt cancellation, so this implementation also exercises the
//! cancellation paths of the guards in development setups.

use crate::{Authorizer, Decision, PinChecker};
use doorward_core::{AttemptContext, Credential, DoorId, DoorSide, Result};
use std::time::Duration;

/// Fixed-allowlist authorizer and PIN checker.
///
/// # Examples
///
/// ```
/// use doorward_auth::StaticAuth;
/// use doorward_core::Credential;
/// use std::time::Duration;
///
/// let auth = StaticAuth::new(vec![Credential::new("0001f680").unwrap()])
///     .with_delay(Duration::from_millis(200));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    delay: Duration,
    allow: Vec<Credential>,
}

impl StaticAuth {
    /// Create an authorizer admitting exactly `allow`.
    #[must_use]
    pub fn new(allow: Vec<Credential>) -> Self {
        Self {
            delay: Duration::ZERO,
            allow,
        }
    }

    /// Add an artificial decision delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Authorizer for StaticAuth {
    async fn allowed(
        &self,
        ctx: &AttemptContext,
        _door: DoorId,
        _side: DoorSide,
        id: &Credential,
    ) -> Result<Decision> {
        ctx.run(tokio::time::sleep(self.delay)).await?;

        if self.allow.iter().any(|cred| cred == id) {
            Ok(Decision::allow("Welcome, user."))
        } else {
            Ok(Decision::deny("Be gone, stranger."))
        }
    }
}

impl PinChecker for StaticAuth {
    async fn check_pin(
        &self,
        ctx: &AttemptContext,
        _door: DoorId,
        _side: DoorSide,
        pin: &Credential,
    ) -> Result<String> {
        ctx.run(tokio::time::sleep(self.delay)).await?;

        if self.allow.iter().any(|cred| cred == pin) {
            Ok("Pin was good".to_string())
        } else {
            Ok("Pin was bad".to_string())
        }
    }
}
