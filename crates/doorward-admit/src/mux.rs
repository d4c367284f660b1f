//! Sequential fan-out of one authorization outcome to many admitters.
//!
//! Native async trait methods are not object-safe, so the mux holds its
//! members through the [`AnyAdmitter`] enum wrapper rather than
//! `Box<dyn Admitter>`.

use crate::admitter::Admitter;
use crate::light::Light;
use crate::log::AccessLog;
use crate::mock::MockAdmitter;
use crate::strike::Strike;
use doorward_core::{AttemptContext, Error, Result};

/// Enum wrapper for admitter dispatch.
#[non_exhaustive]
pub enum AnyAdmitter {
    /// Physical door strike.
    Strike(Strike),
    /// Status light.
    Light(Light),
    /// Audit log.
    Log(AccessLog),
    /// Recording mock for development and testing.
    Mock(MockAdmitter),
}

impl Admitter for AnyAdmitter {
    async fn interrogating(&self, ctx: &AttemptContext, message: &str) {
        match self {
            Self::Strike(a) => a.interrogating(ctx, message).await,
            Self::Light(a) => a.interrogating(ctx, message).await,
            Self::Log(a) => a.interrogating(ctx, message).await,
            Self::Mock(a) => a.interrogating(ctx, message).await,
        }
    }

    async fn deny(&self, ctx: &AttemptContext, message: &str, reason: &Error) -> Result<()> {
        match self {
            Self::Strike(a) => a.deny(ctx, message, reason).await,
            Self::Light(a) => a.deny(ctx, message, reason).await,
            Self::Log(a) => a.deny(ctx, message, reason).await,
            Self::Mock(a) => a.deny(ctx, message, reason).await,
        }
    }

    async fn allow(&self, ctx: &AttemptContext, message: &str) -> Result<()> {
        match self {
            Self::Strike(a) => a.allow(ctx, message).await,
            Self::Light(a) => a.allow(ctx, message).await,
            Self::Log(a) => a.allow(ctx, message).await,
            Self::Mock(a) => a.allow(ctx, message).await,
        }
    }
}

/// A container for multiple admitters, each called sequentially in
/// registration order.
///
/// `deny` and `allow` stop at the first member that returns an error and
/// return that error to the caller: a failing admitter aborts the rest of
/// the notification chain, since it may mean the door state is unknown.
///
/// # Examples
///
/// ```no_run
/// use doorward_admit::{AccessLog, AnyAdmitter, Mux, Strike};
/// use doorward_gpio::{AnyPin, MockPin};
///
/// let (pin, _handle) = MockPin::new();
/// let gate = Mux::from(vec![
///     AnyAdmitter::Strike(Strike::new(AnyPin::Mock(pin))),
///     AnyAdmitter::Log(AccessLog::new()),
/// ]);
/// ```
#[derive(Default)]
pub struct Mux {
    members: Vec<AnyAdmitter>,
}

impl Mux {
    /// Create an empty mux.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member; it will be called after all existing members.
    pub fn push(&mut self, admitter: AnyAdmitter) {
        self.members.push(admitter);
    }

    /// Number of registered members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if no members are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl From<Vec<AnyAdmitter>> for Mux {
    fn from(members: Vec<AnyAdmitter>) -> Self {
        Self { members }
    }
}

impl FromIterator<AnyAdmitter> for Mux {
    fn from_iter<I: IntoIterator<Item = AnyAdmitter>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl Admitter for Mux {
    async fn interrogating(&self, ctx: &AttemptContext, message: &str) {
        for member in &self.members {
            member.interrogating(ctx, message).await;
        }
    }

    async fn deny(&self, ctx: &AttemptContext, message: &str, reason: &Error) -> Result<()> {
        for member in &self.members {
            member.deny(ctx, message, reason).await?;
        }
        Ok(())
    }

    async fn allow(&self, ctx: &AttemptContext, message: &str) -> Result<()> {
        for member in &self.members {
            member.allow(ctx, message).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::AdmitterCall;
    use doorward_core::{AttemptMeta, Credential, DoorId, DoorSide, GuardKind};
    use std::time::Duration;

    fn ctx() -> AttemptContext {
        AttemptContext::new(
            AttemptMeta::new(
                DoorId::new(1).unwrap(),
                DoorSide::A,
                GuardKind::Nfc,
                Credential::new("0001f680").unwrap(),
            ),
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn test_fan_out_in_order() {
        let first = MockAdmitter::new();
        let second = MockAdmitter::new();
        let mux = Mux::from(vec![
            AnyAdmitter::Mock(first.clone()),
            AnyAdmitter::Mock(second.clone()),
        ]);

        let ctx = ctx();
        mux.interrogating(&ctx, "checking...").await;
        mux.allow(&ctx, "Welcome").await.unwrap();

        for mock in [&first, &second] {
            assert_eq!(
                mock.calls(),
                vec![
                    AdmitterCall::Interrogating {
                        message: "checking...".into()
                    },
                    AdmitterCall::Allow {
                        message: "Welcome".into()
                    },
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_deny_stops_at_first_error() {
        let first = MockAdmitter::new();
        let second = MockAdmitter::new();
        first.fail_next_deny(Error::hardware("relay fault"));

        let mux = Mux::from(vec![
            AnyAdmitter::Mock(first.clone()),
            AnyAdmitter::Mock(second.clone()),
        ]);

        let err = mux
            .deny(&ctx(), "Go away", &Error::AccessDenied)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("relay fault"));

        // The failing member was called, the later member saw nothing.
        assert_eq!(first.calls().len(), 1);
        assert!(second.calls().is_empty());
    }

    #[tokio::test]
    async fn test_allow_stops_at_first_error() {
        let first = MockAdmitter::new();
        let second = MockAdmitter::new();
        first.fail_next_allow(Error::hardware("relay fault"));

        let mux = Mux::from(vec![
            AnyAdmitter::Mock(first.clone()),
            AnyAdmitter::Mock(second.clone()),
        ]);

        assert!(mux.allow(&ctx(), "Welcome").await.is_err());
        assert!(second.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_mux_is_fine() {
        let mux = Mux::new();
        assert!(mux.is_empty());
        mux.allow(&ctx(), "Welcome").await.unwrap();
        mux.deny(&ctx(), "Go away", &Error::AccessDenied)
            .await
            .unwrap();
    }
}
