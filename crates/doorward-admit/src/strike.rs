//! Strike admitter: a timed physical unlock.
//!
//! The strike is the part in the door frame that lets the door be pulled
//! open while energized. An allow drives the pin to the active (unlocked)
//! level immediately and spawns a relock session that drives it back to the
//! inactive level after [`open_for`](Strike::with_open_for).
//!
//! # Relock guarantee
//!
//! The relock session is spawned even when the unlock write failed: the pin
//! state is unknown at that point and leaving it possibly asserted is worse
//! than a redundant lock write. A failed *unlock* is returned as an error to
//! the caller; a failed *lock* is escalated through the injected
//! [`FatalHook`], since the door may now be stuck open with no corrective
//! action left.
//!
//! # Concurrency
//!
//! Overlapping allows each own an independent unlock/relock cycle. Sessions
//! serialize only their final lock write (through a per-strike mutex), so
//! two admissions inside one open window complete in roughly one open
//! duration, not two.

use crate::admitter::{Admitter, FatalHook, NoopFatal};
use doorward_core::constants::DEFAULT_OPEN_FOR;
use doorward_core::{AttemptContext, Error, Result};
use doorward_gpio::{AnyPin, PinOutput, Polarity};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

/// Tracks in-flight relock sessions so tests can join deterministically.
#[derive(Debug, Default)]
struct Inflight {
    count: AtomicUsize,
    idle: Notify,
}

impl Inflight {
    fn enter(self: &Arc<Self>) -> InflightGuard {
        self.count.fetch_add(1, Ordering::AcqRel);
        InflightGuard(Arc::clone(self))
    }

    async fn settled(&self) {
        loop {
            let notified = self.idle.notified();
            if self.count.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}

struct InflightGuard(Arc<Inflight>);

impl Drop for InflightGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// Admitter driving a door strike through a [`PinOutput`].
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use doorward_admit::Strike;
/// use doorward_gpio::{AnyPin, MockPin, Polarity};
///
/// let (pin, _handle) = MockPin::new();
/// let strike = Strike::new(AnyPin::Mock(pin))
///     .with_open_for(Duration::from_secs(3))
///     .with_polarity(Polarity::ActiveLow);
/// ```
pub struct Strike {
    open_for: Duration,
    polarity: Polarity,
    pin: Arc<AnyPin>,
    relock_order: Arc<Mutex<()>>,
    fatal: Arc<dyn FatalHook>,
    inflight: Arc<Inflight>,
}

impl Strike {
    /// Create a strike with default open duration (5s), active-high
    /// polarity, and a no-op fatal hook.
    #[must_use]
    pub fn new(pin: AnyPin) -> Self {
        Self {
            open_for: DEFAULT_OPEN_FOR,
            polarity: Polarity::ActiveHigh,
            pin: Arc::new(pin),
            relock_order: Arc::new(Mutex::new(())),
            fatal: Arc::new(NoopFatal),
            inflight: Arc::new(Inflight::default()),
        }
    }

    /// Set how long the strike stays unlocked after an allow.
    #[must_use]
    pub fn with_open_for(mut self, open_for: Duration) -> Self {
        self.open_for = open_for;
        self
    }

    /// Set the active-vs-unlocked polarity. Active intent means unlocked.
    #[must_use]
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Install the collaborator notified when a lock write fails.
    #[must_use]
    pub fn with_fatal_hook(mut self, hook: Arc<dyn FatalHook>) -> Self {
        self.fatal = hook;
        self
    }

    /// Resolves once no relock session is in flight.
    ///
    /// Tests use this to join the spawned sessions instead of sleeping.
    pub async fn settle(&self) {
        self.inflight.settled().await;
    }
}

impl Admitter for Strike {
    /// Interrogating has no effect on a strike.
    async fn interrogating(&self, _ctx: &AttemptContext, _message: &str) {}

    /// Deny has no effect on a strike.
    async fn deny(&self, _ctx: &AttemptContext, _message: &str, _reason: &Error) -> Result<()> {
        Ok(())
    }

    /// Unlock the strike for the configured open duration.
    ///
    /// Returns immediately after the unlock write; the relock runs in a
    /// spawned session.
    async fn allow(&self, ctx: &AttemptContext, _message: &str) -> Result<()> {
        // The relock deadline is armed before the unlock write so a slow
        // write cannot extend the open window.
        let due = Instant::now() + self.open_for;

        let unlocked = self.pin.set_level(self.polarity.level(true)).await;

        let pin = Arc::clone(&self.pin);
        let order = Arc::clone(&self.relock_order);
        let fatal = Arc::clone(&self.fatal);
        let polarity = self.polarity;
        let ctx = ctx.clone();
        let session = self.inflight.enter();
        tokio::spawn(async move {
            let _slot = order.lock().await;
            tokio::time::sleep_until(due).await;

            if let Err(err) = pin.set_level(polarity.level(false)).await {
                fatal.fatal(&ctx, &format!("Failed to lock door: {err}"));
            }

            drop(session);
        });

        unlocked.map_err(|err| Error::hardware(format!("failed to unlock door: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockFatal;
    use doorward_core::{AttemptMeta, Credential, DoorId, DoorSide, GuardKind};
    use doorward_gpio::{Level, MockPin};

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

    #[tokio::test(start_paused = true)]
    async fn test_allow_opens_then_locks() {
        let (pin, handle) = MockPin::new();
        let strike = Strike::new(AnyPin::Mock(pin)).with_open_for(Duration::from_millis(100));

        let started = Instant::now();
        strike.allow(&ctx(), "Welcome back Bracken").await.unwrap();
        assert_eq!(handle.levels(), vec![Level::High]);

        strike.settle().await;
        assert_eq!(handle.levels(), vec![Level::High, Level::Low]);

        let writes = handle.writes();
        let elapsed = writes[1].at.duration_since(started);
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(150));
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_low_polarity() {
        let (pin, handle) = MockPin::new();
        let strike = Strike::new(AnyPin::Mock(pin))
            .with_open_for(Duration::from_millis(50))
            .with_polarity(Polarity::ActiveLow);

        strike.allow(&ctx(), "in you go").await.unwrap();
        strike.settle().await;

        assert_eq!(handle.levels(), vec![Level::Low, Level::High]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_allows_overlap() {
        let (pin, handle) = MockPin::new();
        let strike = Strike::new(AnyPin::Mock(pin)).with_open_for(Duration::from_millis(100));

        let started = Instant::now();
        strike.allow(&ctx(), "one").await.unwrap();
        strike.allow(&ctx(), "two").await.unwrap();

        strike.settle().await;

        // Two full open/close cycles inside roughly one open window.
        assert_eq!(
            handle.levels(),
            vec![Level::High, Level::High, Level::Low, Level::Low]
        );
        let elapsed = Instant::now().duration_since(started);
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(150));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_unlock_still_locks() {
        let (pin, handle) = MockPin::new();
        let strike = Strike::new(AnyPin::Mock(pin)).with_open_for(Duration::from_millis(50));

        handle.fail_next("relay fault");
        let err = strike.allow(&ctx(), "come in").await.unwrap_err();
        assert!(err.to_string().contains("failed to unlock door"));

        // The lock write is still attempted, exactly once.
        strike.settle().await;
        assert_eq!(handle.levels(), vec![Level::Low]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_lock_raises_fatal_once() {
        let (pin, handle) = MockPin::new();
        let fatal = MockFatal::default();
        let strike = Strike::new(AnyPin::Mock(pin))
            .with_open_for(Duration::from_millis(50))
            .with_fatal_hook(Arc::new(fatal.clone()));

        strike.allow(&ctx(), "come in").await.unwrap();
        handle.fail_next("stuck relay");

        strike.settle().await;

        assert_eq!(fatal.count(), 1);
        assert!(fatal.messages()[0].contains("Failed to lock door"));
        // Only the unlock write landed.
        assert_eq!(handle.levels(), vec![Level::High]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrogating_and_deny_are_noops() {
        let (pin, handle) = MockPin::new();
        let strike = Strike::new(AnyPin::Mock(pin));

        let ctx = ctx();
        strike.interrogating(&ctx, "checking...").await;
        strike
            .deny(&ctx, "Go away", &Error::AccessDenied)
            .await
            .unwrap();

        assert_eq!(handle.write_count(), 0);
    }
}
