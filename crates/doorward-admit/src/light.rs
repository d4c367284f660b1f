//! Status light admitter.
//!
//! The light continuously renders one of four blink patterns reflecting the
//! guard's current status. The pattern is never stored as a transition
//! target; it is recomputed from recent event timestamps and a live flag on
//! every cycle of the render loop, with this priority:
//!
//! 1. **Allowed** — an allow happened within `allowed_time` of now
//! 2. **Interrogating** — an authorization attempt is currently open
//! 3. **Denied** — a deny happened within `denied_time` of now
//! 4. **Heartbeat** — otherwise
//!
//! # Preemption
//!
//! Any stimulus (`interrogating`/`allow`/`deny`) wakes the render loop
//! through a single-slot [`Notify`]: the in-progress phase wait aborts
//! immediately and the cycle restarts with a freshly computed state. The
//! wake is non-blocking and coalesced, so a rapid burst of denials cannot
//! stall the caller or grow background work.

use crate::admitter::Admitter;
use doorward_core::constants::{DEFAULT_ALLOWED_TIME, DEFAULT_DENIED_TIME};
use doorward_core::{AttemptContext, Error, Result};
use doorward_gpio::{AnyPin, Level, PinOutput};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// The status a light renders, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightState {
    /// Idle default pattern.
    Heartbeat,
    /// An authorization attempt is in flight.
    Interrogating,
    /// A recent admission.
    Allowed,
    /// A recent rejection.
    Denied,
}

/// One blink pattern: how long the light is on, then off, per cycle.
///
/// A zero duration skips that phase entirely (the light simply never
/// asserts that level while the pattern holds). At most one of the two may
/// be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blink {
    pub on: Duration,
    pub off: Duration,
}

impl Blink {
    /// Shorthand constructor from milliseconds.
    #[must_use]
    pub const fn from_millis(on: u64, off: u64) -> Self {
        Self {
            on: Duration::from_millis(on),
            off: Duration::from_millis(off),
        }
    }
}

/// Blink pattern per light state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkRates {
    pub heartbeat: Blink,
    pub interrogating: Blink,
    pub allowed: Blink,
    pub denied: Blink,
}

impl BlinkRates {
    fn pattern(&self, state: LightState) -> Blink {
        match state {
            LightState::Heartbeat => self.heartbeat,
            LightState::Interrogating => self.interrogating,
            LightState::Allowed => self.allowed,
            LightState::Denied => self.denied,
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, blink) in [
            ("heartbeat", self.heartbeat),
            ("interrogating", self.interrogating),
            ("allowed", self.allowed),
            ("denied", self.denied),
        ] {
            if blink.on.is_zero() && blink.off.is_zero() {
                return Err(Error::config(format!(
                    "Blink pattern '{name}' must have at least one non-zero duration"
                )));
            }
        }
        Ok(())
    }
}

impl Default for BlinkRates {
    /// Slow 50ms flash every 5s at rest, fast flicker while interrogating,
    /// solid second on allow, dark second on deny.
    fn default() -> Self {
        Self {
            heartbeat: Blink::from_millis(50, 4950),
            interrogating: Blink::from_millis(50, 50),
            allowed: Blink::from_millis(1000, 0),
            denied: Blink::from_millis(0, 1000),
        }
    }
}

#[derive(Debug, Default)]
struct LightInner {
    interrogating: bool,
    last_allow: Option<Instant>,
    last_deny: Option<Instant>,
}

#[derive(Debug)]
struct LightShared {
    rates: BlinkRates,
    allowed_time: Duration,
    denied_time: Duration,
    inner: Mutex<LightInner>,
    wake: Notify,
}

impl LightShared {
    /// Resolve the current intended state from timestamps and the live flag.
    fn state(&self) -> LightState {
        let inner = self.inner.lock().unwrap();
        let now = Instant::now();

        let within = |stamp: Option<Instant>, window: Duration| {
            stamp.is_some_and(|at| now.duration_since(at) < window)
        };

        if within(inner.last_allow, self.allowed_time) {
            LightState::Allowed
        } else if inner.interrogating {
            LightState::Interrogating
        } else if within(inner.last_deny, self.denied_time) {
            LightState::Denied
        } else {
            LightState::Heartbeat
        }
    }

    fn poke(&self) {
        self.wake.notify_one();
    }
}

/// Admitter that renders guard status on a single LED.
///
/// Construction spawns the render loop; dropping the light aborts it.
pub struct Light {
    shared: Arc<LightShared>,
    render: JoinHandle<()>,
}

impl Light {
    /// Create a started light with the default rates and windows.
    #[must_use]
    pub fn new(pin: AnyPin) -> Self {
        Self::with_config(
            pin,
            BlinkRates::default(),
            DEFAULT_ALLOWED_TIME,
            DEFAULT_DENIED_TIME,
        )
        .expect("default blink rates are valid")
    }

    /// Create a started light with custom rates and hold windows.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any pattern has both durations zero.
    pub fn with_config(
        pin: AnyPin,
        rates: BlinkRates,
        allowed_time: Duration,
        denied_time: Duration,
    ) -> Result<Self> {
        rates.validate()?;

        let shared = Arc::new(LightShared {
            rates,
            allowed_time,
            denied_time,
            inner: Mutex::new(LightInner::default()),
            wake: Notify::new(),
        });

        let render = tokio::spawn(render(Arc::clone(&shared), pin));

        Ok(Self { shared, render })
    }

    /// The state the render loop would pick right now.
    #[must_use]
    pub fn state(&self) -> LightState {
        self.shared.state()
    }
}

impl Drop for Light {
    fn drop(&mut self) {
        self.render.abort();
    }
}

/// The unending render cycle: assert on, wait, assert off, wait, recompute.
///
/// Pin write errors are ignored here; a status light that cannot be driven
/// must not take the door down.
async fn render(shared: Arc<LightShared>, pin: AnyPin) {
    loop {
        let blink = shared.rates.pattern(shared.state());

        if !blink.on.is_zero() {
            let _ = pin.set_level(Level::High).await;
            tokio::select! {
                _ = tokio::time::sleep(blink.on) => {}
                _ = shared.wake.notified() => continue,
            }
        }

        if !blink.off.is_zero() {
            let _ = pin.set_level(Level::Low).await;
            tokio::select! {
                _ = tokio::time::sleep(blink.off) => {}
                _ = shared.wake.notified() => continue,
            }
        }
    }
}

impl Admitter for Light {
    /// Raise the interrogating flag and watch the attempt for cancellation.
    ///
    /// The watcher guarantees the light leaves the interrogating pattern
    /// promptly once the attempt concludes, even if no allow or deny is
    /// ever delivered for it.
    async fn interrogating(&self, ctx: &AttemptContext, _message: &str) {
        self.shared.inner.lock().unwrap().interrogating = true;

        let shared = Arc::clone(&self.shared);
        let ctx = ctx.clone();
        tokio::spawn(async move {
            ctx.cancelled().await;
            shared.inner.lock().unwrap().interrogating = false;
            shared.poke();
        });

        self.shared.poke();
    }

    async fn deny(&self, _ctx: &AttemptContext, _message: &str, _reason: &Error) -> Result<()> {
        self.shared.inner.lock().unwrap().last_deny = Some(Instant::now());
        self.shared.poke();
        Ok(())
    }

    async fn allow(&self, _ctx: &AttemptContext, _message: &str) -> Result<()> {
        self.shared.inner.lock().unwrap().last_allow = Some(Instant::now());
        self.shared.poke();
        Ok(())
    }
}
