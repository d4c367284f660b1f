//! Mock pin implementation for testing and development.
//!
//! The mock records every level write with a timestamp and can be scripted to
//! fail upcoming writes, which is how the strike's lock-failure paths are
//! exercised without hardware.

use crate::error::{GpioError, Result};
use crate::traits::PinOutput;
use crate::types::Level;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::time::Instant;

/// A single recorded level write.
#[derive(Debug, Clone, Copy)]
pub struct LevelWrite {
    /// The level that was written.
    pub level: Level,
    /// When the write happened (Tokio clock, so paused-time tests see
    /// virtual timestamps).
    pub at: Instant,
}

#[derive(Debug, Default)]
struct PinShared {
    writes: Mutex<Vec<LevelWrite>>,
    failures: Mutex<VecDeque<String>>,
    changed: Notify,
}

/// Mock binary output pin.
///
/// Created together with a [`MockPinHandle`] used to inspect and script it:
///
/// ```
/// use doorward_gpio::{Level, MockPin, PinOutput};
///
/// # async fn example() -> doorward_gpio::Result<()> {
/// let (pin, handle) = MockPin::new();
///
/// pin.set_level(Level::High).await?;
/// pin.set_level(Level::Low).await?;
///
/// assert_eq!(handle.levels(), vec![Level::High, Level::Low]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockPin {
    shared: Arc<PinShared>,
}

impl MockPin {
    /// Create a new mock pin and its controlling handle.
    pub fn new() -> (Self, MockPinHandle) {
        let shared = Arc::new(PinShared::default());
        (
            Self {
                shared: Arc::clone(&shared),
            },
            MockPinHandle { shared },
        )
    }
}

impl PinOutput for MockPin {
    async fn set_level(&self, level: Level) -> Result<()> {
        if let Some(message) = self.shared.failures.lock().unwrap().pop_front() {
            return Err(GpioError::write(message));
        }
        self.shared.writes.lock().unwrap().push(LevelWrite {
            level,
            at: Instant::now(),
        });
        self.shared.changed.notify_waiters();
        Ok(())
    }
}

/// Handle for inspecting and scripting a [`MockPin`].
#[derive(Debug, Clone)]
pub struct MockPinHandle {
    shared: Arc<PinShared>,
}

impl MockPinHandle {
    /// All recorded writes, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<LevelWrite> {
        self.shared.writes.lock().unwrap().clone()
    }

    /// Just the written levels, oldest first.
    #[must_use]
    pub fn levels(&self) -> Vec<Level> {
        self.shared
            .writes
            .lock()
            .unwrap()
            .iter()
            .map(|w| w.level)
            .collect()
    }

    /// The most recently written level, if any write happened.
    #[must_use]
    pub fn last_level(&self) -> Option<Level> {
        self.shared.writes.lock().unwrap().last().map(|w| w.level)
    }

    /// Number of writes recorded so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.shared.writes.lock().unwrap().len()
    }

    /// Forget all recorded writes.
    pub fn clear(&self) {
        self.shared.writes.lock().unwrap().clear();
    }

    /// Script the next write to fail with the given message.
    ///
    /// Failures queue up: two calls make the next two writes fail in order.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.shared
            .failures
            .lock()
            .unwrap()
            .push_back(message.into());
    }

    /// Wait until at least `count` writes have been recorded.
    ///
    /// This is the deterministic join used by tests instead of sleeping.
    pub async fn wait_for_writes(&self, count: usize) {
        loop {
            let notified = self.shared.changed.notified();
            if self.write_count() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_pin_records_writes() {
        let (pin, handle) = MockPin::new();

        pin.set_level(Level::High).await.unwrap();
        pin.set_level(Level::Low).await.unwrap();

        assert_eq!(handle.levels(), vec![Level::High, Level::Low]);
        assert_eq!(handle.last_level(), Some(Level::Low));
        assert_eq!(handle.write_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_pin_scripted_failure() {
        let (pin, handle) = MockPin::new();

        handle.fail_next("relay fault");

        let err = pin.set_level(Level::High).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to drive pin: relay fault");

        // The failed write is not recorded, the next one succeeds.
        pin.set_level(Level::High).await.unwrap();
        assert_eq!(handle.write_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_pin_wait_for_writes() {
        let (pin, handle) = MockPin::new();

        let writer = tokio::spawn(async move {
            pin.set_level(Level::High).await.unwrap();
            pin.set_level(Level::Low).await.unwrap();
        });

        handle.wait_for_writes(2).await;
        assert_eq!(handle.write_count(), 2);

        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_mock_pin_clear() {
        let (pin, handle) = MockPin::new();

        pin.set_level(Level::High).await.unwrap();
        handle.clear();
        assert_eq!(handle.write_count(), 0);
        assert_eq!(handle.last_level(), None);
    }
}
