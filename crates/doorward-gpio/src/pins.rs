//! Enum wrapper for pin dispatch.
//!
//! Native async trait methods (RPITIT) are not object-safe, so the workspace
//! uses concrete enum dispatch instead of `Box<dyn PinOutput>`. Real hardware
//! variants (rppal, sysfs) slot in behind the crate's feature flags when a
//! driver lands; the controller core does not change.

use crate::error::Result;
use crate::mock::MockPin;
use crate::traits::PinOutput;
use crate::types::Level;

/// Enum wrapper for pin device dispatch.
///
/// # Examples
///
/// ```
/// use doorward_gpio::{AnyPin, Level, MockPin, PinOutput};
///
/// # async fn example() -> doorward_gpio::Result<()> {
/// let (pin, _handle) = MockPin::new();
/// let pin = AnyPin::Mock(pin);
/// pin.set_level(Level::High).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnyPin {
    /// Mock pin for development and testing.
    Mock(MockPin),
    // Planned variants behind feature flags:
    // - Rppal(RppalPin)  - Raspberry Pi GPIO via rppal
    // - Sysfs(SysfsPin)  - Linux sysfs GPIO fallback
}

impl PinOutput for AnyPin {
    async fn set_level(&self, level: Level) -> Result<()> {
        match self {
            Self::Mock(pin) => pin.set_level(level).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_any_pin_dispatches_to_mock() {
        let (pin, handle) = MockPin::new();
        let any = AnyPin::Mock(pin);

        any.set_level(Level::High).await.unwrap();
        assert_eq!(handle.last_level(), Some(Level::High));
    }
}
