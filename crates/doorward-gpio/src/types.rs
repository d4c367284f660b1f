//! Logical pin levels and polarity mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical electrical level of a binary output pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Pin driven low (0V).
    Low,
    /// Pin driven high (VCC).
    High,
}

impl Level {
    /// Returns `true` if the level is [`Level::High`].
    #[inline]
    #[must_use]
    pub fn is_high(self) -> bool {
        matches!(self, Level::High)
    }

    /// Returns `true` if the level is [`Level::Low`].
    #[inline]
    #[must_use]
    pub fn is_low(self) -> bool {
        matches!(self, Level::Low)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::High => write!(f, "high"),
        }
    }
}

/// Maps the *intent* of a pin ("active" or not) to an electrical [`Level`].
///
/// A strike wired through a relay board is often active-low: driving the pin
/// low energizes the relay and unlocks the door. Components express intent
/// (`active = true` means "unlocked" / "lit") and let the polarity translate.
///
/// # Examples
///
/// ```
/// use doorward_gpio::{Level, Polarity};
///
/// assert_eq!(Polarity::ActiveHigh.level(true), Level::High);
/// assert_eq!(Polarity::ActiveLow.level(true), Level::Low);
/// assert_eq!(Polarity::ActiveLow.level(false), Level::High);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Active intent drives the pin high. The default.
    #[default]
    ActiveHigh,
    /// Active intent drives the pin low.
    ActiveLow,
}

impl Polarity {
    /// Translate intent into an electrical level.
    #[inline]
    #[must_use]
    pub fn level(self, active: bool) -> Level {
        match (self, active) {
            (Polarity::ActiveHigh, true) | (Polarity::ActiveLow, false) => Level::High,
            (Polarity::ActiveHigh, false) | (Polarity::ActiveLow, true) => Level::Low,
        }
    }
}
