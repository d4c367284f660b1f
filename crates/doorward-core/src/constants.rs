//! Default timings and display messages for the access controller.
//!
//! These defaults are tuned for a hackspace door: a tag reader polled fast
//! enough to feel instant, an authorization backend on the local network, and
//! a strike that stays open long enough to pull the door.
//!
//! Every value here is a default; the owning component exposes a setter.

use std::time::Duration;

// ============================================================================
// Reader polling
// ============================================================================

/// Time given to the reader to produce a tag UID on one poll.
///
/// Also the pacing of the tag guard's idle loop: with no tag present the
/// guard wakes this often. 100ms keeps presentation latency imperceptible
/// without saturating the SPI bus.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

// ============================================================================
// Authorization attempt bounds
// ============================================================================

/// Overall time budget for one authorization attempt.
///
/// If the backend has not answered within this window the attempt context is
/// cancelled and the admittee is denied.
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a tag must be continuously absent (or replaced by a different
/// tag) before an in-progress attempt is cancelled.
///
/// This is a debounce, not a deadline: brief read glitches shorter than this
/// window are forgiven so the admittee does not need to hold the tag
/// perfectly still.
pub const DEFAULT_CANCEL_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Consequence timings
// ============================================================================

/// How long the strike stays unlocked after an allow.
pub const DEFAULT_OPEN_FOR: Duration = Duration::from_secs(5);

/// How long the status light shows the Allowed pattern after an allow.
pub const DEFAULT_ALLOWED_TIME: Duration = Duration::from_secs(1);

/// How long the status light shows the Denied pattern after a deny.
pub const DEFAULT_DENIED_TIME: Duration = Duration::from_secs(1);

// ============================================================================
// Default display messages
// ============================================================================

/// Message substituted when the backend allows without a message of its own.
pub const MSG_ACCESS_GRANTED: &str = "Access granted";

/// Message substituted when the backend denies without a message of its own.
pub const MSG_ACCESS_DENIED: &str = "Access denied";

/// Message shown while a tag authorization is in flight.
pub const MSG_AUTHORIZING_TAG: &str = "Authorizing tag...";
