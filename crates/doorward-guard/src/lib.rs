//! Credential guards: the polling loops that watch one input modality each.
//!
//! A guard owns the full life of an authorization attempt for its modality:
//! it observes a credential, opens an [`AttemptContext`], consults the
//! authorizer, and dispatches the outcome to its admitters. Guards are
//! independent of each other; the [`GuardMux`] runs several concurrently and
//! treats the first one to stop — for any reason — as fatal to the whole
//! access point.
//!
//! - [`TagGuard`] — NFC/RFID, continuously polled, cancellable mid-attempt
//! - [`PinGuard`] — PIN terminal, line oriented, blocking reads
//!
//! [`AttemptContext`]: doorward_core::AttemptContext

pub mod mock;
pub mod mux;
pub mod nfc;
pub mod pin;

pub use mock::{LogEntry, MockLog, MockReader};
pub use mux::GuardMux;
pub use nfc::{TagGuard, TagReader};
pub use pin::{ContextLog, NoopLog, PinGuard, TracingLog};

use doorward_core::Result;

/// A long-running credential guard.
///
/// Declared in the desugared `-> impl Future + Send` form so that the
/// [`GuardMux`] can spawn guard loops onto the runtime.
pub trait Guard: Send {
    /// Run the guard loop. Returning — with an error or not — is fatal for
    /// the access point this guard belongs to.
    fn guard(&mut self) -> impl Future<Output = Result<()>> + Send;
}
