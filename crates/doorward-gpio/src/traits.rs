//! Pin device trait definition.
//!
//! The trait method is declared in the desugared
//! `-> impl Future<Output = _> + Send` form rather than `async fn` so that
//! callers generic over `PinOutput` can spawn the returned futures onto the
//! Tokio runtime. Implementations may still be written with plain `async fn`.

use crate::error::Result;
use crate::types::Level;

/// A binary output pin.
///
/// Takes `&self` so that a pin can be shared between concurrently running
/// sessions (for example, overlapping strike unlock cycles). Implementations
/// are responsible for their own interior mutability.
///
/// # Examples
///
/// ```no_run
/// use doorward_gpio::{Level, PinOutput, Result};
///
/// async fn pulse<P: PinOutput>(pin: &P) -> Result<()> {
///     pin.set_level(Level::High).await?;
///     tokio::time::sleep(std::time::Duration::from_millis(100)).await;
///     pin.set_level(Level::Low).await
/// }
/// ```
pub trait PinOutput: Send + Sync {
    /// Drive the pin to the given electrical level.
    ///
    /// # Errors
    ///
    /// Returns an error if the write cannot be performed (bus fault, driver
    /// gone). Callers decide whether such a failure is fatal; for a strike's
    /// final lock write it is.
    fn set_level(&self, level: Level) -> impl Future<Output = Result<()>> + Send;
}
