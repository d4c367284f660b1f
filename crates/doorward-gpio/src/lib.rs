//! Pin-output abstraction layer for the Doorward access controller.
//!
//! This crate provides the smallest capability the controller needs from the
//! world: "set a binary electrical level". The strike (door latch) and the
//! status light are both driven through the [`PinOutput`] trait, which keeps
//! the consequence layer testable without a Raspberry Pi on the desk.
//!
//! # Design Philosophy
//!
//! - **Async-first**: `set_level` is asynchronous so that real drivers backed
//!   by a bus (I2C expanders, remote GPIO) fit the same trait as mocks.
//! - **Shared access**: the trait takes `&self`; implementations own their
//!   interior mutability. Overlapping strike sessions and the light's render
//!   loop both drive pins from spawned tasks.
//! - **Polarity is layered above the boundary**: a pin only knows
//!   [`Level::High`] and [`Level::Low`]; whether "active" means high or low is
//!   a [`Polarity`] configuration concern of the component using the pin.
//!
//! # Dynamic Dispatch
//!
//! Trait methods return `impl Future`, which is not object-safe, so
//! `Box<dyn PinOutput>` is unavailable. Use the [`AnyPin`] enum wrapper for
//! concrete dispatch, mirroring the device-enum pattern used elsewhere in the
//! workspace:
//!
//! ```
//! use doorward_gpio::{AnyPin, Level, MockPin, PinOutput};
//!
//! # async fn example() -> doorward_gpio::Result<()> {
//! let (pin, handle) = MockPin::new();
//! let pin = AnyPin::Mock(pin);
//!
//! pin.set_level(Level::High).await?;
//! assert_eq!(handle.last_level(), Some(Level::High));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod mock;
pub mod pins;
pub mod traits;
pub mod types;

pub use error::{GpioError, Result};
pub use mock::{MockPin, MockPinHandle};
pub use pins::AnyPin;
pub use traits::PinOutput;
pub use types::{Level, Polarity};
