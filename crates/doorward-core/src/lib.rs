//! Core vocabulary for the Doorward access controller.
//!
//! This crate holds what every other workspace member speaks: door identity
//! ([`DoorId`], [`DoorSide`]), input modality ([`GuardKind`]), the opaque
//! [`Credential`], the cancellable [`AttemptContext`] that scopes one
//! authorization exchange, the workspace [`Error`] type, and the default
//! timing [`constants`].

pub mod attempt;
pub mod constants;
pub mod error;
pub mod types;

pub use attempt::{AttemptContext, AttemptMeta};
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
