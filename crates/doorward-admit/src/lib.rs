//! Consequence handlers for authorization outcomes.
//!
//! Admitters implement what happens once an authorization attempt starts and
//! finishes: unlocking a strike, changing the status light, writing an audit
//! line. A guard never talks to hardware directly; it dispatches outcomes to
//! an [`Admitter`], usually a [`Mux`] fanning out to several.
//!
//! # Members
//!
//! - [`Strike`] — timed physical unlock with guaranteed relock
//! - [`Light`] — four-pattern status lamp with immediate preemption
//! - [`AccessLog`] — structured audit trail via `tracing`
//! - [`Mux`] — ordered sequential fan-out over [`AnyAdmitter`] members
//!
//! # Error contract
//!
//! `interrogating` is fire-and-forget. `deny` and `allow` return a `Result`;
//! an error from any member is propagated by the [`Mux`] immediately and the
//! dispatching guard treats it as fatal, because a failed consequence (a
//! strike that could not be driven) means the door state is unknown.

pub mod admitter;
pub mod light;
pub mod log;
pub mod mock;
pub mod mux;
pub mod strike;

pub use admitter::{Admitter, FatalHook, NoopFatal};
pub use light::{Blink, BlinkRates, Light, LightState};
pub use log::AccessLog;
pub use mock::{AdmitterCall, MockAdmitter, MockFatal};
pub use mux::{AnyAdmitter, Mux};
pub use strike::Strike;
