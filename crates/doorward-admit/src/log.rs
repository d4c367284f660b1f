//! Audit-trail admitter backed by `tracing`.
//!
//! Every call is emitted as a structured event carrying the attempt
//! metadata, so one access attempt can be correlated across interrogation
//! and outcome by its attempt id. Log emission never fails; this admitter
//! cannot abort a notification chain.

use crate::admitter::Admitter;
use doorward_core::{AttemptContext, Error, Result};
use tracing::info;

/// Admitter that logs admissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLog;

impl AccessLog {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Admitter for AccessLog {
    async fn interrogating(&self, ctx: &AttemptContext, message: &str) {
        info!(
            door = %ctx.door(),
            side = %ctx.side(),
            guard = %ctx.guard_kind(),
            credential = %ctx.credential(),
            attempt = %ctx.attempt_id(),
            "Interrogating: {}",
            message
        );
    }

    async fn deny(&self, ctx: &AttemptContext, message: &str, reason: &Error) -> Result<()> {
        info!(
            door = %ctx.door(),
            side = %ctx.side(),
            guard = %ctx.guard_kind(),
            credential = %ctx.credential(),
            attempt = %ctx.attempt_id(),
            "Denied: {}, reason: {}",
            message,
            reason
        );
        Ok(())
    }

    async fn allow(&self, ctx: &AttemptContext, message: &str) -> Result<()> {
        info!(
            door = %ctx.door(),
            side = %ctx.side(),
            guard = %ctx.guard_kind(),
            credential = %ctx.credential(),
            attempt = %ctx.attempt_id(),
            "Allowed: {}",
            message
        );
        Ok(())
    }
}
