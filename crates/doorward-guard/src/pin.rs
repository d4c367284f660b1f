//! PIN guard.
//!
//! The simpler, blocking variant: one newline-terminated line per iteration,
//! read from any [`AsyncBufRead`] source (usually stdin). An empty line is
//! ignored. A non-empty line becomes a PIN, scoped in an attempt context and
//! submitted to the authorizer-side PIN check; the outcome is reported
//! through the injected [`ContextLog`] and the console, never dispatched to
//! admitters. A read failure (closed input) is fatal.

use crate::Guard;
use doorward_auth::PinChecker;
use doorward_core::constants::DEFAULT_AUTH_TIMEOUT;
use doorward_core::{
    AttemptContext, AttemptMeta, Credential, DoorId, DoorSide, Error, GuardKind, Result,
};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info};

/// Logger collaborator for the PIN guard.
///
/// Injected at construction; the default is [`NoopLog`]. Failures here are
/// informational only and do not affect control flow.
pub trait ContextLog: Send + Sync {
    /// Report an informational outcome.
    fn info(&self, ctx: &AttemptContext, message: &str);
    /// Report a failed check.
    fn error(&self, ctx: &AttemptContext, message: &str);
}

/// Default [`ContextLog`] that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLog;

impl ContextLog for NoopLog {
    fn info(&self, _ctx: &AttemptContext, _message: &str) {}
    fn error(&self, _ctx: &AttemptContext, _message: &str) {}
}

/// [`ContextLog`] emitting structured `tracing` events with the attempt
/// metadata attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl ContextLog for TracingLog {
    fn info(&self, ctx: &AttemptContext, message: &str) {
        info!(
            door = %ctx.door(),
            side = %ctx.side(),
            guard = %ctx.guard_kind(),
            credential = %ctx.credential(),
            attempt = %ctx.attempt_id(),
            "{}",
            message
        );
    }

    fn error(&self, ctx: &AttemptContext, message: &str) {
        error!(
            door = %ctx.door(),
            side = %ctx.side(),
            guard = %ctx.guard_kind(),
            credential = %ctx.credential(),
            attempt = %ctx.attempt_id(),
            "{}",
            message
        );
    }
}

/// A guard that takes PIN codes terminated by `\n` from a reader and checks
/// them against the authorization backend.
pub struct PinGuard<I, C> {
    input: I,
    checker: C,
    door: DoorId,
    side: DoorSide,
    pin_timeout: Duration,
    logger: Arc<dyn ContextLog>,
}

impl<I, C> PinGuard<I, C>
where
    I: AsyncBufRead + Unpin + Send,
    C: PinChecker,
{
    /// Create a guard reading PINs from `input`, usually stdin.
    #[must_use]
    pub fn new(input: I, checker: C, door: DoorId, side: DoorSide) -> Self {
        Self {
            input,
            checker,
            door,
            side,
            pin_timeout: DEFAULT_AUTH_TIMEOUT,
            logger: Arc::new(NoopLog),
        }
    }

    /// Bound each PIN check by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.pin_timeout = timeout;
        self
    }

    /// Install the logger collaborator.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn ContextLog>) -> Self {
        self.logger = logger;
        self
    }

    /// One iteration: read a line, check it if non-empty.
    async fn tick(&mut self) -> Result<()> {
        print!("Enter pin: ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        let read = self.input.read_line(&mut line).await?;
        if read == 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "pin input closed",
            )));
        }

        let pin = line.trim_end_matches('\n').trim_end_matches('\r');
        if pin.is_empty() {
            return Ok(());
        }

        let ctx = AttemptContext::new(
            AttemptMeta::new(self.door, self.side, GuardKind::Pin, Credential::new(pin)?),
            self.pin_timeout,
        );

        let result = self
            .checker
            .check_pin(&ctx, self.door, self.side, ctx.credential())
            .await;
        ctx.cancel();

        match result {
            Ok(message) => {
                let message = format!("PIN OK: {message}");
                self.logger.info(&ctx, &message);
                println!("{message}");
            }
            Err(err) => {
                // Not fatal: the backend being down must not stop the guard.
                let message = format!("PIN check failed: {err}");
                self.logger.error(&ctx, &message);
                println!("{message}");
            }
        }

        Ok(())
    }
}

impl<I, C> Guard for PinGuard<I, C>
where
    I: AsyncBufRead + Unpin + Send,
    C: PinChecker,
{
    async fn guard(&mut self) -> Result<()> {
        loop {
            self.tick().await?;
        }
    }
}
