//! Concurrent guard runner.
//!
//! Each registered guard runs as an independent Tokio task. The mux resolves
//! as soon as **any** guard loop terminates — error or not — and that result
//! is fatal for the whole access point. It does not attempt to stop the
//! other guards: the expected recovery action is a process-level restart,
//! and half-stopped guards would only hide the fault.

use crate::Guard;
use doorward_core::{Error, Result};
use tokio::task::JoinSet;

/// Runs multiple credential guards concurrently, first exit wins.
///
/// # Examples
///
/// ```no_run
/// use doorward_guard::{Guard, GuardMux};
/// # async fn example(tag_guard: impl Guard + 'static, pin_guard: impl Guard + 'static) {
/// let mut mux = GuardMux::new();
/// mux.add(tag_guard);
/// mux.add(pin_guard);
///
/// // Runs until the first guard stops; the result is fatal either way.
/// let result = mux.guard().await;
/// # }
/// ```
#[derive(Default)]
pub struct GuardMux {
    tasks: JoinSet<Result<()>>,
}

impl GuardMux {
    /// Create an empty mux.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a guard; its loop starts immediately.
    pub fn add<G>(&mut self, mut guard: G)
    where
        G: Guard + 'static,
    {
        self.tasks.spawn(async move { guard.guard().await });
    }

    /// Number of registered guards still running.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if no guards are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Guard for GuardMux {
    /// Wait for the first guard to stop and propagate its result.
    ///
    /// A clean guard exit yields `Ok(())`; callers treat any return as fatal
    /// (see the error-handling contract of [`Guard::guard`]).
    async fn guard(&mut self) -> Result<()> {
        match self.tasks.join_next().await {
            None => Err(Error::config("guard mux has no guards registered")),
            Some(Ok(result)) => result,
            Some(Err(join_err)) => Err(Error::GuardAborted {
                message: join_err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Guard double that runs for a fixed time, then returns a scripted
    /// result.
    struct TimedGuard {
        runs_for: Duration,
        result: Option<Result<()>>,
    }

    impl TimedGuard {
        fn ok(runs_for: Duration) -> Self {
            Self {
                runs_for,
                result: Some(Ok(())),
            }
        }

        fn failing(runs_for: Duration, message: &str) -> Self {
            Self {
                runs_for,
                result: Some(Err(Error::hardware(message))),
            }
        }
    }

    impl Guard for TimedGuard {
        async fn guard(&mut self) -> Result<()> {
            tokio::time::sleep(self.runs_for).await;
            self.result.take().expect("guard polled twice")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_error_wins() {
        let mut mux = GuardMux::new();
        mux.add(TimedGuard::ok(Duration::from_secs(3600)));
        mux.add(TimedGuard::failing(Duration::from_millis(10), "oops"));

        let started = Instant::now();
        let err = mux.guard().await.unwrap_err();

        assert!(err.to_string().contains("oops"));
        assert!(Instant::now().duration_since(started) < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clean_exit_also_resolves() {
        let mut mux = GuardMux::new();
        mux.add(TimedGuard::ok(Duration::from_millis(10)));
        mux.add(TimedGuard::ok(Duration::from_secs(3600)));

        assert!(mux.guard().await.is_ok());
        // The long-running guard was not stopped.
        assert_eq!(mux.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_mux_is_an_error() {
        let mut mux = GuardMux::new();
        assert!(mux.guard().await.is_err());
    }
}
