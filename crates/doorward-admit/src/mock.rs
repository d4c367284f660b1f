//! Recording mocks for the admitter boundary.
//!
//! [`MockAdmitter`] records every call it receives and can be scripted to
//! fail upcoming deny/allow calls, which is how guard fatal paths are
//! tested. Clones share state: hand one clone to the component under test
//! and keep the other for assertions.

use crate::admitter::{Admitter, FatalHook};
use doorward_core::{AttemptContext, Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One recorded admitter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmitterCall {
    Interrogating { message: String },
    Deny { message: String, reason: String },
    Allow { message: String },
}

#[derive(Debug, Default)]
struct MockInner {
    calls: Vec<AdmitterCall>,
    deny_errors: VecDeque<Error>,
    allow_errors: VecDeque<Error>,
}

/// Recording, scriptable admitter double.
#[derive(Debug, Clone, Default)]
pub struct MockAdmitter {
    inner: Arc<Mutex<MockInner>>,
}

impl MockAdmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<AdmitterCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Script the next `deny` call to fail with `error`.
    pub fn fail_next_deny(&self, error: Error) {
        self.inner.lock().unwrap().deny_errors.push_back(error);
    }

    /// Script the next `allow` call to fail with `error`.
    pub fn fail_next_allow(&self, error: Error) {
        self.inner.lock().unwrap().allow_errors.push_back(error);
    }
}

impl Admitter for MockAdmitter {
    async fn interrogating(&self, _ctx: &AttemptContext, message: &str) {
        self.inner
            .lock()
            .unwrap()
            .calls
            .push(AdmitterCall::Interrogating {
                message: message.to_string(),
            });
    }

    async fn deny(&self, _ctx: &AttemptContext, message: &str, reason: &Error) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(AdmitterCall::Deny {
            message: message.to_string(),
            reason: reason.to_string(),
        });
        match inner.deny_errors.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn allow(&self, _ctx: &AttemptContext, message: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(AdmitterCall::Allow {
            message: message.to_string(),
        });
        match inner.allow_errors.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Recording [`FatalHook`] double.
#[derive(Debug, Clone, Default)]
pub struct MockFatal {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MockFatal {
    /// Messages reported so far, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// Number of fatal reports received.
    #[must_use]
    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

impl FatalHook for MockFatal {
    fn fatal(&self, _ctx: &AttemptContext, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorward_core::{AttemptMeta, Credential, DoorId, DoorSide, GuardKind};
    use std::time::Duration;

    fn ctx() -> AttemptContext {
        AttemptContext::new(
            AttemptMeta::new(
                DoorId::new(1).unwrap(),
                DoorSide::A,
                GuardKind::Pin,
                Credential::new("1234").unwrap(),
            ),
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn test_mock_records_calls_in_order() {
        let mock = MockAdmitter::new();
        let ctx = ctx();

        mock.interrogating(&ctx, "checking...").await;
        mock.deny(&ctx, "no", &Error::AccessDenied).await.unwrap();
        mock.allow(&ctx, "yes").await.unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                AdmitterCall::Interrogating {
                    message: "checking...".into()
                },
                AdmitterCall::Deny {
                    message: "no".into(),
                    reason: "access denied".into()
                },
                AdmitterCall::Allow {
                    message: "yes".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_mock_scripted_failures_pop_in_order() {
        let mock = MockAdmitter::new();
        mock.fail_next_allow(Error::hardware("boom"));

        let ctx = ctx();
        assert!(mock.allow(&ctx, "yes").await.is_err());
        assert!(mock.allow(&ctx, "yes").await.is_ok());
    }
}
