//! NFC/RFID tag guard.
//!
//! One iteration of the guard loop:
//!
//! 1. Poll the reader with a short timeout. No tag or a read error clears
//!    the dedup marker and ends the tick — a normal idle state, not logged.
//! 2. A tag whose id matches the previously processed one is already
//!    handled; nothing happens while it sits on the reader.
//! 3. A new id opens an [`AttemptContext`] bounded by the auth timeout and
//!    announces `Interrogating` to the admitters.
//! 4. A presence monitor re-polls the reader concurrently. If the original
//!    tag stays absent (or a different one appears) for longer than the
//!    cancel timeout, the attempt is cancelled. Brief glitches inside that
//!    grace window are forgiven. The tick does not return until the monitor
//!    has exited.
//! 5. The authorizer's verdict is dispatched: error becomes a deny carrying
//!    the error, an explicit non-allow becomes a deny with the canonical
//!    access-denied reason, an allow becomes an allow. Missing backend
//!    messages get default wording.
//!
//! Any admitter error at dispatch is fatal and ends the guard loop.

use crate::Guard;
use doorward_admit::Admitter;
use doorward_auth::Authorizer;
use doorward_core::constants::{
    DEFAULT_AUTH_TIMEOUT, DEFAULT_CANCEL_TIMEOUT, DEFAULT_READ_TIMEOUT, MSG_ACCESS_DENIED,
    MSG_ACCESS_GRANTED, MSG_AUTHORIZING_TAG,
};
use doorward_core::{
    AttemptContext, AttemptMeta, Credential, DoorId, DoorSide, Error, GuardKind, Result,
};
use std::time::Duration;
use tokio::time::Instant;

/// Any NFC/RFID reader the guard can poll for tag UIDs.
///
/// `read_uid` is expected to take up to `timeout` to resolve when no tag is
/// in the field; the guard relies on that pacing for its poll loop. An error
/// means "no tag" or a transient read failure — the guard treats both
/// identically.
pub trait TagReader: Send + Sync {
    /// Read the UID of the tag currently in the field.
    ///
    /// # Errors
    ///
    /// No tag present within `timeout`, or a transient I/O failure.
    fn read_uid(&self, timeout: Duration) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// A door guard for NFC tags.
///
/// # Examples
///
/// ```no_run
/// use doorward_admit::{AccessLog, AnyAdmitter, Mux};
/// use doorward_auth::StaticAuth;
/// use doorward_core::{Credential, DoorId, DoorSide};
/// use doorward_guard::{Guard, MockReader, TagGuard};
///
/// # async fn example() -> doorward_core::Result<()> {
/// let reader = MockReader::presenting(&[0x00, 0x01, 0xf6, 0x80]);
/// let auth = StaticAuth::new(vec![Credential::new("0001f680")?]);
/// let gate = Mux::from(vec![AnyAdmitter::Log(AccessLog::new())]);
///
/// let mut guard = TagGuard::new(DoorId::new(1)?, DoorSide::A, reader, auth, gate);
/// guard.guard().await // runs until a fatal error
/// # }
/// ```
pub struct TagGuard<R, A, G> {
    door: DoorId,
    side: DoorSide,
    reader: R,
    auth: A,
    gate: G,

    last_tag: Option<Credential>,

    read_timeout: Duration,
    auth_timeout: Duration,
    cancel_timeout: Duration,
}

impl<R, A, G> TagGuard<R, A, G>
where
    R: TagReader,
    A: Authorizer,
    G: Admitter,
{
    /// Create a guard with default timeouts (100ms read, 30s auth, 5s
    /// cancel).
    #[must_use]
    pub fn new(door: DoorId, side: DoorSide, reader: R, auth: A, gate: G) -> Self {
        Self {
            door,
            side,
            reader,
            auth,
            gate,
            last_tag: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            cancel_timeout: DEFAULT_CANCEL_TIMEOUT,
        }
    }

    /// Time given to read a UID from the reader per poll.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Overall time given for the authorization process; when it elapses
    /// before authorization is granted, admission is denied.
    #[must_use]
    pub fn with_auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    /// How long a tag must be absent from the reader before an in-progress
    /// attempt is cancelled.
    #[must_use]
    pub fn with_cancel_timeout(mut self, timeout: Duration) -> Self {
        self.cancel_timeout = timeout;
        self
    }

    /// One iteration of the guard loop.
    async fn tick(&mut self) -> Result<()> {
        let raw = match self.reader.read_uid(self.read_timeout).await {
            Ok(raw) => raw,
            Err(_) => {
                // There was no tag, or we couldn't read the tag.
                self.last_tag = None;
                return Ok(());
            }
        };

        let uid = Credential::from_uid_bytes(&raw);
        if self.last_tag.as_ref() == Some(&uid) {
            return Ok(());
        }
        self.last_tag = Some(uid.clone());

        let ctx = AttemptContext::new(
            AttemptMeta::new(self.door, self.side, GuardKind::Nfc, uid.clone()),
            self.auth_timeout,
        );

        self.gate.interrogating(&ctx, MSG_AUTHORIZING_TAG).await;

        // If the admittee pulls their tag off the reader, the monitor
        // cancels the attempt. It exits as soon as the context is cancelled
        // by any means, and the tick does not return before it has.
        let this = &*self;
        let (outcome, ()) = tokio::join!(
            async {
                let outcome = this.resolve(&ctx, &uid).await;
                ctx.cancel();
                outcome
            },
            this.watch_presence(&ctx, &uid),
        );

        outcome
    }

    /// Consult the authorizer and dispatch the verdict.
    async fn resolve(&self, ctx: &AttemptContext, uid: &Credential) -> Result<()> {
        match self.auth.allowed(ctx, self.door, self.side, uid).await {
            Err(err) => self
                .gate
                .deny(ctx, "Error", &err)
                .await
                .map_err(|e| Error::admitter("failed to deny access", e)),
            Ok(decision) if !decision.allowed => self
                .gate
                .deny(
                    ctx,
                    &decision.message_or(MSG_ACCESS_DENIED),
                    &Error::AccessDenied,
                )
                .await
                .map_err(|e| Error::admitter("failed to deny access", e)),
            Ok(decision) => self
                .gate
                .allow(ctx, &decision.message_or(MSG_ACCESS_GRANTED))
                .await
                .map_err(|e| Error::admitter("failed to allow access", e)),
        }
    }

    /// Re-poll the reader while the attempt is live; cancel the attempt when
    /// the original tag has been gone past the grace window.
    async fn watch_presence(&self, ctx: &AttemptContext, uid: &Credential) {
        let mut last_seen = Instant::now();

        while !ctx.is_cancelled() {
            let present = match self.reader.read_uid(self.read_timeout).await {
                Ok(raw) => Credential::from_uid_bytes(&raw) == *uid,
                Err(_) => false,
            };

            if present {
                last_seen = Instant::now();
                continue;
            }

            // Either the tag is gone or there was a read error; show the
            // admittee some kindness and only cancel them if this keeps
            // being the case for a short time.
            if last_seen.elapsed() > self.cancel_timeout {
                ctx.cancel();
                return;
            }
        }
    }
}

impl<R, A, G> Guard for TagGuard<R, A, G>
where
    R: TagReader,
    A: Authorizer,
    G: Admitter,
{
    async fn guard(&mut self) -> Result<()> {
        loop {
            self.tick().await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockReader;
    use doorward_admit::{AdmitterCall, MockAdmitter};
    use doorward_auth::{MockAuthorizer, StaticAuth};

    const RAW_UID: [u8; 4] = [0x00, 0x01, 0xf6, 0x80];
    const RAW_ALT_UID: [u8; 4] = [0x00, 0x01, 0xf4, 0xa9];
    const STR_UID: &str = "0001f680";

    fn guard_with(
        reader: MockReader,
        auth: MockAuthorizer,
        gate: MockAdmitter,
    ) -> TagGuard<MockReader, MockAuthorizer, MockAdmitter> {
        TagGuard::new(DoorId::new(7).unwrap(), DoorSide::B, reader, auth, gate)
    }

    #[tokio::test(start_paused = true)]
    async fn test_tag_allowed() {
        let reader = MockReader::presenting(&RAW_UID);
        let auth = MockAuthorizer::allow_with("Welcome back Bracken");
        let gate = MockAdmitter::new();
        let mut guard = guard_with(reader, auth.clone(), gate.clone());

        guard.tick().await.unwrap();

        assert_eq!(
            gate.calls(),
            vec![
                AdmitterCall::Interrogating {
                    message: "Authorizing tag...".into()
                },
                AdmitterCall::Allow {
                    message: "Welcome back Bracken".into()
                },
            ]
        );

        let calls = auth.calls();
        assert_eq!(calls.len(), 1);
        let (door, side, id) = &calls[0];
        assert_eq!(door.as_i32(), 7);
        assert_eq!(*side, DoorSide::B);
        assert_eq!(id.as_str(), STR_UID);

        // The same tag still on the reader produces no further calls.
        guard.tick().await.unwrap();
        assert_eq!(gate.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tag_denied() {
        let reader = MockReader::presenting(&RAW_UID);
        let auth = MockAuthorizer::deny_with("Unknown tag");
        let gate = MockAdmitter::new();
        let mut guard = guard_with(reader, auth, gate.clone());

        guard.tick().await.unwrap();

        assert_eq!(
            gate.calls()[1],
            AdmitterCall::Deny {
                message: "Unknown tag".into(),
                reason: "access denied".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_tag_denied_without_message() {
        // This is what the membership backend actually does.
        let reader = MockReader::presenting(&RAW_UID);
        let auth = MockAuthorizer::deny_silent();
        let gate = MockAdmitter::new();
        let mut guard = guard_with(reader, auth, gate.clone());

        guard.tick().await.unwrap();

        assert_eq!(
            gate.calls()[1],
            AdmitterCall::Deny {
                message: "Access denied".into(),
                reason: "access denied".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_tag_allowed_without_message() {
        let reader = MockReader::presenting(&RAW_UID);
        let auth = MockAuthorizer::allow_silent();
        let gate = MockAdmitter::new();
        let mut guard = guard_with(reader, auth, gate.clone());

        guard.tick().await.unwrap();

        assert_eq!(
            gate.calls()[1],
            AdmitterCall::Allow {
                message: "Access granted".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_from_reader_is_an_idle_tick() {
        let reader = MockReader::idle();
        let auth = MockAuthorizer::allow_silent();
        let gate = MockAdmitter::new();
        let mut guard = guard_with(reader, auth.clone(), gate.clone());

        guard.tick().await.unwrap();

        assert!(gate.calls().is_empty());
        assert!(auth.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_from_auth_denies_with_reason() {
        // This includes timeouts.
        let reader = MockReader::presenting(&RAW_UID);
        let auth = MockAuthorizer::failing("server error");
        let gate = MockAdmitter::new();
        let mut guard = guard_with(reader, auth, gate.clone());

        guard.tick().await.unwrap();

        match &gate.calls()[1] {
            AdmitterCall::Deny { message, reason } => {
                assert_eq!(message, "Error");
                assert!(reason.contains("server error"));
            }
            other => panic!("expected deny, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dedup_resets_after_idle_tick() {
        let reader = MockReader::presenting(&RAW_UID);
        let auth = MockAuthorizer::allow_silent();
        let gate = MockAdmitter::new();
        let mut guard = guard_with(reader.clone(), auth, gate.clone());

        guard.tick().await.unwrap();
        guard.tick().await.unwrap();
        assert_eq!(gate.calls().len(), 2, "held tag must not re-authorize");

        // An intervening no-tag tick resets dedup.
        reader.enqueue_absent();
        guard.tick().await.unwrap();
        assert_eq!(gate.calls().len(), 2);

        guard.tick().await.unwrap();
        assert_eq!(gate.calls().len(), 4, "same tag processed again after gap");
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_tag_is_processed_without_gap() {
        let reader = MockReader::presenting(&RAW_UID);
        let auth = MockAuthorizer::allow_silent();
        let gate = MockAdmitter::new();
        let mut guard = guard_with(reader.clone(), auth, gate.clone());

        guard.tick().await.unwrap();
        reader.present(&RAW_ALT_UID);
        guard.tick().await.unwrap();

        assert_eq!(gate.calls().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_deny_is_fatal() {
        let reader = MockReader::presenting(&RAW_UID);
        let auth = MockAuthorizer::failing("bad problem");
        let gate = MockAdmitter::new();
        gate.fail_next_deny(Error::hardware("relay fault"));
        let mut guard = guard_with(reader, auth, gate);

        let err = guard.tick().await.unwrap_err();
        assert!(err.to_string().starts_with("failed to deny access"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_allow_is_fatal() {
        let reader = MockReader::presenting(&RAW_UID);
        let auth = MockAuthorizer::allow_silent();
        let gate = MockAdmitter::new();
        gate.fail_next_allow(Error::hardware("relay fault"));
        let mut guard = guard_with(reader, auth, gate);

        let err = guard.tick().await.unwrap_err();
        assert!(err.to_string().starts_with("failed to allow access"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_withdrawn_tag_cancels_the_attempt() {
        let reader = MockReader::presenting(&RAW_UID);
        let auth = MockAuthorizer::hanging();
        let gate = MockAdmitter::new();
        let mut guard = guard_with(reader.clone(), auth, gate.clone())
            .with_read_timeout(Duration::from_millis(5))
            .with_cancel_timeout(Duration::from_millis(50));

        let started = Instant::now();
        let swap = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            reader.present(&RAW_ALT_UID);
        };
        let (result, ()) = tokio::join!(guard.tick(), swap);
        result.unwrap();

        match &gate.calls()[1] {
            AdmitterCall::Deny { message, reason } => {
                assert_eq!(message, "Error");
                assert!(reason.contains("cancelled"), "reason was: {reason}");
            }
            other => panic!("expected deny, got {other:?}"),
        }

        // Cancellation waited out the grace window first.
        let elapsed = Instant::now().duration_since(started);
        assert!(elapsed >= Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_brief_glitch_does_not_cancel() {
        let reader = MockReader::presenting(&RAW_UID);
        // Slow enough that the monitor lives through the glitch and sees the
        // tag come back.
        let auth = StaticAuth::new(vec![Credential::new(STR_UID).unwrap()])
            .with_delay(Duration::from_millis(350));
        let gate = MockAdmitter::new();
        let mut guard = TagGuard::new(
            DoorId::new(7).unwrap(),
            DoorSide::B,
            reader.clone(),
            auth,
            gate.clone(),
        )
        .with_cancel_timeout(Duration::from_millis(500));

        // Two missed polls (~200ms with the default read timeout), well
        // inside the grace window.
        let glitch = async {
            reader.enqueue_absent();
            reader.enqueue_absent();
        };
        let (result, ()) = tokio::join!(guard.tick(), glitch);
        result.unwrap();

        assert_eq!(
            gate.calls()[1],
            AdmitterCall::Allow {
                message: "Welcome, user.".into()
            }
        );
    }
}
