//! Test doubles for the guard boundaries.

use crate::nfc::TagReader;
use crate::pin::ContextLog;
use doorward_core::{AttemptContext, Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum ReadOutcome {
    Tag(Vec<u8>),
    Absent,
}

#[derive(Debug)]
struct ReaderInner {
    queue: VecDeque<ReadOutcome>,
    fallback: ReadOutcome,
}

/// Mock tag reader.
///
/// Scripted outcomes queue ahead of a steady fallback state ("this tag is on
/// the reader" / "the field is empty"). The mock paces itself like real
/// hardware: a present tag resolves quickly, an absent field consumes the
/// whole poll window, so guard loops driven by this mock do not spin.
///
/// Clones share state: keep one clone to re-script the reader while a guard
/// owns the other.
#[derive(Debug, Clone)]
pub struct MockReader {
    inner: Arc<Mutex<ReaderInner>>,
}

impl MockReader {
    fn with_fallback(fallback: ReadOutcome) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ReaderInner {
                queue: VecDeque::new(),
                fallback,
            })),
        }
    }

    /// A reader with an empty field.
    #[must_use]
    pub fn idle() -> Self {
        Self::with_fallback(ReadOutcome::Absent)
    }

    /// A reader with `uid` sitting on it.
    #[must_use]
    pub fn presenting(uid: &[u8]) -> Self {
        Self::with_fallback(ReadOutcome::Tag(uid.to_vec()))
    }

    /// Put `uid` on the reader (replacing whatever was there).
    pub fn present(&self, uid: &[u8]) {
        self.inner.lock().unwrap().fallback = ReadOutcome::Tag(uid.to_vec());
    }

    /// Take the current tag off the reader.
    pub fn remove(&self) {
        self.inner.lock().unwrap().fallback = ReadOutcome::Absent;
    }

    /// Script one empty poll ahead of the fallback state.
    pub fn enqueue_absent(&self) {
        self.inner
            .lock()
            .unwrap()
            .queue
            .push_back(ReadOutcome::Absent);
    }

    /// Script one poll returning `uid` ahead of the fallback state.
    pub fn enqueue_tag(&self, uid: &[u8]) {
        self.inner
            .lock()
            .unwrap()
            .queue
            .push_back(ReadOutcome::Tag(uid.to_vec()));
    }
}

impl TagReader for MockReader {
    async fn read_uid(&self, timeout: Duration) -> Result<Vec<u8>> {
        let outcome = {
            let mut inner = self.inner.lock().unwrap();
            match inner.queue.pop_front() {
                Some(outcome) => outcome,
                None => inner.fallback.clone(),
            }
        };

        match outcome {
            ReadOutcome::Tag(uid) => {
                tokio::time::sleep(timeout.min(Duration::from_millis(1))).await;
                Ok(uid)
            }
            ReadOutcome::Absent => {
                tokio::time::sleep(timeout).await;
                Err(Error::hardware("no tag in field"))
            }
        }
    }
}

/// One recorded [`ContextLog`] entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Info(String),
    Error(String),
}

/// Recording [`ContextLog`] double.
#[derive(Debug, Clone, Default)]
pub struct MockLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MockLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries recorded so far, in order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl ContextLog for MockLog {
    fn info(&self, _ctx: &AttemptContext, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push(LogEntry::Info(message.to_string()));
    }

    fn error(&self, _ctx: &AttemptContext, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push(LogEntry::Error(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_mock_reader_queue_then_fallback() {
        let reader = MockReader::presenting(&[0x01, 0x02]);
        reader.enqueue_absent();

        assert!(reader.read_uid(Duration::from_millis(10)).await.is_err());
        assert_eq!(
            reader.read_uid(Duration::from_millis(10)).await.unwrap(),
            vec![0x01, 0x02]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_reader_absent_consumes_poll_window() {
        let reader = MockReader::idle();
        let started = tokio::time::Instant::now();

        let _ = reader.read_uid(Duration::from_millis(100)).await;

        assert!(started.elapsed() >= Duration::from_millis(100));
    }
}
