use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use quietline_core::HistoryEntry;
use serde::{Deserialize, Serialize};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::StoreError;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// One popup exchange as recorded in the conversation log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyExchange {
    pub recorded_at_ms: u64,
    pub assistant_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_response: Option<String>,
    /// Outcome kind, e.g. `success` or `timeout`.
    pub result_type: String,
}

impl NotifyExchange {
    /// Empty responses are recorded as absent.
    pub fn new(
        assistant_message: impl Into<String>,
        user_response: Option<&str>,
        result_type: impl Into<String>,
    ) -> Self {
        Self {
            recorded_at_ms: now_millis(),
            assistant_message: assistant_message.into(),
            user_response: user_response
                .filter(|response| !response.is_empty())
                .map(str::to_owned),
            result_type: result_type.into(),
        }
    }

    /// History bubbles for this exchange: the assistant message, then the
    /// reply if there was one.
    pub fn history_entries(&self) -> impl Iterator<Item = HistoryEntry> + '_ {
        std::iter::once(HistoryEntry::assistant(&self.assistant_message)).chain(
            self.user_response
                .as_deref()
                .map(HistoryEntry::user)
                .into_iter(),
        )
    }
}

/// Source of prior conversation shown above a popup, and sink for the
/// exchanges popups produce. Failures are reported, never panicked.
pub trait ConversationStore: Send + Sync + 'static {
    /// Up to `limit` most recent history entries, oldest first.
    fn recent_exchanges<'a>(&'a self, limit: usize) -> StoreFuture<'a, Vec<HistoryEntry>>;

    fn log_notify_exchange<'a>(&'a self, exchange: &'a NotifyExchange) -> StoreFuture<'a, ()>;
}

/// Keeps nothing and remembers nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoConversationStore;

impl ConversationStore for NoConversationStore {
    fn recent_exchanges<'a>(&'a self, _limit: usize) -> StoreFuture<'a, Vec<HistoryEntry>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn log_notify_exchange<'a>(&'a self, _exchange: &'a NotifyExchange) -> StoreFuture<'a, ()> {
        Box::pin(async { Ok(()) })
    }
}

/// Append-only JSONL file, one `NotifyExchange` per line.
#[derive(Debug)]
pub struct JsonlConversationLog {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

impl JsonlConversationLog {
    /// Open or create the log in append mode.
    /// Side effects: filesystem open/create. Complexity: O(1).
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(Self {
            path,
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConversationStore for JsonlConversationLog {
    /// Lines that fail to parse are skipped.
    /// Allocation: whole file read once. Complexity: O(n), n = file bytes.
    fn recent_exchanges<'a>(&'a self, limit: usize) -> StoreFuture<'a, Vec<HistoryEntry>> {
        Box::pin(async move {
            if limit == 0 {
                return Ok(Vec::new());
            }
            // Hold the writer lock so a half-written line is never observed.
            let contents = {
                let _writer = self.file.lock().await;
                tokio::fs::read_to_string(&self.path)
                    .await
                    .map_err(|err| StoreError::Io(err.to_string()))?
            };

            let mut entries: Vec<HistoryEntry> = Vec::new();
            for (index, line) in contents.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<NotifyExchange>(line) {
                    Ok(exchange) => entries.extend(exchange.history_entries()),
                    Err(err) => debug!(line = index + 1, error = %err, "skipping log line"),
                }
            }

            let start = entries.len().saturating_sub(limit);
            Ok(entries.split_off(start))
        })
    }

    /// Serialize one exchange and append a trailing newline.
    /// Allocation: one JSON byte vector. Complexity: O(n), n = serialized bytes.
    fn log_notify_exchange<'a>(&'a self, exchange: &'a NotifyExchange) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut bytes = serde_json::to_vec(exchange)
                .map_err(|err| StoreError::Serialize(err.to_string()))?;
            bytes.push(b'\n');

            let mut file = self.file.lock().await;
            file.write_all(&bytes)
                .await
                .map_err(|err| StoreError::Io(err.to_string()))?;
            file.flush()
                .await
                .map_err(|err| StoreError::Io(err.to_string()))?;
            Ok(())
        })
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
