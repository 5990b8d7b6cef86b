//! Push notifications for committed writes
//!
//! Every backend owns a [`ChangeNotifier`]. A committed write (plain write or
//! successful compare-and-swap) is published once, in commit order, to every
//! live [`Watch`].

use serde_json::Value;
use tokio::sync::broadcast;

use crate::path;

/// Default capacity of the change channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// A committed change at a single path
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub path: String,
    /// `None` when the value was removed
    pub value: Option<Value>,
}

/// What a watcher observes
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    Changed(Change),
    /// The watcher fell behind and missed this many changes; re-read state
    Lagged(u64),
}

/// Broadcast side, held by a backend
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<Change>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a committed change. Having no watchers is not an error.
    pub fn publish(&self, path: &str, value: Option<Value>) {
        let _ = self.tx.send(Change {
            path: path.to_string(),
            value,
        });
    }

    /// Watch everything
    pub fn subscribe(&self) -> Watch {
        Watch {
            rx: self.tx.subscribe(),
            prefix: None,
        }
    }

    pub fn watcher_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of the change stream, optionally scoped to a path prefix
#[derive(Debug)]
pub struct Watch {
    rx: broadcast::Receiver<Change>,
    prefix: Option<String>,
}

impl Watch {
    /// Only yield changes at or under `prefix`
    pub fn scoped(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into().trim_matches('/').to_string());
        self
    }

    /// Wait for the next relevant event. Returns `None` once the store is dropped.
    pub async fn next(&mut self) -> Option<WatchEvent> {
        loop {
            match self.rx.recv().await {
                Ok(change) => {
                    if self.matches(&change) {
                        return Some(WatchEvent::Changed(change));
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Watcher lagged behind change stream");
                    return Some(WatchEvent::Lagged(missed));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn matches(&self, change: &Change) -> bool {
        self.prefix
            .as_deref()
            .is_none_or(|prefix| path::is_within(prefix, &change.path))
    }
}
