//! Change-notification sink abstraction.

use std::fmt::Debug;

use tokio::sync::mpsc;
use tracing::debug;

use crate::game::TableSnapshot;

/// Observer for table state changes.
///
/// The table calls [`publish`](StateSink::publish) with a full
/// snapshot after every successful mutation. Implementations must not
/// block: the call happens on the mutation path, and a slow consumer
/// must never stall gameplay. When a snapshot cannot be accepted
/// immediately, drop it.
pub trait StateSink: Send + Sync + Debug {
    /// Accepts one post-mutation snapshot, best effort.
    fn publish(&self, snapshot: TableSnapshot);
}

/// Sink that forwards snapshots into a bounded channel.
///
/// Snapshots are dropped when the channel is full or the receiving
/// half is gone, keeping the mutation path non-blocking either way.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<TableSnapshot>,
}

impl ChannelSink {
    /// Creates a sink and its receiving half with the given capacity.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<TableSnapshot>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl StateSink for ChannelSink {
    fn publish(&self, snapshot: TableSnapshot) {
        if let Err(err) = self.tx.try_send(snapshot) {
            debug!(error = %err, "Dropping state notification");
        }
    }
}
