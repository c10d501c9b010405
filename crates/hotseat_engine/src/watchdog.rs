//! One-shot countdown backing the per-move time limit.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Armed countdown tied to the round that created it.
///
/// Dropping the watchdog aborts its task, so storing a fresh instance
/// is a reset and clearing the slot is a stop. A countdown that has
/// already slept past its deadline may still be running when the
/// watchdog is dropped; the firing path re-checks the epoch under the
/// table lock, which turns such stale firings into no-ops.
#[derive(Debug)]
pub(crate) struct Watchdog {
    epoch: u64,
    handle: JoinHandle<()>,
}

impl Watchdog {
    /// Arms a countdown that runs `on_elapsed` after `timeout`.
    pub(crate) fn arm<F>(epoch: u64, timeout: Duration, on_elapsed: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            on_elapsed.await;
        });
        Self { epoch, handle }
    }

    /// Epoch this countdown was armed under.
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        debug!(epoch = self.epoch, "Disarming watchdog");
        self.handle.abort();
    }
}
