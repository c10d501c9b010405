//! File mirror: the latest table snapshot as JSON on disk.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hotseat_engine::{ChannelSink, Table, TableSnapshot};
use tracing::{debug, info, instrument, warn};

/// Snapshots buffered between the table and the writer task. Bursts
/// beyond this are dropped rather than allowed to slow the table.
const MIRROR_BUFFER: usize = 64;

/// Attaches a file mirror to the table, replacing any previous sink.
///
/// The current snapshot is written immediately so an unusable path
/// fails the call instead of surfacing later inside the writer task.
/// After that a background task rewrites the file on every change.
#[instrument(skip(table), fields(path = %path.display()))]
pub async fn attach_mirror(table: &Table, path: &Path) -> io::Result<()> {
    write_snapshot(path, &table.snapshot()).await?;

    let (sink, mut rx) = ChannelSink::channel(MIRROR_BUFFER);
    table.set_sink(Arc::new(sink));

    let path = path.to_path_buf();
    tokio::spawn(async move {
        while let Some(snapshot) = rx.recv().await {
            if let Err(err) = write_snapshot(&path, &snapshot).await {
                warn!(error = %err, path = %path.display(), "Mirror write failed");
            }
        }
        // The sender side was replaced or the table went away.
        debug!(path = %path.display(), "Mirror detached");
    });

    info!("Mirror attached");
    Ok(())
}

/// Serializes the snapshot into a scratch file next to the target and
/// renames it into place, so readers never observe a torn write.
async fn write_snapshot(path: &Path, snapshot: &TableSnapshot) -> io::Result<()> {
    let json = serde_json::to_vec(snapshot)?;
    let scratch = scratch_path(path);
    tokio::fs::write(&scratch, &json).await?;
    tokio::fs::rename(&scratch, path).await?;
    Ok(())
}

fn scratch_path(path: &Path) -> PathBuf {
    let mut scratch = path.as_os_str().to_os_string();
    scratch.push(".tmp");
    PathBuf::from(scratch)
}
