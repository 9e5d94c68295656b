//! Goal state watcher.
//!
//! The automation agent reports progress only through its log file. The
//! watcher scans the log incrementally for the goal state marker, resuming
//! from a cursor so a marker that satisfied an earlier wait is never
//! re-detected by a later one.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::error::WatchError;

/// Resumable byte offset into the agent's log stream.
///
/// Cursors are produced by [`await_goal`]; the cursor returned by one wait
/// is the only valid `start_from` for the next wait on the same stream.
/// Offsets are monotonically non-decreasing across waits within one driver
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LogCursor(u64);

impl LogCursor {
    /// The beginning of the stream, for the first wait after launch.
    pub const START: LogCursor = LogCursor(0);

    /// The raw byte offset, for diagnostics.
    pub fn offset(self) -> u64 {
        self.0
    }
}

/// Tuning for a goal state wait.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Sleep between unsuccessful scans.
    pub poll_interval: Duration,

    /// Give up after this long. `None` blocks until the marker appears,
    /// matching the agent's own open-ended convergence.
    pub timeout: Option<Duration>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: None,
        }
    }
}

/// The log line the agent emits once every declared process has converged.
pub fn goal_state_message(process_count: usize) -> String {
    format!("All {process_count} Mongo processes are in goal state")
}

/// Wait until the agent log contains the goal state marker for
/// `process_count` processes in content appended at or after `start_from`.
///
/// Each scan re-seeks to `start_from` and reads to end of stream, so a
/// marker landing across two appends is still seen whole; the cursor only
/// advances on a successful match. Returns the end-of-stream cursor at
/// match time, the `start_from` for the next wait.
///
/// A missing or unreadable log fails immediately with [`WatchError::Io`].
pub async fn await_goal(
    log_path: &Path,
    process_count: usize,
    start_from: LogCursor,
    options: &WatchOptions,
) -> Result<LogCursor, WatchError> {
    let marker = goal_state_message(process_count);
    let started = Instant::now();

    loop {
        let (content, end) = read_from(log_path, start_from.0).map_err(|source| WatchError::Io {
            path: log_path.to_path_buf(),
            source,
        })?;

        if content.contains(&marker) {
            debug!(
                marker = %marker,
                cursor = end,
                "goal state marker found"
            );
            return Ok(LogCursor(end));
        }

        debug!(
            start_from = start_from.0,
            scanned = end - start_from.0,
            "goal state marker not yet present"
        );

        if let Some(limit) = options.timeout {
            if started.elapsed() >= limit {
                return Err(WatchError::Timeout {
                    elapsed: started.elapsed(),
                });
            }
        }

        tokio::time::sleep(options.poll_interval).await;
    }
}

/// Read everything appended since `offset`; returns the content and the new
/// end-of-stream offset.
fn read_from(log_path: &Path, offset: u64) -> std::io::Result<(String, u64)> {
    let mut file = File::open(log_path)?;
    file.seek(SeekFrom::Start(offset))?;

    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;

    let end = offset + buf.len() as u64;
    Ok((String::from_utf8_lossy(&buf).into_owned(), end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(12)]
    fn goal_message_tracks_process_count(#[case] count: usize) {
        let message = goal_state_message(count);
        assert_eq!(
            message,
            format!("All {count} Mongo processes are in goal state")
        );
    }

    #[test]
    fn goal_message_for_three_processes() {
        assert_eq!(
            goal_state_message(3),
            "All 3 Mongo processes are in goal state"
        );
    }

    #[test]
    fn cursor_start_is_zero() {
        assert_eq!(LogCursor::START.offset(), 0);
    }

    #[test]
    fn cursors_order_by_offset() {
        assert!(LogCursor::START < LogCursor(10));
        assert!(LogCursor(10) <= LogCursor(10));
    }
}
