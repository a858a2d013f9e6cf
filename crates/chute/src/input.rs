//! Line-delimited JSON input
//!
//! Splits a byte stream into lines, parses each non-blank line as JSON, and
//! forwards the values to the sink channel.

use std::io::{ErrorKind, Read};

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Bytes buffered between the reader thread and the async side
const PIPE_CAPACITY: usize = 64 * 1024;

/// Counters for one input stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputStats {
    /// Lines read, including blank and invalid ones
    pub lines: u64,
    /// Records handed to the sink
    pub forwarded: u64,
    /// Lines that were not valid JSON
    pub invalid: u64,
}

/// Forward every JSON line of `reader` to `tx`
///
/// Stops at end of input, or early when the receiving side is gone. Counts
/// land in `stats` as lines are read, so they survive cancellation.
pub async fn forward_lines<R>(
    reader: R,
    tx: &mpsc::Sender<Value>,
    stats: &mut InputStats,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.split(b'\n');

    while let Some(line) = lines.next_segment().await? {
        stats.lines += 1;

        let line = line.trim_ascii();
        if line.is_empty() {
            continue;
        }

        let record = match serde_json::from_slice::<Value>(line) {
            Ok(record) => record,
            Err(e) => {
                stats.invalid += 1;
                tracing::warn!(line = stats.lines, error = %e, "skipping invalid json");
                continue;
            }
        };

        if tx.send(record).await.is_err() {
            tracing::debug!(line = stats.lines, "sink stopped, no longer reading input");
            break;
        }
        stats.forwarded += 1;
    }

    Ok(())
}

/// Stdin as an async reader, fed from a dedicated thread
pub fn stdin_reader() -> std::io::Result<BufReader<DuplexStream>> {
    spawn_reader(std::io::stdin())
}

/// Pump a blocking source into an in-memory pipe on its own thread
///
/// The thread is detached: a read blocked on the source never holds up
/// runtime shutdown. It exits at end of input, on a read error, or once the
/// async side is dropped.
pub fn spawn_reader<S>(mut source: S) -> std::io::Result<BufReader<DuplexStream>>
where
    S: Read + Send + 'static,
{
    let (mut writer, reader) = tokio::io::duplex(PIPE_CAPACITY);
    let handle = Handle::current();

    std::thread::Builder::new()
        .name("chute-input".into())
        .spawn(move || {
            let mut buf = vec![0u8; PIPE_CAPACITY];
            loop {
                let n = match source.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::warn!(error = %e, "input read failed, treating as end of input");
                        break;
                    }
                };
                if handle.block_on(writer.write_all(&buf[..n])).is_err() {
                    break;
                }
            }
        })?;

    Ok(BufReader::new(reader))
}

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;
