//! Line reader tolerant of invalid UTF-8 and safe to poll from `select!`.

use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Reads `\n`-terminated lines, replacing invalid UTF-8. Bytes read by a
/// cancelled call stay buffered and are returned by the next call.
pub(super) struct LineStream<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineStream<R> {
    pub(super) fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            buf: Vec::new(),
        }
    }

    /// Next line without its terminator, or `None` once the stream is closed.
    pub(super) async fn next_line(&mut self) -> io::Result<Option<String>> {
        let n = self.reader.read_until(b'\n', &mut self.buf).await?;
        if n == 0 && self.buf.is_empty() {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&self.buf)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        self.buf.clear();
        Ok(Some(line))
    }
}

/// Poll an optional stream; a missing stream never resolves (used with `select!` guards).
pub(super) async fn next_from<R: AsyncRead + Unpin>(
    stream: &mut Option<LineStream<R>>,
) -> io::Result<Option<String>> {
    match stream {
        Some(s) => s.next_line().await,
        None => std::future::pending().await,
    }
}
