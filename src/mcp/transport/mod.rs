//! Line-delimited stdio transport
//!
//! [`LineReader`] pulls one non-blank line at a time from the input stream and
//! [`ResponseWriter`] emits one compact JSON response per line. Both are
//! generic over tokio byte streams so tests can drive them with in-memory
//! buffers.


use crate::Result;
use crate::mcp::protocol::{JsonRpcError, Response};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error};

const LOG_PREVIEW_CHARS: usize = 100;

/// Reads newline-terminated lines, skipping blank and undecodable ones
pub struct LineReader<R> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R> LineReader<R>
where
    R: AsyncBufRead + Unpin,
{
    #[inline]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
        }
    }

    /// Read the next non-blank line with its terminator stripped.
    ///
    /// Returns `None` at end of stream or on any read failure other than an
    /// invalid UTF-8 line, which is logged and skipped. Not cancel safe: a
    /// partially read line is discarded if the future is dropped.
    #[inline]
    pub async fn read_line(&mut self) -> Option<String> {
        loop {
            self.buffer.clear();
            match self.reader.read_until(b'\n', &mut self.buffer).await {
                Ok(0) => return None,
                Ok(_) => {
                    let line = match std::str::from_utf8(&self.buffer) {
                        Ok(line) => line,
                        Err(e) => {
                            error!("Unicode decode error reading input: {}", e);
                            continue;
                        }
                    };

                    let line = line.trim_end_matches(['\n', '\r']);
                    if line.trim().is_empty() {
                        debug!("Skipping empty line");
                        continue;
                    }

                    debug!("Read line: {}...", preview(line));
                    return Some(line.to_string());
                }
                Err(e) => {
                    error!("Error reading line from input: {}", e);
                    return None;
                }
            }
        }
    }
}

/// Writes responses as single compact JSON lines
pub struct ResponseWriter<W> {
    writer: W,
    /// A previous emission stopped partway through a line
    partial_line: bool,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    #[inline]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            partial_line: false,
        }
    }

    /// Write `response` as one line. Never fails: if the response cannot be
    /// emitted a generic internal error for the same id is attempted instead,
    /// and if that fails too the response is dropped. A line left unfinished
    /// by a failed write is terminated before anything else is written.
    #[inline]
    pub async fn write(&mut self, response: &Response) {
        match self.emit(response).await {
            Ok(line) => debug!("Sent response: {}...", preview(&line)),
            Err(e) => {
                error!("Error writing response: {}", e);
                error!(
                    "Response type: {}",
                    if response.is_error() { "error" } else { "success" }
                );
                error!("Response content: {:?}", response);

                let fallback =
                    Response::error(response.id().clone(), JsonRpcError::serialization_failed());
                if let Err(e) = self.emit(&fallback).await {
                    error!("Failed to send error message: {}", e);
                }
            }
        }
    }

    /// Flush buffered output, logging any failure
    #[inline]
    pub async fn flush(&mut self) {
        match self.writer.flush().await {
            Ok(()) => debug!("Flushed output"),
            Err(e) => error!("Error flushing output: {}", e),
        }
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    #[inline]
    pub fn into_inner(self) -> W {
        self.writer
    }

    async fn emit(&mut self, response: &Response) -> Result<String> {
        let mut line = serde_json::to_string(response)?;
        line.push('\n');

        let mut bytes = Vec::with_capacity(line.len() + 1);
        if self.partial_line {
            bytes.push(b'\n');
        }
        let skip = bytes.len();
        bytes.extend_from_slice(line.as_bytes());

        let mut written = 0;
        while written < bytes.len() {
            let outcome = match bytes.get(written..) {
                Some(remaining) => self.writer.write(remaining).await,
                None => break,
            };
            match outcome {
                Ok(0) => {
                    self.partial_line = written > skip || self.partial_line;
                    return Err(std::io::Error::from(std::io::ErrorKind::WriteZero).into());
                }
                Ok(n) => {
                    written += n;
                    if written >= skip {
                        self.partial_line = false;
                    }
                }
                Err(e) => {
                    self.partial_line = written > skip || self.partial_line;
                    return Err(e.into());
                }
            }
        }
        self.partial_line = false;

        line.pop();
        Ok(line)
    }
}

fn preview(line: &str) -> &str {
    line.char_indices()
        .nth(LOG_PREVIEW_CHARS)
        .and_then(|(end, _)| line.get(..end))
        .unwrap_or(line)
}
