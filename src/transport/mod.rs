//! Line transport: bounded inbound lines, outbound queues with a writer task per connection.

use std::io;

use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub mod in_memory;
pub mod tcp;

/// Newline-delimited reader that refuses lines longer than `max_len` bytes.
///
/// A trailing `\n` or `\r\n` is stripped. An oversized line or invalid
/// UTF-8 is an `InvalidData` error; the rest of the stream is not read.
pub struct LineReader<R> {
    inner: BufReader<R>,
    max_len: usize,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(reader: R, max_len: usize) -> Self {
        Self {
            inner: BufReader::new(reader),
            max_len,
        }
    }

    /// Next line, or `None` at end of stream.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        // one extra byte for the terminator
        let limit = self.max_len as u64 + 1;
        let mut buf = Vec::new();
        let n = (&mut self.inner)
            .take(limit)
            .read_until(b'\n', &mut buf)
            .await?;
        if n == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        } else if n as u64 == limit {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line longer than {} bytes", self.max_len),
            ));
        }
        String::from_utf8(buf)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Item queued for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Text followed by a newline.
    Line(String),
    /// Flush and shut the write half down.
    Close,
}

/// Sending side of a connection's outbound line queue.
///
/// Sends never block and never fail loudly: a closed connection just drops
/// the line, so one dead client cannot stall the session or the broadcast.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl Outbox {
    /// Outbox plus the receiving end, for callers that drain it themselves.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Outbox whose lines are written to `writer` by a spawned task.
    pub fn spawn_writer<W>(writer: W) -> (Self, JoinHandle<()>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (outbox, rx) = Self::channel();
        let handle = tokio::spawn(write_lines(writer, rx));
        (outbox, handle)
    }

    /// Queue one line. Returns `false` if the connection is already gone.
    pub fn send(&self, line: impl Into<String>) -> bool {
        let ok = self.tx.send(Outbound::Line(line.into())).is_ok();
        if !ok {
            debug!("dropping line for closed connection");
        }
        ok
    }

    /// Ask the writer to shut the connection down; tolerates an already closed one.
    pub fn close(&self) {
        let _ = self.tx.send(Outbound::Close);
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

async fn write_lines<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<Outbound>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(item) = rx.recv().await {
        match item {
            Outbound::Line(mut line) => {
                line.push('\n');
                if let Err(e) = writer.write_all(line.as_bytes()).await {
                    debug!("write failed, stopping writer: {}", e);
                    break;
                }
                if let Err(e) = writer.flush().await {
                    debug!("flush failed, stopping writer: {}", e);
                    break;
                }
            }
            Outbound::Close => break,
        }
    }
    rx.close();
    let _ = writer.shutdown().await;
}
