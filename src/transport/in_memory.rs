#![cfg(feature = "std")]

//! Line client over an in-process duplex pipe, served by the real connection handler.

use std::sync::Arc;

use anyhow::bail;
use tokio::io::{
    duplex, split, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf,
    WriteHalf,
};
use tokio::task::JoinHandle;
use tokio::time::{timeout, timeout_at, Duration, Instant};

use crate::lobby::Lobby;
use crate::protocol;
use crate::server::handle_connection;

const PIPE_CAPACITY: usize = 64 * 1024;

/// How long `expect_*` waits for a matching line.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(5);

pub struct InMemoryClient {
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
    handler: JoinHandle<anyhow::Result<()>>,
    wait: Duration,
}

impl InMemoryClient {
    /// Open a connection; the server side is already waiting for a username.
    pub fn connect(lobby: &Arc<Lobby>) -> Self {
        let (client, server) = duplex(PIPE_CAPACITY);
        let handler = tokio::spawn(handle_connection(
            server,
            "in-memory".to_string(),
            lobby.clone(),
        ));
        let (reader, writer) = split(client);
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
            handler,
            wait: DEFAULT_WAIT,
        }
    }

    /// Connect and complete the username exchange.
    pub async fn join(lobby: &Arc<Lobby>, name: &str) -> anyhow::Result<Self> {
        let mut client = Self::connect(lobby);
        client.expect(protocol::ASK_USERNAME).await?;
        client.send(name).await?;
        client.expect_line(|l| l.starts_with("Welcome, ")).await?;
        Ok(client)
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Next line within `wait`; `None` once the server closed the connection.
    pub async fn recv_line(&mut self, wait: Duration) -> anyhow::Result<Option<String>> {
        match timeout(wait, self.lines.next_line()).await {
            Ok(line) => Ok(line?),
            Err(_) => bail!("no line within {:?}", wait),
        }
    }

    /// Read until a line satisfies `pred`, skipping everything before it.
    pub async fn expect_line<F>(&mut self, mut pred: F) -> anyhow::Result<String>
    where
        F: FnMut(&str) -> bool,
    {
        let deadline = Instant::now() + self.wait;
        loop {
            match timeout_at(deadline, self.lines.next_line()).await {
                Ok(Ok(Some(line))) if pred(&line) => return Ok(line),
                Ok(Ok(Some(_))) => continue,
                Ok(Ok(None)) => bail!("connection closed while waiting"),
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => bail!("timed out waiting for an expected line"),
            }
        }
    }

    /// Read until a line containing `text`.
    pub async fn expect(&mut self, text: &str) -> anyhow::Result<String> {
        self.expect_line(|l| l.contains(text)).await
    }

    /// Read until the server closes the connection, returning what was left.
    pub async fn drain_until_closed(&mut self) -> anyhow::Result<Vec<String>> {
        let deadline = Instant::now() + self.wait;
        let mut rest = Vec::new();
        loop {
            match timeout_at(deadline, self.lines.next_line()).await {
                Ok(Ok(Some(line))) => rest.push(line),
                Ok(Ok(None)) => return Ok(rest),
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => bail!("connection still open"),
            }
        }
    }

    /// Close our end and wait for the server handler to finish.
    pub async fn hang_up(self) -> anyhow::Result<()> {
        let Self {
            lines,
            mut writer,
            handler,
            wait,
        } = self;
        let _ = writer.shutdown().await;
        drop(writer);
        drop(lines);
        match timeout(wait, handler).await {
            Ok(joined) => joined?,
            Err(_) => bail!("handler did not finish"),
        }
    }
}
