#![cfg(feature = "std")]

//! Interactive line client: stdin goes to the server, server lines go to stdout.

use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::ToSocketAddrs;

use crate::transport::tcp;
use crate::ui::GRID_HEADER;

/// A complete unit of server output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine {
    Text(String),
    /// Header and row lines of a `GRID` block, without the `GRID` marker and
    /// the blank terminator.
    Board(Vec<String>),
}

/// Groups raw server lines into text lines and board blocks.
#[derive(Debug, Default)]
pub struct GridReader {
    block: Option<Vec<String>>,
}

impl GridReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line; returns an item once it is complete.
    pub fn push(&mut self, line: &str) -> Option<ServerLine> {
        if let Some(rows) = self.block.as_mut() {
            if !line.trim().is_empty() {
                rows.push(line.to_string());
                return None;
            }
            return self.block.take().map(ServerLine::Board);
        }
        if line == GRID_HEADER {
            self.block = Some(Vec::new());
            return None;
        }
        Some(ServerLine::Text(line.to_string()))
    }

    /// True while a board block is being collected.
    pub fn in_board(&self) -> bool {
        self.block.is_some()
    }
}

fn render(item: ServerLine) {
    match item {
        ServerLine::Text(text) => println!("{}", text),
        ServerLine::Board(rows) => {
            println!();
            for row in rows {
                println!("    {}", row);
            }
            println!();
        }
    }
}

/// Connect to a lobby at `addr` and relay lines until either side closes.
pub async fn run_client<A: ToSocketAddrs>(addr: A) -> anyhow::Result<()> {
    let stream = tcp::connect(addr).await?;
    let (reader, mut writer) = stream.into_split();
    let mut server = BufReader::new(reader).lines();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut grid = GridReader::new();

    loop {
        tokio::select! {
            line = server.next_line() => match line? {
                Some(line) => {
                    if let Some(item) = grid.push(&line) {
                        render(item);
                    }
                }
                None => {
                    println!("Server closed the connection.");
                    break;
                }
            },
            input = stdin.next_line() => match input? {
                Some(input) => {
                    writer.write_all(input.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                }
                None => {
                    debug!("stdin closed");
                    writer.shutdown().await?;
                    break;
                }
            },
        }
    }
    Ok(())
}
