#![cfg(feature = "std")]

use std::time::Duration;

use battleship_lobby::client::{GridReader, ServerLine};
use battleship_lobby::transport::tcp;
use battleship_lobby::{protocol, GameConfig, Server, ServerConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::time::timeout;

struct LineClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl LineClient {
    async fn connect(addr: std::net::SocketAddr) -> anyhow::Result<Self> {
        let stream = tcp::connect(addr).await?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            lines: BufReader::new(reader).lines(),
            writer,
        })
    }

    async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(format!("{}\n", line).as_bytes()).await?;
        Ok(())
    }

    async fn expect(&mut self, text: &str) -> anyhow::Result<String> {
        loop {
            let line = timeout(Duration::from_secs(5), self.lines.next_line())
                .await??
                .ok_or_else(|| anyhow::anyhow!("connection closed waiting for {:?}", text))?;
            if line.contains(text) {
                return Ok(line);
            }
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_two_clients_play_over_tcp() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = Server::start(ServerConfig {
        game: GameConfig::skirmish(),
        seed: Some(11),
        ..ServerConfig::default()
    });
    let lobby = server.lobby().clone();
    tokio::spawn(async move { server.serve(listener).await });

    let mut ann = LineClient::connect(addr).await?;
    ann.expect(protocol::ASK_USERNAME).await?;
    ann.send("ann").await?;
    ann.expect("Welcome, ann!").await?;

    let mut bob = LineClient::connect(addr).await?;
    bob.expect(protocol::ASK_USERNAME).await?;
    bob.send("bob").await?;

    ann.expect("You are Player 1.").await?;
    bob.expect("You are Player 2.").await?;

    ann.expect(protocol::PLACEMENT_CHOICE).await?;
    ann.send("R").await?;

    // the owner view of the placed fleet, read through the client's block parser
    let mut grid = GridReader::new();
    let rows = loop {
        let line = timeout(Duration::from_secs(5), ann.lines.next_line())
            .await??
            .ok_or_else(|| anyhow::anyhow!("connection closed before the board"))?;
        if let Some(ServerLine::Board(rows)) = grid.push(&line) {
            break rows;
        }
    };
    assert_eq!(rows.len(), 4);
    assert_eq!(rows.iter().skip(1).map(|r| r.matches('S').count()).sum::<usize>(), 2);

    bob.expect(protocol::PLACEMENT_CHOICE).await?;
    bob.send("quit").await?;
    bob.expect(protocol::GOODBYE).await?;
    ann.expect("Player 2 quit the game.").await?;

    let snapshot = lobby.snapshot().await;
    assert_eq!(snapshot.clients.len(), 2);
    Ok(())
}
