#![cfg(feature = "std")]

//! Per-connection handler and server assembly.

use std::sync::Arc;

use log::{debug, info};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::common::Role;
use crate::config::ServerConfig;
use crate::gate::Delivery;
use crate::lobby::{spawn_announcer, Lobby, Registration};
use crate::protocol::{self, Inbound};
use crate::transport::{tcp, LineReader, Outbox};

/// Serve one client connection until it closes.
///
/// Asks for a username, registers the identity and then routes every line:
/// chat to the broadcast, game answers to the seat's input gate. When the
/// stream ends, fails or sends a line longer than `max_line_len`, the
/// lobby's disconnect path runs exactly once.
pub async fn handle_connection<S>(stream: S, peer: String, lobby: Arc<Lobby>) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (reader, writer) = tokio::io::split(stream);
    let (outbox, writer_task) = Outbox::spawn_writer(writer);
    let mut lines = LineReader::new(reader, lobby.config().max_line_len);

    outbox.send(protocol::ASK_USERNAME);
    let name = match lines.next_line().await {
        Ok(Some(name)) => name,
        Ok(None) => {
            debug!("{} left before choosing a name", peer);
            outbox.close();
            return Ok(());
        }
        Err(e) => {
            outbox.close();
            return Err(e.into());
        }
    };

    let registration = lobby.register(&name, outbox.clone()).await;
    info!("{} joined from {}", registration.name, peer);
    outbox.send(protocol::welcome(&registration.name));

    let result = dispatch(&mut lines, &registration, &outbox, &lobby).await;
    lobby.disconnect(registration.id).await;
    drop(outbox);
    let _ = writer_task.await;
    result
}

async fn dispatch<R>(
    lines: &mut LineReader<R>,
    registration: &Registration,
    outbox: &Outbox,
    lobby: &Lobby,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
{
    while let Some(line) = lines.next_line().await? {
        let text = match Inbound::parse(&line) {
            Inbound::Chat(text) => {
                lobby.send_all(registration.id, &text).await;
                continue;
            }
            Inbound::Line(text) => text,
        };
        let reply = match lobby.role_of(registration.id).await {
            None => break,
            Some(Role::Spectator) => Some(protocol::SPECTATING),
            Some(Role::Player(_)) if !lobby.game_active() => Some(protocol::WAITING_FOR_PLAYERS),
            Some(Role::Player(_)) => match registration.gate.deliver(text) {
                Delivery::Accepted => None,
                Delivery::Rejected => Some(protocol::CANNOT_INPUT),
            },
        };
        if let Some(reply) = reply {
            outbox.send(reply);
        }
    }
    Ok(())
}

/// A running lobby with its manager and announcer tasks.
///
/// Dropping the server stops both tasks; connections already being served
/// keep their own handler tasks.
pub struct Server {
    lobby: Arc<Lobby>,
    manager: JoinHandle<()>,
    announcer: JoinHandle<()>,
}

impl Server {
    pub fn start(config: ServerConfig) -> Self {
        let period = config.announce_interval;
        let lobby = Lobby::new(config);
        let manager = tokio::spawn(lobby.clone().run());
        let announcer = spawn_announcer(lobby.clone(), period);
        Self {
            lobby,
            manager,
            announcer,
        }
    }

    pub fn lobby(&self) -> &Arc<Lobby> {
        &self.lobby
    }

    /// Accept TCP clients until the listener fails.
    pub async fn serve(&self, listener: TcpListener) -> anyhow::Result<()> {
        tcp::serve(listener, self.lobby.clone()).await
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.manager.abort();
        self.announcer.abort();
    }
}

/// Bind `config.bind` and serve until Ctrl-C.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.bind).await?;
    info!(
        "battleship lobby listening on {} ({}x{} board, {} ships)",
        listener.local_addr()?,
        config.game.board_size,
        config.game.board_size,
        config.game.fleet.len()
    );
    let server = Server::start(config);
    tokio::select! {
        res = server.serve(listener) => res?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }
    Ok(())
}
