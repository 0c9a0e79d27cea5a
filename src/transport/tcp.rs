#![cfg(feature = "std")]

use std::sync::Arc;

use log::{info, warn};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::time::{sleep, timeout, Duration};

use crate::lobby::Lobby;
use crate::server::handle_connection;

/// Timeout for establishing a client connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause after a failed accept so a persistent error does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accept connections forever, one handler task per client.
pub async fn serve(listener: TcpListener, lobby: Arc<Lobby>) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("accept failed: {}", e);
                sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        if let Err(e) = socket.set_nodelay(true) {
            warn!("set_nodelay failed for {}: {}", peer, e);
        }
        info!("connection from {}", peer);
        let lobby = lobby.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, peer.to_string(), lobby).await {
                warn!("connection {} ended with error: {}", peer, e);
            }
            info!("connection from {} closed", peer);
        });
    }
}

pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<TcpStream> {
    let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
        .await
        .map_err(|_| anyhow::anyhow!("Connection timeout"))??;
    stream.set_nodelay(true)?;
    Ok(stream)
}
