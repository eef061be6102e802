//! TCP transport: one JSON message per line in each direction.
//!
//! Each accepted connection gets a reader loop, which feeds frames to
//! [`dispatch`], and a writer task draining the player's outbound queue.

use crate::dispatch::dispatch;
use crate::protocol::ServerMessage;
use crate::state::{Player, SessionDirectory};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Accept connections until the listener fails.
pub async fn serve(
    listener: TcpListener,
    directory: Arc<SessionDirectory>,
    outbound_capacity: usize,
) -> std::io::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        let directory = Arc::clone(&directory);
        tokio::spawn(async move {
            handle_connection(stream, addr, directory, outbound_capacity).await;
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    directory: Arc<SessionDirectory>,
    outbound_capacity: usize,
) {
    let (reader, writer) = stream.into_split();
    let (player, outbound) = Player::new(outbound_capacity);
    info!("Connection from {} as player {}", addr, player.id());
    directory.add_player(Arc::clone(&player));

    let writer_task = {
        let player = Arc::clone(&player);
        tokio::spawn(async move {
            if let Err(e) = drain_outbound(outbound, writer).await {
                debug!("Write to player {} failed: {}", player.id(), e);
            }
            player.disconnect();
        })
    };

    let mut lines = BufReader::new(reader).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    dispatch(&directory, &player, &line);
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Read from player {} failed: {}", player.id(), e);
                    break;
                }
            },
            _ = player.disconnected() => break,
        }
    }

    directory.remove_player(&player);
    player.disconnect();
    if let Err(e) = writer_task.await {
        error!("Writer task for player {} panicked: {}", player.id(), e);
    }

    let session = chrono::Utc::now() - player.connection().connected_at;
    info!(
        "Player {} from {} disconnected after {}s",
        player.id(),
        addr,
        session.num_seconds()
    );
}

/// Write queued messages as JSON lines until the queue is closed.
pub async fn drain_outbound<W>(
    mut outbound: mpsc::Receiver<ServerMessage>,
    mut writer: W,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = outbound.recv().await {
        let mut line = message.to_json()?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
