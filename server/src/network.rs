//! WebSocket transport wiring.
//!
//! One reader and one writer task per connection. The reader parses JSON
//! frames into client events and forwards them to the coordinator; the
//! writer drains the connection's outbound channel. The transport assigns
//! connection ids from a counter owned by the accept loop and reports every
//! lost socket to the coordinator exactly once.

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ClientEvent, ServerEvent};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::coordinator::Command;
use crate::session::ConnectionId;

/// Accepts connections forever, spawning one task per socket.
pub async fn serve(listener: TcpListener, command_tx: mpsc::UnboundedSender<Command>) {
    let mut next_conn: ConnectionId = 1;

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let conn = next_conn;
                next_conn += 1;
                info!("Connection {} accepted from {}", conn, addr);

                let command_tx = command_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(conn, stream, command_tx).await {
                        warn!("Connection {} ended with error: {}", conn, e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

async fn handle_connection(
    conn: ConnectionId,
    stream: TcpStream,
    command_tx: mpsc::UnboundedSender<Command>,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut source) = ws.split();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();
    if command_tx
        .send(Command::Register {
            conn,
            sender: event_tx,
        })
        .is_err()
    {
        // Coordinator is gone; nothing useful left to do for this socket
        return Ok(());
    }

    // Writer task: drains the coordinator's outbound queue for this connection
    let writer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(text) => {
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to encode outbound event: {}", e),
            }
        }
    });

    while let Some(message) = source.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => {
                    if command_tx.send(Command::Event { conn, event }).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Connection {} sent an unreadable frame: {}", conn, e);
                }
            },
            Ok(Message::Close(_)) => break,
            // Pings are answered by the protocol layer; binary frames are
            // not part of the protocol
            Ok(_) => {}
            Err(e) => {
                debug!("Connection {} socket error: {}", conn, e);
                break;
            }
        }
    }

    let _ = command_tx.send(Command::Disconnect { conn });
    writer.abort();
    Ok(())
}
