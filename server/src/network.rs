//! Network listeners feeding the relay: the UDP log stream and WebSocket clients

use crate::relay::RelayMessage;
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::decode_datagram;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Largest datagram the log stream produces, with room to spare
const DATAGRAM_BUFFER: usize = 8192;

/// Binds the UDP socket the game server logs to
pub async fn bind_udp(addr: &str) -> Result<Arc<UdpSocket>, Box<dyn std::error::Error>> {
    let socket = UdpSocket::bind(addr).await?;
    info!("Listening for log lines on udp://{}", socket.local_addr()?);
    Ok(Arc::new(socket))
}

/// Binds the TCP listener for WebSocket clients
pub async fn bind_websocket(addr: &str) -> Result<TcpListener, Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    info!("Accepting WebSocket clients on ws://{}", listener.local_addr()?);
    Ok(listener)
}

/// Spawns task that turns every datagram into one `LineReceived`
pub fn spawn_udp_receiver(
    socket: Arc<UdpSocket>,
    relay_tx: mpsc::UnboundedSender<RelayMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buffer = [0u8; DATAGRAM_BUFFER];

        loop {
            match socket.recv_from(&mut buffer).await {
                Ok((len, addr)) => {
                    let line = decode_datagram(&buffer[..len]);
                    if let Err(e) = relay_tx.send(RelayMessage::LineReceived { line, addr }) {
                        error!("Failed to send line to relay: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    error!("Error receiving datagram: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    })
}

/// Spawns task that accepts WebSocket connections and registers them
pub fn spawn_websocket_acceptor(
    listener: TcpListener,
    relay_tx: mpsc::UnboundedSender<RelayMessage>,
    client_buffer: usize,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut next_client_id: u32 = 1;

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    let client_id = next_client_id;
                    next_client_id = next_client_id.wrapping_add(1);
                    tokio::spawn(handle_websocket(
                        stream,
                        addr,
                        client_id,
                        relay_tx.clone(),
                        client_buffer,
                    ));
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    })
}

/// Runs one client connection until either side closes it
async fn handle_websocket(
    stream: TcpStream,
    addr: SocketAddr,
    client_id: u32,
    relay_tx: mpsc::UnboundedSender<RelayMessage>,
    client_buffer: usize,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();
    let (sender, mut outbound) = mpsc::channel::<String>(client_buffer.max(1));

    if relay_tx
        .send(RelayMessage::ClientConnected {
            client_id,
            addr,
            sender,
        })
        .is_err()
    {
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = outbound.recv().await {
            if let Err(e) = write.send(Message::Text(payload)).await {
                debug!("Write to client {} failed: {}", client_id, e);
                break;
            }
        }
        let _ = write.close().await;
    });

    // Clients never send anything meaningful; reading only detects closure
    let mut recv_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    let _ = relay_tx.send(RelayMessage::ClientDisconnected { client_id });
}
