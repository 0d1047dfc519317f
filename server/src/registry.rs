//! Registry of connected real-time clients and per-client delivery
//!
//! This module tracks every open WebSocket connection, including:
//! - Connection lifecycle (connect, disconnect, pruning of dead connections)
//! - Non-blocking delivery to each client's outbound queue
//! - Fan-out of one payload to every client with per-client failure isolation
//!
//! Each client owns a bounded queue drained by its own writer task, so a slow
//! or dead client can only ever lose its own messages.

use log::{debug, info, warn};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Why a payload did not reach a client's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("client connection is closed")]
    Closed,
    #[error("client outbound queue is full")]
    Full,
    #[error("no such client")]
    Unknown,
}

/// A connected client
#[derive(Debug)]
pub struct Client {
    /// Identifier assigned when the connection was accepted
    pub id: u32,
    /// Peer address, for logging
    pub addr: SocketAddr,
    /// When the connection was registered
    pub connected_at: Instant,
    /// Queue drained by the client's writer task
    sender: mpsc::Sender<String>,
}

impl Client {
    /// Creates a client record stamped with the current time
    pub fn new(id: u32, addr: SocketAddr, sender: mpsc::Sender<String>) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
            sender,
        }
    }

    /// False once the writer task has gone away.
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queues a payload without waiting.
    pub fn deliver(&self, payload: String) -> Result<(), DeliveryError> {
        self.sender.try_send(payload).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

/// Outcome of one broadcast
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Clients the payload was queued for
    pub delivered: usize,
    /// Clients whose queue was full; they stay registered
    pub dropped: Vec<u32>,
    /// Clients found closed and removed
    pub pruned: Vec<u32>,
}

/// Manages all connected clients
#[derive(Debug, Default)]
pub struct ClientRegistry {
    /// Connected clients indexed by their ID
    clients: HashMap<u32, Client>,
}

impl ClientRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection, replacing any previous client with the same ID.
    pub fn add_client(&mut self, id: u32, addr: SocketAddr, sender: mpsc::Sender<String>) {
        if self.contains(&id) {
            warn!("Client {} reconnected, dropping old connection", id);
        }
        info!("Client {} connected from {}", id, addr);
        self.clients.insert(id, Client::new(id, addr, sender));
    }

    /// Removes a client. Returns false if it was already gone.
    pub fn remove_client(&mut self, client_id: &u32) -> bool {
        if let Some(client) = self.clients.remove(client_id) {
            info!(
                "Client {} disconnected after {:.1}s",
                client.id,
                client.connected_at.elapsed().as_secs_f32()
            );
            true
        } else {
            false
        }
    }

    /// Returns true if the client is registered
    pub fn contains(&self, client_id: &u32) -> bool {
        self.clients.contains_key(client_id)
    }

    /// Queues a payload for a single client.
    pub fn send_to(&self, client_id: u32, payload: String) -> Result<(), DeliveryError> {
        self.clients
            .get(&client_id)
            .ok_or(DeliveryError::Unknown)?
            .deliver(payload)
    }

    /// Queues a payload for every open client.
    ///
    /// A full queue drops the payload for that client only; closed clients
    /// are skipped and removed once the fan-out is done.
    pub fn broadcast(&mut self, payload: &str) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for (id, client) in &self.clients {
            if !client.is_open() {
                report.pruned.push(*id);
                continue;
            }
            match client.deliver(payload.to_string()) {
                Ok(()) => report.delivered += 1,
                Err(DeliveryError::Full) => {
                    warn!("Client {} is not keeping up, dropping message", id);
                    report.dropped.push(*id);
                }
                Err(e) => {
                    debug!("Could not deliver to client {}: {}", id, e);
                    report.pruned.push(*id);
                }
            }
        }

        for id in &report.pruned {
            self.remove_client(id);
        }
        report
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
