//! Broadcast coordinator: turns log lines into client messages.

use crate::assets::{MapAssets, PrepareError};
use crate::map_tracker::MapTracker;
use crate::registry::{BroadcastReport, ClientRegistry};
use log::{debug, error, info, trace, warn};
use shared::{LineParser, MapInfo};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Messages sent from network and preparation tasks to the relay loop
#[derive(Debug)]
pub enum RelayMessage {
    LineReceived {
        line: String,
        addr: SocketAddr,
    },
    ClientConnected {
        client_id: u32,
        addr: SocketAddr,
        sender: mpsc::Sender<String>,
    },
    ClientDisconnected {
        client_id: u32,
    },
    MapPrepared {
        name: String,
        result: Result<MapInfo, PrepareError>,
    },
    Shutdown,
}

/// Owns the map tracker and client registry; all mutation happens on the
/// task running [`Relay::run`].
pub struct Relay {
    parser: LineParser,
    tracker: MapTracker,
    registry: ClientRegistry,
    assets: Arc<MapAssets>,

    relay_tx: mpsc::UnboundedSender<RelayMessage>,
    relay_rx: mpsc::UnboundedReceiver<RelayMessage>,
}

impl Relay {
    /// Relay with no clients and no map.
    pub fn new(parser: LineParser, assets: MapAssets) -> Self {
        let (relay_tx, relay_rx) = mpsc::unbounded_channel();
        Self {
            parser,
            tracker: MapTracker::new(),
            registry: ClientRegistry::new(),
            assets: Arc::new(assets),
            relay_tx,
            relay_rx,
        }
    }

    /// Handle for tasks that feed the relay.
    pub fn sender(&self) -> mpsc::UnboundedSender<RelayMessage> {
        self.relay_tx.clone()
    }

    /// Map state as seen by the relay.
    pub fn tracker(&self) -> &MapTracker {
        &self.tracker
    }

    /// Currently connected clients.
    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Applies one message. Returns false once the relay should stop.
    pub fn handle_message(&mut self, message: RelayMessage) -> bool {
        match message {
            RelayMessage::LineReceived { line, addr } => {
                trace!("Line from {}: {}", addr, line);
                self.handle_line(&line);
            }
            RelayMessage::ClientConnected {
                client_id,
                addr,
                sender,
            } => self.handle_client_connected(client_id, addr, sender),
            RelayMessage::ClientDisconnected { client_id } => {
                self.registry.remove_client(&client_id);
            }
            RelayMessage::MapPrepared { name, result } => {
                self.handle_map_prepared(&name, result);
            }
            RelayMessage::Shutdown => {
                info!("Relay shutting down");
                return false;
            }
        }
        true
    }

    /// Parses a line and relays the event to every client.
    ///
    /// Returns `None` when the line produced nothing to send.
    pub fn handle_line(&mut self, line: &str) -> Option<BroadcastReport> {
        let event = match self.parser.parse(line) {
            Ok(event) => event,
            Err(e) if e.is_foreign() => return None,
            Err(e) => {
                warn!("Could not parse line ({}): {}", e, line);
                return None;
            }
        };

        if let Some(name) = event.map_name() {
            if self.tracker.observe(name) {
                self.start_preparation(name);
            }
        }

        match event.to_json() {
            Ok(payload) => Some(self.registry.broadcast(&payload)),
            Err(e) => {
                error!("Could not serialize {} event: {}", event.command(), e);
                None
            }
        }
    }

    /// Registers a client and replays the current map to it.
    pub fn handle_client_connected(
        &mut self,
        client_id: u32,
        addr: SocketAddr,
        sender: mpsc::Sender<String>,
    ) {
        self.registry.add_client(client_id, addr, sender);

        let Some(info) = self.tracker.ready_map() else {
            return;
        };
        match info.notification() {
            Ok(payload) => {
                if let Err(e) = self.registry.send_to(client_id, payload) {
                    debug!("Could not replay map to client {}: {}", client_id, e);
                }
            }
            Err(e) => error!("Could not serialize map {}: {}", info.name, e),
        }
    }

    /// Applies a finished preparation and announces the map if it became ready.
    pub fn handle_map_prepared(
        &mut self,
        name: &str,
        result: Result<MapInfo, PrepareError>,
    ) -> Option<BroadcastReport> {
        let payload = match self.tracker.complete(name, result)?.notification() {
            Ok(payload) => payload,
            Err(e) => {
                error!("Could not serialize map {}: {}", name, e);
                return None;
            }
        };
        Some(self.registry.broadcast(&payload))
    }

    /// Spawns preparation of `name`; the result comes back as `MapPrepared`.
    fn start_preparation(&self, name: &str) {
        let assets = Arc::clone(&self.assets);
        let relay_tx = self.relay_tx.clone();
        let name = name.to_string();

        tokio::spawn(async move {
            let result = assets.prepare(&name).await;
            if let Err(e) = relay_tx.send(RelayMessage::MapPrepared { name, result }) {
                debug!("Relay gone before map preparation finished: {}", e);
            }
        });
    }

    /// Main relay loop
    pub async fn run(mut self) {
        info!("Relay started");
        while let Some(message) = self.relay_rx.recv().await {
            if !self.handle_message(message) {
                break;
            }
        }
    }
}
