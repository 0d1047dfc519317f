//! # Event Log Relay
//!
//! This library receives the event log a game server streams over UDP,
//! parses every line into a structured event, and forwards the events as
//! JSON to every connected WebSocket client. Alongside the events it keeps
//! clients informed about the active map and its overview calibration.
//!
//! ## Core Responsibilities
//!
//! ### Ingestion
//! Each datagram carries one log line. Lines without the protocol prefix
//! are someone else's output and are dropped silently; lines with an
//! unknown command or a truncated field list are logged and dropped. No
//! line can stop the stream.
//!
//! ### Map Tracking
//! Events that name a map drive a small state machine (no map, loading,
//! ready). Entering a new map reads its calibration file and, when the web
//! overview image does not exist yet, converts it with an external program.
//! That work runs on its own task so ingestion never waits for the disk or
//! the converter.
//!
//! ### Broadcasting
//! Every parsed event goes to every open client. Each client has a bounded
//! queue and its own writer task: a slow client loses messages, a dead one
//! is pruned, and neither delays anybody else. Clients connecting after a
//! map became ready receive the map notification straight away.
//!
//! ## Architecture Design
//!
//! ### Single Relay Loop
//! One task owns the map tracker and the client registry and applies
//! [`relay::RelayMessage`]s in order. Listeners and preparation tasks only
//! ever talk to it through the channel, so no state is shared behind locks.
//!
//! ## Module Organization
//!
//! - `config`: command line options
//! - `assets`: calibration files and overview conversion
//! - `map_tracker`: active map state machine
//! - `registry`: connected clients and fan-out
//! - `relay`: the coordinating loop
//! - `network`: UDP and WebSocket listeners
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use clap::Parser;
//! use server::config::RelayConfig;
//! use server::network;
//! use server::relay::Relay;
//! use shared::{LineParser, ParserTable};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RelayConfig::parse_from(["haywire", "--udp-port", "27500"]);
//!     let relay = Relay::new(
//!         LineParser::new(ParserTable::standard(), &config.prefix),
//!         config.assets(),
//!     );
//!
//!     let socket = network::bind_udp(&config.udp_addr()).await?;
//!     let listener = network::bind_websocket(&config.ws_addr()).await?;
//!     network::spawn_udp_receiver(socket, relay.sender());
//!     network::spawn_websocket_acceptor(listener, relay.sender(), config.client_buffer());
//!
//!     relay.run().await;
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod config;
pub mod map_tracker;
pub mod network;
pub mod registry;
pub mod relay;
