use clap::Parser;
use log::{error, info};
use server::config::RelayConfig;
use server::network;
use server::relay::{Relay, RelayMessage};
use shared::{LineParser, ParserTable};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RelayConfig::parse();

    let parser = LineParser::new(ParserTable::standard(), &config.prefix);
    info!("Loaded {} event parsers", parser.table().len());

    let relay = Relay::new(parser, config.assets());
    let relay_tx = relay.sender();

    let socket = network::bind_udp(&config.udp_addr()).await?;
    let listener = network::bind_websocket(&config.ws_addr()).await?;

    let udp_handle = network::spawn_udp_receiver(socket, relay.sender());
    let ws_handle =
        network::spawn_websocket_acceptor(listener, relay.sender(), config.client_buffer());
    let relay_handle = tokio::spawn(relay.run());

    tokio::select! {
        result = udp_handle => {
            if let Err(e) = result {
                error!("UDP receiver task panicked: {}", e);
            }
        }
        result = ws_handle => {
            if let Err(e) = result {
                error!("WebSocket acceptor task panicked: {}", e);
            }
        }
        result = relay_handle => {
            if let Err(e) = result {
                error!("Relay task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            let _ = relay_tx.send(RelayMessage::Shutdown);
        }
    }

    Ok(())
}
