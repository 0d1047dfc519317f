//! Command line configuration for the relay.

use crate::assets::MapAssets;
use clap::Parser;
use std::path::PathBuf;

/// Relays game server event logs to WebSocket clients
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct RelayConfig {
    /// IP address to bind both listeners to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    pub host: String,

    /// UDP port the game server sends its log stream to
    #[arg(short, long, default_value = "3333")]
    pub udp_port: u16,

    /// Port WebSocket clients connect to
    #[arg(short, long, default_value = "3000")]
    pub ws_port: u16,

    /// Directory with `<map>.txt` calibration and `<map>_radar.dds` overviews
    #[arg(long, default_value = "./csgo/server/csgo/resource/overviews")]
    pub overviews_dir: PathBuf,

    /// Directory converted `<map>.png` overview images are written to
    #[arg(long, default_value = "elm-frontend/public/maps")]
    pub images_dir: PathBuf,

    /// Image converter, invoked as `<program> <input.dds> <output.png>`
    #[arg(long, default_value = "convert")]
    pub convert_program: String,

    /// Messages queued per client before further messages are dropped for it
    #[arg(long, default_value = "256")]
    pub client_buffer: usize,

    /// Marker identifying event protocol lines
    #[arg(long, default_value = shared::PROTOCOL_PREFIX)]
    pub prefix: String,
}

impl RelayConfig {
    /// Address the log stream listener binds to
    pub fn udp_addr(&self) -> String {
        format!("{}:{}", self.host, self.udp_port)
    }

    /// Address the WebSocket listener binds to
    pub fn ws_addr(&self) -> String {
        format!("{}:{}", self.host, self.ws_port)
    }

    /// Map asset locations from the configured directories
    pub fn assets(&self) -> MapAssets {
        MapAssets::new(
            self.overviews_dir.clone(),
            self.images_dir.clone(),
            &self.convert_program,
        )
    }

    /// Per-client queue depth; never zero.
    pub fn client_buffer(&self) -> usize {
        self.client_buffer.max(1)
    }
}
