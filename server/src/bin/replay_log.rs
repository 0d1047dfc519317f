//! Sends a recorded log file to the relay, one datagram per line.

use clap::Parser;
use log::{info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::UdpSocket;
use tokio::time::{sleep, Duration};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log file to replay
    file: PathBuf,

    /// Relay UDP address
    #[arg(short, long, default_value = "127.0.0.1:3333")]
    target: String,

    /// Pause between lines in milliseconds
    #[arg(short, long, default_value = "0")]
    delay_ms: u64,

    /// Only send lines carrying the protocol prefix
    #[arg(long)]
    protocol_only: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let target: SocketAddr = args.target.parse()?;
    let contents = tokio::fs::read_to_string(&args.file).await?;

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    info!(
        "Replaying {} to {} from {}",
        args.file.display(),
        target,
        socket.local_addr()?
    );

    let mut sent = 0usize;
    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if args.protocol_only && !line.contains(shared::PROTOCOL_PREFIX) {
            continue;
        }

        if let Err(e) = socket.send_to(line.as_bytes(), target).await {
            warn!("Failed to send line {}: {}", sent + 1, e);
            continue;
        }
        sent += 1;

        if args.delay_ms > 0 {
            sleep(Duration::from_millis(args.delay_ms)).await;
        }
    }

    info!("Sent {} lines", sent);
    Ok(())
}
