//! Dumps the entity lump of compiled maps to `<out-dir>/<map>.entities.json`.

use clap::Parser;
use log::{error, info};
use shared::extract_entities;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Map names, without extension
    #[arg(default_values_t = vec!["de_dust2".to_string()])]
    maps: Vec<String>,

    /// Directory containing `<map>.bsp`
    #[arg(long, default_value = "./csgo/server/csgo/maps")]
    bsp_dir: PathBuf,

    /// Directory the JSON files are written to
    #[arg(short, long, default_value = "./maps")]
    out_dir: PathBuf,
}

async fn extract_map(
    name: String,
    bsp_dir: PathBuf,
    out_dir: PathBuf,
) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    let bsp = tokio::fs::read(bsp_dir.join(format!("{}.bsp", name))).await?;
    let entities = extract_entities(&String::from_utf8_lossy(&bsp))?;

    let json = serde_json::to_string(&entities)?;
    tokio::fs::write(output_path(&out_dir, &name), json).await?;
    Ok(entities.len())
}

fn output_path(out_dir: &Path, name: &str) -> PathBuf {
    out_dir.join(format!("{}.entities.json", name))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    tokio::fs::create_dir_all(&args.out_dir).await?;

    let tasks: Vec<_> = args
        .maps
        .iter()
        .map(|name| {
            let name = name.clone();
            let handle = tokio::spawn(extract_map(
                name.clone(),
                args.bsp_dir.clone(),
                args.out_dir.clone(),
            ));
            (name, handle)
        })
        .collect();

    for (name, handle) in tasks {
        match handle.await {
            Ok(Ok(count)) => info!(
                "Wrote {} entities to {}",
                count,
                output_path(&args.out_dir, &name).display()
            ),
            Ok(Err(e)) => error!("Could not extract entities for {}: {}", name, e),
            Err(e) => error!("Extraction task for {} panicked: {}", name, e),
        }
    }

    Ok(())
}
