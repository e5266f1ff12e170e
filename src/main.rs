mod app;
mod config;
mod engine;
mod util;
mod vault;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;

use config::EngineConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory whose sub-repositories become dream nodes.
    #[arg(long, env = "DREAM_VAULT", default_value = ".")]
    vault_path: PathBuf,
    /// JSON file overriding engine constants.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    no_distance_scaling: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if args.no_distance_scaling {
        config.distance_scaling = false;
    }
    log::info!("opening vault {}", args.vault_path.display());

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let vault_path = args.vault_path;
    eframe::run_native(
        "dream-space",
        options,
        Box::new(move |cc| Ok(Box::new(app::DreamSpaceApp::new(cc, vault_path, config)))),
    )
    .map_err(|error| anyhow!("failed to run the window: {error}"))
}
