// Copyright (C) 2026 The padboard authors
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
mod assets;
mod audio;
mod catalog;
mod config;
mod console;
mod dispatch;
mod engine;
mod registry;
mod store;
#[cfg(test)]
mod testutil;
mod volume;

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use clap::{crate_version, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::engine::Instrument;
use crate::store::BlobStore;

#[derive(Parser)]
#[clap(
    version = crate_version!(),
    about = "A virtual drum pad instrument."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Starts the instrument and its interactive console.
    Start {
        /// The path to the config file. Defaults apply without one.
        config: Option<String>,
    },
    /// Lists the builtin sound catalog.
    Sounds {},
    /// Lists the pads with their trigger keys and default sounds.
    Pads {},
    /// Lists the available audio output devices.
    Devices {},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sounds {} => {
            println!("Sounds (count: {}):", catalog::BUILTIN_SOUNDS.len());
            for name in catalog::BUILTIN_SOUNDS {
                println!("- {}", name);
            }
        }
        Commands::Pads {} => {
            println!("{:<12} {:<5} {}", "Pad", "Key", "Default sound");
            for pad in catalog::PADS.iter() {
                println!("{:<12} {:<5} {}", pad.id, pad.key, pad.default_sound);
            }
        }
        Commands::Devices {} => {
            let devices = audio::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Start { config } => {
            let config = match config {
                Some(path) => Config::load(Path::new(&path))?,
                None => Config::default(),
            };
            start(config).await?;
        }
    }

    Ok(())
}

async fn start(config: Config) -> Result<(), Box<dyn Error>> {
    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let settings = store::open_settings(&data_dir)?;
    let blobs = BlobStore::open(&data_dir)?;
    let output = audio::get_output(config.device())?;
    info!(output = %output, "Using audio output");

    let instrument = Arc::new(Instrument::new(settings, blobs, output));
    instrument.load_sounds(&config.sounds_dir()).await;

    let dispatcher = Dispatcher::new(instrument);

    let (events_tx, mut events_rx) = mpsc::channel(16);
    let monitor = console::monitor_events(events_tx);
    console::run(&dispatcher, &mut events_rx).await;

    monitor.abort();
    Ok(())
}
