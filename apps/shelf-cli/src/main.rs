//! # Shelf Scanner Terminal Harness
//!
//! Runs one scan session against the local catalog, with stdin standing in
//! for the camera: every line typed while scanning is a decoded frame.
//!
//! ## Startup Sequence
//! 1. Parse arguments, load `ShelfConfig`
//! 2. Initialize tracing (logging)
//! 3. Connect to the catalog & run migrations
//! 4. Open the scan session
//! 5. Pump stdin until the session exits
//!
//! ## Usage
//! ```bash
//! cargo run --bin seed -- --db ./shelf_dev.db
//! cargo run --bin shelf-scan -- --db ./shelf_dev.db
//! ```

mod terminal;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use shelf_core::{ScanState, SessionExit};
use shelf_db::{Database, DbConfig};
use shelf_scan::{EngineError, ScanController, ScanDeps, ScanHandle, ShelfConfig, VideoSink};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::terminal::{TerminalCamera, TerminalEmitter, TerminalNavigator};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    db: Option<PathBuf>,
    json: bool,
}

fn parse_args() -> Option<Args> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if let Some(value) = args.get(i + 1) {
                    parsed.config = Some(PathBuf::from(value));
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if let Some(value) = args.get(i + 1) {
                    parsed.db = Some(PathBuf::from(value));
                    i += 1;
                }
            }
            "--json" => parsed.json = true,
            "--help" | "-h" => {
                println!("Shelf Scanner");
                println!();
                println!("Usage: shelf-scan [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -d, --db <PATH>      Catalog database, overrides the config file");
                println!("      --json           Print state snapshots as JSON");
                println!("  -h, --help           Show this help message");
                return None;
            }
            _ => {}
        }
        i += 1;
    }

    Some(parsed)
}

/// Loads the config file, falling back to defaults. The load error is
/// handed back so it can be logged once tracing is up.
fn load_config(args: &Args) -> (ShelfConfig, Option<EngineError>) {
    let (mut config, error) = match ShelfConfig::load(args.config.clone()) {
        Ok(config) => (config, None),
        Err(e) => (ShelfConfig::default(), Some(e)),
    };
    if let Some(db) = &args.db {
        config.catalog.database_path = db.clone();
    }
    (config, error)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = parse_args() else {
        return Ok(());
    };

    let (config, load_error) = load_config(&args);
    config.validate()?;

    init_tracing(&config.logging.filter);
    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load scanner config, using defaults");
    }

    info!(
        database = %config.catalog.database_path.display(),
        "Opening catalog"
    );
    let db = Database::new(DbConfig::new(&config.catalog.database_path)).await?;

    let camera = Arc::new(TerminalCamera::new());
    let deps = ScanDeps::new(camera.clone(), Arc::new(db.products()), Arc::new(TerminalNavigator))
        .with_emitter(Arc::new(TerminalEmitter::new(args.json)))
        .with_event_capacity(config.decoder.channel_capacity);

    let handle = ScanController::open(deps, VideoSink::new("terminal"));
    pump_stdin(&handle, &camera).await?;

    match handle.join().await? {
        SessionExit::Navigated(id) => info!(product_id = %id, "Scan finished on product page"),
        SessionExit::Fallback(barcode) => info!(barcode = %barcode, "Scan finished on search"),
        SessionExit::Closed => info!("Scan cancelled"),
    }

    db.close().await;
    Ok(())
}

/// Feeds stdin to the session until it ends. End of input closes it.
async fn pump_stdin(handle: &ScanHandle, camera: &TerminalCamera) -> std::io::Result<()> {
    let mut states = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => dispatch(handle, camera, line.trim()).await,
                None => {
                    stdin_open = false;
                    let _ = handle.close().await;
                }
            },
        }
    }

    Ok(())
}

async fn dispatch(handle: &ScanHandle, camera: &TerminalCamera, line: &str) {
    let state = handle.state();
    let sent = match (state, line) {
        (_, "q") => handle.close().await,
        (ScanState::NotFound | ScanState::Error, "r") => handle.retry().await,
        (ScanState::NotFound, "f") => handle.fallback().await,
        (ScanState::Scanning, _) => {
            camera.feed(line);
            Ok(())
        }
        _ => {
            println!("(ignored while {})", state);
            Ok(())
        }
    };

    if let Err(e) = sent {
        eprintln!("{}", e);
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over the configured filter.
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_config_falls_back_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scanner.toml");
        std::fs::write(&path, "[catalog\n").unwrap();

        let args = Args {
            config: Some(path),
            db: Some(PathBuf::from("/tmp/override.db")),
            json: false,
        };
        let (config, error) = load_config(&args);

        assert!(error.is_some());
        assert_eq!(config.catalog.database_path, PathBuf::from("/tmp/override.db"));
        assert_eq!(config.decoder.channel_capacity, 32);
    }

    #[test]
    fn test_missing_config_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args {
            config: Some(dir.path().join("absent.toml")),
            ..Args::default()
        };
        let (_, error) = load_config(&args);
        assert!(error.is_none());
    }
}
