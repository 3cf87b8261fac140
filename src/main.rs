// filepath: src/main.rs

mod app;
mod keyboard;
mod session;
mod wayland;

use std::path::PathBuf;

use app::AppData;
use calloop::EventLoop;
use calloop_wayland_source::WaylandSource;
use clap::Parser;
use log::{info, warn};
use smithay_client_toolkit::{
    compositor::CompositorState,
    output::OutputState,
    registry::RegistryState,
    seat::SeatState,
    shell::wlr_layer::LayerShell,
    shm::{slot::SlotPool, Shm},
};
use unlock_indicator::config::BackgroundMode;
use unlock_indicator::{IndicatorConfig, UnlockIndicator};
use wayland_client::{globals::registry_queue_init, Connection};

/// Initial shm pool size; the pool grows on demand.
const INITIAL_POOL_SIZE: usize = 1920 * 1080 * 4;

/// Preview the unlock indicator on every output.
#[derive(Debug, Parser)]
#[command(name = "unlock-indicator", version, about, long_about = None)]
struct Cli {
    /// Override config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Background image (PNG or JPEG).
    #[arg(short = 'i', long, value_name = "PATH")]
    image: Option<PathBuf>,
    /// Tile the background image.
    #[arg(short = 't', long, conflicts_with = "centered")]
    tile: bool,
    /// Center the background image on every output.
    #[arg(short = 'C', long)]
    centered: bool,
    /// Background color as rrggbb.
    #[arg(short = 'c', long, value_name = "RRGGBB")]
    color: Option<String>,
    /// Show the number of failed attempts.
    #[arg(short = 'f', long)]
    show_failed_attempts: bool,
    /// Never draw the unlock indicator.
    #[arg(short = 'u', long)]
    no_unlock_indicator: bool,
    /// Debug logging.
    #[arg(short = 'd', long)]
    debug: bool,
    /// Password that ends the preview; without it every attempt is wrong.
    #[arg(long)]
    password: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut IndicatorConfig) {
        if let Some(image) = &self.image {
            config.background.image = Some(image.clone());
        }
        if self.tile {
            config.background.mode = BackgroundMode::Tile;
        } else if self.centered {
            config.background.mode = BackgroundMode::Centered;
        }
        if let Some(color) = &self.color {
            config.background.color = color.clone();
        }
        if self.show_failed_attempts {
            config.show_failed_attempts = true;
        }
        if self.no_unlock_indicator {
            config.unlock_indicator = false;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let default_filter = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    info!("Starting unlock-indicator preview");

    let mut config = match &cli.config {
        Some(path) => IndicatorConfig::load_from_path(path)?,
        None => IndicatorConfig::load_from_file().unwrap_or_else(|e| {
            warn!("Using default configuration: {e}");
            IndicatorConfig::default()
        }),
    };
    cli.apply(&mut config);
    let indicator = UnlockIndicator::from_config(config)?;
    info!("Configuration loaded");

    let conn = Connection::connect_to_env()?;
    let (globals, event_queue) = registry_queue_init(&conn)?;
    let qh = event_queue.handle();

    let mut event_loop: EventLoop<'static, AppData> = EventLoop::try_new()?;
    WaylandSource::new(conn.clone(), event_queue)
        .insert(event_loop.handle())
        .map_err(|e| e.error)?;

    let compositor = CompositorState::bind(&globals, &qh)?;
    let layer_shell = LayerShell::bind(&globals, &qh)?;
    let shm = Shm::bind(&globals, &qh)?;
    let pool = SlotPool::new(INITIAL_POOL_SIZE, &shm)?;

    let mut app_data = AppData::new(
        RegistryState::new(&globals),
        OutputState::new(&globals, &qh),
        SeatState::new(&globals, &qh),
        compositor,
        shm,
        layer_shell,
        pool,
        indicator,
        cli.password.clone(),
        event_loop.handle(),
    );

    info!("Entering event loop");
    while !app_data.exit {
        event_loop.dispatch(None, &mut app_data)?;
    }

    info!("Exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_config() {
        let cli = Cli::parse_from(["unlock-indicator", "-t", "-c", "1a1a1a", "-f", "-u"]);
        let mut config = IndicatorConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.background.mode, BackgroundMode::Tile);
        assert_eq!(config.background.color, "1a1a1a");
        assert!(config.show_failed_attempts);
        assert!(!config.unlock_indicator);
    }

    #[test]
    fn tile_and_centered_conflict() {
        assert!(Cli::try_parse_from(["unlock-indicator", "-t", "-C"]).is_err());
    }

    #[test]
    fn centered_flag_selects_mode() {
        let cli = Cli::parse_from(["unlock-indicator", "--centered", "-i", "bg.png"]);
        let mut config = IndicatorConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.background.mode, BackgroundMode::Centered);
        assert_eq!(config.background.image, Some(PathBuf::from("bg.png")));
    }
}
