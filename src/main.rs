mod app;
mod canvas;
mod config;
mod controls;
mod error;
mod export;
mod geometry;
mod loader;
mod measurement;
mod points;
mod render;
mod session;
mod theme;
mod ui_controls;
mod view;

use eframe::egui;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

fn main() -> eframe::Result<()> {
    let loaded = AppConfig::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();
    init_logging(&config.log_filter);
    if let Err(err) = &loaded {
        warn!("using default configuration: {err:#}");
    }

    let viewport = egui::ViewportBuilder::default()
        .with_title("Segmeter")
        .with_inner_size([config.surface_width + 360.0, config.surface_height + 80.0])
        .with_min_inner_size([720.0, 420.0])
        .with_drag_and_drop(true);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Segmeter",
        options,
        Box::new(|cc| Box::new(app::SegmeterApp::new(cc, config))),
    )
}

/// `RUST_LOG` wins over the configured filter.
fn init_logging(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
