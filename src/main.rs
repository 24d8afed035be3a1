mod api;
mod gui;
mod models;
mod state;
mod utils;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::gui::ViewerApp;

/// Desktop viewer and admin console for a location-tracking backend
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct CliArgs {
    /// Base URL of the tracking API
    #[arg(short, long, default_value = "http://127.0.0.1:8000/api")]
    server: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    tracing::info!("Connecting to {}", args.server);

    let api = ApiClient::new(&args.server).context("invalid server URL")?;

    // The UI owns the main thread; API calls run on this runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Location Tracker"),
        ..Default::default()
    };

    eframe::run_native(
        "Location Tracker",
        options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(cc, api, handle)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start UI: {e}"))?;

    Ok(())
}
