mod app;
mod color;
mod state;
mod ui;

use anyhow::Context;
use app::SalesDashboardApp;
use clap::Parser;
use eframe::egui;
use sales_dashboard::config::{Cli, DashboardConfig};
use sales_dashboard::data::loader;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("{e:#}");
        return Err(e);
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = DashboardConfig::resolve(&cli).context("resolving configuration")?;

    // The dataset is loaded exactly once; without it there is nothing to show.
    let options = config.load_options()?;
    let dataset = loader::load_file(&config.data_path, &options)
        .with_context(|| format!("loading sales data from {}", config.data_path.display()))?;
    log::info!(
        "Loaded {} sales ({} cities, {} categories) with columns {:?}",
        dataset.len(),
        dataset.cities.len(),
        dataset.categories.len(),
        dataset.headers
    );

    let app = SalesDashboardApp::new(AppState::new(dataset, config));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard window: {e}"))
}
