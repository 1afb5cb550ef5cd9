mod app;
mod charts;
mod color;
mod config;
mod dashboard;
mod data;
mod export;
mod state;
mod stats;
mod ui;

use anyhow::anyhow;
use app::SacksDashboardApp;
use clap::Parser;
use config::DashboardConfig;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter()))
        .init();

    if let Some(out) = &config.export {
        let mut cache = data::cache::TableCache::new();
        let view = export::export_default_view(&mut cache, &config.data, config.method, out)?;
        let top = view.top_games.ready().map_or(0, |table| table.rows.len());
        log::info!("{} ({} games, {} in the top table)", view.caption, view.filtered_rows, top);
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "NFL Sacks Analysis",
        options,
        Box::new(move |_cc| Ok(Box::new(SacksDashboardApp::new(&config)))),
    )
    .map_err(|e| anyhow!("eframe error: {e}"))
}
