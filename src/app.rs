use eframe::egui::{self, ScrollArea, Ui};

use crate::config::DashboardConfig;
use crate::dashboard::DashboardView;
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SacksDashboardApp {
    pub state: AppState,
}

impl SacksDashboardApp {
    pub fn new(config: &DashboardConfig) -> Self {
        let mut state = AppState::new(config.method);
        if let Err(e) = state.open_path(&config.data) {
            log::warn!("Starting without data: {e}");
        }
        Self { state }
    }
}

impl eframe::App for SacksDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| match &self.state.view {
            Some(view) => dashboard(ui, view),
            None => {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Abre un archivo de partidos  (File → Open…)");
                });
            }
        });
    }
}

fn dashboard(ui: &mut Ui, view: &DashboardView) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Análisis de sacks en la NFL");
            ui.label("Partidos decididos por 8 puntos o más.");
            ui.small(&view.caption);
            ui.separator();

            ui.strong("1 · Sacks promedio en derrotas");
            charts::slot(ui, &view.avg_sacks_losses, charts::bar_chart);
            ui.separator();

            ui.strong("2 · Sacks vs puntos anotados");
            charts::slot(ui, &view.sacks_vs_points, |ui, chart| {
                charts::scatter_chart(ui, "sacks_vs_points", chart)
            });
            ui.separator();

            ui.strong("3 · Distribución de sacks");
            charts::slot(ui, &view.sacks_distribution, charts::box_chart);
            ui.separator();

            ui.strong("4 · Correlaciones");
            charts::slot(ui, &view.correlations, charts::heatmap);
            ui.separator();

            ui.strong("5 · Top 10 partidos con más sacks");
            charts::slot(ui, &view.top_games, charts::top_table);
            ui.separator();

            ui.strong("6 · Sacks vs margen final");
            charts::slot(ui, &view.sacks_vs_margin, |ui, chart| {
                charts::scatter_chart(ui, "sacks_vs_margin", chart)
            });
        });
}
