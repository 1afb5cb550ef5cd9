use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::{OutcomeFilter, TeamSelection};
use crate::data::model::Phase;
use crate::export::write_view;
use crate::state::AppState;
use crate::stats::correlation::CorrelationMethod;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filtros");
    ui.separator();

    let (Some(table), Some(selections)) = (state.table.clone(), state.selections.clone()) else {
        ui.label("No hay datos cargados.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Season ----
            ui.strong("Temporada");
            egui::ComboBox::from_id_salt("season")
                .selected_text(selections.criteria.season.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for &season in table.seasons().iter().rev() {
                        if ui
                            .selectable_label(selections.criteria.season == season, season.to_string())
                            .clicked()
                        {
                            state.set_season(season);
                        }
                    }
                });
            ui.separator();

            // ---- Phases ----
            ui.strong("Fase");
            for phase in Phase::ALL {
                let mut checked = selections.criteria.phases.contains(&phase);
                if ui.checkbox(&mut checked, phase.as_str()).changed() {
                    state.toggle_phase(phase);
                }
            }
            ui.separator();

            // ---- Teams ----
            let teams = table.teams();
            let header = match &selections.criteria.teams {
                TeamSelection::All => format!("Equipos  ({0}/{0})", teams.len()),
                TeamSelection::Only(chosen) => format!("Equipos  ({}/{})", chosen.len(), teams.len()),
            };
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("teams")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    let mut all = selections.criteria.teams == TeamSelection::All;
                    if ui.checkbox(&mut all, "Todos los equipos").changed() {
                        state.set_all_teams(all);
                    }
                    // Individual teams only matter once "all" is off.
                    ui.add_enabled_ui(!all, |ui: &mut Ui| {
                        for team in teams {
                            let mut checked = match &selections.criteria.teams {
                                TeamSelection::All => true,
                                TeamSelection::Only(chosen) => chosen.contains(team),
                            };
                            if ui.checkbox(&mut checked, team.as_str()).changed() {
                                state.toggle_team(team);
                            }
                        }
                    });
                });
            ui.separator();

            // ---- Outcome ----
            ui.strong("Resultado");
            ui.horizontal(|ui: &mut Ui| {
                for outcome in OutcomeFilter::ALL {
                    if ui.radio(selections.outcome == outcome, outcome.label()).clicked() {
                        state.set_outcome(outcome);
                    }
                }
            });
            ui.separator();

            // ---- Minimum sacks ----
            ui.strong("Sacks mínimos");
            let (lo, hi) = table.sacks_range().unwrap_or((0, 0));
            let mut min_sacks = selections.criteria.min_sacks.clamp(lo, hi);
            if ui.add(egui::Slider::new(&mut min_sacks, lo..=hi)).changed() {
                state.set_min_sacks(min_sacks);
            }
            ui.separator();

            // ---- Correlation method ----
            ui.strong("Método de correlación");
            for method in CorrelationMethod::ALL {
                if ui.radio(selections.method == method, method.title()).clicked() {
                    state.set_method(method);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.view.is_some(), egui::Button::new("Export view…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(table), Some(view)) = (&state.table, &state.view) {
            ui.label(format!(
                "{} partidos cargados, {} filtrados, {} tras resultado",
                table.len(),
                view.filtered_rows,
                view.outcome_rows
            ));
        }

        if let Some(path) = &state.data_path {
            ui.separator();
            ui.small(path.display().to_string());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open game table")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        // Errors are already recorded in the status line.
        if state.open_path(&path).is_ok() {
            log::info!("Active table: {}", path.display());
        }
    }
}

pub fn export_dialog(state: &mut AppState) {
    let Some(view) = &state.view else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export dashboard view")
        .add_filter("JSON", &["json"])
        .set_file_name("dashboard.json")
        .save_file();

    if let Some(path) = file {
        match write_view(&path, view) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
