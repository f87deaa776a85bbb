use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::{AppState, Dimension};
use sales_dashboard::data::export::ExportFormat;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                dimension_filter(ui, state, dim);
            }
            ui.separator();

            date_range_filter(ui, state);
            ui.add_space(4.0);
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }

            ui.separator();
            ui.strong("Download data");
            for format in ExportFormat::ALL {
                if ui.button(format!("Save as {}…", format.label())).clicked() {
                    save_export_dialog(state, format);
                }
            }
        });
}

/// Collapsible checklist for one dimension, with All/None buttons.
fn dimension_filter(ui: &mut Ui, state: &mut AppState, dim: Dimension) {
    let all_values = state.all_values(dim).clone();
    let colors = match dim {
        Dimension::City => state.city_colors.clone(),
        Dimension::Category => state.category_colors.clone(),
    };

    // Show count of selected / total in the header
    let header_text = format!(
        "{}  ({}/{})",
        state.dimension_title(dim),
        state.selected(dim).len(),
        all_values.len()
    );

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(format!("{dim:?}"))
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(dim);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(dim);
                }
            });

            for value in &all_values {
                let mut checked = state.selected(dim).contains(value);
                let text = RichText::new(value).color(colors.color_for(value));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_value(dim, value);
                }
            }
        });
}

fn date_range_filter(ui: &mut Ui, state: &mut AppState) {
    let mut start = state.criteria.date_range.start;
    let mut end = state.criteria.date_range.end;

    ui.strong("Date range");
    egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("From");
        ui.add(DatePickerButton::new(&mut start).id_salt("date_from"));
        ui.end_row();
        ui.label("To");
        ui.add(DatePickerButton::new(&mut end).id_salt("date_to"));
        ui.end_row();
    });

    if start > end {
        ui.label(RichText::new("Start is after end: nothing matches.").color(Color32::YELLOW));
    }
    state.set_date_range(start, end);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            for format in ExportFormat::ALL {
                if ui.button(format!("Export {}…", format.label())).clicked() {
                    save_export_dialog(state, format);
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        let source = state
            .config
            .data_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        ui.label(format!(
            "{source}: {} sales loaded, {} matching",
            state.dataset.len(),
            state.view.record_count
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Save dialog
// ---------------------------------------------------------------------------

pub fn save_export_dialog(state: &mut AppState, format: ExportFormat) {
    let file = rfd::FileDialog::new()
        .set_title(format!("Save filtered sales as {}", format.label()))
        .set_file_name(state.export_file_name(format))
        .add_filter(format.label(), &[format.extension()])
        .save_file();

    let Some(path) = file else {
        return;
    };

    let result = state
        .export_bytes(format)
        .context("serializing filtered rows")
        .and_then(|bytes| {
            std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))
        });

    match result {
        Ok(()) => {
            log::info!(
                "exported {} rows as {} to {}",
                state.view.record_count,
                format.mime(),
                path.display()
            );
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Failed to export: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
