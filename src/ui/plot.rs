use std::f32::consts::TAU;
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Color32, Pos2, Sense, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoint, PlotPoints};

use crate::state::{AppState, Dimension};
use crate::ui::metrics::format_currency;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Daily sales line chart
// ---------------------------------------------------------------------------

/// Total sale per day, x axis in days since the common era.
pub fn sales_over_time(ui: &mut Ui, state: &AppState) {
    ui.heading("Daily total sales");
    if state.view.by_date.is_empty() {
        empty_placeholder(ui);
        return;
    }

    let points: PlotPoints = state
        .view
        .by_date
        .iter()
        .map(|(date, total)| [date.num_days_from_ce() as f64, *total])
        .collect();
    let currency = state.config.currency_symbol.clone();

    Plot::new("sales_over_time")
        .height(CHART_HEIGHT)
        .x_axis_label("Date")
        .y_axis_label("Total sale")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| day_label(mark.value))
        .label_formatter(move |_name: &str, value: &PlotPoint| {
            format!("{}\n{}", day_label(value.x.round()), format_currency(value.y, &currency))
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("Total sale")
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0),
            );
        });
}

fn day_label(value: f64) -> String {
    if value.fract() != 0.0 {
        return String::new();
    }
    NaiveDate::from_num_days_from_ce_opt(value as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// City bar chart
// ---------------------------------------------------------------------------

pub fn sales_by_city(ui: &mut Ui, state: &AppState) {
    ui.heading(format!("Sales by {}", state.dimension_title(Dimension::City)));
    if state.view.by_city.is_empty() {
        empty_placeholder(ui);
        return;
    }

    let labels: Vec<String> = state.view.by_city.iter().map(|(c, _)| c.clone()).collect();
    let bars: Vec<Bar> = state
        .view
        .by_city
        .iter()
        .enumerate()
        .map(|(i, (city, total))| {
            Bar::new(i as f64, *total)
                .name(city)
                .fill(state.city_colors.color_for(city))
                .width(0.6)
        })
        .collect();

    Plot::new("sales_by_city")
        .height(CHART_HEIGHT)
        .y_axis_label("Total sale")
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            if mark.value.fract() != 0.0 || mark.value < 0.0 {
                return String::new();
            }
            labels.get(mark.value as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Total sale"));
        });
}

// ---------------------------------------------------------------------------
// Category pie chart
// ---------------------------------------------------------------------------

pub fn sales_by_category(ui: &mut Ui, state: &AppState) {
    ui.heading(format!(
        "Sales by {}",
        state.dimension_title(Dimension::Category)
    ));
    let slices = &state.view.by_category;
    if let Some(message) = pie_placeholder(slices) {
        placeholder(ui, message);
        return;
    }
    let total: f64 = slices.iter().map(|(_, v)| v).sum();

    ui.horizontal(|ui: &mut Ui| {
        let side = (ui.available_width() * 0.5).min(CHART_HEIGHT);
        let (response, painter) = ui.allocate_painter(egui::vec2(side, side), Sense::hover());
        let center = response.rect.center();
        let radius = side * 0.45;

        let mut angle = -TAU / 4.0;
        for (category, value) in slices {
            let sweep = (*value / total) as f32 * TAU;
            let color = state.category_colors.color_for(category);
            paint_wedge(&painter, center, radius, angle, sweep, color);
            angle += sweep;
        }
        // Separators on top of every wedge.
        if slices.len() > 1 {
            let mut angle = -TAU / 4.0;
            for (_, value) in slices {
                let edge = center + radius * egui::vec2(angle.cos(), angle.sin());
                painter.line_segment([center, edge], Stroke::new(1.5, ui.visuals().panel_fill));
                angle += (*value / total) as f32 * TAU;
            }
        }

        ui.vertical(|ui: &mut Ui| {
            for (category, value) in slices {
                ui.horizontal(|ui: &mut Ui| {
                    let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), Sense::hover());
                    ui.painter()
                        .rect_filled(rect, 2.0, state.category_colors.color_for(category));
                    ui.label(format!(
                        "{category}  {} ({:.1}%)",
                        format_currency(*value, &state.config.currency_symbol),
                        value / total * 100.0
                    ));
                });
            }
        });
    });
}

/// A pie wedge split into convex pieces of at most 30°.
fn paint_wedge(painter: &egui::Painter, center: Pos2, radius: f32, start: f32, sweep: f32, color: Color32) {
    let max_step = TAU / 12.0;
    let pieces = (sweep / max_step).ceil().max(1.0) as usize;
    let step = sweep / pieces as f32;
    for p in 0..pieces {
        let a0 = start + step * p as f32;
        let mut points = vec![center];
        for k in 0..=4 {
            let a = a0 + step * k as f32 / 4.0;
            points.push(center + radius * egui::vec2(a.cos(), a.sin()));
        }
        painter.add(egui::Shape::convex_polygon(points, color, Stroke::NONE));
    }
}

const NO_MATCH: &str = "No sales match the current filters.";
const ZERO_TOTAL: &str = "The matching sales total zero; there is nothing to divide.";

/// Why the pie cannot be drawn, if it cannot.
fn pie_placeholder(slices: &[(String, f64)]) -> Option<&'static str> {
    if slices.is_empty() {
        return Some(NO_MATCH);
    }
    let total: f64 = slices.iter().map(|(_, v)| v).sum();
    (total <= 0.0).then_some(ZERO_TOTAL)
}

fn empty_placeholder(ui: &mut Ui) {
    placeholder(ui, NO_MATCH);
}

fn placeholder(ui: &mut Ui, message: &str) {
    ui.allocate_ui(egui::vec2(ui.available_width(), CHART_HEIGHT), |ui: &mut Ui| {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(message);
        });
    });
}
