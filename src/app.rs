use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{metrics, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashboardApp {
    pub state: AppState,
}

impl SalesDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters and downloads ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.heading("Overview");
                    metrics::metric_cards(ui, &self.state);
                    ui.add_space(12.0);

                    plot::sales_over_time(ui, &self.state);
                    ui.add_space(12.0);

                    ui.columns(2, |columns| {
                        plot::sales_by_city(&mut columns[0], &self.state);
                        plot::sales_by_category(&mut columns[1], &self.state);
                    });
                });
        });
    }
}
