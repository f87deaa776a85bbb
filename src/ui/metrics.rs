use eframe::egui::{self, RichText, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Summary metric cards
// ---------------------------------------------------------------------------

/// Three cards: total sales amount, units sold, number of sales.
pub fn metric_cards(ui: &mut Ui, state: &AppState) {
    let view = &state.view;
    let cards = [
        (
            "Total sales",
            format_currency(view.total_sales_sum, &state.config.currency_symbol),
        ),
        ("Units sold", format_thousands(view.total_quantity_sum)),
        ("Sales", format_thousands(view.record_count as i128)),
    ];

    ui.columns(cards.len(), |columns| {
        for (col, (label, value)) in columns.iter_mut().zip(cards) {
            egui::Frame::group(col.style()).show(col, |ui: &mut Ui| {
                ui.set_min_width(ui.available_width());
                ui.label(label);
                ui.label(RichText::new(value).size(26.0).strong());
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// `1234567.891` → `1,234,567.89₺`
pub fn format_currency(value: f64, symbol: &str) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{}.{frac_part}{symbol}", group_digits(int_part))
}

/// `1234567` → `1,234,567`
pub fn format_thousands(value: i128) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{}", group_digits(&value.unsigned_abs().to_string()))
}

fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
