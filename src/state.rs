use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::color::ColorMap;
use sales_dashboard::config::DashboardConfig;
use sales_dashboard::data::export::{ExportError, ExportFormat};
use sales_dashboard::data::filter::{apply, DateRange, FilterCriteria, FilteredView};
use sales_dashboard::data::model::{Column, SalesDataset};

// ---------------------------------------------------------------------------
// Filter dimensions shown as checklists
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    City,
    Category,
}

impl Dimension {
    pub const ALL: [Dimension; 2] = [Dimension::City, Dimension::Category];

    pub fn column(self) -> Column {
        match self {
            Dimension::City => Column::City,
            Dimension::Category => Column::Category,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Dataset loaded once at startup; never modified afterwards.
    pub dataset: SalesDataset,

    pub config: DashboardConfig,

    /// Current user selection.
    pub criteria: FilterCriteria,

    /// Rows and aggregates for `criteria` (recomputed on every change).
    pub view: FilteredView,

    pub city_colors: ColorMap,
    pub category_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Take ownership of the loaded dataset and select everything.
    pub fn new(dataset: SalesDataset, config: DashboardConfig) -> Self {
        let criteria = FilterCriteria::all(&dataset);
        let view = apply(&dataset, &criteria);
        Self {
            city_colors: ColorMap::new(&dataset.cities),
            category_colors: ColorMap::new(&dataset.categories),
            dataset,
            config,
            criteria,
            view,
            status_message: None,
        }
    }

    /// Recompute the view after a criteria change.
    pub fn refilter(&mut self) {
        self.view = apply(&self.dataset, &self.criteria);
    }

    /// All distinct values of a dimension in the dataset.
    pub fn all_values(&self, dim: Dimension) -> &BTreeSet<String> {
        match dim {
            Dimension::City => &self.dataset.cities,
            Dimension::Category => &self.dataset.categories,
        }
    }

    /// Currently selected values of a dimension.
    pub fn selected(&self, dim: Dimension) -> &BTreeSet<String> {
        match dim {
            Dimension::City => &self.criteria.cities,
            Dimension::Category => &self.criteria.categories,
        }
    }

    fn selected_mut(&mut self, dim: Dimension) -> &mut BTreeSet<String> {
        match dim {
            Dimension::City => &mut self.criteria.cities,
            Dimension::Category => &mut self.criteria.categories,
        }
    }

    /// Header text for a dimension, as it appears in the source file.
    pub fn dimension_title(&self, dim: Dimension) -> String {
        self.dataset
            .header_for(dim.column())
            .unwrap_or(match dim {
                Dimension::City => "City",
                Dimension::Category => "Category",
            })
            .to_string()
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle_value(&mut self, dim: Dimension, value: &str) {
        let selected = self.selected_mut(dim);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select all values in a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        let all = self.all_values(dim).clone();
        *self.selected_mut(dim) = all;
        self.refilter();
    }

    /// Deselect all values in a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.selected_mut(dim).clear();
        self.refilter();
    }

    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        let range = DateRange::new(start, end);
        if range != self.criteria.date_range {
            self.criteria.date_range = range;
            self.refilter();
        }
    }

    /// Back to the defaults: everything selected, full date span.
    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::all(&self.dataset);
        self.refilter();
    }

    /// Serialize the current filtered rows.
    pub fn export_bytes(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        format.render(&self.dataset, self.view.rows(&self.dataset))
    }

    pub fn export_file_name(&self, format: ExportFormat) -> String {
        format.file_name(&self.config.export_stem)
    }
}
