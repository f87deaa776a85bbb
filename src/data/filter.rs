use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::{SalesDataset, SalesRecord};

// ---------------------------------------------------------------------------
// Filter criteria: selected cities, categories and an inclusive date range
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` range of calendar dates. An inverted range
/// contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

/// One filtering request.
///
/// Unlike a "no constraint" column filter, an empty `cities` or `categories`
/// set means nothing is selected, so no row matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub cities: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub date_range: DateRange,
}

impl FilterCriteria {
    /// Everything selected: all cities, all categories, `[min, max]` date.
    /// An empty dataset gets `[today, today]`.
    pub fn all(dataset: &SalesDataset) -> Self {
        let (start, end) = dataset.date_bounds.unwrap_or_else(|| {
            let today = chrono::Local::now().date_naive();
            (today, today)
        });
        Self {
            cities: dataset.cities.clone(),
            categories: dataset.categories.clone(),
            date_range: DateRange::new(start, end),
        }
    }

    /// Whether a single record passes all three predicates.
    pub fn matches(&self, record: &SalesRecord) -> bool {
        self.cities.contains(&record.city)
            && self.categories.contains(&record.category)
            && self.date_range.contains(record.date)
    }
}

// ---------------------------------------------------------------------------
// FilteredView – everything derived from one criteria application
// ---------------------------------------------------------------------------

/// Rows passing the criteria plus the metrics and grouped totals computed
/// from them. Rows are held as indices into the dataset, in dataset order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView {
    pub indices: Vec<usize>,
    pub total_sales_sum: f64,
    /// Widened so that no mix of `i64` quantities can overflow.
    pub total_quantity_sum: i128,
    pub record_count: usize,
    /// Date → total sale, ascending by date.
    pub by_date: Vec<(NaiveDate, f64)>,
    /// City → total sale, sorted by city label.
    pub by_city: Vec<(String, f64)>,
    /// Category → total sale, sorted by category label.
    pub by_category: Vec<(String, f64)>,
}

impl FilteredView {
    /// The filtered records, in dataset order.
    pub fn rows<'a>(&'a self, dataset: &'a SalesDataset) -> impl Iterator<Item = &'a SalesRecord> + 'a {
        self.indices.iter().map(move |&i| &dataset.records[i])
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return indices of records that pass the criteria.
pub fn filtered_indices(dataset: &SalesDataset, criteria: &FilterCriteria) -> Vec<usize> {
    if criteria.cities.is_empty()
        || criteria.categories.is_empty()
        || criteria.date_range.is_inverted()
    {
        return Vec::new();
    }

    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Filter the dataset and compute the summary metrics and grouped totals
/// over the filtered rows only.
pub fn apply(dataset: &SalesDataset, criteria: &FilterCriteria) -> FilteredView {
    let indices = filtered_indices(dataset, criteria);

    let mut total_sales_sum = 0.0;
    let mut total_quantity_sum: i128 = 0;
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut by_city: BTreeMap<&str, f64> = BTreeMap::new();
    let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();

    for &i in &indices {
        let rec = &dataset.records[i];
        total_sales_sum += rec.total_sale;
        total_quantity_sum += i128::from(rec.quantity);
        *by_date.entry(rec.date).or_default() += rec.total_sale;
        *by_city.entry(rec.city.as_str()).or_default() += rec.total_sale;
        *by_category.entry(rec.category.as_str()).or_default() += rec.total_sale;
    }

    log::debug!(
        "filter matched {} of {} rows ({} cities, {} categories, {} → {})",
        indices.len(),
        dataset.len(),
        criteria.cities.len(),
        criteria.categories.len(),
        criteria.date_range.start,
        criteria.date_range.end
    );

    FilteredView {
        record_count: indices.len(),
        indices,
        total_sales_sum,
        total_quantity_sum,
        by_date: by_date.into_iter().collect(),
        by_city: owned_keys(by_city),
        by_category: owned_keys(by_category),
    }
}

fn owned_keys(map: BTreeMap<&str, f64>) -> Vec<(String, f64)> {
    map.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}
