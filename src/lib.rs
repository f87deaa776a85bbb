//! Sales dashboard core: dataset loading, filtering, aggregation and export.
//!
//! The egui front-end in `main.rs` is a thin shell over these modules; all
//! data semantics live here so they can be tested without a window.

pub mod config;
pub mod data;
