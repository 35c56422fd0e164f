// ABOUTME: Module root for record exporters.
// ABOUTME: Re-exports the CSV exporter and its formatting helpers.

pub mod csv;

pub use csv::{export_csv, format_timestamp, rating_label};
