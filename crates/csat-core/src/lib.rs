// ABOUTME: Core library for csatd, containing the survey record model and derived views.
// ABOUTME: Defines records, statistics, storage metadata, and the CSV exporter used by every backend.

pub mod export;
pub mod info;
pub mod record;
pub mod stats;

pub use export::export_csv;
pub use info::StorageInfo;
pub use record::{NewResponse, Record, most_recent_first};
pub use stats::Stats;
