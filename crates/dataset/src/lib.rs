//! Organic / recyclable image dataset on disk.
//!
//! Expects `TRAIN/{O,R}` and `TEST/{O,R}` under a common root, one image per
//! directory entry.

pub mod config;
pub mod error;
pub mod layout;

pub use config::InspectConfig;
pub use error::DatasetError;
pub use layout::{DatasetLayout, DatasetSummary, Split, SplitCounts, WasteClass};
