//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the boundary listing record (`ListingRecord`) and rule enum (`GougingRule`)
//! - validated chart inputs (`Observation`, `Series`, `Ceiling`, `ChartRules`)
//! - chart outputs (`ChartSpec` and its parts)

pub mod types;

pub use types::*;
