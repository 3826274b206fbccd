//! Input/output helpers.
//!
//! - listing store load + lookup (`listing`)
//! - chart JSON export (`export`)

pub mod export;
pub mod listing;

pub use export::*;
pub use listing::*;
