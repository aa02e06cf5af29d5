//! cw-core: stable foundation for coolwatch.
//!
//! Contains:
//! - numeric (Real + missing-value helpers)
//! - stats (skip-missing aggregates and rolling windows)
//! - units (uom SI types + flow/power conversions)

pub mod numeric;
pub mod stats;
pub mod units;

pub use numeric::*;
pub use units::*;
