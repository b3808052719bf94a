//! Presentation-side number formatting: raw magnitudes to tooltip and
//! axis label strings.

pub mod si;

pub use si::{si, Precision};
