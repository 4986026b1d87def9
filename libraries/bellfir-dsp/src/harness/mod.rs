//! Reference signals and spectral summaries for verifying filter designs
//!
//! Provides test signal generation and analysis tools used to compare audio
//! before and after filtering. Nothing here mutates its inputs.

pub mod analysis;
pub mod signals;

pub use analysis::*;
pub use signals::*;
