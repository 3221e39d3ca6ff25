//! Series fusion and result types
//!
//! - Millisecond-indexed series and their alignment
//! - Rolling-window statistics
//! - Stability fusion (attack end)
//! - Result types

pub mod result;
pub mod rolling;
pub mod series;
pub mod stability;
