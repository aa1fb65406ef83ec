//! Screen layout logic: topology, zone correspondence, and resizing.
//!
//! The `topology` module maps a layout identifier to its ordered zones and
//! split direction. The `correspondence` module carries zone content across
//! layout changes. The `resize` module turns drag measurements into zone
//! percentages that sum to exactly 100.

mod correspondence;
mod resize;
mod topology;

pub use correspondence::{correspond, SeedChain, SeedRule};
pub use resize::{normalize, normalize_tenths, normalize_with_step, DEFAULT_SNAP_STEP};
pub use topology::{resolve, topology, Topology};

use thiserror::Error;

/// Errors from layout computations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// One raw size per zone is required.
    #[error("Expected {expected} zone sizes, got {found}")]
    SizeCountMismatch { expected: usize, found: usize },

    /// A raw size was negative or not a finite number.
    #[error("Invalid size {value} at position {index}")]
    InvalidSize { index: usize, value: f64 },

    /// Raw sizes sum to zero, so no ratio can be derived.
    #[error("Zone sizes sum to zero")]
    DegenerateSizes,
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;
