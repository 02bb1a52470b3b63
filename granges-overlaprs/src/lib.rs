//! Strand-aware interval intersection over granges range stores.
//!
//! This crate provides the overlap index ([`AIList`]) and the intersection engine
//! built on it. Intersection pairs partitions of two
//! [`RangeStore`](granges_core::RangeStore)s according to a
//! [`Strandedness`] mode, finds overlapping rows with an AIList per partition pair,
//! and returns the rows of the first store clipped to the overlapping span.
//!
//! All overlap computation logic should live here; the CLI only wires it up.
//!
//! ## Quick Start
//!
//! ```rust
//! use granges_core::{ColumnArrays, RangeStore};
//! use granges_overlaprs::{Intersect, OverlapHow, Strandedness};
//!
//! let a = RangeStore::new(
//!     ColumnArrays::new("chr1", vec![3, 5, 8], vec![6, 7, 9]).with_strands(vec!["+", "-", "+"]),
//!     false,
//! )
//! .unwrap();
//! let b = RangeStore::new(
//!     ColumnArrays::new("chr1", vec![1, 6], vec![2, 7]).with_strands(vec!["+", "-"]),
//!     false,
//! )
//! .unwrap();
//!
//! let hits = a
//!     .intersection(&b, Strandedness::Same, OverlapHow::Overlap)
//!     .unwrap();
//! assert_eq!(hits.len(), 1);
//! ```
//!
//! ## Performance
//!
//! Each matched partition pair builds one [`AIList`] over the second store's rows,
//! so a pair costs `O((n + m) log m + k)` instead of `n * m`. Pairs are processed in
//! parallel on the `rayon` global pool.
//!

/// Augmented Interval List implementation.
///
/// See [`AIList`] for details.
pub mod ailist;

/// Strand-aware store intersection.
pub mod intersect;

/// Core traits for overlap operations.
///
/// See [`Overlapper`] for the main trait.
pub mod traits;

// re-exports
pub use self::ailist::AIList;
pub use self::intersect::{Intersect, OverlapHow, Strandedness, intersect};
pub use self::traits::{Interval, Overlapper};

/// Constants used throughout the crate.
pub mod consts {
    /// The command name for intersection.
    pub const INTERSECT_CMD: &str = "intersect";
}
