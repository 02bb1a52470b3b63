//! Core data model for stranded, partitioned collections of genomic ranges.
//!
//! A [`RangeStore`] holds rows of genomic intervals (`Chromosome`, `Start`, `End`,
//! optionally `Strand`, plus any annotation columns) partitioned by chromosome,
//! or by chromosome and strand when every row carries a valid `+`/`-` strand.
//!
//! Stores are built from column arrays, flat tables or already partitioned
//! mappings, and every construction path goes through the same strand
//! transition ([`rebalance::rebalance`]), so partition layout is always a pure
//! function of the data.
//!
//! ## Quick Start
//!
//! ```rust
//! use granges_core::{ColumnArrays, RangeStore};
//!
//! let arrays = ColumnArrays::new(
//!     vec!["chr10", "chr2", "chr2"],
//!     vec![0, 10, 20],
//!     vec![5, 15, 25],
//! )
//! .with_strands(vec!["+", "-", "+"]);
//!
//! let store = RangeStore::new(arrays, false).unwrap();
//! assert!(store.is_stranded());
//! assert_eq!(store.chromosomes(), vec!["chr2", "chr10"]);
//! ```
//!
//! A strand column with anything other than `+` and `-` (usually `.`) demotes
//! the store to unstranded; this is logged, never an error.
//!
pub mod consts;
pub mod errors;
pub mod ingest;
pub mod io;
pub mod models;
pub mod normalize;
pub mod rebalance;
pub mod utils;

// re-exports
pub use self::errors::{RangesError, Result};
pub use self::ingest::{Broadcast, ColumnArrays, RangeInput};
pub use self::models::{
    Column, CoordinateWidth, Interval, KeyKind, PartitionKey, RangeStore, StoreOptions, Strand,
    Table,
};
