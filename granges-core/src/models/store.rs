use std::collections::BTreeMap;
use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::{CHROMOSOME_COL, END_COL, START_COL, STRAND_COL};
use crate::errors::Result;
use crate::ingest::{RangeInput, ingest};
use crate::models::{KeyKind, PartitionKey, Row, Table};
use crate::rebalance::rebalance;

/// Integer width of the Start/End columns of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CoordinateWidth {
    #[default]
    Int32,
    Int64,
}

///
/// Construction parameters of a [`RangeStore`]. Fixed for the lifetime of the
/// store and inherited by every store derived from it.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StoreOptions {
    #[cfg_attr(feature = "serde", serde(default))]
    pub coordinate_width: CoordinateWidth,
}

impl StoreOptions {
    pub fn new(use_64bit_coordinates: bool) -> Self {
        StoreOptions {
            coordinate_width: match use_64bit_coordinates {
                true => CoordinateWidth::Int64,
                false => CoordinateWidth::Int32,
            },
        }
    }

    /// Options for a store with 64-bit coordinates.
    pub fn wide() -> Self {
        StoreOptions::new(true)
    }
}

///
/// A collection of genomic ranges, partitioned by chromosome (and strand, for
/// stranded stores).
///
/// Every partition is non-empty, all partitions share one schema, categorical
/// chromosome/strand columns carry exactly the categories in use, and Start/End
/// use the store-wide [`CoordinateWidth`]. Partitions are only ever handed out
/// by shared reference; deriving operations build a new store.
///
#[derive(Debug, Clone)]
pub struct RangeStore {
    partitions: BTreeMap<PartitionKey, Table>,
    key_kind: KeyKind,
    options: StoreOptions,
}

impl RangeStore {
    ///
    /// Build a store from column arrays, a flat table or a partitioned mapping.
    ///
    /// # Arguments
    /// - input: anything convertible into a [`RangeInput`]
    /// - use_64bit_coordinates: store Start/End as 64-bit instead of 32-bit integers
    ///
    pub fn new<T: Into<RangeInput>>(input: T, use_64bit_coordinates: bool) -> Result<Self> {
        RangeStore::with_options(input, StoreOptions::new(use_64bit_coordinates))
    }

    pub fn with_options<T: Into<RangeInput>>(input: T, options: StoreOptions) -> Result<Self> {
        ingest(input.into(), options)
    }

    pub fn empty(options: StoreOptions) -> Self {
        RangeStore {
            partitions: BTreeMap::new(),
            key_kind: KeyKind::Chrom,
            options,
        }
    }

    /// Assemble a store from partitions that already satisfy the store invariants.
    pub(crate) fn from_parts(
        partitions: BTreeMap<PartitionKey, Table>,
        key_kind: KeyKind,
        options: StoreOptions,
    ) -> Self {
        RangeStore {
            partitions,
            key_kind,
            options,
        }
    }

    /// Total number of rows over all partitions.
    pub fn len(&self) -> usize {
        self.partitions.values().map(Table::height).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_stranded(&self) -> bool {
        self.key_kind == KeyKind::ChromStrand
    }

    pub fn key_kind(&self) -> KeyKind {
        self.key_kind
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn coordinate_width(&self) -> CoordinateWidth {
        self.options.coordinate_width
    }

    /// Partition keys in natural order.
    pub fn keys(&self) -> impl Iterator<Item = &PartitionKey> {
        self.partitions.keys()
    }

    /// Partitions in natural key order.
    pub fn partitions(&self) -> impl Iterator<Item = (&PartitionKey, &Table)> {
        self.partitions.iter()
    }

    pub fn get(&self, key: &PartitionKey) -> Option<&Table> {
        self.partitions.get(key)
    }

    /// All partitions on one chromosome, whatever their strand.
    pub fn partitions_on<'a, 'c>(
        &'a self,
        chromosome: &'c str,
    ) -> impl Iterator<Item = (&'a PartitionKey, &'a Table)> + 'c
    where
        'a: 'c,
    {
        // a bare key sorts before every strand key of its chromosome
        self.partitions
            .range(PartitionKey::chrom(chromosome)..)
            .take_while(move |(k, _)| k.chromosome() == chromosome)
    }

    /// Distinct chromosomes in natural order.
    pub fn chromosomes(&self) -> Vec<&str> {
        let mut chroms: Vec<&str> = self.partitions.keys().map(|k| k.chromosome()).collect();
        chroms.dedup();
        chroms
    }

    /// Concatenate every partition, in natural key order, into one flat table.
    pub fn to_table(&self) -> Result<Table> {
        let tables: Vec<&Table> = self.partitions.values().collect();
        Table::concat(&tables)
    }

    /// Give up the store, handing its partitions to the caller.
    pub fn into_partitions(self) -> BTreeMap<PartitionKey, Table> {
        self.partitions
    }

    ///
    /// Re-run the strand transition on this store. Rebalancing a store that
    /// came out of any constructor is a no-op.
    ///
    pub fn rebalance(self) -> Result<Self> {
        rebalance(self.partitions, self.options)
    }

    ///
    /// Keep only the rows matching `predicate`; the result is a new, rebalanced store.
    ///
    pub fn filter<F>(&self, predicate: F) -> Result<Self>
    where
        F: Fn(&Row<'_>) -> bool,
    {
        let partitions = self
            .partitions
            .iter()
            .map(|(key, table)| (key.clone(), table.filter(&predicate)))
            .collect();
        rebalance(partitions, self.options)
    }

    ///
    /// Convert the whole store to a polars `DataFrame`.
    ///
    #[cfg(feature = "dataframe")]
    pub fn to_polars(&self) -> polars::prelude::PolarsResult<polars::prelude::DataFrame> {
        let table = self
            .to_table()
            .map_err(|e| polars::prelude::PolarsError::ComputeError(e.to_string().into()))?;
        table.to_polars()
    }
}

/// Sort a partition by coordinates (and strand), then by every other column.
fn sorted_for_comparison(table: &Table) -> Option<Table> {
    let mut keys = vec![CHROMOSOME_COL, START_COL, END_COL];
    if table.has_column(STRAND_COL) {
        keys.push(STRAND_COL);
    }
    let rest: Vec<&str> = table
        .column_names()
        .filter(|n| !keys.contains(n))
        .collect();
    keys.extend(rest);

    table.sort_by(&keys).ok()
}

impl PartialEq for RangeStore {
    ///
    /// Two stores are equal iff they have the same partition keys and every pair
    /// of matched partitions holds the same rows once sorted by
    /// `(Chromosome, Start, End, [Strand])`.
    ///
    fn eq(&self, other: &Self) -> bool {
        if !self.partitions.keys().eq(other.partitions.keys()) {
            return false;
        }

        self.partitions
            .values()
            .zip(other.partitions.values())
            .all(
                |(a, b)| match (sorted_for_comparison(a), sorted_for_comparison(b)) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                },
            )
    }
}

impl Display for RangeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RangeStore with {} ranges in {} partitions ({}).",
            self.len(),
            self.partition_count(),
            match self.is_stranded() {
                true => "stranded",
                false => "unstranded",
            }
        )
    }
}
