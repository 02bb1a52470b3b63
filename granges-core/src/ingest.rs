//! Row ingestion: everything a [`RangeStore`] can be built from.

use std::collections::BTreeMap;

use log::debug;

use crate::consts::{CHROMOSOME_COL, END_COL, START_COL, STRAND_COL};
use crate::errors::{RangesError, Result};
use crate::models::{Column, PartitionKey, RangeStore, StoreOptions, Table};
use crate::normalize::{classify, normalize};
use crate::rebalance::{construct_from_partitions, construct_from_table};

///
/// A value that is either given once for every row, or once per row.
///
#[derive(Debug, Clone, PartialEq)]
pub enum Broadcast<T> {
    Scalar(T),
    Values(Vec<T>),
}

impl<T: Clone> Broadcast<T> {
    /// Number of values, if given per row.
    fn explicit_len(&self) -> Option<usize> {
        match self {
            Broadcast::Scalar(_) => None,
            Broadcast::Values(v) => Some(v.len()),
        }
    }

    fn into_values(self, len: usize) -> Vec<T> {
        match self {
            Broadcast::Scalar(v) => vec![v; len],
            Broadcast::Values(v) => v,
        }
    }
}

impl From<&str> for Broadcast<String> {
    fn from(value: &str) -> Self {
        Broadcast::Scalar(value.to_string())
    }
}

impl From<String> for Broadcast<String> {
    fn from(value: String) -> Self {
        Broadcast::Scalar(value)
    }
}

impl From<Vec<String>> for Broadcast<String> {
    fn from(values: Vec<String>) -> Self {
        Broadcast::Values(values)
    }
}

impl From<Vec<&str>> for Broadcast<String> {
    fn from(values: Vec<&str>) -> Self {
        Broadcast::Values(values.into_iter().map(String::from).collect())
    }
}

///
/// Parallel arrays of chromosomes, starts, ends and (optionally) strands.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnArrays {
    pub chromosomes: Broadcast<String>,
    pub starts: Vec<i64>,
    pub ends: Vec<i64>,
    pub strands: Option<Broadcast<String>>,
}

impl ColumnArrays {
    pub fn new<C: Into<Broadcast<String>>>(chromosomes: C, starts: Vec<i64>, ends: Vec<i64>) -> Self {
        ColumnArrays {
            chromosomes: chromosomes.into(),
            starts,
            ends,
            strands: None,
        }
    }

    pub fn with_strands<S: Into<Broadcast<String>>>(mut self, strands: S) -> Self {
        self.strands = Some(strands.into());
        self
    }

    ///
    /// Turn the arrays into a flat table, broadcasting scalar chromosome/strand
    /// values to the number of starts.
    ///
    /// Fails with [`RangesError::LengthMismatch`] if the arrays differ in length.
    ///
    pub fn into_table(self) -> Result<Table> {
        let len = self.starts.len();

        let mut lengths = vec![
            self.chromosomes.explicit_len().unwrap_or(len),
            len,
            self.ends.len(),
        ];
        if let Some(strands) = &self.strands {
            lengths.push(strands.explicit_len().unwrap_or(len));
        }
        if lengths.iter().any(|&l| l != len) {
            return Err(RangesError::LengthMismatch(lengths));
        }

        let mut columns = vec![
            (
                CHROMOSOME_COL,
                Column::categorical(self.chromosomes.into_values(len)),
            ),
            (START_COL, Column::Int64(self.starts)),
            (END_COL, Column::Int64(self.ends)),
        ];
        if let Some(strands) = self.strands {
            columns.push((STRAND_COL, Column::categorical(strands.into_values(len))));
        }

        Table::new(columns)
    }
}

///
/// Every accepted input shape for [`RangeStore::new`].
///
#[derive(Debug, Clone)]
pub enum RangeInput {
    Columns(ColumnArrays),
    Table(Table),
    Partitions(BTreeMap<PartitionKey, Table>),
    /// Already a store; always rejected with [`RangesError::AlreadyPartitioned`].
    Store(RangeStore),
}

impl From<ColumnArrays> for RangeInput {
    fn from(value: ColumnArrays) -> Self {
        RangeInput::Columns(value)
    }
}

impl From<Table> for RangeInput {
    fn from(value: Table) -> Self {
        RangeInput::Table(value)
    }
}

impl From<BTreeMap<PartitionKey, Table>> for RangeInput {
    fn from(value: BTreeMap<PartitionKey, Table>) -> Self {
        RangeInput::Partitions(value)
    }
}

impl From<Vec<(PartitionKey, Table)>> for RangeInput {
    fn from(value: Vec<(PartitionKey, Table)>) -> Self {
        RangeInput::Partitions(value.into_iter().collect())
    }
}

impl From<RangeStore> for RangeInput {
    fn from(value: RangeStore) -> Self {
        RangeInput::Store(value)
    }
}

///
/// Build a store from any input shape.
///
/// Flat inputs are classified and normalized once, then grouped into
/// partitions; partitioned inputs go straight to the rebalancer.
///
pub fn ingest(input: RangeInput, options: StoreOptions) -> Result<RangeStore> {
    let table = match input {
        RangeInput::Store(_) => return Err(RangesError::AlreadyPartitioned),
        RangeInput::Partitions(partitions) => {
            debug!("Building store from {} partitions", partitions.len());
            return construct_from_partitions(partitions, options);
        }
        RangeInput::Columns(arrays) => arrays.into_table()?,
        RangeInput::Table(table) => table,
    };

    let stranded = classify(&table);
    let table = normalize(table, options.coordinate_width)?;
    debug!(
        "Building {} store from a table with {} rows",
        if stranded { "stranded" } else { "unstranded" },
        table.height()
    );

    construct_from_table(table, stranded, options)
}

impl TryFrom<Table> for RangeStore {
    type Error = RangesError;

    fn try_from(value: Table) -> Result<Self> {
        RangeStore::with_options(value, StoreOptions::default())
    }
}

impl TryFrom<ColumnArrays> for RangeStore {
    type Error = RangesError;

    fn try_from(value: ColumnArrays) -> Result<Self> {
        RangeStore::with_options(value, StoreOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KeyKind, Strand};
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_scalar_chromosome_is_broadcast() {
        let table = ColumnArrays::new("chr1", vec![1, 2, 3], vec![4, 5, 6])
            .into_table()
            .unwrap();
        assert_eq!(table.height(), 3);
        assert_eq!(table.row(2).chromosome(), Some("chr1"));
    }

    #[rstest]
    fn test_scalar_strand_is_broadcast() {
        let store = RangeStore::new(
            ColumnArrays::new(vec!["chr1", "chr2"], vec![1, 2], vec![4, 5]).with_strands("-"),
            false,
        )
        .unwrap();
        let keys: Vec<&PartitionKey> = store.keys().collect();
        assert_eq!(
            keys,
            vec![
                &PartitionKey::stranded("chr1", Strand::Reverse),
                &PartitionKey::stranded("chr2", Strand::Reverse),
            ]
        );
    }

    #[rstest]
    #[case(ColumnArrays::new(vec!["chr1", "chr1"], vec![1, 2, 3], vec![4, 5, 6]), vec![2, 3, 3])]
    #[case(ColumnArrays::new("chr1", vec![1, 2, 3], vec![4, 5]), vec![3, 3, 2])]
    #[case(
        ColumnArrays::new("chr1", vec![1, 2], vec![4, 5]).with_strands(vec!["+"]),
        vec![2, 2, 2, 1]
    )]
    fn test_length_mismatch(#[case] arrays: ColumnArrays, #[case] expected: Vec<usize>) {
        match RangeStore::new(arrays, false) {
            Err(RangesError::LengthMismatch(lengths)) => assert_eq!(lengths, expected),
            other => panic!("expected a length mismatch, got {:?}", other),
        }
    }

    #[rstest]
    fn test_store_input_is_rejected() {
        let store = RangeStore::new(ColumnArrays::new("chr1", vec![1], vec![2]), false).unwrap();
        assert!(matches!(
            RangeStore::new(store, false),
            Err(RangesError::AlreadyPartitioned)
        ));
    }

    #[rstest]
    fn test_dot_strands_demote_to_unstranded() {
        let store = RangeStore::new(
            ColumnArrays::new("chr1", vec![1, 5], vec![4, 9]).with_strands(vec!["+", "."]),
            false,
        )
        .unwrap();
        assert_eq!(store.key_kind(), KeyKind::Chrom);
        let table = store.get(&PartitionKey::chrom("chr1")).unwrap();
        assert!(!table.has_column("Strand"));
    }

    #[rstest]
    fn test_caller_table_is_untouched() {
        let table = ColumnArrays::new("chr1", vec![1, 5], vec![4, 9])
            .with_strands(vec!["+", "."])
            .into_table()
            .unwrap();
        let before = table.clone();
        let _store = RangeStore::new(table.clone(), false).unwrap();
        assert_eq!(table, before);
        assert!(table.has_column("Strand"));
    }

    #[rstest]
    fn test_try_from_table() {
        let table = ColumnArrays::new("chr1", vec![1], vec![2]).into_table().unwrap();
        let store = RangeStore::try_from(table).unwrap();
        assert_eq!(store.len(), 1);
    }
}
