//! Partitioning of normalized tables and the strand transition between
//! chromosome-keyed and chromosome+strand-keyed stores.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::consts::{CHROMOSOME_COL, STRAND_COL};
use crate::errors::{RangesError, Result};
use crate::models::{Column, KeyKind, PartitionKey, RangeStore, StoreOptions, Strand, Table};
use crate::normalize::{conform, strands_valid};

///
/// What rebalancing does to a mapping, decided from its key shape, whether it
/// carries a strand column, and whether every strand is `+` or `-`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    /// Bare chromosome keys stay; a strand column, if any, is an annotation.
    KeepChrom,
    /// Bare chromosome keys over valid strands are split into strand keys.
    SplitByStrand,
    /// Strand keys over valid strands stay as they are.
    KeepStranded,
    /// Strand keys without a strand column get one filled in from the key.
    MaterializeStrand,
    /// Strand keys over invalid strands fold back into one partition per chromosome.
    MergeStrands,
}

impl Transition {
    pub(crate) fn decide(has_strand_key: bool, stranded: bool, all_strands_valid: bool) -> Self {
        match (has_strand_key, stranded, all_strands_valid) {
            (false, false, _) => Transition::KeepChrom,
            (false, true, true) => Transition::SplitByStrand,
            (false, true, false) => Transition::KeepChrom,
            (true, false, _) => Transition::MaterializeStrand,
            (true, true, true) => Transition::KeepStranded,
            (true, true, false) => Transition::MergeStrands,
        }
    }
}

///
/// Group a normalized table into partitions, by chromosome and (if `stranded`)
/// strand, then rebalance.
///
pub fn construct_from_table(
    table: Table,
    stranded: bool,
    options: StoreOptions,
) -> Result<RangeStore> {
    let by: &[&str] = match stranded {
        true => &[CHROMOSOME_COL, STRAND_COL],
        false => &[CHROMOSOME_COL],
    };

    let mut partitions = BTreeMap::new();
    for (values, rows) in table.group_by(by)? {
        let key = key_from_values(&values)?;
        partitions.insert(key, table.take(&rows).tighten_categories());
    }

    rebalance(partitions, options)
}

///
/// Build a store from caller-partitioned data.
///
pub fn construct_from_partitions(
    partitions: BTreeMap<PartitionKey, Table>,
    options: StoreOptions,
) -> Result<RangeStore> {
    rebalance(partitions, options)
}

///
/// The strand transition. Drops empty partitions, conforms every partition to
/// the store encoding, and re-keys the mapping so that strand keys are used
/// exactly when every row carries a valid strand.
///
/// Rebalancing the partitions of a store is a no-op.
///
pub fn rebalance(
    mut partitions: BTreeMap<PartitionKey, Table>,
    options: StoreOptions,
) -> Result<RangeStore> {
    partitions.retain(|_, table| !table.is_empty());

    let Some(first_key) = partitions.keys().next() else {
        return Ok(RangeStore::empty(options));
    };

    let has_strand_key = first_key.kind() == KeyKind::ChromStrand;
    if partitions.keys().any(|k| k.kind() != first_key.kind()) {
        return Err(RangesError::schema(
            "partition keys mix bare chromosomes with chromosome/strand pairs",
        ));
    }

    let partitions = partitions
        .into_iter()
        .map(|(key, table)| Ok((key, conform(table, options.coordinate_width)?)))
        .collect::<Result<BTreeMap<_, _>>>()?;

    check_schemas(&partitions)?;

    let stranded = partitions
        .values()
        .next()
        .is_some_and(|t| t.has_column(STRAND_COL));
    let all_strands_valid = stranded
        && partitions
            .values()
            .filter_map(|t| t.column(STRAND_COL))
            .all(strands_valid);

    let transition = Transition::decide(has_strand_key, stranded, all_strands_valid);
    debug!("Rebalancing {} partitions: {:?}", partitions.len(), transition);

    let (partitions, key_kind) = match transition {
        Transition::KeepChrom => (checked(partitions)?, KeyKind::Chrom),
        Transition::KeepStranded => (checked(partitions)?, KeyKind::ChromStrand),
        Transition::SplitByStrand => (split_by_strand(partitions)?, KeyKind::ChromStrand),
        Transition::MaterializeStrand => (materialize_strand(partitions)?, KeyKind::ChromStrand),
        Transition::MergeStrands => {
            info!("Strand values outside '+' and '-' found; merging strand partitions per chromosome");
            (merge_strands(partitions)?, KeyKind::Chrom)
        }
    };

    let partitions = partitions
        .into_iter()
        .map(|(key, table)| (key, table.tighten_categories()))
        .collect();

    Ok(RangeStore::from_parts(partitions, key_kind, options))
}

fn key_from_values(values: &[String]) -> Result<PartitionKey> {
    match values {
        [chrom] => Ok(PartitionKey::chrom(chrom.as_str())),
        [chrom, strand] => {
            let strand = Strand::from_symbol(strand).ok_or_else(|| {
                RangesError::schema(format!("invalid strand '{}' in a stranded table", strand))
            })?;
            Ok(PartitionKey::stranded(chrom.as_str(), strand))
        }
        _ => Err(RangesError::schema("unexpected partition key shape")),
    }
}

fn check_schemas(partitions: &BTreeMap<PartitionKey, Table>) -> Result<()> {
    let mut tables = partitions.iter();
    let Some((first_key, first)) = tables.next() else {
        return Ok(());
    };
    let schema = first.schema();

    for (key, table) in tables {
        if table.schema() != schema {
            return Err(RangesError::schema(format!(
                "partitions {:?} and {:?} have different schemas: {} vs {}",
                first_key,
                key,
                first,
                table
            )));
        }
    }
    Ok(())
}

/// Every row of a partition must belong to the partition's key.
fn check_membership(key: &PartitionKey, table: &Table) -> Result<()> {
    let chroms = table
        .require(CHROMOSOME_COL)?
        .distinct_str()
        .unwrap_or_default();
    if let Some(other) = chroms.iter().find(|&&c| c != key.chromosome()) {
        return Err(RangesError::schema(format!(
            "partition {:?} holds rows on chromosome '{}'",
            key, other
        )));
    }

    if let Some(strand) = key.strand() {
        let strands = table
            .require(STRAND_COL)?
            .distinct_str()
            .unwrap_or_default();
        if let Some(other) = strands.iter().find(|&&s| s != strand.symbol()) {
            return Err(RangesError::schema(format!(
                "partition {:?} holds rows on strand '{}'",
                key, other
            )));
        }
    }
    Ok(())
}

fn checked(partitions: BTreeMap<PartitionKey, Table>) -> Result<BTreeMap<PartitionKey, Table>> {
    for (key, table) in &partitions {
        check_membership(key, table)?;
    }
    Ok(partitions)
}

fn split_by_strand(
    partitions: BTreeMap<PartitionKey, Table>,
) -> Result<BTreeMap<PartitionKey, Table>> {
    let mut split = BTreeMap::new();
    for (key, table) in partitions {
        check_membership(&key, &table)?;

        for (values, rows) in table.group_by(&[STRAND_COL])? {
            let strand = values
                .first()
                .and_then(|s| Strand::from_symbol(s))
                .ok_or_else(|| RangesError::schema("strand split on an invalid strand"))?;
            split.insert(
                PartitionKey::stranded(key.chromosome(), strand),
                table.take(&rows),
            );
        }
    }
    Ok(split)
}

fn materialize_strand(
    partitions: BTreeMap<PartitionKey, Table>,
) -> Result<BTreeMap<PartitionKey, Table>> {
    partitions
        .into_iter()
        .map(|(key, table)| {
            let symbol = key.strand().map(|s| s.symbol()).unwrap_or_default();
            let strands = Column::categorical(std::iter::repeat_n(symbol, table.height()));
            let table = table.with_column(STRAND_COL, strands)?;
            check_membership(&key, &table)?;
            Ok((key, table))
        })
        .collect()
}

fn merge_strands(
    partitions: BTreeMap<PartitionKey, Table>,
) -> Result<BTreeMap<PartitionKey, Table>> {
    // keys iterate in natural chromosome order, so one chromosome's strands are adjacent
    let mut grouped: Vec<(PartitionKey, Vec<Table>)> = Vec::new();
    for (key, table) in partitions {
        let chrom = key.to_chrom();
        match grouped.last_mut() {
            Some((last, tables)) if *last == chrom => tables.push(table),
            _ => grouped.push((chrom, vec![table])),
        }
    }

    grouped
        .into_iter()
        .map(|(key, tables)| {
            let refs: Vec<&Table> = tables.iter().collect();
            let merged = Table::concat(&refs)?;
            check_membership(&key, &merged)?;
            Ok((key, merged))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ColumnArrays;
    use crate::models::{Categorical, CoordinateWidth};
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn part(chrom: &str, starts: Vec<i64>, ends: Vec<i64>, strands: Option<Vec<&str>>) -> Table {
        let arrays = ColumnArrays::new(chrom, starts, ends);
        match strands {
            Some(strands) => arrays.with_strands(strands),
            None => arrays,
        }
        .into_table()
        .unwrap()
    }

    fn categories<'a>(table: &'a Table, name: &str) -> &'a [String] {
        table
            .column(name)
            .and_then(Column::as_categorical)
            .map(Categorical::categories)
            .unwrap_or_default()
    }

    #[rstest]
    #[case(false, false, false, Transition::KeepChrom)]
    #[case(false, true, true, Transition::SplitByStrand)]
    #[case(false, true, false, Transition::KeepChrom)]
    #[case(true, false, false, Transition::MaterializeStrand)]
    #[case(true, true, true, Transition::KeepStranded)]
    #[case(true, true, false, Transition::MergeStrands)]
    fn test_transition_table(
        #[case] has_strand_key: bool,
        #[case] stranded: bool,
        #[case] valid: bool,
        #[case] expected: Transition,
    ) {
        assert_eq!(Transition::decide(has_strand_key, stranded, valid), expected);
    }

    #[rstest]
    fn test_bare_keys_with_valid_strands_are_split() {
        let mut partitions = BTreeMap::new();
        partitions.insert(
            PartitionKey::chrom("chr1"),
            part("chr1", vec![1, 2, 3], vec![4, 5, 6], Some(vec!["+", "-", "+"])),
        );

        let store = rebalance(partitions, StoreOptions::default()).unwrap();
        assert!(store.is_stranded());
        let keys: Vec<String> = store.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["chr1\t+", "chr1\t-"]);
        assert_eq!(
            store
                .get(&PartitionKey::stranded("chr1", Strand::Forward))
                .map(Table::height),
            Some(2)
        );
    }

    #[rstest]
    fn test_invalid_strands_merge_in_natural_order() {
        let mut partitions = BTreeMap::new();
        partitions.insert(
            PartitionKey::stranded("chr10", Strand::Forward),
            part("chr10", vec![1], vec![2], Some(vec!["+"])),
        );
        partitions.insert(
            PartitionKey::stranded("chr2", Strand::Forward),
            part("chr2", vec![1], vec![2], Some(vec!["+"])),
        );
        partitions.insert(
            PartitionKey::stranded("chr2", Strand::Reverse),
            part("chr2", vec![3, 4], vec![5, 6], Some(vec!["-", "-"])),
        );
        // a '.' on a '-' key is both an invalid strand and a key mismatch; the merge drops the key
        partitions.insert(
            PartitionKey::stranded("chr10", Strand::Reverse),
            part("chr10", vec![7], vec![9], Some(vec!["."])),
        );

        let store = rebalance(partitions, StoreOptions::default()).unwrap();
        assert!(!store.is_stranded());
        let keys: Vec<String> = store.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["chr2", "chr10"]);

        let chr10 = store.get(&PartitionKey::chrom("chr10")).unwrap();
        assert_eq!(chr10.height(), 2);
        assert_eq!(categories(chr10, "Strand"), &["+", "."]);
    }

    #[rstest]
    fn test_strand_keys_without_strand_column_materialize() {
        let mut partitions = BTreeMap::new();
        partitions.insert(
            PartitionKey::stranded("chr1", Strand::Reverse),
            part("chr1", vec![1, 2], vec![4, 5], None),
        );

        let store = rebalance(partitions, StoreOptions::default()).unwrap();
        assert!(store.is_stranded());
        let table = store
            .get(&PartitionKey::stranded("chr1", Strand::Reverse))
            .unwrap();
        assert_eq!(categories(table, "Strand"), &["-"]);
        assert_eq!(table.row(1).strand(), Some(Strand::Reverse));
    }

    #[rstest]
    fn test_empty_partitions_are_dropped() {
        let mut partitions = BTreeMap::new();
        partitions.insert(PartitionKey::chrom("chr1"), part("chr1", vec![1], vec![2], None));
        partitions.insert(PartitionKey::chrom("chr2"), part("chr2", vec![], vec![], None));

        let store = rebalance(partitions, StoreOptions::default()).unwrap();
        assert_eq!(store.partition_count(), 1);

        let mut only_empty = BTreeMap::new();
        only_empty.insert(PartitionKey::chrom("chr2"), part("chr2", vec![], vec![], None));
        let store = rebalance(only_empty, StoreOptions::default()).unwrap();
        assert!(store.is_empty());
    }

    #[rstest]
    fn test_mixed_key_shapes_are_rejected() {
        let mut partitions = BTreeMap::new();
        partitions.insert(
            PartitionKey::chrom("chr1"),
            part("chr1", vec![1], vec![2], Some(vec!["+"])),
        );
        partitions.insert(
            PartitionKey::stranded("chr2", Strand::Forward),
            part("chr2", vec![1], vec![2], Some(vec!["+"])),
        );
        assert!(matches!(
            rebalance(partitions, StoreOptions::default()),
            Err(RangesError::SchemaViolation(_))
        ));
    }

    #[rstest]
    fn test_different_schemas_are_rejected() {
        let mut partitions = BTreeMap::new();
        partitions.insert(PartitionKey::chrom("chr1"), part("chr1", vec![1], vec![2], None));
        partitions.insert(
            PartitionKey::chrom("chr2"),
            part("chr2", vec![1], vec![2], None)
                .with_column("Score", Column::Float64(vec![1.0]))
                .unwrap(),
        );
        assert!(matches!(
            rebalance(partitions, StoreOptions::default()),
            Err(RangesError::SchemaViolation(_))
        ));
    }

    #[rstest]
    fn test_rows_must_match_their_key() {
        let mut partitions = BTreeMap::new();
        partitions.insert(PartitionKey::chrom("chr1"), part("chr2", vec![1], vec![2], None));
        assert!(matches!(
            rebalance(partitions, StoreOptions::default()),
            Err(RangesError::SchemaViolation(_))
        ));

        let mut partitions = BTreeMap::new();
        partitions.insert(
            PartitionKey::stranded("chr1", Strand::Forward),
            part("chr1", vec![1, 3], vec![2, 4], Some(vec!["+", "-"])),
        );
        assert!(matches!(
            rebalance(partitions, StoreOptions::default()),
            Err(RangesError::SchemaViolation(_))
        ));
    }

    #[rstest]
    #[case(Some(vec!["+", "-", "+", "-"]))]
    #[case(Some(vec!["+", ".", "+", "-"]))]
    #[case(None)]
    fn test_rebalance_is_idempotent(#[case] strands: Option<Vec<&str>>) {
        let mut arrays = ColumnArrays::new(
            vec!["chr1", "chr2", "chr1", "chr10"],
            vec![1, 2, 3, 4],
            vec![5, 6, 7, 8],
        );
        if let Some(strands) = strands {
            arrays = arrays.with_strands(strands);
        }
        let store = RangeStore::new(arrays, false).unwrap();
        let again = store.clone().rebalance().unwrap();

        assert_eq!(again, store);
        assert_eq!(again.key_kind(), store.key_kind());
        let twice = again.clone().rebalance().unwrap();
        assert_eq!(twice, again);
    }

    #[rstest]
    fn test_categories_are_tight() {
        let store = RangeStore::new(
            ColumnArrays::new(
                vec!["chr1", "chr2", "chr1", "chr3"],
                vec![1, 2, 3, 4],
                vec![5, 6, 7, 8],
            )
            .with_strands(vec!["+", "-", "-", "+"]),
            false,
        )
        .unwrap();

        for (key, table) in store.partitions() {
            assert_eq!(categories(table, "Chromosome"), &[key.chromosome().to_string()]);
            let strand = key.strand().map(|s| s.symbol().to_string());
            assert_eq!(categories(table, "Strand").first(), strand.as_ref());
            assert_eq!(categories(table, "Strand").len(), 1);
        }
    }

    #[rstest]
    fn test_partitions_take_store_width() {
        let mut partitions = BTreeMap::new();
        partitions.insert(PartitionKey::chrom("chr1"), part("chr1", vec![1], vec![2], None));
        let store = rebalance(partitions, StoreOptions::wide()).unwrap();
        assert_eq!(store.coordinate_width(), CoordinateWidth::Int64);
        let table = store.get(&PartitionKey::chrom("chr1")).unwrap();
        assert_eq!(
            table.column("Start").map(Column::dtype),
            Some(crate::models::DataType::Int64)
        );
    }
}
