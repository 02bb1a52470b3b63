use std::collections::BTreeSet;
use std::io::Cursor;

use pretty_assertions::assert_eq;
use rstest::*;

use granges_core::io::parse_table;
use granges_core::{ColumnArrays, RangeStore};
use granges_overlaprs::{Intersect, OverlapHow, Strandedness, intersect};

fn store_from_text(text: &str) -> RangeStore {
    let table = parse_table(Cursor::new(text)).unwrap();
    RangeStore::new(table, false).unwrap()
}

#[fixture]
fn simple_gr1() -> RangeStore {
    store_from_text(
        "Chromosome Start End Strand Score
chr1 3 6 + 5
chr1 5 7 - 7
chr1 8 9 + 1",
    )
}

#[fixture]
fn simple_gr2() -> RangeStore {
    store_from_text(
        "Chromosome Start End Strand Score
chr1 1 2 + 1
chr1 6 7 - 2",
    )
}

#[fixture]
fn expected_single_hit() -> RangeStore {
    store_from_text(
        "Chromosome Start End Strand Score
chr1    6   7   - 7",
    )
}

#[rstest]
fn test_intersect_unstranded(
    simple_gr1: RangeStore,
    simple_gr2: RangeStore,
    expected_single_hit: RangeStore,
) {
    let result = simple_gr1
        .intersection(&simple_gr2, Strandedness::Unstranded, OverlapHow::Overlap)
        .unwrap();
    assert_eq!(result, expected_single_hit);
}

#[rstest]
fn test_intersect_same_strand(
    simple_gr1: RangeStore,
    simple_gr2: RangeStore,
    expected_single_hit: RangeStore,
) {
    let result = simple_gr1
        .intersection(&simple_gr2, Strandedness::Same, OverlapHow::Overlap)
        .unwrap();
    assert_eq!(result, expected_single_hit);
}

#[rstest]
fn test_intersect_opposite_strand(simple_gr1: RangeStore, simple_gr2: RangeStore) {
    let result = simple_gr1
        .intersection(&simple_gr2, Strandedness::Opposite, OverlapHow::Overlap)
        .unwrap();
    assert_eq!(result.len(), 0);
}

#[rstest]
fn test_intersect_unstranded_containment(simple_gr1: RangeStore, simple_gr2: RangeStore) {
    let result = simple_gr1
        .intersection(&simple_gr2, Strandedness::Unstranded, OverlapHow::Containment)
        .unwrap();
    assert_eq!(result.len(), 0);
}

#[rstest]
fn test_containment_keeps_rows_inside_b() {
    let a = store_from_text(
        "Chromosome Start End
chr1 2 4
chr1 5 12
chr2 0 3",
    );
    let b = store_from_text(
        "Chromosome Start End
chr1 0 10
chr2 1 3",
    );
    let result = intersect(&a, &b, Strandedness::Unstranded, OverlapHow::Containment).unwrap();
    let expected = store_from_text(
        "Chromosome Start End
chr1 2 4",
    );
    assert_eq!(result, expected);
}

/// Small deterministic generator, so the property tests below are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: i64) -> i64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) % bound as u64) as i64
    }
}

fn random_store(seed: u64, rows: usize, strands: &[&str]) -> RangeStore {
    let mut rng = Lcg(seed);
    let mut chroms = Vec::new();
    let mut starts = Vec::new();
    let mut ends = Vec::new();
    let mut strand_values = Vec::new();

    for _ in 0..rows {
        let start = rng.next(200);
        chroms.push(["chr1", "chr2", "chr10"][rng.next(3) as usize]);
        starts.push(start);
        ends.push(start + 1 + rng.next(40));
        strand_values.push(strands[rng.next(strands.len() as i64) as usize]);
    }

    let ids: Vec<String> = (0..rows).map(|i| format!("row{}", i)).collect();
    let table = ColumnArrays::new(chroms, starts, ends)
        .with_strands(strand_values)
        .into_table()
        .unwrap()
        .with_column("Id", granges_core::Column::utf8(ids))
        .unwrap();
    RangeStore::new(table, false).unwrap()
}

type RowSet = BTreeSet<(String, i64, i64, String)>;

fn row_set(store: &RangeStore) -> RowSet {
    let table = store.to_table().unwrap();
    table
        .rows()
        .map(|r| {
            (
                r.chromosome().unwrap_or_default().to_string(),
                r.start().unwrap_or_default(),
                r.end().unwrap_or_default(),
                r.get("Id").map(|v| v.to_string()).unwrap_or_default(),
            )
        })
        .collect()
}

#[rstest]
#[case(Strandedness::Unstranded)]
#[case(Strandedness::Same)]
#[case(Strandedness::Opposite)]
fn test_containment_is_subset_of_overlap(#[case] strandedness: Strandedness) {
    for seed in 0..5 {
        let a = random_store(seed, 60, &["+", "-"]);
        let b = random_store(seed + 100, 40, &["+", "-"]);

        let overlap = row_set(&intersect(&a, &b, strandedness, OverlapHow::Overlap).unwrap());
        let containment =
            row_set(&intersect(&a, &b, strandedness, OverlapHow::Containment).unwrap());
        assert!(containment.is_subset(&overlap));
    }
}

#[rstest]
fn test_opposite_is_empty_on_a_single_shared_strand() {
    let a = random_store(7, 50, &["-"]);
    let b = random_store(8, 50, &["-"]);
    let result = intersect(&a, &b, Strandedness::Opposite, OverlapHow::Overlap).unwrap();
    assert!(result.is_empty());

    // the same stores do overlap when strands are matched
    let result = intersect(&a, &b, Strandedness::Same, OverlapHow::Overlap).unwrap();
    assert!(!result.is_empty());
}

#[rstest]
fn test_clipping_matches_naive_overlap() {
    let a = random_store(11, 80, &["+", "-"]);
    let b = random_store(12, 80, &["+", "-"]);
    let result = intersect(&a, &b, Strandedness::Unstranded, OverlapHow::Overlap).unwrap();

    let a_rows = a.to_table().unwrap();
    let b_rows = b.to_table().unwrap();

    // naive cross product over the same rows
    let mut expected: Vec<(String, i64, i64, String)> = Vec::new();
    for ra in a_rows.rows() {
        for rb in b_rows.rows() {
            let (sa, ea) = (ra.start().unwrap(), ra.end().unwrap());
            let (sb, eb) = (rb.start().unwrap(), rb.end().unwrap());
            if ra.chromosome() == rb.chromosome() && sa < eb && sb < ea {
                expected.push((
                    ra.chromosome().unwrap().to_string(),
                    sa.max(sb),
                    ea.min(eb),
                    ra.get("Id").unwrap().to_string(),
                ));
            }
        }
    }
    expected.sort();

    let result_rows = result.to_table().unwrap();
    let mut actual: Vec<(String, i64, i64, String)> = result_rows
        .rows()
        .map(|r| {
            (
                r.chromosome().unwrap().to_string(),
                r.start().unwrap(),
                r.end().unwrap(),
                r.get("Id").unwrap().to_string(),
            )
        })
        .collect();
    actual.sort();

    assert_eq!(actual, expected);
}

#[rstest]
fn test_result_is_rebalanced(simple_gr1: RangeStore, simple_gr2: RangeStore) {
    let result = simple_gr1
        .intersection(&simple_gr2, Strandedness::Unstranded, OverlapHow::Overlap)
        .unwrap();
    assert!(result.is_stranded());
    assert_eq!(result.clone().rebalance().unwrap(), result);
}
