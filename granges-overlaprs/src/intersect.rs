use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use log::{debug, warn};
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use granges_core::consts::{END_COL, START_COL};
use granges_core::errors::Result;
use granges_core::models::{Column, CoordinateWidth, PartitionKey, RangeStore, Table};
use granges_core::rebalance::rebalance;

use crate::{AIList, Interval, Overlapper};

/// Which partitions of the other store are compared against a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Strandedness {
    /// Pair by chromosome only.
    #[default]
    Unstranded,
    /// Pair identical chromosome/strand keys.
    Same,
    /// Pair `+` against `-` on the same chromosome, and vice versa.
    Opposite,
}

impl FromStr for Strandedness {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unstranded" | "none" => Ok(Strandedness::Unstranded),
            "same" | "same-strand" => Ok(Strandedness::Same),
            "opposite" | "opposite-strand" => Ok(Strandedness::Opposite),
            _ => Err(format!("Invalid strandedness: {}", s)),
        }
    }
}

impl Display for Strandedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strandedness::Unstranded => "unstranded",
            Strandedness::Same => "same",
            Strandedness::Opposite => "opposite",
        };
        write!(f, "{}", name)
    }
}

/// Which pairs of rows count as a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OverlapHow {
    /// Any shared base.
    #[default]
    Overlap,
    /// The row of the first store lies inside the row of the second.
    Containment,
}

impl FromStr for OverlapHow {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overlap" => Ok(OverlapHow::Overlap),
            "containment" | "contained" => Ok(OverlapHow::Containment),
            _ => Err(format!("Invalid overlap mode: {}", s)),
        }
    }
}

impl Display for OverlapHow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OverlapHow::Overlap => "overlap",
            OverlapHow::Containment => "containment",
        };
        write!(f, "{}", name)
    }
}

///
/// Range stores that can be intersected with another store.
///
pub trait Intersect {
    ///
    /// Rows of `self` overlapping rows of `other`, clipped to the shared span.
    ///
    /// # Arguments
    /// - other: the store to intersect with
    /// - strandedness: how partitions of the two stores are paired
    /// - how: plain overlap, or containment of `self`'s row in `other`'s row
    ///
    fn intersection(
        &self,
        other: &RangeStore,
        strandedness: Strandedness,
        how: OverlapHow,
    ) -> Result<RangeStore>;
}

impl Intersect for RangeStore {
    fn intersection(
        &self,
        other: &RangeStore,
        strandedness: Strandedness,
        how: OverlapHow,
    ) -> Result<RangeStore> {
        intersect(self, other, strandedness, how)
    }
}

/// Partitions of `b` that a partition of `a` with `key` is compared against.
fn partners<'b>(
    key: &PartitionKey,
    b: &'b RangeStore,
    strandedness: Strandedness,
) -> Vec<&'b Table> {
    match (strandedness, key.strand()) {
        (Strandedness::Unstranded, _) => b
            .partitions_on(key.chromosome())
            .map(|(_, table)| table)
            .collect(),
        (Strandedness::Same, Some(strand)) => b
            .get(&PartitionKey::stranded(key.chromosome(), strand))
            .into_iter()
            .collect(),
        (Strandedness::Opposite, Some(strand)) => b
            .get(&PartitionKey::stranded(key.chromosome(), strand.opposite()))
            .into_iter()
            .collect(),
        (_, None) => Vec::new(),
    }
}

fn coordinates(table: &Table) -> Result<(Vec<i64>, Vec<i64>)> {
    let starts = table.require(START_COL)?.to_i64_vec().unwrap_or_default();
    let ends = table.require(END_COL)?.to_i64_vec().unwrap_or_default();
    Ok((starts, ends))
}

///
/// Intersect one partition of `a` with its partner partitions of `b`.
///
fn intersect_partition(
    a: &Table,
    partners: &[&Table],
    how: OverlapHow,
    width: CoordinateWidth,
) -> Result<Table> {
    let mut intervals: Vec<Interval<i64, ()>> = Vec::new();
    for table in partners {
        let (starts, ends) = coordinates(table)?;
        intervals.extend(
            starts
                .into_iter()
                .zip(ends)
                .filter(|(s, e)| s < e)
                .map(|(start, end)| Interval { start, end, val: () }),
        );
    }
    let index = AIList::build(intervals);

    let (starts, ends) = coordinates(a)?;
    let mut rows = Vec::new();
    let mut clipped_starts = Vec::new();
    let mut clipped_ends = Vec::new();

    for (row, (&start, &end)) in starts.iter().zip(ends.iter()).enumerate() {
        if start >= end {
            continue;
        }

        let mut spans: Vec<(i64, i64)> = index
            .find_iter(start, end)
            .filter(|b| match how {
                OverlapHow::Overlap => true,
                OverlapHow::Containment => b.contains(start, end),
            })
            .filter_map(|b| b.clip(start, end))
            .collect();
        spans.sort_unstable();

        for (lo, hi) in spans {
            rows.push(row);
            clipped_starts.push(lo);
            clipped_ends.push(hi);
        }
    }

    a.take(&rows)
        .with_column(START_COL, Column::from_coordinates(clipped_starts, width)?)?
        .with_column(END_COL, Column::from_coordinates(clipped_ends, width)?)
}

///
/// Rows of `a` overlapping rows of `b`, with coordinates clipped to the
/// overlap. See [`Intersect::intersection`].
///
/// Output rows keep `a`'s columns, strand and coordinate width, in `a`'s row
/// order and, per row, in ascending order of the clipped span. Pairs that
/// only touch, and zero-length rows on either side, never overlap.
///
pub fn intersect(
    a: &RangeStore,
    b: &RangeStore,
    strandedness: Strandedness,
    how: OverlapHow,
) -> Result<RangeStore> {
    if strandedness != Strandedness::Unstranded && !(a.is_stranded() && b.is_stranded()) {
        warn!(
            "Requested {} strandedness, but {} unstranded; no partitions can be paired",
            strandedness,
            match (a.is_stranded(), b.is_stranded()) {
                (false, false) => "both stores are",
                (false, true) => "the first store is",
                _ => "the second store is",
            }
        );
        return Ok(RangeStore::empty(a.options()));
    }

    let pairs: Vec<(&PartitionKey, &Table, Vec<&Table>)> = a
        .partitions()
        .map(|(key, table)| (key, table, partners(key, b, strandedness)))
        .filter(|(_, _, partners)| !partners.is_empty())
        .collect();
    debug!(
        "Intersecting {} partition pairs ({}, {})",
        pairs.len(),
        strandedness,
        how
    );

    let width = a.coordinate_width();
    let partitions = pairs
        .par_iter()
        .map(|(key, table, partners)| {
            Ok(((*key).clone(), intersect_partition(table, partners, how, width)?))
        })
        .collect::<Result<BTreeMap<PartitionKey, Table>>>()?;

    rebalance(partitions, a.options())
}
