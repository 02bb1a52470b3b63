//! Dtype and strandedness normalization of range tables.

use log::info;

use crate::consts::{CHROMOSOME_COL, END_COL, REQUIRED_COLS, START_COL, STRAND_COL};
use crate::errors::{RangesError, Result};
use crate::models::{Column, CoordinateWidth, Strand, Table};

///
/// Whether a strand column only holds `+` and `-`.
///
/// For a categorical column the declared categories are checked, so an unused
/// `.` category is enough to fail. Non-string columns never hold valid strands.
///
pub fn strands_valid(column: &Column) -> bool {
    match column {
        Column::Categorical(cat) => cat
            .categories()
            .iter()
            .all(|s| Strand::is_valid_symbol(s)),
        other => other
            .iter_str()
            .is_some_and(|mut values| values.all(Strand::is_valid_symbol)),
    }
}

///
/// True iff the table has a strand column and every strand is `+` or `-`.
///
pub fn classify(table: &Table) -> bool {
    table.column(STRAND_COL).is_some_and(strands_valid)
}

///
/// Normalize a flat table: chromosome (and a valid strand) become categorical,
/// Start/End take the store coordinate width, and a strand column with
/// values outside `{+, -}` is dropped.
///
pub fn normalize(table: Table, width: CoordinateWidth) -> Result<Table> {
    let demote = table.column(STRAND_COL).is_some_and(|c| !strands_valid(c));
    let table = if demote {
        info!("Strand column holds values other than '+' and '-'; treating ranges as unstranded");
        table.drop_column(STRAND_COL)
    } else {
        table
    };

    conform(table, width)
}

///
/// Bring a table to the store encoding without touching strand semantics:
/// required columns present, categorical chromosome/strand, coordinates of
/// `width`, valid intervals and tight categories.
///
pub(crate) fn conform(table: Table, width: CoordinateWidth) -> Result<Table> {
    for name in REQUIRED_COLS {
        table.require(name)?;
    }

    let mut table = table
        .map_column(CHROMOSOME_COL, encode_categorical)?
        .map_column(START_COL, |c| c.cast_coordinates(width))?
        .map_column(END_COL, |c| c.cast_coordinates(width))?;

    if table.has_column(STRAND_COL) {
        table = table.map_column(STRAND_COL, encode_categorical)?;
    }

    validate_intervals(&table)?;

    Ok(table.tighten_categories())
}

fn encode_categorical(column: Column) -> Result<Column> {
    Ok(Column::Categorical(column.into_categorical()?))
}

fn validate_intervals(table: &Table) -> Result<()> {
    let starts = table.require(START_COL)?.to_i64_vec().unwrap_or_default();
    let ends = table.require(END_COL)?.to_i64_vec().unwrap_or_default();

    match starts
        .iter()
        .zip(ends.iter())
        .position(|(&s, &e)| s < 0 || s > e)
    {
        Some(i) => Err(RangesError::InvalidInterval {
            chrom: table.row(i).chromosome().unwrap_or_default().to_string(),
            start: starts[i],
            end: ends[i],
        }),
        None => Ok(()),
    }
}
