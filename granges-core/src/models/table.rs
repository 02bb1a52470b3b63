use std::cmp::Ordering;
use std::fmt::{self, Display};

use fxhash::FxHashMap;

use crate::consts::{CHROMOSOME_COL, END_COL, START_COL, STRAND_COL};
use crate::errors::{RangesError, Result};
use crate::models::column::{Column, DataType, Value};
use crate::models::strand::Strand;

///
/// A small columnar table: an ordered list of named, equal-length columns.
///
/// This is the container that holds the rows of one partition. It supports
/// exactly what the store needs: select, take, group-by, sort and concatenate.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<(String, Column)>,
}

///
/// A borrowed view of one row of a [`Table`].
///
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, name: &str) -> Option<Value<'a>> {
        self.table.column(name).map(|c| c.get(self.index))
    }

    pub fn chromosome(&self) -> Option<&'a str> {
        self.get(CHROMOSOME_COL).and_then(|v| v.as_str())
    }

    pub fn start(&self) -> Option<i64> {
        self.get(START_COL).and_then(|v| v.as_i64())
    }

    pub fn end(&self) -> Option<i64> {
        self.get(END_COL).and_then(|v| v.as_i64())
    }

    pub fn strand(&self) -> Option<Strand> {
        self.get(STRAND_COL)
            .and_then(|v| v.as_str())
            .and_then(Strand::from_symbol)
    }
}

impl Table {
    ///
    /// Create a table from named columns.
    ///
    /// Fails with [`RangesError::LengthMismatch`] if the columns differ in length
    /// and with [`RangesError::SchemaViolation`] on duplicate names.
    ///
    pub fn new<S: Into<String>>(columns: Vec<(S, Column)>) -> Result<Self> {
        let columns: Vec<(String, Column)> =
            columns.into_iter().map(|(n, c)| (n.into(), c)).collect();

        let lengths: Vec<usize> = columns.iter().map(|(_, c)| c.len()).collect();
        if lengths.windows(2).any(|w| w[0] != w[1]) {
            return Err(RangesError::LengthMismatch(lengths));
        }

        for (i, (name, _)) in columns.iter().enumerate() {
            if columns[..i].iter().any(|(other, _)| other == name) {
                return Err(RangesError::schema(format!("duplicate column '{}'", name)));
            }
        }

        Ok(Table { columns })
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Column names with their types, in column order.
    pub fn schema(&self) -> Vec<(&str, DataType)> {
        self.columns
            .iter()
            .map(|(n, c)| (n.as_str(), c.dtype()))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Like [`Table::column`], but a missing column is a schema violation.
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| RangesError::schema(format!("missing column '{}'", name)))
    }

    pub fn row(&self, index: usize) -> Row<'_> {
        Row { table: self, index }
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.height()).map(move |index| Row { table: self, index })
    }

    ///
    /// Replace the column called `name`, or append it if there is none.
    ///
    pub fn with_column<S: Into<String>>(mut self, name: S, column: Column) -> Result<Self> {
        let name = name.into();
        if !self.columns.is_empty() && column.len() != self.height() {
            return Err(RangesError::LengthMismatch(vec![self.height(), column.len()]));
        }

        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name, column)),
        }
        Ok(self)
    }

    /// Remove a column if present.
    pub fn drop_column(mut self, name: &str) -> Self {
        self.columns.retain(|(n, _)| n != name);
        self
    }

    ///
    /// Rewrite one column in place, keeping its position. The rewritten column
    /// must keep the table height.
    ///
    pub fn map_column<F>(mut self, name: &str, f: F) -> Result<Self>
    where
        F: FnOnce(Column) -> Result<Column>,
    {
        let height = self.height();
        let pos = self
            .columns
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| RangesError::schema(format!("missing column '{}'", name)))?;

        let column = std::mem::replace(&mut self.columns[pos].1, Column::Int64(Vec::new()));
        let column = f(column)?;
        if column.len() != height {
            return Err(RangesError::LengthMismatch(vec![height, column.len()]));
        }
        self.columns[pos].1 = column;
        Ok(self)
    }

    /// Take ownership of a column, removing it from the table.
    pub fn take_column(&mut self, name: &str) -> Option<Column> {
        let pos = self.columns.iter().position(|(n, _)| n == name)?;
        Some(self.columns.remove(pos).1)
    }

    /// Keep only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Table> {
        let columns = names
            .iter()
            .map(|&name| Ok((name.to_string(), self.require(name)?.clone())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Table { columns })
    }

    /// Gather rows by index; indices may repeat.
    pub fn take(&self, indices: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|(n, c)| (n.clone(), c.take(indices)))
                .collect(),
        }
    }

    ///
    /// Concatenate tables with identical schemas (same names, order and types).
    ///
    pub fn concat(tables: &[&Table]) -> Result<Table> {
        let Some(first) = tables.first() else {
            return Ok(Table::default());
        };

        let schema = first.schema();
        if let Some(other) = tables.iter().find(|t| t.schema() != schema) {
            return Err(RangesError::schema(format!(
                "cannot concatenate tables with schemas {} and {}",
                format_schema(&schema),
                format_schema(&other.schema())
            )));
        }

        let columns = first
            .columns
            .iter()
            .enumerate()
            .map(|(i, (name, _))| {
                let parts: Vec<&Column> = tables.iter().map(|t| &t.columns[i].1).collect();
                Ok((name.clone(), Column::concat(&parts)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Table { columns })
    }

    ///
    /// Stable argsort on one or more columns.
    ///
    pub fn argsort_by(&self, names: &[&str]) -> Result<Vec<usize>> {
        let keys = names
            .iter()
            .map(|&name| self.require(name))
            .collect::<Result<Vec<_>>>()?;

        let mut order: Vec<usize> = (0..self.height()).collect();
        order.sort_by(|&i, &j| {
            keys.iter()
                .map(|col| col.cmp_rows(i, j))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        Ok(order)
    }

    pub fn sort_by(&self, names: &[&str]) -> Result<Table> {
        Ok(self.take(&self.argsort_by(names)?))
    }

    ///
    /// Group row indices by the values of the given columns.
    ///
    /// Groups come back in order of first appearance; each key is the rendered
    /// cell values of the grouping columns.
    ///
    pub fn group_by(&self, names: &[&str]) -> Result<Vec<(Vec<String>, Vec<usize>)>> {
        let keys = names
            .iter()
            .map(|&name| self.require(name))
            .collect::<Result<Vec<_>>>()?;

        let mut slots: FxHashMap<Vec<String>, usize> = FxHashMap::default();
        let mut groups: Vec<(Vec<String>, Vec<usize>)> = Vec::new();

        for row in 0..self.height() {
            let key: Vec<String> = keys.iter().map(|c| c.get(row).to_string()).collect();
            match slots.get(&key) {
                Some(&slot) => groups[slot].1.push(row),
                None => {
                    slots.insert(key.clone(), groups.len());
                    groups.push((key, vec![row]));
                }
            }
        }

        Ok(groups)
    }

    /// Drop unused categories from every categorical column.
    pub fn tighten_categories(self) -> Self {
        Table {
            columns: self
                .columns
                .into_iter()
                .map(|(n, c)| (n, c.tighten()))
                .collect(),
        }
    }

    /// Rows filtered by a predicate on the row view.
    pub fn filter<F>(&self, predicate: F) -> Table
    where
        F: Fn(&Row<'_>) -> bool,
    {
        let keep: Vec<usize> = self
            .rows()
            .filter(|row| predicate(row))
            .map(|row| row.index())
            .collect();
        self.take(&keep)
    }

    ///
    /// Convert to a polars `DataFrame`, going through the delimited writer.
    ///
    #[cfg(feature = "dataframe")]
    pub fn to_polars(&self) -> polars::prelude::PolarsResult<polars::prelude::DataFrame> {
        use polars::prelude::*;
        use std::io::Cursor;

        let mut buffer: Vec<u8> = Vec::new();
        crate::io::write_table(self, &mut buffer)
            .map_err(|e| PolarsError::ComputeError(e.to_string().into()))?;

        let cursor = Cursor::new(buffer);

        CsvReadOptions::default()
            .with_has_header(true)
            .map_parse_options(|parse_options| parse_options.with_separator(b'\t'))
            .with_infer_schema_length(Some(10000))
            .into_reader_with_file_handle(cursor)
            .finish()
    }
}

fn format_schema(schema: &[(&str, DataType)]) -> String {
    let fields: Vec<String> = schema
        .iter()
        .map(|(name, dtype)| format!("{}: {}", name, dtype))
        .collect();
    format!("[{}]", fields.join(", "))
}

impl Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Table with {} rows and columns {}",
            self.height(),
            format_schema(&self.schema())
        )
    }
}
