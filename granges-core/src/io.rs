//! Delimited text tables: a header line followed by tab- or space-separated rows.

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::errors::{RangesError, Result};
use crate::models::{Column, Table, Value};
use crate::utils::get_dynamic_reader;

///
/// Read a delimited table from disk. Files ending in `.gz` are decompressed.
///
/// # Arguments
/// - path: the path to the file to read
///
pub fn read_table(path: &Path) -> Result<Table> {
    let reader = get_dynamic_reader(path)?;
    parse_table(reader)
}

fn split_fields(line: &str) -> Vec<&str> {
    match line.contains('\t') {
        true => line.split('\t').map(str::trim).collect(),
        false => line.split_whitespace().collect(),
    }
}

///
/// Parse a delimited table from any reader.
///
/// Blank lines and lines starting with `#` are skipped; the first remaining
/// line is the header. Column types are inferred: all integers gives
/// `Int64`, all numbers `Float64`, anything else `Utf8`.
///
pub fn parse_table<R: BufRead>(reader: R) -> Result<Table> {
    let mut header: Option<Vec<String>> = None;
    let mut cells: Vec<Vec<String>> = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields = split_fields(&line);
        match &header {
            None => {
                cells = vec![Vec::new(); fields.len()];
                header = Some(fields.into_iter().map(String::from).collect());
            }
            Some(names) => {
                if fields.len() != names.len() {
                    return Err(RangesError::Parse {
                        line: i + 1,
                        message: format!(
                            "expected {} fields, found {}",
                            names.len(),
                            fields.len()
                        ),
                    });
                }
                for (column, field) in cells.iter_mut().zip(fields) {
                    column.push(field.to_string());
                }
            }
        }
    }

    let Some(names) = header else {
        return Ok(Table::default());
    };

    let columns: Vec<(String, Column)> = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| (name, infer_column(values)))
        .collect();

    Table::new(columns)
}

fn infer_column(values: Vec<String>) -> Column {
    let ints: std::result::Result<Vec<i64>, _> = values.iter().map(|v| v.parse()).collect();
    if let Ok(ints) = ints {
        return Column::Int64(ints);
    }

    let floats: std::result::Result<Vec<f64>, _> = values.iter().map(|v| v.parse()).collect();
    if let Ok(floats) = floats {
        return Column::Float64(floats);
    }

    Column::Utf8(values)
}

///
/// Write a table as tab-separated text with a header line.
///
pub fn write_table<W: Write>(table: &Table, mut writer: W) -> Result<()> {
    let names: Vec<&str> = table.column_names().collect();
    writeln!(writer, "{}", names.join("\t"))?;

    for row in 0..table.height() {
        let line: Vec<String> = table
            .columns()
            .map(|(_, column)| format_cell(column.get(row)))
            .collect();
        writeln!(writer, "{}", line.join("\t"))?;
    }

    writer.flush()?;
    Ok(())
}

/// Floats always carry a decimal point, so they read back as floats.
fn format_cell(value: Value<'_>) -> String {
    match value {
        Value::Float(v) => format!("{:?}", v),
        other => other.to_string(),
    }
}

///
/// Save a table to disk; paths ending in `.gz` are gzip-compressed.
///
/// # Arguments
/// - table: the table to write
/// - path: the path to the file to dump to
///
pub fn write_table_to_path(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = BufWriter::new(File::create(path)?);
    match path.extension().is_some_and(|ext| ext == "gz") {
        true => {
            let mut encoder = GzEncoder::new(file, Compression::best());
            write_table(table, &mut encoder)?;
            encoder.finish()?;
        }
        false => write_table(table, file)?,
    }
    Ok(())
}
