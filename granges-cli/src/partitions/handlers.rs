use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use granges_core::RangeStore;
use granges_core::io::parse_table;
use granges_core::utils::get_dynamic_reader_w_stdin;

pub fn run_partitions(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .context("An input table is required")?;

    let reader = get_dynamic_reader_w_stdin(input)
        .with_context(|| format!("Failed to open {}", input))?;
    let table = parse_table(reader).with_context(|| format!("Failed to parse {}", input))?;

    let store = RangeStore::new(table, matches.get_flag("wide"))
        .with_context(|| format!("Failed to build a range store from {}", input))?;
    info!("{}", store);

    let stdout = io::stdout();
    write_partitions(&store, BufWriter::new(stdout.lock()))
}

/// One line per partition, in natural key order: the key, then the row count.
fn write_partitions<W: Write>(store: &RangeStore, mut writer: W) -> Result<()> {
    for (key, table) in store.partitions() {
        writeln!(writer, "{}\t{}", key, table.height())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use granges_core::ColumnArrays;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_write_partitions_in_natural_order() {
        let store = RangeStore::new(
            ColumnArrays::new(
                vec!["chr10", "chr2", "chr2", "chr1"],
                vec![0, 1, 2, 3],
                vec![5, 6, 7, 8],
            )
            .with_strands(vec!["+", "-", "-", "+"]),
            false,
        )
        .unwrap();

        let mut out: Vec<u8> = Vec::new();
        write_partitions(&store, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "chr1\t+\t1\nchr2\t-\t2\nchr10\t+\t1\n"
        );
    }

    #[rstest]
    fn test_run_partitions_on_fixture() {
        let matches = crate::partitions::cli::create_partitions_cli()
            .get_matches_from(["partitions", "../tests/data/intersect/a.tsv"]);
        assert!(run_partitions(&matches).is_ok());
    }
}
