use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use granges_core::io::{read_table, write_table, write_table_to_path};
use granges_core::{RangeStore, StoreOptions, Table};
use granges_overlaprs::{Intersect, OverlapHow, Strandedness};

use crate::config::IntersectConfig;

pub fn run_intersect(matches: &ArgMatches) -> Result<()> {
    let a_path = matches.get_one::<String>("A").context("-a is required")?;
    let b_path = matches.get_one::<String>("B").context("-b is required")?;

    let config = resolve_config(matches)?;
    let options = config.store_options();

    let a = load_store(a_path, options)?;
    let b = load_store(b_path, options)?;
    info!("A: {}", a);
    info!("B: {}", b);

    let result = a
        .intersection(&b, config.strandedness, config.how)
        .context("Failed to intersect range stores")?;
    info!("Result: {}", result);

    // an empty result still carries A's header
    let table = match result.is_empty() {
        true => a.to_table()?.take(&[]),
        false => result.to_table()?,
    };

    write_output(&table, matches.get_one::<String>("output"))
}

///
/// Settings from `--config`, overridden by any flags given on the command line.
///
fn resolve_config(matches: &ArgMatches) -> Result<IntersectConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => IntersectConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to read config file {}", path))?,
        None => IntersectConfig::default(),
    };

    if let Some(s) = matches.get_one::<String>("strandedness") {
        config.strandedness = s.parse::<Strandedness>().map_err(anyhow::Error::msg)?;
    }
    if let Some(s) = matches.get_one::<String>("how") {
        config.how = s.parse::<OverlapHow>().map_err(anyhow::Error::msg)?;
    }
    if matches.get_flag("wide") {
        config.use_64bit_coordinates = true;
    }

    Ok(config)
}

fn load_store(path: &str, options: StoreOptions) -> Result<RangeStore> {
    let table = read_table(Path::new(path))
        .with_context(|| format!("Failed to read ranges from {}", path))?;
    RangeStore::with_options(table, options)
        .with_context(|| format!("Failed to build a range store from {}", path))
}

fn write_output(table: &Table, output: Option<&String>) -> Result<()> {
    match output {
        Some(p) => {
            write_table_to_path(table, Path::new(p))
                .with_context(|| format!("Failed to write output to {}", p))?;
            info!("Output written to {}", p);
        }
        None => {
            let stdout = io::stdout();
            write_table(table, BufWriter::new(stdout.lock()))?;
        }
    }
    Ok(())
}
