mod config;
mod intersect;
mod partitions;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "granges";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Stranded, partitioned genomic range stores and strand-aware interval intersection.")
        .subcommand_required(true)
        .subcommand(intersect::cli::create_intersect_cli())
        .subcommand(partitions::cli::create_partitions_cli())
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // INTERSECT
        //
        Some((intersect::cli::INTERSECT_CMD, matches)) => {
            intersect::handlers::run_intersect(matches)?;
        }

        //
        // PARTITIONS
        //
        Some((partitions::cli::PARTITIONS_CMD, matches)) => {
            partitions::handlers::run_partitions(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    fn test_parser_is_valid() {
        build_parser().debug_assert();
    }

    #[rstest]
    fn test_subcommand_is_required() {
        assert!(build_parser().try_get_matches_from(["granges"]).is_err());
    }
}
