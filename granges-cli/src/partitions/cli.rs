use clap::{Arg, Command, arg};

pub const PARTITIONS_CMD: &str = "partitions";

pub fn create_partitions_cli() -> Command {
    Command::new(PARTITIONS_CMD)
        .author("Databio")
        .about("List the partitions a range table is split into, with their row counts.")
        .arg_required_else_help(true)
        .arg(Arg::new("input").help("Delimited table of ranges, or - for stdin").required(true))
        .arg(
            arg!(--wide "Store coordinates as 64-bit integers")
                .action(clap::ArgAction::SetTrue),
        )
}
