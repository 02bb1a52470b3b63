use clap::{Command, arg};

pub use granges_overlaprs::consts::INTERSECT_CMD;

pub fn create_intersect_cli() -> Command {
    Command::new(INTERSECT_CMD)
        .author("Databio")
        .about("Keep the ranges of A that overlap B, clipped to the overlapping span.")
        .arg_required_else_help(true)
        .arg(
            arg!(-a <A> "Delimited table of ranges to keep (Chromosome, Start, End, [Strand], ...)")
                .required(true),
        )
        .arg(arg!(-b <B> "Delimited table of ranges to intersect with").required(true))
        .arg(
            arg!(-s --strandedness <STRANDEDNESS> "How partitions are paired: unstranded, same or opposite")
                .required(false),
        )
        .arg(
            arg!(--how <HOW> "What counts as a hit: overlap, or containment of A in B")
                .required(false),
        )
        .arg(arg!(--wide "Store coordinates as 64-bit integers").action(clap::ArgAction::SetTrue))
        .arg(
            arg!(-c --config <CONFIG> "TOML file with intersect settings; flags take precedence")
                .required(false),
        )
        .arg(
            arg!(-o --output <OUTPUT> "Output file, .gz for compressed (default: stdout)")
                .required(false),
        )
}
