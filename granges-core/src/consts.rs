//! Column names shared by ingestion, the store and the row readers that feed it.

pub const CHROMOSOME_COL: &str = "Chromosome";
pub const START_COL: &str = "Start";
pub const END_COL: &str = "End";
pub const STRAND_COL: &str = "Strand";

/// Columns every range table must carry.
pub const REQUIRED_COLS: [&str; 3] = [CHROMOSOME_COL, START_COL, END_COL];

/// Row shape yielded by a BED-line reader.
pub const BED_COLS: [&str; 12] = [
    "Chromosome",
    "Start",
    "End",
    "Name",
    "Score",
    "Strand",
    "ThickStart",
    "ThickEnd",
    "ItemRGB",
    "BlockCount",
    "BlockSizes",
    "BlockStarts",
];

/// Row shape yielded by a GTF/GFF reader, after the attribute column is decomposed.
pub const GTF_COLS: [&str; 12] = [
    "Chromosome",
    "Source",
    "Feature",
    "Start",
    "End",
    "Score",
    "Strand",
    "Frame",
    "GeneID",
    "TranscriptID",
    "ExonNumber",
    "ExonID",
];
