use thiserror::Error;

#[derive(Error, Debug)]
pub enum RangesError {
    #[error("Column arrays must be of equal length, but are {}", join_lengths(.0))]
    LengthMismatch(Vec<usize>),

    #[error("Object is already a partitioned range store")]
    AlreadyPartitioned,

    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Invalid interval {chrom}:{start}-{end}: start must satisfy 0 <= start <= end")]
    InvalidInterval { chrom: String, start: i64, end: i64 },

    #[error("Coordinate {0} does not fit into a 32-bit store; use 64-bit coordinates")]
    CoordinateOverflow(i64),

    #[error("Error parsing line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RangesError>;

fn join_lengths(lengths: &[usize]) -> String {
    lengths
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl RangesError {
    pub(crate) fn schema<S: Into<String>>(msg: S) -> Self {
        RangesError::SchemaViolation(msg.into())
    }
}
