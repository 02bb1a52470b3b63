use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::utils::natural_cmp;

///
/// Orientation of a feature. Only `+` and `-` are meaningful strands;
/// anything else (typically `.`) means the row is unstranded.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strand {
    #[cfg_attr(feature = "serde", serde(rename = "+"))]
    Forward,
    #[cfg_attr(feature = "serde", serde(rename = "-"))]
    Reverse,
}

impl Strand {
    pub fn symbol(&self) -> &'static str {
        match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
        }
    }

    pub fn opposite(&self) -> Strand {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }

    /// Parse a strand symbol, returning `None` for anything but `+` or `-`.
    pub fn from_symbol(s: &str) -> Option<Strand> {
        match s {
            "+" => Some(Strand::Forward),
            "-" => Some(Strand::Reverse),
            _ => None,
        }
    }

    pub fn is_valid_symbol(s: &str) -> bool {
        Strand::from_symbol(s).is_some()
    }
}

impl FromStr for Strand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strand::from_symbol(s).ok_or_else(|| format!("Invalid strand symbol: '{}'", s))
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Which key shape a store partitions on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyKind {
    #[default]
    Chrom,
    ChromStrand,
}

///
/// Key of one partition of a [`RangeStore`](crate::models::RangeStore).
///
/// Keys order naturally by chromosome (`chr2` before `chr10`); within one
/// chromosome a bare key sorts before strand keys and `+` before `-`.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartitionKey {
    Chrom(String),
    ChromStrand(String, Strand),
}

impl PartitionKey {
    pub fn chrom<S: Into<String>>(name: S) -> Self {
        PartitionKey::Chrom(name.into())
    }

    pub fn stranded<S: Into<String>>(name: S, strand: Strand) -> Self {
        PartitionKey::ChromStrand(name.into(), strand)
    }

    pub fn chromosome(&self) -> &str {
        match self {
            PartitionKey::Chrom(c) | PartitionKey::ChromStrand(c, _) => c,
        }
    }

    pub fn strand(&self) -> Option<Strand> {
        match self {
            PartitionKey::Chrom(_) => None,
            PartitionKey::ChromStrand(_, s) => Some(*s),
        }
    }

    pub fn kind(&self) -> KeyKind {
        match self {
            PartitionKey::Chrom(_) => KeyKind::Chrom,
            PartitionKey::ChromStrand(..) => KeyKind::ChromStrand,
        }
    }

    /// Drop the strand component of the key.
    pub fn to_chrom(&self) -> PartitionKey {
        PartitionKey::Chrom(self.chromosome().to_string())
    }
}

impl Ord for PartitionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(self.chromosome(), other.chromosome()).then_with(|| {
            match (self.strand(), other.strand()) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(&b),
            }
        })
    }
}

impl PartialOrd for PartitionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionKey::Chrom(c) => write!(f, "{}", c),
            PartitionKey::ChromStrand(c, s) => write!(f, "{}\t{}", c, s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::collections::BTreeMap;

    #[rstest]
    #[case("+", Some(Strand::Forward))]
    #[case("-", Some(Strand::Reverse))]
    #[case(".", None)]
    #[case("", None)]
    fn test_strand_from_symbol(#[case] symbol: &str, #[case] expected: Option<Strand>) {
        assert_eq!(Strand::from_symbol(symbol), expected);
    }

    #[rstest]
    fn test_key_ordering_is_natural() {
        let mut map = BTreeMap::new();
        map.insert(PartitionKey::stranded("chr10", Strand::Forward), ());
        map.insert(PartitionKey::stranded("chr2", Strand::Reverse), ());
        map.insert(PartitionKey::stranded("chr2", Strand::Forward), ());
        map.insert(PartitionKey::stranded("chr1", Strand::Reverse), ());

        let keys: Vec<String> = map.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["chr1\t-", "chr2\t+", "chr2\t-", "chr10\t+"]);
    }

    #[rstest]
    fn test_key_accessors() {
        let key = PartitionKey::stranded("chr3", Strand::Reverse);
        assert_eq!(key.chromosome(), "chr3");
        assert_eq!(key.strand(), Some(Strand::Reverse));
        assert_eq!(key.kind(), KeyKind::ChromStrand);
        assert_eq!(key.to_chrom(), PartitionKey::chrom("chr3"));
    }
}
