use std::ffi::OsStr;
use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use granges_core::StoreOptions;
use granges_overlaprs::{OverlapHow, Strandedness};

///
/// Settings for `granges intersect`, read from a TOML file. Every field is
/// optional; command-line flags take precedence over the file.
///
#[derive(Deserialize, Serialize, Debug, PartialEq, Default)]
pub struct IntersectConfig {
    #[serde(default)]
    pub strandedness: Strandedness,
    #[serde(default)]
    pub how: OverlapHow,
    #[serde(default)]
    pub use_64bit_coordinates: bool,
}

impl IntersectConfig {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::new(self.use_64bit_coordinates)
    }
}

#[derive(Error, Debug)]
pub enum IntersectConfigError {
    #[error("Missing or invalid file extension in intersect config file. It must be `toml`")]
    InvalidFileType,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type IntersectConfigResult<T> = std::result::Result<T, IntersectConfigError>;

impl TryFrom<&Path> for IntersectConfig {
    type Error = IntersectConfigError;

    fn try_from(path: &Path) -> IntersectConfigResult<Self> {
        if path.extension().and_then(OsStr::to_str) != Some("toml") {
            return Err(IntersectConfigError::InvalidFileType);
        }
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}
