//! Session configuration for framesum

use crate::checksum::ChecksumAlgorithm;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Checksum session configuration
///
/// Set before the session starts and read-only afterwards. Field names
/// in TOML files are kebab-case (`frame-checksum`, `dump-location`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SessionConfig {
    /// Algorithm for frame and plane checksums
    pub hash: ChecksumAlgorithm,
    /// Emit a checksum per frame
    pub frame_checksum: bool,
    /// Emit a checksum per plane
    pub plane_checksum: bool,
    /// Emit an MD5 of the whole raw stream at session end
    pub file_checksum: bool,
    /// Keep the raw stream on disk
    pub dump_output: bool,
    /// Raw stream path (None = temporary file)
    pub dump_location: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            hash: ChecksumAlgorithm::Md5,
            frame_checksum: true,
            plane_checksum: false,
            file_checksum: false,
            dump_output: false,
            dump_location: None,
        }
    }
}

impl SessionConfig {
    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn with_hash(mut self, hash: ChecksumAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    pub fn with_frame_checksum(mut self, enabled: bool) -> Self {
        self.frame_checksum = enabled;
        self
    }

    pub fn with_plane_checksum(mut self, enabled: bool) -> Self {
        self.plane_checksum = enabled;
        self
    }

    pub fn with_file_checksum(mut self, enabled: bool) -> Self {
        self.file_checksum = enabled;
        self
    }

    pub fn with_dump_output(mut self, enabled: bool) -> Self {
        self.dump_output = enabled;
        self
    }

    pub fn with_dump_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.dump_location = Some(path.into());
        self
    }

    /// Does the session need a raw file at all?
    pub fn needs_raw_file(&self) -> bool {
        self.file_checksum || self.dump_output
    }
}
