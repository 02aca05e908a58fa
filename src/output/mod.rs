//! Output module
//!
//! - Raw frame dump file (also the source of the whole-file checksum)
//! - Per-frame and per-session reports

mod raw;

pub use raw::{write_fully, RawFileOutput};

use std::path::PathBuf;

/// Digests produced for one frame, in emission order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// One digest per plane, in plane order (empty unless plane checksums are on)
    pub plane_checksums: Vec<String>,
    /// Digest of the whole extracted frame
    pub frame_checksum: Option<String>,
}

impl FrameReport {
    pub fn is_empty(&self) -> bool {
        self.plane_checksums.is_empty() && self.frame_checksum.is_none()
    }

    /// All digests in emission order: planes first, then the frame
    pub fn digests(&self) -> impl Iterator<Item = &str> {
        self.plane_checksums
            .iter()
            .map(String::as_str)
            .chain(self.frame_checksum.as_deref())
    }
}

impl std::fmt::Display for FrameReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.plane_checksums.is_empty() {
            writeln!(f, "{}", self.plane_checksums.join("  "))?;
        }
        if let Some(csum) = &self.frame_checksum {
            writeln!(f, "FrameChecksum {}", csum)?;
        }
        Ok(())
    }
}

/// Result of a finished session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Frames checksummed
    pub frames: u64,
    /// Frames rejected
    pub rejected: u64,
    /// MD5 of the raw file, when requested
    pub file_checksum: Option<String>,
    /// Location of the retained raw file
    pub raw_path: Option<PathBuf>,
}
