//! framesum - video frame integrity checking
//!
//! Validates decoder and filter output by checksumming raw planar frames.
//!
//! # Features
//!
//! - **Geometry**: per-format plane layout with 4:2:0 chroma rounding and crop
//! - **Extraction**: stride-free copy of every plane into a reusable buffer
//! - **Checksums**: MD5, SHA-1, SHA-256, SHA-512 per frame and per plane
//! - **Raw dump**: flat `.yuv` output and a whole-file MD5 read back from disk
//!
//! # Example
//!
//! ```rust
//! use framesum::{ChecksumSink, Frame, FrameFormat, SessionConfig, VideoInfo};
//!
//! fn main() -> framesum::Result<()> {
//!     let config = SessionConfig::default().with_plane_checksum(true);
//!     let mut sink = ChecksumSink::new(config);
//!     sink.start()?;
//!     sink.set_format(VideoInfo::new(FrameFormat::I420, 4, 4))?;
//!
//!     let report = sink.render(&Frame::new(4, 4, FrameFormat::I420))?;
//!     print!("{}", report);
//!
//!     sink.stop()?;
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod config;
pub mod error;
pub mod output;
pub mod processing;
pub mod sink;
pub mod source;
pub mod types;

// Re-exports for convenience
pub use checksum::{ChecksumAlgorithm, ChecksumStream};
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use output::{FrameReport, SessionSummary};
pub use processing::{FrameLayout, PlaneLayout, ScratchBuffer};
pub use sink::{ChecksumSink, SinkState};
pub use source::RawFrameReader;
pub use types::{CropRegion, Frame, FrameBuffer, FrameFormat, PlaneData, Resolution, SinkStats, VideoInfo};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
