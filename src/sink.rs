//! Checksum sink
//!
//! Drives a session: start → negotiate format → render frames → stop.
//! Each frame is resolved, extracted, checksummed and optionally appended
//! to the raw file, strictly one at a time in arrival order.

use crate::checksum;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::output::{FrameReport, RawFileOutput, SessionSummary};
use crate::processing::{self, ScratchBuffer};
use crate::types::{FrameBuffer, FrameFormat, SinkStats, VideoInfo};
use std::path::Path;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// Created, not started
    Idle,
    /// Started, no format yet
    Started,
    /// Format known, no frame yet
    Negotiated,
    /// At least one frame rendered
    Processing,
    /// Finished; a new session needs a new sink
    Stopped,
    /// A session-fatal error occurred; only `stop` is accepted
    Failed,
}

/// Frame checksum sink
#[derive(Debug)]
pub struct ChecksumSink {
    config: SessionConfig,
    state: SinkState,
    info: Option<VideoInfo>,
    scratch: ScratchBuffer,
    raw: Option<RawFileOutput>,
    stats: SinkStats,
}

impl ChecksumSink {
    /// Create a new sink
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SinkState::Idle,
            info: None,
            scratch: ScratchBuffer::new(),
            raw: None,
            stats: SinkStats::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SinkState {
        self.state
    }

    /// Negotiated format, if any
    pub fn video_info(&self) -> Option<VideoInfo> {
        self.info
    }

    /// Path of the raw file, once created
    pub fn raw_path(&self) -> Option<&Path> {
        self.raw.as_ref().and_then(|r| r.path())
    }

    pub fn stats(&self) -> SinkStats {
        SinkStats {
            scratch_allocations: self.scratch.allocations(),
            bytes_written: self.raw.as_ref().map_or(0, |r| r.bytes_written()),
            ..self.stats.clone()
        }
    }

    /// Start the session, opening the raw file when one is needed
    pub fn start(&mut self) -> Result<()> {
        if self.state != SinkState::Idle {
            return Err(Error::InvalidState(format!(
                "cannot start from {:?}",
                self.state
            )));
        }

        if self.config.needs_raw_file() {
            let mut raw = RawFileOutput::new(
                self.config.dump_location.clone(),
                self.config.dump_output,
            );
            raw.ensure_open()?;
            self.raw = Some(raw);
        } else if self.config.dump_location.is_some() {
            tracing::warn!("dump-location set without dump-output or file-checksum, ignoring");
        }

        self.state = SinkState::Started;
        tracing::info!(
            "Checksum sink started (hash: {}, frame: {}, plane: {}, file: {}, dump: {})",
            self.config.hash,
            self.config.frame_checksum,
            self.config.plane_checksum,
            self.config.file_checksum,
            self.config.dump_output
        );
        Ok(())
    }

    /// Accept the stream format
    pub fn set_format(&mut self, info: VideoInfo) -> Result<()> {
        match self.state {
            SinkState::Started | SinkState::Negotiated | SinkState::Processing => {}
            state => {
                return Err(Error::InvalidState(format!(
                    "cannot negotiate from {:?}",
                    state
                )))
            }
        }

        processing::resolve(info.format, info.resolution, None)?;

        if let Some(previous) = self.info.filter(|p| *p != info) {
            tracing::info!(
                "Format changed: {} {} -> {} {}",
                previous.format,
                previous.resolution,
                info.format,
                info.resolution
            );
        } else {
            tracing::debug!("Format negotiated: {} {}", info.format, info.resolution);
        }

        self.info = Some(info);
        if self.state == SinkState::Started {
            self.state = SinkState::Negotiated;
        }
        Ok(())
    }

    /// Accept the stream format by name
    pub fn set_caps(&mut self, format: &str, width: u32, height: u32) -> Result<()> {
        let format: FrameFormat = format.parse()?;
        self.set_format(VideoInfo::new(format, width, height))
    }

    /// Checksum one frame.
    ///
    /// Frame-local errors reject the frame and keep the session alive.
    /// Session-fatal errors move the sink to [`SinkState::Failed`].
    pub fn render<F: FrameBuffer + ?Sized>(&mut self, frame: &F) -> Result<FrameReport> {
        let info = match (self.state, self.info) {
            (SinkState::Negotiated | SinkState::Processing, Some(info)) => info,
            (state, _) => {
                return Err(Error::InvalidState(format!("cannot render in {:?}", state)))
            }
        };

        match self.render_frame(info, frame) {
            Ok(report) => {
                self.state = SinkState::Processing;
                self.stats.frames_rendered += 1;
                Ok(report)
            }
            Err(e) if e.is_session_fatal() => {
                tracing::error!("Checksum sink failed: {}", e);
                self.state = SinkState::Failed;
                self.scratch.release();
                Err(e)
            }
            Err(e) => {
                tracing::warn!("Rejected frame {}: {}", self.stats.frames_rendered, e);
                self.stats.frames_rejected += 1;
                Err(e)
            }
        }
    }

    fn render_frame<F: FrameBuffer + ?Sized>(
        &mut self,
        info: VideoInfo,
        frame: &F,
    ) -> Result<FrameReport> {
        if frame.format() != info.format || frame.resolution() != info.resolution {
            return Err(Error::GeometryMismatch(format!(
                "frame is {} {}, negotiated {} {}",
                frame.format(),
                frame.resolution(),
                info.format,
                info.resolution
            )));
        }

        let (layout, data) = processing::process_frame(frame, &mut self.scratch)?;
        let hash = self.config.hash;

        let mut report = FrameReport::default();
        if self.config.plane_checksum {
            report.plane_checksums = layout
                .planes
                .iter()
                .map(|plane| checksum::digest(hash, &data[plane.range()]))
                .collect();
        }
        if self.config.frame_checksum {
            report.frame_checksum = Some(checksum::digest(hash, data));
        }

        if let Some(raw) = self.raw.as_mut() {
            raw.append(data)?;
        }

        self.stats.bytes_extracted += data.len() as u64;
        Ok(report)
    }

    /// Stop the session.
    ///
    /// Releases the scratch buffer, closes the raw file, computes the
    /// whole-file checksum when requested and deletes the raw file unless
    /// dump output was asked for. Runs on every state except `Idle` and
    /// `Stopped`; after a failure no whole-file checksum is produced.
    pub fn stop(&mut self) -> Result<SessionSummary> {
        match self.state {
            SinkState::Idle | SinkState::Stopped => {
                return Err(Error::InvalidState(format!("cannot stop from {:?}", self.state)))
            }
            _ => {}
        }

        let failed = self.state == SinkState::Failed;
        self.state = SinkState::Stopped;
        self.scratch.release();

        let mut summary = SessionSummary {
            frames: self.stats.frames_rendered,
            rejected: self.stats.frames_rejected,
            ..Default::default()
        };

        if let Some(raw) = self.raw.as_mut() {
            if failed && self.config.file_checksum {
                tracing::warn!("Session failed, skipping file checksum");
            }
            let path = raw.path().map(Path::to_path_buf);
            let finished = raw.finish(self.config.file_checksum && !failed);
            if self.config.dump_output {
                summary.raw_path = path;
            }
            summary.file_checksum = finished?;
        }

        tracing::info!(
            "Checksum sink stopped ({} frames, {} rejected)",
            summary.frames,
            summary.rejected
        );
        Ok(summary)
    }
}
