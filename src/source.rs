//! Raw frame source
//!
//! Reads consecutive planar frames of a fixed format from a byte stream,
//! e.g. a `.yuv` file written by a decoder.

use crate::error::{Error, Result};
use crate::processing::format_layout;
use crate::types::{CropRegion, Frame, FramePlane, VideoInfo};
use std::io::{ErrorKind, Read};

/// Reads frames from a raw planar stream
pub struct RawFrameReader<R> {
    reader: R,
    info: VideoInfo,
    strides: Vec<usize>,
    rows: Vec<usize>,
    crop: Option<CropRegion>,
    frame_duration_us: i64,
    frames_read: u64,
}

impl<R: Read> RawFrameReader<R> {
    /// Create a reader for tightly packed frames
    pub fn new(reader: R, info: VideoInfo) -> Self {
        let strides = info.packed_strides();
        let rows = format_layout(info.format)
            .planes
            .iter()
            .map(|p| p.rows(info.resolution.height))
            .collect();

        Self {
            reader,
            info,
            strides,
            rows,
            crop: None,
            frame_duration_us: 0,
            frames_read: 0,
        }
    }

    /// Use padded rows; one stride per plane
    pub fn with_strides(mut self, strides: Vec<usize>) -> Result<Self> {
        if strides.len() != self.strides.len() {
            return Err(Error::Config(format!(
                "{} has {} planes, got {} strides",
                self.info.format,
                self.strides.len(),
                strides.len()
            )));
        }
        for (index, (given, packed)) in strides.iter().zip(&self.strides).enumerate() {
            if given < packed {
                return Err(Error::Config(format!(
                    "stride {} of plane {} is shorter than its {} byte row",
                    given, index, packed
                )));
            }
        }
        padded_size(&strides, &self.rows).ok_or_else(|| {
            Error::Config(format!("strides {:?} overflow the frame size", strides))
        })?;
        self.strides = strides;
        Ok(self)
    }

    /// Attach a crop region to every frame
    pub fn with_crop(mut self, crop: CropRegion) -> Self {
        self.crop = Some(crop);
        self
    }

    /// Stamp frames with timestamps at `fps`
    pub fn with_fps(mut self, fps: u32) -> Self {
        if fps > 0 {
            self.frame_duration_us = 1_000_000 / fps as i64;
        }
        self
    }

    /// Bytes one frame occupies in the stream
    pub fn frame_size(&self) -> usize {
        padded_size(&self.strides, &self.rows).unwrap_or(usize::MAX)
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Read the next frame; `Ok(None)` at a clean end of stream
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        let size = self.frame_size();
        let mut buf = Vec::new();
        buf.try_reserve_exact(size)
            .map_err(|_| Error::AllocationFailure { size })?;
        buf.resize(size, 0);
        let got = read_full(&mut self.reader, &mut buf)?;
        if got == 0 {
            return Ok(None);
        }
        if got < buf.len() {
            return Err(Error::TruncatedInput {
                expected: buf.len(),
                got,
            });
        }

        let mut planes = Vec::with_capacity(self.strides.len());
        let mut rest = buf.as_slice();
        for (&stride, &rows) in self.strides.iter().zip(&self.rows) {
            let (plane, tail) = rest.split_at(stride * rows);
            planes.push(FramePlane {
                data: plane.to_vec(),
                stride,
            });
            rest = tail;
        }

        let mut frame = Frame::from_planes(
            planes,
            self.info.resolution.width,
            self.info.resolution.height,
            self.info.format,
        )
        .with_pts(self.frames_read as i64 * self.frame_duration_us);
        frame.crop = self.crop;

        self.frames_read += 1;
        Ok(Some(frame))
    }
}

impl<R: Read> Iterator for RawFrameReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

/// Sum of `stride * rows` over all planes, `None` on overflow
fn padded_size(strides: &[usize], rows: &[usize]) -> Option<usize> {
    strides
        .iter()
        .zip(rows)
        .try_fold(0usize, |total, (&stride, &rows)| {
            stride.checked_mul(rows)?.checked_add(total)
        })
}

/// Fill `buf` as far as the stream allows, returning the bytes read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
