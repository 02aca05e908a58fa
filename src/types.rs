//! Common types used throughout framesum

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Video resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Frame format / pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameFormat {
    /// GRAY8 - single 8-bit luma plane
    Gray8,
    /// NV12 - Y plane + interleaved UV
    Nv12,
    /// NV21 - Y plane + interleaved VU
    Nv21,
    /// I420 - Planar YUV 4:2:0, U before V
    I420,
    /// YV12 - Planar YUV 4:2:0, V before U
    Yv12,
    /// P010 - 10-bit NV12 in 16-bit little-endian containers
    P010,
    /// I420_10LE - 10-bit planar YUV 4:2:0
    I420P10,
}

impl FrameFormat {
    /// Every supported format
    pub const ALL: [FrameFormat; 7] = [
        FrameFormat::Gray8,
        FrameFormat::Nv12,
        FrameFormat::Nv21,
        FrameFormat::I420,
        FrameFormat::Yv12,
        FrameFormat::P010,
        FrameFormat::I420P10,
    ];

    /// Canonical format name
    pub fn name(&self) -> &'static str {
        match self {
            FrameFormat::Gray8 => "GRAY8",
            FrameFormat::Nv12 => "NV12",
            FrameFormat::Nv21 => "NV21",
            FrameFormat::I420 => "I420",
            FrameFormat::Yv12 => "YV12",
            FrameFormat::P010 => "P010_10LE",
            FrameFormat::I420P10 => "I420_10LE",
        }
    }

    /// Number of planes in memory
    pub fn n_planes(&self) -> usize {
        crate::processing::format_layout(*self).planes.len()
    }
}

impl std::fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for FrameFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "GRAY8" | "Y8" => Ok(FrameFormat::Gray8),
            "NV12" => Ok(FrameFormat::Nv12),
            "NV21" => Ok(FrameFormat::Nv21),
            "I420" | "YUV420P" => Ok(FrameFormat::I420),
            "YV12" => Ok(FrameFormat::Yv12),
            "P010" | "P010_10LE" => Ok(FrameFormat::P010),
            "I420_10LE" | "YUV420P10LE" => Ok(FrameFormat::I420P10),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Active sub-rectangle of a frame, in luma samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Crop covering the whole frame
    pub const fn full(resolution: Resolution) -> Self {
        Self::new(0, 0, resolution.width, resolution.height)
    }

    /// Check the crop lies within `resolution`
    pub fn fits(&self, resolution: Resolution) -> bool {
        (self.x as u64 + self.width as u64) <= resolution.width as u64
            && (self.y as u64 + self.height as u64) <= resolution.height as u64
    }
}

impl std::str::FromStr for CropRegion {
    type Err = Error;

    /// Parse `x,y,width,height`
    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Config(format!("Invalid crop '{}': {}", s, e)))?;

        match parts.as_slice() {
            [x, y, w, h] => Ok(CropRegion::new(*x, *y, *w, *h)),
            _ => Err(Error::Config(format!(
                "Invalid crop '{}': expected x,y,width,height",
                s
            ))),
        }
    }
}

/// Negotiated stream format (template for every frame of the session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub format: FrameFormat,
    pub resolution: Resolution,
}

impl VideoInfo {
    pub fn new(format: FrameFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            resolution: Resolution::new(width, height),
        }
    }

    /// Row strides of a tightly packed frame in this format
    pub fn packed_strides(&self) -> Vec<usize> {
        crate::processing::format_layout(self.format)
            .planes
            .iter()
            .map(|p| p.row_bytes(self.resolution.width))
            .collect()
    }
}

/// Read-only view of one mapped plane
#[derive(Debug, Clone, Copy)]
pub struct PlaneData<'a> {
    pub data: &'a [u8],
    /// Bytes between the starts of consecutive rows
    pub stride: usize,
}

/// A frame delivered by the frame source.
///
/// `map` is the only access to pixel memory; sources that cannot expose
/// their storage for reading report [`Error::MapFailure`].
pub trait FrameBuffer {
    fn format(&self) -> FrameFormat;
    fn resolution(&self) -> Resolution;
    fn crop(&self) -> Option<CropRegion>;
    fn map(&self) -> Result<Vec<PlaneData<'_>>>;
}

/// One owned plane of a [`Frame`]
#[derive(Debug, Clone)]
pub struct FramePlane {
    pub data: Vec<u8>,
    pub stride: usize,
}

/// An owned video frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Plane storage, in the format's memory order
    pub planes: Vec<FramePlane>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Pixel format
    pub format: FrameFormat,
    /// Optional active region
    pub crop: Option<CropRegion>,
    /// Presentation timestamp in microseconds
    pub pts: i64,
}

impl Frame {
    /// Create a zeroed, tightly packed frame
    pub fn new(width: u32, height: u32, format: FrameFormat) -> Self {
        let info = VideoInfo::new(format, width, height);
        let planes = crate::processing::format_layout(format)
            .planes
            .iter()
            .zip(info.packed_strides())
            .map(|(spec, stride)| FramePlane {
                data: vec![0u8; stride * spec.rows(height)],
                stride,
            })
            .collect();

        Self {
            planes,
            width,
            height,
            format,
            crop: None,
            pts: 0,
        }
    }

    /// Create a frame from existing planes
    pub fn from_planes(planes: Vec<FramePlane>, width: u32, height: u32, format: FrameFormat) -> Self {
        Self {
            planes,
            width,
            height,
            format,
            crop: None,
            pts: 0,
        }
    }

    pub fn with_crop(mut self, crop: CropRegion) -> Self {
        self.crop = Some(crop);
        self
    }

    pub fn with_pts(mut self, pts: i64) -> Self {
        self.pts = pts;
        self
    }

    /// Fill every byte of plane `index` with `value`
    pub fn fill_plane(&mut self, index: usize, value: u8) {
        if let Some(plane) = self.planes.get_mut(index) {
            plane.data.fill(value);
        }
    }

    /// Calculate storage size in bytes (including stride padding)
    pub fn size_bytes(&self) -> usize {
        self.planes.iter().map(|p| p.data.len()).sum()
    }
}

impl FrameBuffer for Frame {
    fn format(&self) -> FrameFormat {
        self.format
    }

    fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    fn crop(&self) -> Option<CropRegion> {
        self.crop
    }

    fn map(&self) -> Result<Vec<PlaneData<'_>>> {
        Ok(self
            .planes
            .iter()
            .map(|p| PlaneData {
                data: &p.data,
                stride: p.stride,
            })
            .collect())
    }
}

/// Statistics for monitoring
#[derive(Debug, Clone, Default)]
pub struct SinkStats {
    /// Frames checksummed
    pub frames_rendered: u64,
    /// Frames rejected with a frame-local error
    pub frames_rejected: u64,
    /// Total bytes extracted from frames
    pub bytes_extracted: u64,
    /// Total bytes written to the raw file
    pub bytes_written: u64,
    /// Times the scratch buffer was (re)allocated
    pub scratch_allocations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names_round_trip() {
        for format in FrameFormat::ALL {
            let parsed: FrameFormat = format.name().parse().unwrap();
            assert_eq!(parsed, format);
        }
        assert_eq!("nv12".parse::<FrameFormat>().unwrap(), FrameFormat::Nv12);
        assert!(matches!(
            "RGBA".parse::<FrameFormat>(),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_crop_parse_and_bounds() {
        let crop: CropRegion = "2, 2, 4, 4".parse().unwrap();
        assert_eq!(crop, CropRegion::new(2, 2, 4, 4));
        assert!(crop.fits(Resolution::new(6, 6)));
        assert!(!crop.fits(Resolution::new(5, 6)));
        assert!("1,2,3".parse::<CropRegion>().is_err());
        assert!("a,b,c,d".parse::<CropRegion>().is_err());
    }

    #[test]
    fn test_new_frame_plane_sizes() {
        let frame = Frame::new(5, 3, FrameFormat::I420);
        assert_eq!(frame.planes.len(), 3);
        assert_eq!(frame.planes[0].data.len(), 15);
        assert_eq!(frame.planes[1].data.len(), 6);
        assert_eq!(frame.planes[2].stride, 3);

        let p010 = Frame::new(4, 2, FrameFormat::P010);
        assert_eq!(p010.planes[0].stride, 8);
        assert_eq!(p010.planes[1].stride, 8);
        assert_eq!(p010.size_bytes(), 16 + 8);
    }
}
