//! Plane geometry
//!
//! Every supported format is described by a static [`FormatLayout`] row:
//! plane order, chroma subsampling, interleaving and sample size. All
//! per-frame geometry is derived from that table.

use crate::error::{Error, Result};
use crate::types::{CropRegion, FrameFormat, Resolution};

/// Colour component(s) stored in a plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Y,
    U,
    V,
    /// Interleaved U then V
    Uv,
    /// Interleaved V then U
    Vu,
}

/// Static description of one plane of a format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneSpec {
    pub component: Component,
    /// Horizontal subsampling as a power of two (1 = half width)
    pub x_shift: u8,
    /// Vertical subsampling as a power of two (1 = half height)
    pub y_shift: u8,
    /// Components interleaved per sample position
    pub interleave: u8,
    pub bytes_per_sample: u8,
}

impl PlaneSpec {
    const fn new(component: Component, shift: u8, interleave: u8, bytes_per_sample: u8) -> Self {
        Self {
            component,
            x_shift: shift,
            y_shift: shift,
            interleave,
            bytes_per_sample,
        }
    }

    /// Sample columns for a luma width (odd sizes round up)
    pub fn width(&self, luma_width: u32) -> usize {
        subsample(luma_width, self.x_shift)
    }

    /// Rows for a luma height (odd sizes round up)
    pub fn rows(&self, luma_height: u32) -> usize {
        subsample(luma_height, self.y_shift)
    }

    /// Bytes per sample position, all interleaved components included
    pub fn pixel_stride(&self) -> usize {
        self.interleave as usize * self.bytes_per_sample as usize
    }

    /// Tightly packed row length in bytes
    pub fn row_bytes(&self, luma_width: u32) -> usize {
        self.width(luma_width) * self.pixel_stride()
    }
}

/// `ceil(value / 2^shift)`; for 4:2:0 this is `(v + v % 2) / 2`
fn subsample(value: u32, shift: u8) -> usize {
    let value = value as usize;
    let div = 1usize << shift;
    value.div_ceil(div)
}

/// Table row for one format
#[derive(Debug, Clone, Copy)]
pub struct FormatLayout {
    pub format: FrameFormat,
    pub planes: &'static [PlaneSpec],
}

const Y8: PlaneSpec = PlaneSpec::new(Component::Y, 0, 1, 1);
const Y16: PlaneSpec = PlaneSpec::new(Component::Y, 0, 1, 2);

// Indexed by `FrameFormat as usize`
static FORMATS: [FormatLayout; 7] = [
    FormatLayout {
        format: FrameFormat::Gray8,
        planes: &[Y8],
    },
    FormatLayout {
        format: FrameFormat::Nv12,
        planes: &[Y8, PlaneSpec::new(Component::Uv, 1, 2, 1)],
    },
    FormatLayout {
        format: FrameFormat::Nv21,
        planes: &[Y8, PlaneSpec::new(Component::Vu, 1, 2, 1)],
    },
    FormatLayout {
        format: FrameFormat::I420,
        planes: &[
            Y8,
            PlaneSpec::new(Component::U, 1, 1, 1),
            PlaneSpec::new(Component::V, 1, 1, 1),
        ],
    },
    FormatLayout {
        format: FrameFormat::Yv12,
        planes: &[
            Y8,
            PlaneSpec::new(Component::V, 1, 1, 1),
            PlaneSpec::new(Component::U, 1, 1, 1),
        ],
    },
    FormatLayout {
        format: FrameFormat::P010,
        planes: &[Y16, PlaneSpec::new(Component::Uv, 1, 2, 2)],
    },
    FormatLayout {
        format: FrameFormat::I420P10,
        planes: &[
            Y16,
            PlaneSpec::new(Component::U, 1, 1, 2),
            PlaneSpec::new(Component::V, 1, 1, 2),
        ],
    },
];

/// Look up the table row for `format`
pub fn format_layout(format: FrameFormat) -> &'static FormatLayout {
    &FORMATS[format as usize]
}

/// Geometry of one plane within a frame and within the extracted buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    pub component: Component,
    /// Bytes copied per row
    pub byte_width: usize,
    /// Rows copied
    pub row_count: usize,
    /// First source row (crop origin)
    pub src_row: usize,
    /// Byte offset of the first copied byte inside a source row
    pub src_col_bytes: usize,
    /// Offset of this plane in the extracted buffer
    pub offset: usize,
    /// Length of this plane in the extracted buffer
    pub length: usize,
}

impl PlaneLayout {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// Resolved geometry of a whole frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    pub format: FrameFormat,
    pub planes: Vec<PlaneLayout>,
    /// Sum of all plane lengths
    pub total_len: usize,
}

impl FrameLayout {
    /// Slice plane `index` out of an extracted buffer
    pub fn plane<'a>(&self, extracted: &'a [u8], index: usize) -> Option<&'a [u8]> {
        self.planes
            .get(index)
            .and_then(|p| extracted.get(p.range()))
    }
}

/// Compute the per-plane geometry of a frame.
///
/// Without a crop the whole frame is used. Chroma dimensions of
/// subsampled planes round up for odd luma sizes.
pub fn resolve(
    format: FrameFormat,
    resolution: Resolution,
    crop: Option<CropRegion>,
) -> Result<FrameLayout> {
    if resolution.width == 0 || resolution.height == 0 {
        return Err(Error::InvalidGeometry(format!(
            "frame dimensions must be non-zero, got {}",
            resolution
        )));
    }

    let crop = match crop {
        Some(crop) => {
            if !crop.fits(resolution) {
                return Err(Error::InvalidGeometry(format!(
                    "crop {}x{}+{}+{} exceeds frame {}",
                    crop.width, crop.height, crop.x, crop.y, resolution
                )));
            }
            if crop.width == 0 || crop.height == 0 {
                return Err(Error::InvalidGeometry(format!(
                    "empty crop region {}x{}",
                    crop.width, crop.height
                )));
            }
            crop
        }
        None => CropRegion::full(resolution),
    };

    let specs = format_layout(format).planes;
    let mut planes = Vec::with_capacity(specs.len());
    let mut offset = 0;

    for spec in specs {
        let byte_width = spec.row_bytes(crop.width);
        let row_count = spec.rows(crop.height);
        let length = byte_width * row_count;

        planes.push(PlaneLayout {
            component: spec.component,
            byte_width,
            row_count,
            src_row: (crop.y >> spec.y_shift) as usize,
            src_col_bytes: (crop.x >> spec.x_shift) as usize * spec.pixel_stride(),
            offset,
            length,
        });
        offset += length;
    }

    Ok(FrameLayout {
        format,
        planes,
        total_len: offset,
    })
}
