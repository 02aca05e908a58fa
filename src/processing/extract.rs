//! Stride-free plane extraction
//!
//! Copies the rows described by a [`FrameLayout`] out of strided plane
//! storage into one contiguous buffer, planes back to back.

use super::layout::FrameLayout;
use crate::error::{Error, Result};
use crate::types::PlaneData;

/// Reusable destination buffer.
///
/// Only reallocated when the required length changes between frames.
#[derive(Debug, Default)]
pub struct ScratchBuffer {
    data: Vec<u8>,
    allocations: u64,
}

impl ScratchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of (re)allocations so far
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a buffer of exactly `size` bytes, reusing the current one if it fits
    fn prepare(&mut self, size: usize) -> Result<&mut [u8]> {
        if self.data.len() != size {
            let mut data = Vec::new();
            data.try_reserve_exact(size)
                .map_err(|_| Error::AllocationFailure { size })?;
            data.resize(size, 0);
            self.data = data;
            self.allocations += 1;
        }
        Ok(&mut self.data)
    }

    /// Drop the allocation
    pub fn release(&mut self) {
        self.data = Vec::new();
    }
}

/// Check every row of every plane can be read without leaving its stride
/// or its backing storage.
fn validate(planes: &[PlaneData<'_>], layout: &FrameLayout) -> Result<()> {
    if planes.len() != layout.planes.len() {
        return Err(Error::GeometryMismatch(format!(
            "{} expects {} planes, frame has {}",
            layout.format,
            layout.planes.len(),
            planes.len()
        )));
    }

    for (index, (src, plane)) in planes.iter().zip(&layout.planes).enumerate() {
        if plane.row_count == 0 {
            continue;
        }
        if plane.src_col_bytes + plane.byte_width > src.stride {
            return Err(Error::GeometryMismatch(format!(
                "plane {}: row of {} bytes at offset {} exceeds stride {}",
                index, plane.byte_width, plane.src_col_bytes, src.stride
            )));
        }
        let last_row = plane.src_row + plane.row_count - 1;
        let end = last_row
            .checked_mul(src.stride)
            .and_then(|start| start.checked_add(plane.src_col_bytes + plane.byte_width))
            .ok_or_else(|| {
                Error::GeometryMismatch(format!(
                    "plane {}: stride {} overflows the address space",
                    index, src.stride
                ))
            })?;
        if end > src.data.len() {
            return Err(Error::GeometryMismatch(format!(
                "plane {}: needs {} bytes, storage has {}",
                index,
                end,
                src.data.len()
            )));
        }
    }

    Ok(())
}

/// Copy the planes of a mapped frame into `scratch`.
///
/// Returns the contiguous extracted bytes, `layout.total_len` long. The
/// frame is validated before `scratch` is touched, so a rejected frame
/// leaves the buffer as it was.
pub fn extract<'s>(
    planes: &[PlaneData<'_>],
    layout: &FrameLayout,
    scratch: &'s mut ScratchBuffer,
) -> Result<&'s [u8]> {
    validate(planes, layout)?;

    let dst = scratch.prepare(layout.total_len)?;

    for (index, (src, plane)) in planes.iter().zip(&layout.planes).enumerate() {
        tracing::debug!(
            "copy plane {}, w:{} h:{} stride:{}",
            index,
            plane.byte_width,
            plane.row_count,
            src.stride
        );

        let dst_plane = &mut dst[plane.range()];
        if plane.byte_width == 0 {
            continue;
        }
        for (row, dst_row) in dst_plane.chunks_exact_mut(plane.byte_width).enumerate() {
            let start = (plane.src_row + row) * src.stride + plane.src_col_bytes;
            dst_row.copy_from_slice(&src.data[start..start + plane.byte_width]);
        }
    }

    Ok(&scratch.data)
}
