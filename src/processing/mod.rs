//! Frame processing module
//!
//! - Plane geometry resolution (format table, chroma rounding, crop)
//! - Stride-free plane extraction into a reusable scratch buffer

pub mod extract;
pub mod layout;

pub use extract::{extract, ScratchBuffer};
pub use layout::{format_layout, resolve, Component, FormatLayout, FrameLayout, PlaneLayout, PlaneSpec};

use crate::error::Result;
use crate::types::FrameBuffer;

/// Resolve, map and extract a frame in one step
pub fn process_frame<'s, F: FrameBuffer + ?Sized>(
    frame: &F,
    scratch: &'s mut ScratchBuffer,
) -> Result<(FrameLayout, &'s [u8])> {
    let layout = resolve(frame.format(), frame.resolution(), frame.crop())?;
    let planes = frame.map()?;
    let data = extract(&planes, &layout, scratch)?;
    Ok((layout, data))
}
