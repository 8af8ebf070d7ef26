// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Texture transform engine
//!
//! The RDP addresses a tile through a power-of-two mask per axis and then
//! wraps, mirrors or clamps coordinates that fall outside it. A fixed-function
//! GPU samples a plain rectangle instead, so the padding region of every
//! texture allocation is filled in memory with the texels the RDP would have
//! produced for those coordinates.
//!
//! # Layout
//!
//! Buffers are row-major byte slices. Rows are `real_width` texels apart and
//! every texel is `TexelSize::bytes()` wide. The natively addressed block sits
//! in the top-left corner: columns `[0, 1 << mask_s)` and rows
//! `[0, 1 << mask_t)`.
//!
//! # No-op contract
//!
//! Every routine returns immediately when the mask is 0, when the addressed
//! block already covers the requested size, when the fill count is zero, or
//! when the buffer is too short for the described layout. None of these cases
//! is an error; `validate_addressing` exists for callers that want them
//! reported.

mod clamp;
pub mod decode;
mod mirror;
mod wrap;

#[cfg(test)]
mod tests;

pub use clamp::{clamp_16b_s, clamp_16b_t, clamp_s, clamp_t};
pub use decode::{BitDepth, DecodeParams, DecodeTable, Decoder, Palette, PixelFormat, TextureFormat};
pub use mirror::{mirror_16b_s, mirror_16b_t, mirror_s, mirror_t};
pub use wrap::{wrap_16b_s, wrap_16b_t, wrap_s, wrap_t};

use serde::{Deserialize, Serialize};

use super::config::HardwareCaps;
use super::error::TextureError;

/// Largest mask exponent the RDP tile descriptor can express
pub const MAX_MASK: u32 = 10;

/// Size of one decoded texel in the destination buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TexelSize {
    /// 8-bit texels (intensity, IA44)
    Bits8,
    /// 16-bit texels (ARGB1555, ARGB4444, AI88)
    Bits16,
    /// 32-bit texels (ARGB8888)
    Bits32,
}

impl TexelSize {
    /// Bytes per texel
    #[inline(always)]
    pub fn bytes(self) -> usize {
        match self {
            TexelSize::Bits8 => 1,
            TexelSize::Bits16 => 2,
            TexelSize::Bits32 => 4,
        }
    }
}

/// Per-axis addressing mode from the tile descriptor `cm` bits
///
/// ```text
/// bit 0: mirror (G_TX_MIRROR)
/// bit 1: clamp  (G_TX_CLAMP)
/// ```
///
/// Mirror and clamp combine: the axis mirrors inside the clamp boundary and
/// clamps beyond it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisMode {
    pub mirror: bool,
    pub clamp: bool,
}

impl AxisMode {
    /// Plain wrap
    pub const WRAP: Self = Self {
        mirror: false,
        clamp: false,
    };

    /// Mirrored repeat
    pub const MIRROR: Self = Self {
        mirror: true,
        clamp: false,
    };

    /// Clamp to the edge texel
    pub const CLAMP: Self = Self {
        mirror: false,
        clamp: true,
    };

    /// Decode the two `cm` bits of a tile descriptor
    pub fn from_cm(cm: u8) -> Self {
        Self {
            mirror: cm & 1 != 0,
            clamp: cm & 2 != 0,
        }
    }
}

/// Addressing for one axis of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisAddressing {
    /// Wrap/mirror/clamp selection
    pub mode: AxisMode,

    /// Mask exponent (0 disables wrapping and mirroring)
    pub mask: u32,

    /// Texels actually loaded along this axis (the tile size)
    pub size: u32,
}

/// Full description of a loaded texture and how it is addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureLayout {
    /// Destination texel size
    pub texel: TexelSize,

    /// Allocated width in texels (row stride)
    pub real_width: u32,

    /// Allocated height in rows
    pub real_height: u32,

    /// Horizontal addressing
    pub s: AxisAddressing,

    /// Vertical addressing
    pub t: AxisAddressing,
}

impl TextureLayout {
    /// Bytes covered by the full allocation
    pub fn byte_len(&self) -> usize {
        self.real_width as usize * self.real_height as usize * self.texel.bytes()
    }
}

/// Axes the caller must configure for hardware mirroring
///
/// Returned by `apply_addressing` when the texture unit mirrors by itself and
/// the in-memory expansion was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HardwareMirror {
    pub s: bool,
    pub t: bool,
}

/// Check a layout for combinations the transform routines would silently skip
///
/// # Errors
///
/// Returns the first malformed parameter found: a mask above `MAX_MASK`, an
/// allocation that is not a power of two, a tile larger than its allocation,
/// or a buffer shorter than the allocation.
pub fn validate_addressing(buf_len: usize, layout: &TextureLayout) -> Result<(), TextureError> {
    for axis in [&layout.s, &layout.t] {
        if axis.mask > MAX_MASK {
            return Err(TextureError::InvalidMask { mask: axis.mask });
        }
    }

    for dim in [layout.real_width, layout.real_height] {
        if !dim.is_power_of_two() {
            return Err(TextureError::NotPowerOfTwo { addressed: dim });
        }
    }

    if layout.s.size > layout.real_width {
        return Err(TextureError::RowOverflow {
            requested: layout.s.size,
            real_width: layout.real_width,
        });
    }

    let expected = layout.byte_len();
    if buf_len < expected {
        return Err(TextureError::BufferTooSmall {
            expected,
            got: buf_len,
        });
    }

    Ok(())
}

/// Expand the loaded tile to fill its whole allocation
///
/// Applies the S axis first (on the loaded rows only) and then the T axis
/// (copying whole, already expanded rows). On each axis wrap or mirror runs
/// up to the clamp boundary, then clamp fills the rest.
///
/// # Arguments
///
/// * `tex` - Texture buffer holding the loaded tile in its top-left corner
/// * `layout` - Allocation size and per-axis addressing
/// * `caps` - Hardware capabilities (only `TEXTURE_MIRROR` is consulted)
///
/// # Returns
///
/// The axes left to the hardware mirror unit
pub fn apply_addressing(tex: &mut [u8], layout: &TextureLayout, caps: HardwareCaps) -> HardwareMirror {
    let size = layout.texel;
    let s = layout.s;
    let t = layout.t;
    let rows = t.size.min(layout.real_height);
    let mut hw = HardwareMirror::default();

    log::trace!(
        "Addressing {}x{} tile in {}x{}: s=({:?}, mask {}) t=({:?}, mask {})",
        s.size,
        t.size,
        layout.real_width,
        layout.real_height,
        s.mode,
        s.mask,
        t.mode,
        t.mask
    );

    // A mask of 0 disables wrapping, so the axis always clamps
    let s_clamp = s.mode.clamp || s.mask == 0;
    let t_clamp = t.mode.clamp || t.mask == 0;

    // S axis
    let s_limit = if s_clamp {
        s.size.min(layout.real_width)
    } else {
        layout.real_width
    };
    if s.mode.mirror {
        if hardware_mirrors(caps, s.mask, layout.real_width) {
            hw.s = true;
        } else {
            mirror_s(tex, size, s.mask, s_limit, layout.real_width, rows);
        }
    } else {
        wrap_s(tex, size, s.mask, s_limit, layout.real_width, rows);
    }
    if s_clamp {
        clamp_s(tex, size, s.size, layout.real_width, layout.real_width, rows);
    }

    // T axis
    let t_limit = if t_clamp {
        t.size.min(layout.real_height)
    } else {
        layout.real_height
    };
    if t.mode.mirror {
        if hardware_mirrors(caps, t.mask, layout.real_height) {
            hw.t = true;
        } else {
            mirror_t(tex, size, t.mask, t_limit, layout.real_width);
        }
    } else {
        wrap_t(tex, size, t.mask, t_limit, layout.real_width);
    }
    if t_clamp {
        clamp_t(tex, size, t.size, layout.real_width, layout.real_height);
    }

    hw
}

/// Hardware mirroring repeats the whole allocation, so it only reproduces RDP
/// mirroring when the allocation is exactly one block.
fn hardware_mirrors(caps: HardwareCaps, mask: u32, real: u32) -> bool {
    caps.contains(HardwareCaps::TEXTURE_MIRROR) && mask != 0 && mask <= MAX_MASK && 1u32 << mask == real
}

/// Byte length a row-major layout needs for `rows` rows of `real_width` texels
#[inline(always)]
pub(crate) fn required_len(size: TexelSize, real_width: u32, rows: u32) -> usize {
    real_width as usize * rows as usize * size.bytes()
}
