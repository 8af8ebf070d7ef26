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

//! Plain wrap (modulo repeat)
//!
//! Every padding position copies `position & (block - 1)` from the base
//! block. The fill only reads the base block, so applying it twice gives the
//! same result as applying it once.

use super::{required_len, TexelSize, MAX_MASK};

/// Horizontal copy unit in bytes
///
/// The S wrap copies four bytes per step (two 16-bit texels, four 8-bit
/// texels, one 32-bit texel). A fill width that is not a multiple of the unit
/// leaves the trailing texels untouched.
const WRAP_UNIT_BYTES: usize = 4;

/// Horizontal wrap
///
/// Fills columns `[1 << mask, max_width)` of the first `height` rows in
/// four-byte units.
///
/// # Arguments
///
/// * `tex` - Texture buffer
/// * `size` - Texel size
/// * `mask` - S mask exponent
/// * `max_width` - Column to wrap up to (exclusive)
/// * `real_width` - Row stride in texels
/// * `height` - Rows to process
pub fn wrap_s(
    tex: &mut [u8],
    size: TexelSize,
    mask: u32,
    max_width: u32,
    real_width: u32,
    height: u32,
) {
    if mask == 0 || mask > MAX_MASK {
        return;
    }

    let mask_width = 1u32 << mask;
    if mask_width >= max_width {
        return;
    }
    if max_width > real_width {
        return;
    }

    let bpt = size.bytes();
    // A block narrower than one unit is copied texel by texel
    let unit_texels = (WRAP_UNIT_BYTES / bpt).min(mask_width as usize);
    let unit_bytes = unit_texels * bpt;
    let count = (max_width - mask_width) as usize / unit_texels;
    if count == 0 {
        return;
    }
    if tex.len() < required_len(size, real_width, height) {
        log::warn!(
            "wrap_s: buffer of {} bytes too short for {}x{} texels",
            tex.len(),
            real_width,
            height
        );
        return;
    }

    let unit_mask = mask_width as usize / unit_texels - 1;
    let line_full = real_width as usize * bpt;
    let start = mask_width as usize * bpt;

    for y in 0..height as usize {
        let row = y * line_full;
        let mut dst = row + start;
        for unit in 0..count {
            let src = row + (unit & unit_mask) * unit_bytes;
            tex.copy_within(src..src + unit_bytes, dst);
            dst += unit_bytes;
        }
    }
}

/// Vertical wrap
///
/// Fills rows `[1 << mask, max_height)` with copies of row `y & (block - 1)`.
pub fn wrap_t(tex: &mut [u8], size: TexelSize, mask: u32, max_height: u32, real_width: u32) {
    if mask == 0 || mask > MAX_MASK {
        return;
    }

    let mask_height = 1u32 << mask;
    if max_height <= mask_height {
        return;
    }
    if tex.len() < required_len(size, real_width, max_height) {
        log::warn!(
            "wrap_t: buffer of {} bytes too short for {} rows",
            tex.len(),
            max_height
        );
        return;
    }

    let mask_mask = mask_height - 1;
    let line_full = real_width as usize * size.bytes();

    for y in mask_height..max_height {
        let src = (y & mask_mask) as usize * line_full;
        tex.copy_within(src..src + line_full, y as usize * line_full);
    }
}

/// 16-bit horizontal wrap
#[inline]
pub fn wrap_16b_s(tex: &mut [u8], mask: u32, max_width: u32, real_width: u32, height: u32) {
    wrap_s(tex, TexelSize::Bits16, mask, max_width, real_width, height);
}

/// 16-bit vertical wrap
#[inline]
pub fn wrap_16b_t(tex: &mut [u8], mask: u32, max_height: u32, real_width: u32) {
    wrap_t(tex, TexelSize::Bits16, mask, max_height, real_width);
}
