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

//! Mirrored repeat
//!
//! Each block of `1 << mask` texels past the addressed region alternates
//! between a forward and a reversed copy of the base block. Whether a
//! position is in a reversed block is decided by `position & block`, and the
//! source texel is `position & (block - 1)` or its reflection
//! `(block - 1) - (position & (block - 1))`.

use super::{required_len, TexelSize, MAX_MASK};

/// Horizontal mirror
///
/// Fills columns `[1 << mask, max_width)` of the first `height` rows.
///
/// # Arguments
///
/// * `tex` - Texture buffer
/// * `size` - Texel size
/// * `mask` - S mask exponent
/// * `max_width` - Column to mirror up to (exclusive)
/// * `real_width` - Row stride in texels
/// * `height` - Rows to process
pub fn mirror_s(
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
    // Filling past the row would run into the next one
    if max_width > real_width {
        return;
    }
    if tex.len() < required_len(size, real_width, height) {
        log::warn!(
            "mirror_s: buffer of {} bytes too short for {}x{} texels",
            tex.len(),
            real_width,
            height
        );
        return;
    }

    let bpt = size.bytes();
    let mask_mask = mask_width - 1;
    let line_full = real_width as usize * bpt;

    for y in 0..height as usize {
        let row = y * line_full;
        for x in mask_width..max_width {
            let src_x = if x & mask_width != 0 {
                mask_mask - (x & mask_mask)
            } else {
                x & mask_mask
            };
            let src = row + src_x as usize * bpt;
            tex.copy_within(src..src + bpt, row + x as usize * bpt);
        }
    }
}

/// Vertical mirror
///
/// Fills rows `[1 << mask, max_height)` with whole-row copies.
///
/// # Arguments
///
/// * `tex` - Texture buffer
/// * `size` - Texel size
/// * `mask` - T mask exponent
/// * `max_height` - Row to mirror up to (exclusive)
/// * `real_width` - Row stride in texels
pub fn mirror_t(tex: &mut [u8], size: TexelSize, mask: u32, max_height: u32, real_width: u32) {
    if mask == 0 || mask > MAX_MASK {
        return;
    }

    let mask_height = 1u32 << mask;
    if max_height <= mask_height {
        return;
    }
    if tex.len() < required_len(size, real_width, max_height) {
        log::warn!(
            "mirror_t: buffer of {} bytes too short for {} rows",
            tex.len(),
            max_height
        );
        return;
    }

    let mask_mask = mask_height - 1;
    let line_full = real_width as usize * size.bytes();

    for y in mask_height..max_height {
        let src_y = if y & mask_height != 0 {
            mask_mask - (y & mask_mask)
        } else {
            y & mask_mask
        };
        let src = src_y as usize * line_full;
        tex.copy_within(src..src + line_full, y as usize * line_full);
    }
}

/// 16-bit horizontal mirror
#[inline]
pub fn mirror_16b_s(tex: &mut [u8], mask: u32, max_width: u32, real_width: u32, height: u32) {
    mirror_s(tex, TexelSize::Bits16, mask, max_width, real_width, height);
}

/// 16-bit vertical mirror
#[inline]
pub fn mirror_16b_t(tex: &mut [u8], mask: u32, max_height: u32, real_width: u32) {
    mirror_t(tex, TexelSize::Bits16, mask, max_height, real_width);
}
