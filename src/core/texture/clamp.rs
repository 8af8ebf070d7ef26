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

//! Edge clamp
//!
//! Coordinates past the tile edge return the last valid texel. Horizontally
//! that is the last loaded column of each row; vertically it is the last
//! loaded row.

use super::{required_len, TexelSize};

/// Horizontal clamp
///
/// Replicates column `width - 1` of every row across `[width, clamp_to)`.
///
/// # Arguments
///
/// * `tex` - Texture buffer
/// * `size` - Texel size
/// * `width` - Loaded tile width in texels
/// * `clamp_to` - Column to clamp up to (exclusive, limited to `real_width`)
/// * `real_width` - Row stride in texels
/// * `real_height` - Rows to process
pub fn clamp_s(
    tex: &mut [u8],
    size: TexelSize,
    width: u32,
    clamp_to: u32,
    real_width: u32,
    real_height: u32,
) {
    if real_width <= width || width == 0 {
        return;
    }

    let clamp_to = clamp_to.min(real_width);
    if clamp_to <= width {
        return;
    }
    if tex.len() < required_len(size, real_width, real_height) {
        log::warn!(
            "clamp_s: buffer of {} bytes too short for {}x{} texels",
            tex.len(),
            real_width,
            real_height
        );
        return;
    }

    let bpt = size.bytes();
    let line_full = real_width as usize * bpt;
    let dest = width as usize * bpt;
    let end = clamp_to as usize * bpt;

    for y in 0..real_height as usize {
        let row = y * line_full;
        let constant = row + dest - bpt;
        let mut x = row + dest;
        while x < row + end {
            tex.copy_within(constant..constant + bpt, x);
            x += bpt;
        }
    }
}

/// Vertical clamp
///
/// Replicates row `height - 1` across rows `[height, clamp_to)`.
///
/// # Arguments
///
/// * `tex` - Texture buffer
/// * `size` - Texel size
/// * `height` - Loaded tile height in rows
/// * `real_width` - Row stride in texels
/// * `clamp_to` - Row to clamp up to (exclusive)
pub fn clamp_t(tex: &mut [u8], size: TexelSize, height: u32, real_width: u32, clamp_to: u32) {
    if height == 0 || clamp_to <= height {
        return;
    }
    if tex.len() < required_len(size, real_width, clamp_to) {
        log::warn!(
            "clamp_t: buffer of {} bytes too short for {} rows",
            tex.len(),
            clamp_to
        );
        return;
    }

    let line_full = real_width as usize * size.bytes();
    let const_line = (height as usize - 1) * line_full;

    for y in height as usize..clamp_to as usize {
        tex.copy_within(const_line..const_line + line_full, y * line_full);
    }
}

/// 16-bit horizontal clamp
#[inline]
pub fn clamp_16b_s(tex: &mut [u8], width: u32, clamp_to: u32, real_width: u32, real_height: u32) {
    clamp_s(tex, TexelSize::Bits16, width, clamp_to, real_width, real_height);
}

/// 16-bit vertical clamp
#[inline]
pub fn clamp_16b_t(tex: &mut [u8], height: u32, real_width: u32, clamp_to: u32) {
    clamp_t(tex, TexelSize::Bits16, height, real_width, clamp_to);
}
