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

//! Test fixtures: texture buffers and tile descriptions

use rdpglide::core::texture::{AxisAddressing, AxisMode, BitDepth, DecodeParams, Palette, PixelFormat};
use rdpglide::core::TileLoad;

/// TMEM image of a 16-bit RGBA tile where every texel encodes its position
///
/// Every texel is distinct and opaque, so a copied texel can be traced back
/// to exactly one source position.
#[allow(dead_code)]
pub fn rgba16_tmem(width: usize, height: usize) -> Vec<u8> {
    let mut src = Vec::with_capacity(width * height * 2);
    for y in 0..height {
        for x in 0..width {
            let texel = (((y as u16) << 8) | ((x as u16) << 1)) | 1;
            src.extend_from_slice(&texel.to_be_bytes());
        }
    }
    src
}

/// Axis addressing for a tile of `size` texels with mask `mask`
#[allow(dead_code)]
pub fn axis(mode: AxisMode, mask: u32, size: u32) -> AxisAddressing {
    AxisAddressing { mode, mask, size }
}

/// 16-bit RGBA tile of `width` x `height` texels into a `real_width` x
/// `real_height` allocation on TMU0
#[allow(dead_code)]
pub fn rgba16_tile(
    src: &[u8],
    width: usize,
    height: usize,
    real_width: usize,
    real_height: u32,
    s: AxisAddressing,
    t: AxisAddressing,
) -> TileLoad<'_> {
    TileLoad {
        tmu: 0,
        depth: BitDepth::Bits16,
        format: PixelFormat::Rgba,
        src,
        params: DecodeParams {
            wid_64: width / 4,
            height,
            line: 0,
            real_width,
            palette_bank: 0,
            palette: Palette::None,
        },
        real_height,
        s,
        t,
    }
}
