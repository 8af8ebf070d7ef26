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

//! Texture engine tests
//!
//! Tests are organized into the following modules:
//! - `mirror`: Mirrored repeat on S and T
//! - `wrap`: Plain wrap on S and T
//! - `clamp`: Edge clamp on S and T
//! - `addressing`: Combined per-tile addressing and validation
//! - `decode`: Texel decoders and the dispatch table

mod addressing;
mod clamp;
mod wrap;

/// Build a 16-bit texture whose texel at (x, y) is `(y << 8) | x` inside the
/// `width`x`height` block and 0xFFFF elsewhere
pub(super) fn pattern_16b(width: u32, height: u32, real_width: u32, real_height: u32) -> Vec<u8> {
    let mut tex = vec![0xFFu8; (real_width * real_height * 2) as usize];
    for y in 0..height {
        for x in 0..width {
            let value = ((y << 8) | x) as u16;
            let at = ((y * real_width + x) * 2) as usize;
            tex[at..at + 2].copy_from_slice(&value.to_le_bytes());
        }
    }
    tex
}

/// Read the 16-bit texel at (x, y)
pub(super) fn texel_16b(tex: &[u8], real_width: u32, x: u32, y: u32) -> u16 {
    let at = ((y * real_width + x) * 2) as usize;
    u16::from_le_bytes([tex[at], tex[at + 1]])
}
