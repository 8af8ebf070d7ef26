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

//! Addressing tests - per-tile dispatch and strict validation

use super::super::*;
use super::{pattern_16b, texel_16b};
use crate::core::config::HardwareCaps;
use crate::core::error::TextureError;

fn layout(s: AxisAddressing, t: AxisAddressing, real_width: u32, real_height: u32) -> TextureLayout {
    TextureLayout {
        texel: TexelSize::Bits16,
        real_width,
        real_height,
        s,
        t,
    }
}

#[test]
fn test_axis_mode_from_cm() {
    assert_eq!(AxisMode::from_cm(0), AxisMode::WRAP);
    assert_eq!(AxisMode::from_cm(1), AxisMode::MIRROR);
    assert_eq!(AxisMode::from_cm(2), AxisMode::CLAMP);
    assert_eq!(
        AxisMode::from_cm(3),
        AxisMode {
            mirror: true,
            clamp: true
        }
    );
}

#[test]
fn test_wrap_both_axes() {
    let s = AxisAddressing {
        mode: AxisMode::WRAP,
        mask: 2,
        size: 4,
    };
    let t = AxisAddressing {
        mode: AxisMode::WRAP,
        mask: 1,
        size: 2,
    };
    let layout = layout(s, t, 8, 4);
    let mut tex = pattern_16b(4, 2, 8, 4);

    let hw = apply_addressing(&mut tex, &layout, HardwareCaps::empty());
    assert_eq!(hw, HardwareMirror::default());

    for y in 0..4 {
        for x in 0..8 {
            assert_eq!(texel_16b(&tex, 8, x, y), (((y & 1) << 8) | (x & 3)) as u16);
        }
    }
}

#[test]
fn test_mirror_then_clamp() {
    // Tile is 6 texels wide, mask covers 4: mirror 4..6, clamp 6..8
    let s = AxisAddressing {
        mode: AxisMode {
            mirror: true,
            clamp: true,
        },
        mask: 2,
        size: 6,
    };
    let t = AxisAddressing {
        mode: AxisMode::CLAMP,
        mask: 0,
        size: 1,
    };
    let layout = layout(s, t, 8, 2);
    let mut tex = pattern_16b(4, 1, 8, 2);

    apply_addressing(&mut tex, &layout, HardwareCaps::empty());

    let row0: Vec<u16> = (0..8).map(|x| texel_16b(&tex, 8, x, 0)).collect();
    assert_eq!(row0, vec![0, 1, 2, 3, 3, 2, 2, 2]);
    let row1: Vec<u16> = (0..8).map(|x| texel_16b(&tex, 8, x, 1)).collect();
    assert_eq!(row1, row0);
}

#[test]
fn test_hardware_mirror_needs_single_block_allocation() {
    let s = AxisAddressing {
        mode: AxisMode::MIRROR,
        mask: 2,
        size: 4,
    };
    let t = AxisAddressing {
        mode: AxisMode::MIRROR,
        mask: 1,
        size: 2,
    };
    let layout = layout(s, t, 8, 8);
    let mut tex = pattern_16b(4, 2, 8, 8);

    let hw = apply_addressing(&mut tex, &layout, HardwareCaps::TEXTURE_MIRROR);

    // Two-block allocations are sampled whole, so they are expanded in memory
    assert_eq!(hw, HardwareMirror::default());
    let row0: Vec<u16> = (0..8).map(|x| texel_16b(&tex, 8, x, 0)).collect();
    assert_eq!(row0, vec![0, 1, 2, 3, 3, 2, 1, 0]);
    let col0: Vec<u16> = (0..8).map(|y| texel_16b(&tex, 8, 0, y)).collect();
    assert_eq!(col0, vec![0, 0x100, 0x100, 0, 0, 0x100, 0x100, 0]);
}

#[test]
fn test_hardware_mirror_single_block() {
    let s = AxisAddressing {
        mode: AxisMode::MIRROR,
        mask: 2,
        size: 4,
    };
    let t = AxisAddressing {
        mode: AxisMode::WRAP,
        mask: 1,
        size: 2,
    };
    let layout = layout(s, t, 4, 2);
    let original = pattern_16b(4, 2, 4, 2);
    let mut tex = original.clone();

    let hw = apply_addressing(&mut tex, &layout, HardwareCaps::TEXTURE_MIRROR);

    assert!(hw.s);
    assert!(!hw.t);
    assert_eq!(tex, original);
}

#[test]
fn test_mask_zero_axis_clamps() {
    // 6-texel tile with wrapping disabled: padding repeats the edge texel
    let s = AxisAddressing {
        mode: AxisMode::WRAP,
        mask: 0,
        size: 6,
    };
    let t = AxisAddressing {
        mode: AxisMode::MIRROR,
        mask: 0,
        size: 1,
    };
    let layout = layout(s, t, 8, 2);
    let mut tex = pattern_16b(6, 1, 8, 2);

    apply_addressing(&mut tex, &layout, HardwareCaps::TEXTURE_MIRROR);

    let row0: Vec<u16> = (0..8).map(|x| texel_16b(&tex, 8, x, 0)).collect();
    assert_eq!(row0, vec![0, 1, 2, 3, 4, 5, 5, 5]);
    let row1: Vec<u16> = (0..8).map(|x| texel_16b(&tex, 8, x, 1)).collect();
    assert_eq!(row1, row0);
}

#[test]
fn test_validate_addressing() {
    let axis = AxisAddressing {
        mode: AxisMode::WRAP,
        mask: 2,
        size: 4,
    };
    let good = layout(axis, axis, 8, 8);
    assert_eq!(validate_addressing(128, &good), Ok(()));

    assert_eq!(
        validate_addressing(64, &good),
        Err(TextureError::BufferTooSmall {
            expected: 128,
            got: 64
        })
    );

    let bad_mask = layout(AxisAddressing { mask: 11, ..axis }, axis, 8, 8);
    assert_eq!(
        validate_addressing(128, &bad_mask),
        Err(TextureError::InvalidMask { mask: 11 })
    );

    let odd = layout(axis, axis, 12, 8);
    assert_eq!(
        validate_addressing(1024, &odd),
        Err(TextureError::NotPowerOfTwo { addressed: 12 })
    );

    let wide = layout(AxisAddressing { size: 16, ..axis }, axis, 8, 8);
    assert_eq!(
        validate_addressing(128, &wide),
        Err(TextureError::RowOverflow {
            requested: 16,
            real_width: 8
        })
    );
}
