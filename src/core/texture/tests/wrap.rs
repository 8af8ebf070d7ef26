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

//! Wrap tests - modulo repeat on both axes

use super::super::*;
use super::{pattern_16b, texel_16b};
use proptest::prelude::*;

#[test]
fn test_wrap_s_repeats_columns() {
    // 16x16 native texture sampled at 32 columns
    let mut tex = pattern_16b(16, 16, 32, 16);
    wrap_16b_s(&mut tex, 4, 32, 32, 16);

    for y in 0..16usize {
        let row = y * 64;
        assert_eq!(tex[row..row + 32], tex[row + 32..row + 64], "row {}", y);
    }
}

#[test]
fn test_wrap_s_odd_fill_leaves_last_texel() {
    // 5 texels of padding: two 2-texel units are written, the fifth is not
    let mut tex = pattern_16b(4, 1, 16, 1);
    wrap_16b_s(&mut tex, 2, 9, 16, 1);

    let row: Vec<u16> = (0..9).map(|x| texel_16b(&tex, 16, x, 0)).collect();
    assert_eq!(row, vec![0, 1, 2, 3, 0, 1, 2, 3, 0xFFFF]);
}

#[test]
fn test_wrap_s_narrow_8b_block() {
    // A 2-texel 8-bit block is narrower than one copy unit
    let mut tex: Vec<u8> = vec![7, 9, 0, 0, 0, 0, 0, 0];
    wrap_s(&mut tex, TexelSize::Bits8, 1, 8, 8, 1);
    assert_eq!(tex, vec![7, 9, 7, 9, 7, 9, 7, 9]);
}

#[test]
fn test_wrap_t_repeats_rows() {
    let mut tex = pattern_16b(2, 2, 2, 7);
    wrap_16b_t(&mut tex, 1, 7, 2);

    let sources: Vec<u16> = (0..7).map(|y| texel_16b(&tex, 2, 1, y) >> 8).collect();
    assert_eq!(sources, vec![0, 1, 0, 1, 0, 1, 0]);
}

#[test]
fn test_wrap_noops() {
    let original = pattern_16b(4, 4, 8, 8);
    let mut tex = original.clone();

    wrap_16b_s(&mut tex, 0, 8, 8, 4);
    wrap_16b_t(&mut tex, 0, 8, 8);
    wrap_16b_s(&mut tex, 3, 8, 8, 4);
    wrap_16b_t(&mut tex, 3, 8, 8);
    // One texel of padding is less than a copy unit
    wrap_16b_s(&mut tex, 2, 5, 8, 4);
    assert_eq!(tex, original);
}

proptest! {
    #[test]
    fn prop_wrap_is_idempotent(mask in 1u32..=3, width_shift in 0u32..=2, rows in 1u32..=4, seed in any::<u8>()) {
        let block = 1u32 << mask;
        let real_width = block << width_shift;
        let real_height = rows * 2;
        let mut tex: Vec<u8> = (0..(real_width * real_height * 2) as usize)
            .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
            .collect();

        wrap_16b_s(&mut tex, mask, real_width, real_width, real_height);
        wrap_16b_t(&mut tex, 1, real_height, real_width);
        let once = tex.clone();

        wrap_16b_s(&mut tex, mask, real_width, real_width, real_height);
        wrap_16b_t(&mut tex, 1, real_height, real_width);
        prop_assert_eq!(tex, once);
    }
}
