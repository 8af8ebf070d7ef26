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

//! Clamp tests - edge replication on both axes

use super::super::*;
use super::{pattern_16b, texel_16b};
use proptest::prelude::*;

#[test]
fn test_clamp_t_copies_last_row() {
    // Rows 0-15 valid, clamped out to 20
    let mut tex = pattern_16b(16, 16, 16, 20);
    clamp_16b_t(&mut tex, 16, 16, 20);

    let row15 = tex[15 * 32..16 * 32].to_vec();
    for y in 16..20usize {
        assert_eq!(tex[y * 32..(y + 1) * 32], row15[..], "row {}", y);
    }
}

#[test]
fn test_clamp_s_uses_last_column_of_each_row() {
    let mut tex = pattern_16b(3, 4, 8, 4);
    clamp_16b_s(&mut tex, 3, 8, 8, 4);

    for y in 0..4 {
        let edge = texel_16b(&tex, 8, 2, y);
        assert_eq!(edge, ((y << 8) | 2) as u16);
        for x in 3..8 {
            assert_eq!(texel_16b(&tex, 8, x, y), edge);
        }
    }
}

#[test]
fn test_clamp_s_stops_at_clamp_to() {
    let mut tex = pattern_16b(2, 1, 8, 1);
    clamp_16b_s(&mut tex, 2, 5, 8, 1);

    let row: Vec<u16> = (0..8).map(|x| texel_16b(&tex, 8, x, 0)).collect();
    assert_eq!(row, vec![0, 1, 1, 1, 1, 0xFFFF, 0xFFFF, 0xFFFF]);
}

#[test]
fn test_clamp_32b() {
    let mut tex = vec![0u8; 4 * 4];
    tex[0..4].copy_from_slice(&[1, 2, 3, 4]);
    clamp_s(&mut tex, TexelSize::Bits32, 1, 4, 4, 1);
    assert_eq!(tex, [1u8, 2, 3, 4].repeat(4));
}

#[test]
fn test_clamp_noops() {
    let original = pattern_16b(4, 4, 8, 8);
    let mut tex = original.clone();

    // Row already full
    clamp_16b_s(&mut tex, 8, 8, 8, 8);
    // Zero-area requests
    clamp_16b_s(&mut tex, 4, 4, 8, 8);
    clamp_16b_s(&mut tex, 0, 8, 8, 8);
    clamp_16b_t(&mut tex, 8, 8, 8);
    clamp_16b_t(&mut tex, 0, 8, 8);
    clamp_16b_t(&mut tex, 4, 8, 2);
    assert_eq!(tex, original);
}

proptest! {
    #[test]
    fn prop_clamp_padding_equals_edge(width in 1u32..16, height in 1u32..16, seed in any::<u8>()) {
        let real_width = 16u32;
        let real_height = 16u32;
        let mut tex: Vec<u8> = (0..(real_width * real_height * 2) as usize)
            .map(|i| (i as u8) ^ seed)
            .collect();

        clamp_16b_s(&mut tex, width, real_width, real_width, height);
        clamp_16b_t(&mut tex, height, real_width, real_height);

        for y in 0..real_height {
            let src_y = y.min(height - 1);
            for x in width..real_width {
                prop_assert_eq!(texel_16b(&tex, real_width, x, y), texel_16b(&tex, real_width, width - 1, src_y));
            }
        }
    }
}
