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

//! Blender tests - other-mode low decoding

use super::super::*;

const P_MEMORY: u32 = 1 << 30;
const P_FOG: u32 = 3 << 30;
const M_MEMORY: u32 = 1 << 22;
const M2_MEMORY: u32 = 1 << 20;

#[test]
fn test_opaque_without_force_bl() {
    let blend = BlendState::from_othermode(M_MEMORY, CycleType::One);
    assert_eq!(blend.src, BlendFactor::One);
    assert_eq!(blend.dst, BlendFactor::Zero);
}

#[test]
fn test_translucent_surface() {
    // pixel * A + memory * (1 - A)
    let blend = BlendState::from_othermode(M_MEMORY | FORCE_BL, CycleType::One);
    assert_eq!(blend.src, BlendFactor::SrcAlpha);
    assert_eq!(blend.dst, BlendFactor::OneMinusSrcAlpha);
    assert!(!blend.fog);
}

#[test]
fn test_memory_first_swaps_factors() {
    // memory * A + pixel * (1 - A)
    let blend = BlendState::from_othermode(P_MEMORY | FORCE_BL, CycleType::One);
    assert_eq!(blend.src, BlendFactor::OneMinusSrcAlpha);
    assert_eq!(blend.dst, BlendFactor::SrcAlpha);
}

#[test]
fn test_zero_alpha_adds() {
    // pixel * 0 + memory * 1 keeps the framebuffer
    let a_zero = 3 << 26;
    let b_one = 2 << 18;
    let blend = BlendState::from_othermode(M_MEMORY | a_zero | b_one | FORCE_BL, CycleType::One);
    assert_eq!(blend.src, BlendFactor::Zero);
    assert_eq!(blend.dst, BlendFactor::One);
}

#[test]
fn test_two_cycle_fog_then_blend() {
    let blend = BlendState::from_othermode(P_FOG | M2_MEMORY | FORCE_BL, CycleType::Two);
    assert!(blend.fog);
    assert_eq!(blend.src, BlendFactor::SrcAlpha);
    assert_eq!(blend.dst, BlendFactor::OneMinusSrcAlpha);
}

#[test]
fn test_second_cycle_ignored_in_one_cycle() {
    let blend = BlendState::from_othermode(M2_MEMORY | FORCE_BL, CycleType::One);
    assert_eq!(blend, BlendState::default());
}

#[test]
fn test_alpha_compare() {
    assert_eq!(
        BlendState::from_othermode(1, CycleType::One).alpha_compare,
        AlphaCompare::Threshold
    );
    assert_eq!(
        BlendState::from_othermode(3, CycleType::One).alpha_compare,
        AlphaCompare::Dither
    );
    assert_eq!(
        BlendState::from_othermode(2, CycleType::One).alpha_compare,
        AlphaCompare::None
    );
}

#[test]
fn test_copy_never_blends() {
    let blend = BlendState::from_othermode(M_MEMORY | FORCE_BL | 1, CycleType::Copy);
    assert_eq!(blend.src, BlendFactor::One);
    assert_eq!(blend.dst, BlendFactor::Zero);
    assert_eq!(blend.alpha_compare, AlphaCompare::Threshold);
}
