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

//! Blender derivation
//!
//! The RDP blender computes `(P * A + M * B) / (A + B)` per cycle with the
//! four operands selected in other-mode low:
//!
//! ```text
//! cycle 1: P 31:30  A 27:26  M 23:22  B 19:18
//! cycle 2: P 29:28  A 25:24  M 21:20  B 17:16
//!
//! P, M: 0 pixel, 1 memory, 2 blend color, 3 fog color
//! A:    0 pixel alpha, 1 fog alpha, 2 shade alpha, 3 zero
//! B:    0 1 - A, 1 memory alpha, 2 one, 3 zero
//! ```
//!
//! Only the cycle that reads memory maps onto the GPU's source/destination
//! blend factors.

use serde::{Deserialize, Serialize};

use super::mode::CycleType;

/// Force blending even on fully covered pixels
pub const FORCE_BL: u32 = 1 << 14;

/// GPU blend factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Alpha compare selection (other-mode low bits 1:0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AlphaCompare {
    #[default]
    None,
    /// Compare against the blend color alpha
    Threshold,
    /// Compare against a random threshold
    Dither,
}

/// Derived framebuffer blending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendState {
    pub src: BlendFactor,
    pub dst: BlendFactor,
    pub alpha_compare: AlphaCompare,
    /// The blender mixes in the fog color
    pub fog: bool,
}

impl Default for BlendState {
    /// Opaque: the combiner output replaces the framebuffer
    fn default() -> Self {
        Self {
            src: BlendFactor::One,
            dst: BlendFactor::Zero,
            alpha_compare: AlphaCompare::None,
            fog: false,
        }
    }
}

/// Blender operand selection of one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlenderCycle {
    p: u32,
    a: u32,
    m: u32,
    b: u32,
}

const MEMORY: u32 = 1;
const FOG: u32 = 3;

impl BlenderCycle {
    fn decode(othermode_l: u32, cycle: usize) -> Self {
        let shift = if cycle == 0 { 0 } else { 2 };
        Self {
            p: (othermode_l >> (30 - shift)) & 3,
            a: (othermode_l >> (26 - shift)) & 3,
            m: (othermode_l >> (22 - shift)) & 3,
            b: (othermode_l >> (18 - shift)) & 3,
        }
    }

    fn reads_memory(&self) -> bool {
        self.p == MEMORY || self.m == MEMORY
    }

    fn uses_fog(&self) -> bool {
        self.p == FOG || self.m == FOG || self.a == 1
    }

    /// Factor applied to the A-weighted operand
    fn a_factor(&self) -> BlendFactor {
        match self.a {
            3 => BlendFactor::Zero,
            // Fog and shade alpha reach the GPU through the combiner alpha
            _ => BlendFactor::SrcAlpha,
        }
    }

    /// Factor applied to the B-weighted operand
    fn b_factor(&self) -> BlendFactor {
        match self.b {
            0 => match self.a_factor() {
                BlendFactor::Zero => BlendFactor::One,
                _ => BlendFactor::OneMinusSrcAlpha,
            },
            1 => BlendFactor::DstAlpha,
            2 => BlendFactor::One,
            _ => BlendFactor::Zero,
        }
    }
}

impl BlendState {
    /// Derive blending from other-mode low
    ///
    /// # Arguments
    ///
    /// * `othermode_l` - Other-mode low word
    /// * `cycle` - Current cycle type; copy and fill never blend
    pub fn from_othermode(othermode_l: u32, cycle: CycleType) -> Self {
        let alpha_compare = match othermode_l & 3 {
            1 => AlphaCompare::Threshold,
            3 => AlphaCompare::Dither,
            _ => AlphaCompare::None,
        };

        let cycles: &[usize] = match cycle {
            CycleType::One => &[0],
            CycleType::Two => &[0, 1],
            CycleType::Copy | CycleType::Fill => {
                return Self {
                    alpha_compare,
                    ..Self::default()
                }
            }
        };

        let decoded = cycles
            .iter()
            .map(move |&c| BlenderCycle::decode(othermode_l, c));
        let fog = decoded.clone().any(|c| c.uses_fog());

        let (src, dst) = match decoded.filter(BlenderCycle::reads_memory).last() {
            Some(c) if othermode_l & FORCE_BL != 0 => {
                if c.p == MEMORY && c.m != MEMORY {
                    (c.b_factor(), c.a_factor())
                } else if c.p != MEMORY {
                    (c.a_factor(), c.b_factor())
                } else {
                    // Memory blended with itself
                    (BlendFactor::Zero, BlendFactor::One)
                }
            }
            _ => (BlendFactor::One, BlendFactor::Zero),
        };

        log::trace!(
            "Blender {:08X} ({:?}): src {:?} dst {:?} fog {}",
            othermode_l,
            cycle,
            src,
            dst,
            fog
        );

        Self {
            src,
            dst,
            alpha_compare,
            fog,
        }
    }
}
