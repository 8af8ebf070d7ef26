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

//! RDP combine mode decoding
//!
//! `G_SETCOMBINE` packs two cycles of color and alpha equations into its two
//! command words. Every equation has the form `(a - b) * c + d` with each
//! operand picked by a small mux index.
//!
//! ```text
//! w0: 23:20 a0 color   19:15 c0 color   14:12 a0 alpha   11:9 c0 alpha
//!      8:5  a1 color    4:0  c1 color
//! w1: 31:28 b0 color   27:24 b1 color   23:21 a1 alpha   20:18 c1 alpha
//!     17:15 d0 color   14:12 b0 alpha   11:9  d0 alpha    8:6 d1 color
//!      5:3  b1 alpha    2:0  d1 alpha
//! ```

use serde::{Deserialize, Serialize};

/// Combiner operand
///
/// In an alpha equation the color-named sources stand for their alpha
/// component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombineSource {
    Combined,
    Texel0,
    Texel1,
    Primitive,
    Shade,
    Environment,
    One,
    Zero,
    Noise,
    Center,
    K4,
    Scale,
    CombinedAlpha,
    Texel0Alpha,
    Texel1Alpha,
    PrimitiveAlpha,
    ShadeAlpha,
    EnvironmentAlpha,
    LodFraction,
    PrimLodFraction,
    K5,
}

impl CombineSource {
    /// Color `a` mux (4 bits)
    pub fn color_a(index: u32) -> Self {
        match index {
            0..=5 => Self::common(index),
            6 => Self::One,
            7 => Self::Noise,
            _ => Self::Zero,
        }
    }

    /// Color `b` mux (4 bits)
    pub fn color_b(index: u32) -> Self {
        match index {
            0..=5 => Self::common(index),
            6 => Self::Center,
            7 => Self::K4,
            _ => Self::Zero,
        }
    }

    /// Color `c` mux (5 bits)
    pub fn color_c(index: u32) -> Self {
        match index {
            0..=5 => Self::common(index),
            6 => Self::Scale,
            7 => Self::CombinedAlpha,
            8 => Self::Texel0Alpha,
            9 => Self::Texel1Alpha,
            10 => Self::PrimitiveAlpha,
            11 => Self::ShadeAlpha,
            12 => Self::EnvironmentAlpha,
            13 => Self::LodFraction,
            14 => Self::PrimLodFraction,
            15 => Self::K5,
            _ => Self::Zero,
        }
    }

    /// Color `d` mux (3 bits)
    pub fn color_d(index: u32) -> Self {
        match index {
            0..=5 => Self::common(index),
            6 => Self::One,
            _ => Self::Zero,
        }
    }

    /// Alpha `a`, `b` and `d` mux (3 bits)
    pub fn alpha_abd(index: u32) -> Self {
        match index {
            0..=5 => Self::common(index),
            6 => Self::One,
            _ => Self::Zero,
        }
    }

    /// Alpha `c` mux (3 bits)
    pub fn alpha_c(index: u32) -> Self {
        match index {
            0 => Self::LodFraction,
            1..=5 => Self::common(index),
            6 => Self::PrimLodFraction,
            _ => Self::Zero,
        }
    }

    fn common(index: u32) -> Self {
        match index {
            0 => Self::Combined,
            1 => Self::Texel0,
            2 => Self::Texel1,
            3 => Self::Primitive,
            4 => Self::Shade,
            _ => Self::Environment,
        }
    }

    /// Texel this source samples, if any
    pub fn texel(self) -> Option<u8> {
        match self {
            Self::Texel0 | Self::Texel0Alpha => Some(0),
            Self::Texel1 | Self::Texel1Alpha => Some(1),
            _ => None,
        }
    }

    /// Reads the previous cycle
    pub fn is_combined(self) -> bool {
        matches!(self, Self::Combined | Self::CombinedAlpha)
    }

    /// Reads the iterated color
    pub fn is_shade(self) -> bool {
        matches!(self, Self::Shade | Self::ShadeAlpha)
    }
}

/// One `(a - b) * c + d` equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Equation {
    pub a: CombineSource,
    pub b: CombineSource,
    pub c: CombineSource,
    pub d: CombineSource,
}

impl Equation {
    /// `d` alone
    pub const fn pass(source: CombineSource) -> Self {
        Self {
            a: CombineSource::Zero,
            b: CombineSource::Zero,
            c: CombineSource::Zero,
            d: source,
        }
    }

    pub fn operands(&self) -> [CombineSource; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Rewrite every operand
    pub fn map(&self, mut f: impl FnMut(CombineSource) -> CombineSource) -> Self {
        Self {
            a: f(self.a),
            b: f(self.b),
            c: f(self.c),
            d: f(self.d),
        }
    }

    /// Drop operands whose value cannot reach the result
    ///
    /// `(x - x) * c` and `(a - b) * 0` contribute nothing.
    pub fn simplify(&self) -> Self {
        if self.a == self.b || self.c == CombineSource::Zero {
            Self::pass(self.d)
        } else {
            *self
        }
    }

    /// Texels read by the equation
    pub fn texels(&self) -> [bool; 2] {
        let mut used = [false; 2];
        for op in self.simplify().operands() {
            if let Some(t) = op.texel() {
                used[t as usize] = true;
            }
        }
        used
    }

    pub fn uses_combined(&self) -> bool {
        self.simplify().operands().iter().any(|op| op.is_combined())
    }

    pub fn uses_shade(&self) -> bool {
        self.simplify().operands().iter().any(|op| op.is_shade())
    }

    /// Result is exactly the previous cycle
    pub fn is_combined_pass(&self) -> bool {
        let eq = self.simplify();
        if eq == Self::pass(eq.d) {
            return eq.d == CombineSource::Combined;
        }
        eq.a == CombineSource::Combined
            && eq.b == CombineSource::Zero
            && eq.c == CombineSource::One
            && eq.d == CombineSource::Zero
    }
}

/// Color and alpha equations of one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleMode {
    pub color: Equation,
    pub alpha: Equation,
}

/// Decoded `G_SETCOMBINE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombineMode {
    pub cycles: [CycleMode; 2],
}

impl CombineMode {
    /// Decode the two command words
    ///
    /// # Examples
    ///
    /// ```
    /// use rdpglide::core::combiner::{CombineMode, CombineSource};
    ///
    /// // Color TEXEL0 * SHADE, alpha TEXEL0, in both cycles
    /// let mode = CombineMode::from_words(0x0012_7E24, 0xFFFF_F3F9);
    /// assert_eq!(mode.cycles[0].color.a, CombineSource::Texel0);
    /// assert_eq!(mode.cycles[0].color.c, CombineSource::Shade);
    /// assert_eq!(mode.cycles[1].alpha.d, CombineSource::Texel0);
    /// ```
    pub fn from_words(w0: u32, w1: u32) -> Self {
        let cycle0 = CycleMode {
            color: Equation {
                a: CombineSource::color_a((w0 >> 20) & 0xF),
                b: CombineSource::color_b((w1 >> 28) & 0xF),
                c: CombineSource::color_c((w0 >> 15) & 0x1F),
                d: CombineSource::color_d((w1 >> 15) & 0x7),
            },
            alpha: Equation {
                a: CombineSource::alpha_abd((w0 >> 12) & 0x7),
                b: CombineSource::alpha_abd((w1 >> 12) & 0x7),
                c: CombineSource::alpha_c((w0 >> 9) & 0x7),
                d: CombineSource::alpha_abd((w1 >> 9) & 0x7),
            },
        };
        let cycle1 = CycleMode {
            color: Equation {
                a: CombineSource::color_a((w0 >> 5) & 0xF),
                b: CombineSource::color_b((w1 >> 24) & 0xF),
                c: CombineSource::color_c(w0 & 0x1F),
                d: CombineSource::color_d((w1 >> 6) & 0x7),
            },
            alpha: Equation {
                a: CombineSource::alpha_abd((w1 >> 21) & 0x7),
                b: CombineSource::alpha_abd((w1 >> 3) & 0x7),
                c: CombineSource::alpha_c((w1 >> 18) & 0x7),
                d: CombineSource::alpha_abd(w1 & 0x7),
            },
        };
        Self {
            cycles: [cycle0, cycle1],
        }
    }

    /// Same equations in both cycles
    pub fn one_cycle(cycle: CycleMode) -> Self {
        Self {
            cycles: [cycle, cycle],
        }
    }
}

/// RDP cycle type (other-mode high bits 21:20)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CycleType {
    #[default]
    One,
    Two,
    Copy,
    Fill,
}

impl CycleType {
    pub fn from_othermode_h(othermode_h: u32) -> Self {
        match (othermode_h >> 20) & 3 {
            0 => CycleType::One,
            1 => CycleType::Two,
            2 => CycleType::Copy,
            _ => CycleType::Fill,
        }
    }
}
