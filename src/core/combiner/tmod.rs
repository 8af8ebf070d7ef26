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

//! Texture modifiers
//!
//! Canned formulas that fold a combine equation over one texel and up to
//! three constants into the texel itself. A modifier either runs on the
//! texture unit as a combine extension or, when the extension cannot express
//! it, is applied to the decoded texels in software before upload.
//!
//! Notation: `t` texel, `ta` texel alpha, `c`/`c1`/`c2` modifier colors, `f`
//! modifier factor. `x inter y using z` is `x + (y - x) * z`. Modifiers only
//! touch RGB; alpha is the texel's own.

use serde::{Deserialize, Serialize};

use super::eval::Rgbaf;
use super::types::{CombineExt, ExtSource, FuncMode, TexModifier};
use crate::core::texture::TextureFormat;

/// The 21 texture modifier formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TexMod {
    /// t inter c using f
    TexInterColorUsingFactor = 1,
    /// t inter c using c1
    TexInterColUsingCol1 = 2,
    /// c - t
    FullColorSubTex = 3,
    /// c inter c1 using t
    ColInterCol1UsingTex = 4,
    /// c inter c1 using ta
    ColInterCol1UsingTexa = 5,
    /// (c inter c1 using ta) * t
    ColInterCol1UsingTexaMulTex = 6,
    /// c inter t using ta
    ColInterTexUsingTexa = 7,
    /// c2 inter (c inter c1 using t) using ta
    Col2InterColInterCol1UsingTexUsingTexa = 8,
    /// t * f + f
    TexScaleFacAddFac = 9,
    /// (t - c) * f + t
    TexSubColMulFacAddTex = 10,
    /// t * c + c
    TexScaleColAddCol = 11,
    /// t + c
    TexAddCol = 12,
    /// t - c
    TexSubCol = 13,
    /// (t - c) * f
    TexSubColMulFac = 14,
    /// c inter t using c1
    ColInterTexUsingCol1 = 15,
    /// c * ta + t
    ColMulTexaAddTex = 16,
    /// c inter t using t
    ColInterTexUsingTex = 17,
    /// t inter noise using c
    TexInterNoiseUsingCol = 18,
    /// t inter c using ta
    TexInterColUsingTexa = 19,
    /// t * c
    TexMulCol = 20,
    /// t * f + c
    TexScaleFacAddCol = 21,
}

impl TexMod {
    pub const ALL: [TexMod; 21] = [
        TexMod::TexInterColorUsingFactor,
        TexMod::TexInterColUsingCol1,
        TexMod::FullColorSubTex,
        TexMod::ColInterCol1UsingTex,
        TexMod::ColInterCol1UsingTexa,
        TexMod::ColInterCol1UsingTexaMulTex,
        TexMod::ColInterTexUsingTexa,
        TexMod::Col2InterColInterCol1UsingTexUsingTexa,
        TexMod::TexScaleFacAddFac,
        TexMod::TexSubColMulFacAddTex,
        TexMod::TexScaleColAddCol,
        TexMod::TexAddCol,
        TexMod::TexSubCol,
        TexMod::TexSubColMulFac,
        TexMod::ColInterTexUsingCol1,
        TexMod::ColMulTexaAddTex,
        TexMod::ColInterTexUsingTex,
        TexMod::TexInterNoiseUsingCol,
        TexMod::TexInterColUsingTexa,
        TexMod::TexMulCol,
        TexMod::TexScaleFacAddCol,
    ];

    /// Numeric mode identifier (1-21)
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.code() == code)
    }

    /// Reads `color`
    pub fn uses_color(self) -> bool {
        self != TexMod::TexScaleFacAddFac
    }

    /// Reads `color1`
    pub fn uses_color1(self) -> bool {
        matches!(
            self,
            TexMod::TexInterColUsingCol1
                | TexMod::ColInterCol1UsingTex
                | TexMod::ColInterCol1UsingTexa
                | TexMod::ColInterCol1UsingTexaMulTex
                | TexMod::Col2InterColInterCol1UsingTexUsingTexa
                | TexMod::ColInterTexUsingCol1
        )
    }

    /// Reads `color2`
    pub fn uses_color2(self) -> bool {
        self == TexMod::Col2InterColInterCol1UsingTexUsingTexa
    }

    /// Reads `factor`
    pub fn uses_factor(self) -> bool {
        matches!(
            self,
            TexMod::TexInterColorUsingFactor
                | TexMod::TexScaleFacAddFac
                | TexMod::TexSubColMulFacAddTex
                | TexMod::TexSubColMulFac
                | TexMod::TexScaleFacAddCol
        )
    }

    /// Modified color of texel `t`, clamped
    pub fn apply(self, t: Rgbaf, c: Rgbaf, c1: Rgbaf, c2: Rgbaf, f: f32, noise: f32) -> Rgbaf {
        self.evaluate(t, c, c1, c2, f, noise).clamped()
    }

    /// Modified color of texel `t` before clamping
    pub fn evaluate(self, t: Rgbaf, c: Rgbaf, c1: Rgbaf, c2: Rgbaf, f: f32, noise: f32) -> Rgbaf {
        let inter = |x: f32, y: f32, z: f32| x + (y - x) * z;
        let ta = t.alpha();
        let mut out = t;
        for ch in 0..3 {
            let (tv, cv, c1v, c2v) = (t.0[ch], c.0[ch], c1.0[ch], c2.0[ch]);
            out.0[ch] = match self {
                TexMod::TexInterColorUsingFactor => inter(tv, cv, f),
                TexMod::TexInterColUsingCol1 => inter(tv, cv, c1v),
                TexMod::FullColorSubTex => cv - tv,
                TexMod::ColInterCol1UsingTex => inter(cv, c1v, tv),
                TexMod::ColInterCol1UsingTexa => inter(cv, c1v, ta),
                TexMod::ColInterCol1UsingTexaMulTex => inter(cv, c1v, ta) * tv,
                TexMod::ColInterTexUsingTexa => inter(cv, tv, ta),
                TexMod::Col2InterColInterCol1UsingTexUsingTexa => inter(c2v, inter(cv, c1v, tv), ta),
                TexMod::TexScaleFacAddFac => tv * f + f,
                TexMod::TexSubColMulFacAddTex => (tv - cv) * f + tv,
                TexMod::TexScaleColAddCol => tv * cv + cv,
                TexMod::TexAddCol => tv + cv,
                TexMod::TexSubCol => tv - cv,
                TexMod::TexSubColMulFac => (tv - cv) * f,
                TexMod::ColInterTexUsingCol1 => inter(cv, tv, c1v),
                TexMod::ColMulTexaAddTex => cv * ta + tv,
                TexMod::ColInterTexUsingTex => inter(cv, tv, tv),
                TexMod::TexInterNoiseUsingCol => inter(tv, noise, cv),
                TexMod::TexInterColUsingTexa => inter(tv, cv, ta),
                TexMod::TexMulCol => tv * cv,
                TexMod::TexScaleFacAddCol => tv * f + cv,
            };
        }
        out
    }

    /// Texture unit extension computing this modifier
    ///
    /// The unit constant must hold `c` in RGB and `f` in alpha (see
    /// `unit_constant`). Modifiers needing `c1`, `c2` or noise have no
    /// encoding.
    pub fn to_extension(self) -> Option<CombineExt> {
        use ExtSource::{LocalTextureAlpha as TA, LocalTextureRgb as T, TmuConstantAlpha as F};
        use ExtSource::{TmuConstantColor as C, Zero};

        let ext = |a, a_mode, b, b_mode, c, c_invert, d| CombineExt {
            a,
            a_mode,
            b,
            b_mode,
            c,
            c_invert,
            d,
            d_invert: false,
            shift: 0,
            invert: false,
        };
        let (x, neg, none) = (FuncMode::X, FuncMode::NegativeX, FuncMode::Zero);

        let encoded = match self {
            TexMod::TexInterColorUsingFactor => ext(C, x, T, neg, F, false, T),
            TexMod::FullColorSubTex => ext(C, x, T, neg, Zero, true, Zero),
            TexMod::ColInterTexUsingTexa => ext(T, x, C, neg, TA, false, C),
            TexMod::TexScaleFacAddFac => ext(T, x, Zero, none, F, false, F),
            TexMod::TexSubColMulFacAddTex => ext(T, x, C, neg, F, false, T),
            TexMod::TexScaleColAddCol => ext(T, x, Zero, none, C, false, C),
            TexMod::TexAddCol => ext(T, x, C, x, Zero, true, Zero),
            TexMod::TexSubCol => ext(T, x, C, neg, Zero, true, Zero),
            TexMod::TexSubColMulFac => ext(T, x, C, neg, F, false, Zero),
            TexMod::ColMulTexaAddTex => ext(C, x, Zero, none, TA, false, T),
            TexMod::ColInterTexUsingTex => ext(T, x, C, neg, T, false, C),
            TexMod::TexInterColUsingTexa => ext(C, x, T, neg, TA, false, T),
            TexMod::TexMulCol => ext(T, x, Zero, none, C, false, Zero),
            TexMod::TexScaleFacAddCol => ext(T, x, Zero, none, F, false, C),
            TexMod::TexInterColUsingCol1
            | TexMod::ColInterCol1UsingTex
            | TexMod::ColInterCol1UsingTexa
            | TexMod::ColInterCol1UsingTexaMulTex
            | TexMod::Col2InterColInterCol1UsingTexUsingTexa
            | TexMod::ColInterTexUsingCol1
            | TexMod::TexInterNoiseUsingCol => return None,
        };
        Some(encoded)
    }
}

/// Texture unit constant for an extension-encoded modifier: `c` RGB, `f` alpha
pub fn unit_constant(modifier: &TexModifier) -> u32 {
    (modifier.color & 0xFFFF_FF00) | u32::from(modifier.factor)
}

/// Apply a modifier to one texel
pub fn apply_modifier(modifier: &TexModifier, t: Rgbaf, noise: f32) -> Rgbaf {
    match modifier.mode {
        Some(mode) => mode.apply(
            t,
            Rgbaf::from_packed(modifier.color),
            Rgbaf::from_packed(modifier.color1),
            Rgbaf::from_packed(modifier.color2),
            f32::from(modifier.factor) / 255.0,
            noise,
        ),
        None => t,
    }
}

#[inline(always)]
fn expand(v: u16, bits: u32) -> f32 {
    f32::from(v) / ((1u32 << bits) - 1) as f32
}

#[inline(always)]
fn quantize(v: f32, bits: u32) -> u16 {
    (v.clamp(0.0, 1.0) * ((1u32 << bits) - 1) as f32).round() as u16
}

/// xorshift32 step for the noise modifier
#[inline(always)]
fn next_noise(state: &mut u32) -> f32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    (x >> 24) as f32 / 255.0
}

/// Apply a modifier to every texel of a decoded texture in place
///
/// Supports ARGB1555, ARGB4444 and ARGB8888 buffers. Returns `false` and
/// leaves the buffer untouched for other formats.
pub fn apply_to_texture(tex: &mut [u8], format: TextureFormat, modifier: &TexModifier, seed: u32) -> bool {
    if modifier.mode.is_none() {
        return true;
    }
    let mut noise_state = seed | 1;

    match format {
        TextureFormat::Argb1555 | TextureFormat::Argb4444 => {
            let is_4444 = format == TextureFormat::Argb4444;
            for texel in tex.chunks_exact_mut(2) {
                let v = u16::from_le_bytes([texel[0], texel[1]]);
                let rgba = if is_4444 {
                    Rgbaf::new(
                        expand((v >> 8) & 0xF, 4),
                        expand((v >> 4) & 0xF, 4),
                        expand(v & 0xF, 4),
                        expand(v >> 12, 4),
                    )
                } else {
                    Rgbaf::new(
                        expand((v >> 10) & 0x1F, 5),
                        expand((v >> 5) & 0x1F, 5),
                        expand(v & 0x1F, 5),
                        f32::from(v >> 15),
                    )
                };
                let out = apply_modifier(modifier, rgba, next_noise(&mut noise_state));
                let [r, g, b, _] = out.0;
                let packed = if is_4444 {
                    (v & 0xF000) | (quantize(r, 4) << 8) | (quantize(g, 4) << 4) | quantize(b, 4)
                } else {
                    (v & 0x8000) | (quantize(r, 5) << 10) | (quantize(g, 5) << 5) | quantize(b, 5)
                };
                texel.copy_from_slice(&packed.to_le_bytes());
            }
            true
        }
        TextureFormat::Argb8888 => {
            for texel in tex.chunks_exact_mut(4) {
                let rgba = Rgbaf::new(
                    f32::from(texel[2]) / 255.0,
                    f32::from(texel[1]) / 255.0,
                    f32::from(texel[0]) / 255.0,
                    f32::from(texel[3]) / 255.0,
                );
                let out = apply_modifier(modifier, rgba, next_noise(&mut noise_state));
                texel[2] = quantize(out.0[0], 8) as u8;
                texel[1] = quantize(out.0[1], 8) as u8;
                texel[0] = quantize(out.0[2], 8) as u8;
            }
            true
        }
        TextureFormat::AlphaIntensity44 | TextureFormat::AlphaIntensity88 | TextureFormat::Alpha8 => {
            log::warn!("Texture modifier {:?} not applicable to {:?}", modifier.mode, format);
            false
        }
    }
}
