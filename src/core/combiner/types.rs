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

//! Combiner state types
//!
//! The color and alpha units and both texture units can each run in one of two
//! modes: the native Glide combine (a fixed function/factor/local/other
//! selection) or the combine extension (a four-operand expression). Every
//! channel is a `ChannelCombine`, so only the parameters of the mode actually
//! in use exist.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::blender::BlendState;
use super::tmod::TexMod;

/// Native combine function (`grColorCombine`/`grAlphaCombine`/`grTexCombine`)
///
/// `f` is the combine factor, `local` and `other` the selected inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombineFunction {
    /// 0
    Zero,
    /// local
    Local,
    /// local alpha
    LocalAlpha,
    /// f * other
    ScaleOther,
    /// f * other + local
    ScaleOtherAddLocal,
    /// f * other + local alpha
    ScaleOtherAddLocalAlpha,
    /// f * (other - local)
    ScaleOtherMinusLocal,
    /// f * (other - local) + local
    ScaleOtherMinusLocalAddLocal,
    /// f * (other - local) + local alpha
    ScaleOtherMinusLocalAddLocalAlpha,
    /// -f * local + local
    ScaleMinusLocalAddLocal,
    /// -f * local + local alpha
    ScaleMinusLocalAddLocalAlpha,
}

impl CombineFunction {
    pub const ALL: [CombineFunction; 11] = [
        CombineFunction::Zero,
        CombineFunction::Local,
        CombineFunction::LocalAlpha,
        CombineFunction::ScaleOther,
        CombineFunction::ScaleOtherAddLocal,
        CombineFunction::ScaleOtherAddLocalAlpha,
        CombineFunction::ScaleOtherMinusLocal,
        CombineFunction::ScaleOtherMinusLocalAddLocal,
        CombineFunction::ScaleOtherMinusLocalAddLocalAlpha,
        CombineFunction::ScaleMinusLocalAddLocal,
        CombineFunction::ScaleMinusLocalAddLocalAlpha,
    ];
}

/// Native combine factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombineFactor {
    Zero,
    Local,
    OtherAlpha,
    LocalAlpha,
    /// Color/alpha units only
    TextureAlpha,
    /// Color/alpha units only
    TextureRgb,
    /// Texture units only
    LodFraction,
    One,
    OneMinusLocal,
    OneMinusOtherAlpha,
    OneMinusLocalAlpha,
    /// Color/alpha units only
    OneMinusTextureAlpha,
    /// Texture units only
    OneMinusLodFraction,
}

impl CombineFactor {
    /// Factors accepted by the color and alpha units
    pub const UNIT: [CombineFactor; 11] = [
        CombineFactor::Zero,
        CombineFactor::One,
        CombineFactor::Local,
        CombineFactor::OtherAlpha,
        CombineFactor::LocalAlpha,
        CombineFactor::TextureAlpha,
        CombineFactor::TextureRgb,
        CombineFactor::OneMinusLocal,
        CombineFactor::OneMinusOtherAlpha,
        CombineFactor::OneMinusLocalAlpha,
        CombineFactor::OneMinusTextureAlpha,
    ];

    /// Factors accepted by a texture unit
    pub const TMU: [CombineFactor; 10] = [
        CombineFactor::Zero,
        CombineFactor::One,
        CombineFactor::Local,
        CombineFactor::OtherAlpha,
        CombineFactor::LocalAlpha,
        CombineFactor::LodFraction,
        CombineFactor::OneMinusLocal,
        CombineFactor::OneMinusOtherAlpha,
        CombineFactor::OneMinusLocalAlpha,
        CombineFactor::OneMinusLodFraction,
    ];
}

/// Local input of the color and alpha units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombineLocal {
    /// Iterated (shade) color
    Iterated,
    /// Constant color register
    Constant,
}

impl CombineLocal {
    pub const ALL: [CombineLocal; 2] = [CombineLocal::Iterated, CombineLocal::Constant];
}

/// Other input of the color and alpha units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombineOther {
    /// Iterated (shade) color
    Iterated,
    /// Texture unit output
    Texture,
    /// Constant color register
    Constant,
}

impl CombineOther {
    pub const ALL: [CombineOther; 3] = [
        CombineOther::Texture,
        CombineOther::Iterated,
        CombineOther::Constant,
    ];
}

/// Native color or alpha unit parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCombine {
    pub function: CombineFunction,
    pub factor: CombineFactor,
    pub local: CombineLocal,
    pub other: CombineOther,
}

impl NativeCombine {
    /// Iterated color straight through
    pub const ITERATED: Self = Self {
        function: CombineFunction::Local,
        factor: CombineFactor::Zero,
        local: CombineLocal::Iterated,
        other: CombineOther::Iterated,
    };

    /// Texture unit output straight through
    pub const TEXTURE: Self = Self {
        function: CombineFunction::ScaleOther,
        factor: CombineFactor::One,
        local: CombineLocal::Iterated,
        other: CombineOther::Texture,
    };
}

/// Native texture unit parameters
///
/// Inside a texture unit `local` is the unit's own texel and `other` is the
/// output of the upstream unit (TMU1 feeds TMU0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TexUnitCombine {
    pub function: CombineFunction,
    pub factor: CombineFactor,
    pub invert: bool,
}

impl TexUnitCombine {
    /// Sampled texel straight through
    pub const LOCAL: Self = Self {
        function: CombineFunction::Local,
        factor: CombineFactor::Zero,
        invert: false,
    };

    /// Upstream unit output straight through
    pub const OTHER: Self = Self {
        function: CombineFunction::ScaleOther,
        factor: CombineFactor::One,
        invert: false,
    };
}

/// Operand source of a combine extension expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtSource {
    Zero,
    TextureRgb,
    TextureAlpha,
    ConstantColor,
    ConstantAlpha,
    IteratedRgb,
    IteratedAlpha,
    /// The unit's own texel (texture units)
    LocalTextureRgb,
    LocalTextureAlpha,
    /// The upstream unit's output (texture units)
    OtherTextureRgb,
    OtherTextureAlpha,
    TmuConstantColor,
    TmuConstantAlpha,
    LodFrac,
    /// The B operand after its mode is applied (C and D only)
    B,
}

/// Operand mode applied to A and B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuncMode {
    Zero,
    X,
    OneMinusX,
    NegativeX,
    XMinusHalf,
}

/// Combine extension expression
///
/// ```text
/// result = ((mode_a(a) + mode_b(b)) * c' + d') << shift
/// c' = c_invert ? 1 - c : c
/// d' = d_invert ? 1 - d : d
/// ```
///
/// and `1 - result` when `invert` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineExt {
    pub a: ExtSource,
    pub a_mode: FuncMode,
    pub b: ExtSource,
    pub b_mode: FuncMode,
    pub c: ExtSource,
    pub c_invert: bool,
    pub d: ExtSource,
    pub d_invert: bool,
    pub shift: u8,
    pub invert: bool,
}

impl Default for CombineExt {
    /// Constant zero
    fn default() -> Self {
        Self {
            a: ExtSource::Zero,
            a_mode: FuncMode::Zero,
            b: ExtSource::Zero,
            b_mode: FuncMode::Zero,
            c: ExtSource::Zero,
            c_invert: false,
            d: ExtSource::Zero,
            d_invert: false,
            shift: 0,
            invert: false,
        }
    }
}

/// One logical channel: native parameters or an extension expression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChannelCombine<N> {
    Native(N),
    Extension(CombineExt),
}

impl<N> ChannelCombine<N> {
    pub fn is_extension(&self) -> bool {
        matches!(self, ChannelCombine::Extension(_))
    }

    pub fn native(&self) -> Option<&N> {
        match self {
            ChannelCombine::Native(n) => Some(n),
            ChannelCombine::Extension(_) => None,
        }
    }

    pub fn extension(&self) -> Option<&CombineExt> {
        match self {
            ChannelCombine::Native(_) => None,
            ChannelCombine::Extension(e) => Some(e),
        }
    }
}

bitflags! {
    /// Texels a combine mode samples
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TextureUsage: u8 {
        const TEXEL0 = 0b01;
        const TEXEL1 = 0b10;
    }
}

/// N64 texel a texture unit samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Texel {
    T0,
    T1,
}

/// Detail texture tuning of one texture unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetailState {
    pub lod_bias: i32,
    pub scale: u8,
    pub max: f32,
}

impl Default for DetailState {
    fn default() -> Self {
        Self {
            lod_bias: 31,
            scale: 7,
            max: 1.0,
        }
    }
}

/// Texture modifier applied to one texture unit
///
/// Colors are packed `0xRRGGBBAA`; `factor` is 0-255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TexModifier {
    pub mode: Option<TexMod>,
    pub color: u32,
    pub color1: u32,
    pub color2: u32,
    pub factor: u8,
}

/// Configuration of one texture unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TexUnitState {
    /// Texel bound to this unit
    pub texel: Option<Texel>,
    pub color: ChannelCombine<TexUnitCombine>,
    pub alpha: ChannelCombine<TexUnitCombine>,
    /// Per-unit constant color (`0xRRGGBBAA`), extension paths only
    pub constant: u32,
    pub lod_bias: f32,
    pub detail: DetailState,
    pub modifier: TexModifier,
}

impl Default for TexUnitState {
    fn default() -> Self {
        Self {
            texel: None,
            color: ChannelCombine::Native(TexUnitCombine::LOCAL),
            alpha: ChannelCombine::Native(TexUnitCombine::LOCAL),
            constant: 0,
            lod_bias: 0.0,
            detail: DetailState::default(),
            modifier: TexModifier::default(),
        }
    }
}

impl TexUnitState {
    /// The modifier the texture loader has to apply to the texels itself
    ///
    /// A modifier encoded into the color extension runs on the unit and needs
    /// no software pass.
    pub fn software_modifier(&self) -> Option<&TexModifier> {
        match (self.modifier.mode, &self.color) {
            (Some(_), ChannelCombine::Native(_)) => Some(&self.modifier),
            _ => None,
        }
    }
}

/// Complete derived combiner state for one draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinerState {
    /// Constant color register (`0xRRGGBBAA`)
    pub ccolor: u32,
    pub color: ChannelCombine<NativeCombine>,
    pub alpha: ChannelCombine<NativeCombine>,
    pub tmu: [TexUnitState; 2],
    /// Texels the current mode samples
    pub tex: TextureUsage,
    pub blend: BlendState,
}

impl Default for CombinerState {
    fn default() -> Self {
        Self {
            ccolor: 0,
            color: ChannelCombine::Native(NativeCombine::ITERATED),
            alpha: ChannelCombine::Native(NativeCombine::ITERATED),
            tmu: [TexUnitState::default(); 2],
            tex: TextureUsage::empty(),
            blend: BlendState::default(),
        }
    }
}

impl CombinerState {
    /// Any of the color or alpha units uses the extension
    pub fn combine_ext(&self) -> bool {
        self.color.is_extension() || self.alpha.is_extension()
    }

    /// Any texture unit channel uses the extension
    pub fn tex_combine_ext(&self) -> bool {
        self.tmu
            .iter()
            .any(|t| t.color.is_extension() || t.alpha.is_extension())
    }
}
