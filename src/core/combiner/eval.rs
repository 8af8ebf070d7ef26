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

//! Numeric evaluation of combiner expressions
//!
//! Evaluates RDP equations and the derived Glide state on floating point
//! colors in `[0, 1]`. Every stage clamps its output the way the hardware
//! does; intermediate products are not clamped.

use serde::{Deserialize, Serialize};

use super::mode::{CombineMode, CombineSource, CycleType, Equation};
use super::tmod;
use super::types::{
    ChannelCombine, CombineExt, CombineFactor, CombineFunction, CombineLocal, CombineOther,
    CombinerState, ExtSource, FuncMode, NativeCombine, TexUnitCombine, TexUnitState, Texel,
};

/// RGBA color, one `f32` per channel
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgbaf(pub [f32; 4]);

impl Rgbaf {
    pub const ZERO: Rgbaf = Rgbaf([0.0; 4]);
    pub const ONE: Rgbaf = Rgbaf([1.0; 4]);

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    /// Same value in every channel
    pub fn splat(v: f32) -> Self {
        Self([v; 4])
    }

    /// Unpack `0xRRGGBBAA`
    pub fn from_packed(rgba: u32) -> Self {
        Self(rgba.to_be_bytes().map(|c| c as f32 / 255.0))
    }

    /// Pack to `0xRRGGBBAA`, rounding to nearest
    pub fn to_packed(self) -> u32 {
        u32::from_be_bytes(self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
    }

    #[inline(always)]
    pub fn alpha(&self) -> f32 {
        self.0[3]
    }

    pub fn clamped(self) -> Self {
        Self(self.0.map(|c| c.clamp(0.0, 1.0)))
    }

    /// Largest per-channel difference
    pub fn distance(&self, other: &Rgbaf) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }
}

/// Everything an RDP pixel's combine can read
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CombineInputs {
    pub texel0: Rgbaf,
    pub texel1: Rgbaf,
    pub shade: Rgbaf,
    pub prim: Rgbaf,
    pub env: Rgbaf,
    pub lod_frac: f32,
    pub prim_lod_frac: f32,
    pub noise: f32,
}

impl CombineInputs {
    /// Value of an operand in channel `ch` (3 is alpha)
    ///
    /// `combined` is the previous cycle's output.
    pub fn source(&self, src: CombineSource, combined: &Rgbaf, ch: usize) -> f32 {
        match src {
            CombineSource::Combined => combined.0[ch],
            CombineSource::Texel0 => self.texel0.0[ch],
            CombineSource::Texel1 => self.texel1.0[ch],
            CombineSource::Primitive => self.prim.0[ch],
            CombineSource::Shade => self.shade.0[ch],
            CombineSource::Environment => self.env.0[ch],
            CombineSource::One => 1.0,
            CombineSource::Zero => 0.0,
            CombineSource::Noise => self.noise,
            // YUV conversion constants do not take part in RGB combining
            CombineSource::Center | CombineSource::K4 | CombineSource::K5 => 0.0,
            CombineSource::Scale => 1.0,
            CombineSource::CombinedAlpha => combined.alpha(),
            CombineSource::Texel0Alpha => self.texel0.alpha(),
            CombineSource::Texel1Alpha => self.texel1.alpha(),
            CombineSource::PrimitiveAlpha => self.prim.alpha(),
            CombineSource::ShadeAlpha => self.shade.alpha(),
            CombineSource::EnvironmentAlpha => self.env.alpha(),
            CombineSource::LodFraction => self.lod_frac,
            CombineSource::PrimLodFraction => self.prim_lod_frac,
        }
    }

    /// Unclamped `(a - b) * c + d` in one channel
    pub fn equation(&self, eq: &Equation, combined: &Rgbaf, ch: usize) -> f32 {
        let v = |s| self.source(s, combined, ch);
        (v(eq.a) - v(eq.b)) * v(eq.c) + v(eq.d)
    }
}

/// Output of one RDP cycle
pub fn eval_cycle(color: &Equation, alpha: &Equation, inputs: &CombineInputs, combined: &Rgbaf) -> Rgbaf {
    let mut out = [0.0; 4];
    for (ch, v) in out.iter_mut().enumerate().take(3) {
        *v = inputs.equation(color, combined, ch);
    }
    out[3] = inputs.equation(alpha, combined, 3);
    Rgbaf(out).clamped()
}

/// Output of the RDP combiner for a cycle type
///
/// In one-cycle mode the first cycle runs alone and reads `Combined` as zero.
pub fn eval_mode(mode: &CombineMode, cycle: CycleType, inputs: &CombineInputs) -> Rgbaf {
    let first = eval_cycle(
        &mode.cycles[0].color,
        &mode.cycles[0].alpha,
        inputs,
        &Rgbaf::ZERO,
    );
    match cycle {
        CycleType::Two => eval_cycle(&mode.cycles[1].color, &mode.cycles[1].alpha, inputs, &first),
        _ => first,
    }
}

/// Inputs of the color and alpha units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UnitInputs {
    /// Texture unit chain output
    pub texture: Rgbaf,
    pub constant: Rgbaf,
    pub iterated: Rgbaf,
    pub lod: f32,
}

/// Inputs of one texture unit
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TmuInputs {
    /// The unit's own texel
    pub local: Rgbaf,
    /// Upstream unit output
    pub other: Rgbaf,
    pub constant: Rgbaf,
    pub lod: f32,
}

#[inline(always)]
fn function_value(function: CombineFunction, f: f32, local: f32, local_alpha: f32, other: f32) -> f32 {
    match function {
        CombineFunction::Zero => 0.0,
        CombineFunction::Local => local,
        CombineFunction::LocalAlpha => local_alpha,
        CombineFunction::ScaleOther => f * other,
        CombineFunction::ScaleOtherAddLocal => f * other + local,
        CombineFunction::ScaleOtherAddLocalAlpha => f * other + local_alpha,
        CombineFunction::ScaleOtherMinusLocal => f * (other - local),
        CombineFunction::ScaleOtherMinusLocalAddLocal => f * (other - local) + local,
        CombineFunction::ScaleOtherMinusLocalAddLocalAlpha => f * (other - local) + local_alpha,
        CombineFunction::ScaleMinusLocalAddLocal => local - f * local,
        CombineFunction::ScaleMinusLocalAddLocalAlpha => local_alpha - f * local,
    }
}

#[inline(always)]
fn factor_value(factor: CombineFactor, ch: usize, local: &Rgbaf, other: &Rgbaf, texture: &Rgbaf, lod: f32) -> f32 {
    match factor {
        CombineFactor::Zero => 0.0,
        CombineFactor::One => 1.0,
        CombineFactor::Local => local.0[ch],
        CombineFactor::OtherAlpha => other.alpha(),
        CombineFactor::LocalAlpha => local.alpha(),
        CombineFactor::TextureAlpha => texture.alpha(),
        CombineFactor::TextureRgb => texture.0[ch],
        CombineFactor::LodFraction => lod,
        CombineFactor::OneMinusLocal => 1.0 - local.0[ch],
        CombineFactor::OneMinusOtherAlpha => 1.0 - other.alpha(),
        CombineFactor::OneMinusLocalAlpha => 1.0 - local.alpha(),
        CombineFactor::OneMinusTextureAlpha => 1.0 - texture.alpha(),
        CombineFactor::OneMinusLodFraction => 1.0 - lod,
    }
}

/// Native color/alpha unit in channel `ch`, unclamped
pub fn native_unit(native: &NativeCombine, inputs: &UnitInputs, ch: usize) -> f32 {
    let local = match native.local {
        CombineLocal::Iterated => inputs.iterated,
        CombineLocal::Constant => inputs.constant,
    };
    let other = match native.other {
        CombineOther::Iterated => inputs.iterated,
        CombineOther::Texture => inputs.texture,
        CombineOther::Constant => inputs.constant,
    };
    let f = factor_value(native.factor, ch, &local, &other, &inputs.texture, inputs.lod);
    function_value(native.function, f, local.0[ch], local.alpha(), other.0[ch])
}

/// Native texture unit in channel `ch`, unclamped
///
/// A texture unit has no separate texture input: the texture factors read the
/// unit's own texel.
pub fn native_tmu(combine: &TexUnitCombine, inputs: &TmuInputs, ch: usize) -> f32 {
    let f = factor_value(
        combine.factor,
        ch,
        &inputs.local,
        &inputs.other,
        &inputs.local,
        inputs.lod,
    );
    let v = function_value(
        combine.function,
        f,
        inputs.local.0[ch],
        inputs.local.alpha(),
        inputs.other.0[ch],
    );
    if combine.invert {
        1.0 - v
    } else {
        v
    }
}

/// Operand values a combine extension can read
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExtInputs {
    pub texture: Rgbaf,
    pub constant: Rgbaf,
    pub iterated: Rgbaf,
    pub local_texture: Rgbaf,
    pub other_texture: Rgbaf,
    pub tmu_constant: Rgbaf,
    pub lod: f32,
}

impl From<&UnitInputs> for ExtInputs {
    fn from(inputs: &UnitInputs) -> Self {
        Self {
            texture: inputs.texture,
            constant: inputs.constant,
            iterated: inputs.iterated,
            lod: inputs.lod,
            ..Self::default()
        }
    }
}

impl From<&TmuInputs> for ExtInputs {
    fn from(inputs: &TmuInputs) -> Self {
        Self {
            local_texture: inputs.local,
            other_texture: inputs.other,
            tmu_constant: inputs.constant,
            lod: inputs.lod,
            ..Self::default()
        }
    }
}

impl ExtInputs {
    fn source(&self, src: ExtSource, ch: usize) -> f32 {
        match src {
            ExtSource::Zero | ExtSource::B => 0.0,
            ExtSource::TextureRgb => self.texture.0[ch],
            ExtSource::TextureAlpha => self.texture.alpha(),
            ExtSource::ConstantColor => self.constant.0[ch],
            ExtSource::ConstantAlpha => self.constant.alpha(),
            ExtSource::IteratedRgb => self.iterated.0[ch],
            ExtSource::IteratedAlpha => self.iterated.alpha(),
            ExtSource::LocalTextureRgb => self.local_texture.0[ch],
            ExtSource::LocalTextureAlpha => self.local_texture.alpha(),
            ExtSource::OtherTextureRgb => self.other_texture.0[ch],
            ExtSource::OtherTextureAlpha => self.other_texture.alpha(),
            ExtSource::TmuConstantColor => self.tmu_constant.0[ch],
            ExtSource::TmuConstantAlpha => self.tmu_constant.alpha(),
            ExtSource::LodFrac => self.lod,
        }
    }
}

#[inline(always)]
fn apply_mode(mode: FuncMode, x: f32) -> f32 {
    match mode {
        FuncMode::Zero => 0.0,
        FuncMode::X => x,
        FuncMode::OneMinusX => 1.0 - x,
        FuncMode::NegativeX => -x,
        FuncMode::XMinusHalf => x - 0.5,
    }
}

/// Combine extension in channel `ch`, unclamped
pub fn extension(ext: &CombineExt, inputs: &ExtInputs, ch: usize) -> f32 {
    let a = apply_mode(ext.a_mode, inputs.source(ext.a, ch));
    let b = apply_mode(ext.b_mode, inputs.source(ext.b, ch));
    let operand = |src: ExtSource, invert: bool| {
        let v = if src == ExtSource::B {
            b
        } else {
            inputs.source(src, ch)
        };
        if invert {
            1.0 - v
        } else {
            v
        }
    };
    let c = operand(ext.c, ext.c_invert);
    let d = operand(ext.d, ext.d_invert);
    let v = ((a + b) * c + d) * f32::from(1u8 << ext.shift.min(7));
    if ext.invert {
        1.0 - v
    } else {
        v
    }
}

fn unit_channel(channel: &ChannelCombine<NativeCombine>, inputs: &UnitInputs, ch: usize) -> f32 {
    match channel {
        ChannelCombine::Native(n) => native_unit(n, inputs, ch),
        ChannelCombine::Extension(e) => extension(e, &ExtInputs::from(inputs), ch),
    }
}

fn tmu_channel(channel: &ChannelCombine<TexUnitCombine>, inputs: &TmuInputs, ch: usize) -> f32 {
    match channel {
        ChannelCombine::Native(n) => native_tmu(n, inputs, ch),
        ChannelCombine::Extension(e) => extension(e, &ExtInputs::from(inputs), ch),
    }
}

/// Output of one texture unit, clamped
pub fn eval_tmu(unit: &TexUnitState, local: Rgbaf, other: Rgbaf, inputs: &CombineInputs) -> Rgbaf {
    let local = match unit.software_modifier() {
        Some(modifier) => tmod::apply_modifier(modifier, local, inputs.noise),
        None => local,
    };
    let tmu_inputs = TmuInputs {
        local,
        other,
        constant: Rgbaf::from_packed(unit.constant),
        lod: inputs.lod_frac,
    };
    let mut out = [0.0; 4];
    for (ch, v) in out.iter_mut().enumerate() {
        let channel = if ch < 3 { &unit.color } else { &unit.alpha };
        *v = tmu_channel(channel, &tmu_inputs, ch);
    }
    Rgbaf(out).clamped()
}

fn sampled(unit: &TexUnitState, inputs: &CombineInputs) -> Rgbaf {
    match unit.texel {
        Some(Texel::T0) => inputs.texel0,
        Some(Texel::T1) => inputs.texel1,
        None => Rgbaf::ZERO,
    }
}

/// Final color the derived state produces for the given inputs
///
/// Only `tmu_count` texture units take part; TMU1 feeds TMU0.
pub fn eval_state(state: &CombinerState, tmu_count: u8, inputs: &CombineInputs) -> Rgbaf {
    let upstream = if tmu_count > 1 {
        eval_tmu(
            &state.tmu[1],
            sampled(&state.tmu[1], inputs),
            Rgbaf::ZERO,
            inputs,
        )
    } else {
        Rgbaf::ZERO
    };
    let texture = eval_tmu(&state.tmu[0], sampled(&state.tmu[0], inputs), upstream, inputs);

    let unit_inputs = UnitInputs {
        texture,
        constant: Rgbaf::from_packed(state.ccolor),
        iterated: inputs.shade,
        lod: inputs.lod_frac,
    };
    let mut out = [0.0; 4];
    for (ch, v) in out.iter_mut().enumerate() {
        let channel = if ch < 3 { &state.color } else { &state.alpha };
        *v = unit_channel(channel, &unit_inputs, ch);
    }
    Rgbaf(out).clamped()
}
