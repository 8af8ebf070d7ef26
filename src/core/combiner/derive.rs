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

//! Combine derivation
//!
//! Turns a decoded RDP combine mode into Glide combiner state. Each lane
//! (color, alpha) is reduced to one effective equation, split between the
//! texture unit chain and the color/alpha unit, and every split is matched
//! numerically against the candidate Glide configurations:
//!
//! 1. native texture unit and native color/alpha unit
//! 2. a texture modifier on the unit sampling the texel (color lane only)
//! 3. the combine extension, when the hardware has it
//!
//! A lane nothing reproduces falls back to a texture/shade approximation.

use serde::{Deserialize, Serialize};

use super::eval::{self, CombineInputs, ExtInputs, Rgbaf, TmuInputs, UnitInputs};
use super::mode::{CombineMode, CombineSource, CycleMode, CycleType, Equation};
use super::tmod::{self, TexMod};
use super::types::{
    ChannelCombine, CombineExt, CombineFactor, CombineFunction, CombineLocal, CombineOther,
    CombinerState, ExtSource, FuncMode, NativeCombine, TexModifier, TexUnitCombine,
    TexUnitState, Texel, TextureUsage,
};
use crate::core::config::{Config, HardwareCaps};

const EPSILON: f32 = 1e-4;

/// RDP state read by the combine derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdpCombine {
    pub mode: CombineMode,
    pub cycle: CycleType,
    /// Primitive color (`0xRRGGBBAA`)
    pub prim_color: u32,
    /// Environment color (`0xRRGGBBAA`)
    pub env_color: u32,
    pub prim_lod_frac: u8,
}

impl RdpCombine {
    pub fn new(mode: CombineMode, cycle: CycleType) -> Self {
        Self {
            mode,
            cycle,
            prim_color: 0,
            env_color: 0,
            prim_lod_frac: 0,
        }
    }

    fn constant(&self, id: ConstId) -> u32 {
        match id {
            ConstId::Prim => self.prim_color,
            ConstId::Env => self.env_color,
            ConstId::PrimLodFrac => u32::from_be_bytes([self.prim_lod_frac; 4]),
        }
    }
}

/// Hardware and tuning the derivation targets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombineOptions {
    pub caps: HardwareCaps,
    /// Move every native channel onto the extension afterwards
    pub force_extension: bool,
    pub lod_bias: f32,
}

impl CombineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            caps: config.caps(),
            force_extension: config.combine.force_extension,
            lod_bias: config.combine.lod_bias,
        }
    }

    pub fn tmu_count(&self) -> usize {
        if self.caps.contains(HardwareCaps::DUAL_TMU) {
            2
        } else {
            1
        }
    }

    fn extension(&self) -> bool {
        self.caps.contains(HardwareCaps::COMBINE_EXT)
    }
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// How a lane ended up on the hardware
///
/// Ordered from most to least preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CombinePath {
    Native,
    TexMod,
    Extension,
    /// Not reproducible; a texture/shade approximation is used
    Approximate,
}

/// Result of one derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineOutcome {
    pub color: CombinePath,
    pub alpha: CombinePath,
    /// Render passes the mode needs on this hardware
    pub passes: u8,
}

impl CombineOutcome {
    /// Both lanes reproduce the RDP result
    pub fn is_exact(&self) -> bool {
        self.color != CombinePath::Approximate && self.alpha != CombinePath::Approximate
    }
}

/// Reset the combiner to its power-on state
pub fn init_combine(state: &mut CombinerState) {
    *state = CombinerState::default();
    log::debug!("Combiner reset");
}

/// Derive the blender state from other-mode low
pub fn combine_blender(state: &mut CombinerState, othermode_l: u32, cycle: CycleType) {
    state.blend = super::blender::BlendState::from_othermode(othermode_l, cycle);
}

/// Render passes a combine mode needs
///
/// One pass, plus one when a two-cycle chain cannot fold into a single
/// texture unit stage, plus one when both texels are sampled on a single
/// texture unit.
pub fn count_combine(mode: &CombineMode, cycle: CycleType, caps: HardwareCaps) -> u8 {
    let mut passes = 1;
    let mut used = [false; 2];
    for lane in [Lane::Color, Lane::Alpha] {
        let (eq, chain) = effective(mode, cycle, lane);
        if let Some(first) = chain {
            let foldable = first.operands().iter().all(|&s| tmu_computable(s));
            if !foldable || eq.texels() != [false, false] {
                passes = 2;
            }
            merge(&mut used, first.texels());
        }
        merge(&mut used, eq.texels());
    }
    if used == [true, true] && !caps.contains(HardwareCaps::DUAL_TMU) {
        passes += 1;
    }
    passes
}

/// Derive the Glide combiner state for one draw
///
/// Replaces everything in `state` except the blender.
pub fn combine(state: &mut CombinerState, rdp: &RdpCombine, options: &CombineOptions) -> CombineOutcome {
    let deriver = Deriver { rdp, options };
    let mode = &rdp.mode;

    let (mut color_eq, mut color_chain) = effective(mode, rdp.cycle, Lane::Color);
    let (mut alpha_eq, mut alpha_chain) = effective(mode, rdp.cycle, Lane::Alpha);
    let mut chain_alpha = first_cycle(mode, Lane::Alpha);

    let lane_texels = |eq: &Equation, chain: &Option<Equation>| {
        let mut used = eq.texels();
        if let Some(first) = chain {
            merge(&mut used, first.texels());
        }
        used
    };
    let color_used = lane_texels(&color_eq, &color_chain);
    let alpha_used = lane_texels(&alpha_eq, &alpha_chain);
    let mut used = color_used;
    merge(&mut used, alpha_used);

    let mut fresh = CombinerState {
        blend: state.blend,
        ..CombinerState::default()
    };
    fresh.tex.set(TextureUsage::TEXEL0, used[0]);
    fresh.tex.set(TextureUsage::TEXEL1, used[1]);
    for unit in fresh.tmu.iter_mut() {
        unit.lod_bias = options.lod_bias;
    }

    let folded = options.tmu_count() == 1 && used == [true, true];
    if options.tmu_count() > 1 {
        fresh.tmu[0].texel = used[0].then_some(Texel::T0);
        fresh.tmu[1].texel = used[1].then_some(Texel::T1);
    } else if used[0] {
        fresh.tmu[0].texel = Some(Texel::T0);
    } else if used[1] {
        fresh.tmu[0].texel = Some(Texel::T1);
    }
    if folded {
        log::debug!("Both texels on one texture unit; texel 1 sampled as texel 0");
        let fold = |eq: &Equation| eq.map(fold_texel1);
        color_eq = fold(&color_eq);
        alpha_eq = fold(&alpha_eq);
        color_chain = color_chain.as_ref().map(fold);
        alpha_chain = alpha_chain.as_ref().map(fold);
        chain_alpha = fold(&chain_alpha);
    }

    let work = Work {
        state: fresh,
        slots: Slots::default(),
        tmu_slots: [Slots::default(); 2],
        alpha_tmu: None,
    };
    let (work, mut alpha) = deriver.derive_lane(Lane::Alpha, &alpha_eq, alpha_chain.as_ref(), &chain_alpha, &work);
    let (work, mut color) = deriver.derive_lane(Lane::Color, &color_eq, color_chain.as_ref(), &chain_alpha, &work);

    let mut result = work.state;
    result.ccolor = work.slots.packed(rdp);
    for (unit, slots) in result.tmu.iter_mut().zip(work.tmu_slots.iter()) {
        if !slots.is_empty() {
            unit.constant = slots.packed(rdp);
        }
    }

    if options.force_extension && options.extension() {
        force_extension(&mut result, &work.tmu_slots, rdp, options.tmu_count());
    }

    if folded {
        if color_used != [false, false] {
            color = CombinePath::Approximate;
        }
        if alpha_used != [false, false] {
            alpha = CombinePath::Approximate;
        }
    }

    *state = result;
    let outcome = CombineOutcome {
        color,
        alpha,
        passes: count_combine(mode, rdp.cycle, options.caps),
    };
    log::debug!(
        "Combine {:?}: color {:?} alpha {:?}, {} pass(es)",
        rdp.cycle,
        outcome.color,
        outcome.alpha,
        outcome.passes
    );
    outcome
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lane {
    Color,
    Alpha,
}

impl Lane {
    fn channels(self) -> std::ops::Range<usize> {
        match self {
            Lane::Color => 0..3,
            Lane::Alpha => 3..4,
        }
    }

    fn of(self, cycle: &CycleMode) -> Equation {
        match self {
            Lane::Color => cycle.color,
            Lane::Alpha => cycle.alpha,
        }
    }
}

fn merge(used: &mut [bool; 2], other: [bool; 2]) {
    used[0] |= other[0];
    used[1] |= other[1];
}

fn fold_texel1(s: CombineSource) -> CombineSource {
    match s {
        CombineSource::Texel1 => CombineSource::Texel0,
        CombineSource::Texel1Alpha => CombineSource::Texel0Alpha,
        other => other,
    }
}

/// Sources a texture unit can read
fn tmu_computable(s: CombineSource) -> bool {
    !s.is_shade()
        && !s.is_combined()
        && !matches!(
            s,
            CombineSource::Noise
                | CombineSource::Center
                | CombineSource::K4
                | CombineSource::Scale
                | CombineSource::K5
        )
}

/// First cycle of a lane; the previous-cycle input reads zero
fn first_cycle(mode: &CombineMode, lane: Lane) -> Equation {
    lane.of(&mode.cycles[0])
        .map(|s| if s.is_combined() { CombineSource::Zero } else { s })
        .simplify()
}

/// Effective equation of a lane plus the first cycle it chains onto
fn effective(mode: &CombineMode, cycle: CycleType, lane: Lane) -> (Equation, Option<Equation>) {
    match cycle {
        CycleType::One => (first_cycle(mode, lane), None),
        CycleType::Two => {
            let first = first_cycle(mode, lane);
            let second = lane.of(&mode.cycles[1]).simplify();
            if second.is_combined_pass() {
                (first, None)
            } else if !second.uses_combined() {
                (second, None)
            } else {
                (second, Some(first))
            }
        }
        // Copy blits texel 0
        CycleType::Copy => (Equation::pass(CombineSource::Texel0), None),
        // Fill rectangles carry their color as the iterated color
        CycleType::Fill => (Equation::pass(CombineSource::Shade), None),
    }
}

/// Move every native channel onto the extension
///
/// A software texture modifier only moves onto its unit when its constant
/// agrees with what the unit constant already holds for the derived lanes.
fn force_extension(state: &mut CombinerState, tmu_slots: &[Slots; 2], rdp: &RdpCombine, tmu_count: usize) {
    state.color_combiner_to_extension();
    state.alpha_combiner_to_extension();
    for (tmu, slots) in tmu_slots.iter().enumerate().take(tmu_count) {
        let pending = state.tmu[tmu].software_modifier().map(tmod::unit_constant);
        let result = match pending {
            Some(constant) if !slots.admits(rdp, constant) => {
                log::debug!("TMU{}: modifier constant {:08X} conflicts with claimed constant", tmu, constant);
                Ok(())
            }
            _ => state.tex_color_combiner_to_extension(tmu).map(|_| ()),
        };
        if let Err(err) = result.and_then(|_| state.tex_alpha_combiner_to_extension(tmu)) {
            log::warn!("Forcing extension: {}", err);
        }
    }
}

/// RDP constant a Glide constant slot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConstId {
    Prim,
    Env,
    PrimLodFrac,
}

/// Claims on one Glide constant color register
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Slots {
    rgb: Option<ConstId>,
    alpha: Option<ConstId>,
}

impl Slots {
    fn claim(slot: &mut Option<ConstId>, id: ConstId) -> bool {
        match *slot {
            None => {
                *slot = Some(id);
                true
            }
            Some(held) => held == id,
        }
    }

    fn claim_rgb(&mut self, id: ConstId) -> bool {
        Self::claim(&mut self.rgb, id)
    }

    fn claim_alpha(&mut self, id: ConstId) -> bool {
        Self::claim(&mut self.alpha, id)
    }

    /// `constant` leaves every claimed part of the register unchanged
    fn admits(&self, rdp: &RdpCombine, constant: u32) -> bool {
        let rgb = self.rgb.map_or(true, |id| (rdp.constant(id) ^ constant) & 0xFFFF_FF00 == 0);
        let alpha = self.alpha.map_or(true, |id| (rdp.constant(id) ^ constant) & 0xFF == 0);
        rgb && alpha
    }

    fn is_empty(&self) -> bool {
        self.rgb.is_none() && self.alpha.is_none()
    }

    fn packed(&self, rdp: &RdpCombine) -> u32 {
        let rgb = self.rgb.map_or(0, |id| rdp.constant(id)) & 0xFFFF_FF00;
        let alpha = self.alpha.map_or(0, |id| rdp.constant(id)) & 0xFF;
        rgb | alpha
    }
}

/// Operand of a lane equation once mapped onto Glide inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term {
    Zero,
    One,
    Texture,
    TextureAlpha,
    Shade,
    ShadeAlpha,
    Constant,
    ConstantAlpha,
    Lod,
    Local,
    LocalAlpha,
    Other,
    OtherAlpha,
}

#[derive(Debug, Clone, Copy)]
struct TermEq {
    a: Term,
    b: Term,
    c: Term,
    d: Term,
}

impl TermEq {
    fn uses(&self, term: Term) -> bool {
        [self.a, self.b, self.c, self.d].contains(&term)
    }

    fn value(&self, s: &Sample, ch: usize) -> f32 {
        (s.term(self.a, ch) - s.term(self.b, ch)) * s.term(self.c, ch) + s.term(self.d, ch)
    }
}

/// Generic input values for matching Glide configurations
#[derive(Debug, Clone, Copy)]
struct Sample {
    texture: Rgbaf,
    shade: Rgbaf,
    constant: Rgbaf,
    local: Rgbaf,
    other: Rgbaf,
    lod: f32,
}

impl Sample {
    fn term(&self, term: Term, ch: usize) -> f32 {
        match term {
            Term::Zero => 0.0,
            Term::One => 1.0,
            Term::Texture => self.texture.0[ch],
            Term::TextureAlpha => self.texture.alpha(),
            Term::Shade => self.shade.0[ch],
            Term::ShadeAlpha => self.shade.alpha(),
            Term::Constant => self.constant.0[ch],
            Term::ConstantAlpha => self.constant.alpha(),
            Term::Lod => self.lod,
            Term::Local => self.local.0[ch],
            Term::LocalAlpha => self.local.alpha(),
            Term::Other => self.other.0[ch],
            Term::OtherAlpha => self.other.alpha(),
        }
    }

    fn unit_inputs(&self) -> UnitInputs {
        UnitInputs {
            texture: self.texture,
            constant: self.constant,
            iterated: self.shade,
            lod: self.lod,
        }
    }

    fn tmu_inputs(&self) -> TmuInputs {
        TmuInputs {
            local: self.local,
            other: self.other,
            constant: self.constant,
            lod: self.lod,
        }
    }
}

const SAMPLES: [Sample; 4] = [
    Sample {
        texture: Rgbaf([0.13, 0.71, 0.42, 0.36]),
        shade: Rgbaf([0.58, 0.27, 0.83, 0.64]),
        constant: Rgbaf([0.91, 0.34, 0.19, 0.47]),
        local: Rgbaf([0.22, 0.66, 0.39, 0.81]),
        other: Rgbaf([0.74, 0.08, 0.55, 0.29]),
        lod: 0.61,
    },
    Sample {
        texture: Rgbaf([0.87, 0.31, 0.65, 0.12]),
        shade: Rgbaf([0.17, 0.93, 0.41, 0.26]),
        constant: Rgbaf([0.36, 0.77, 0.58, 0.83]),
        local: Rgbaf([0.69, 0.14, 0.92, 0.37]),
        other: Rgbaf([0.28, 0.59, 0.16, 0.72]),
        lod: 0.23,
    },
    Sample {
        texture: Rgbaf([0.44, 0.09, 0.78, 0.95]),
        shade: Rgbaf([0.71, 0.52, 0.06, 0.39]),
        constant: Rgbaf([0.05, 0.62, 0.88, 0.21]),
        local: Rgbaf([0.97, 0.45, 0.24, 0.08]),
        other: Rgbaf([0.12, 0.86, 0.67, 0.54]),
        lod: 0.84,
    },
    Sample {
        texture: Rgbaf([0.26, 0.58, 0.97, 0.68]),
        shade: Rgbaf([0.39, 0.15, 0.72, 0.91]),
        constant: Rgbaf([0.64, 0.29, 0.11, 0.57]),
        local: Rgbaf([0.33, 0.79, 0.51, 0.46]),
        other: Rgbaf([0.89, 0.37, 0.04, 0.63]),
        lod: 0.42,
    },
];

const INPUT_SAMPLES: [CombineInputs; 4] = [
    CombineInputs {
        texel0: Rgbaf([0.31, 0.76, 0.18, 0.53]),
        texel1: Rgbaf([0.67, 0.24, 0.85, 0.14]),
        shade: Rgbaf([0.48, 0.92, 0.33, 0.71]),
        prim: Rgbaf([0.83, 0.11, 0.59, 0.38]),
        env: Rgbaf([0.16, 0.63, 0.27, 0.88]),
        lod_frac: 0.57,
        prim_lod_frac: 0.34,
        noise: 0.72,
    },
    CombineInputs {
        texel0: Rgbaf([0.92, 0.37, 0.61, 0.26]),
        texel1: Rgbaf([0.08, 0.55, 0.43, 0.79]),
        shade: Rgbaf([0.21, 0.14, 0.96, 0.47]),
        prim: Rgbaf([0.39, 0.68, 0.02, 0.91]),
        env: Rgbaf([0.75, 0.29, 0.81, 0.19]),
        lod_frac: 0.13,
        prim_lod_frac: 0.86,
        noise: 0.41,
    },
    CombineInputs {
        texel0: Rgbaf([0.05, 0.49, 0.94, 0.82]),
        texel1: Rgbaf([0.73, 0.18, 0.36, 0.57]),
        shade: Rgbaf([0.62, 0.81, 0.09, 0.33]),
        prim: Rgbaf([0.27, 0.45, 0.77, 0.06]),
        env: Rgbaf([0.54, 0.97, 0.12, 0.65]),
        lod_frac: 0.92,
        prim_lod_frac: 0.19,
        noise: 0.08,
    },
    CombineInputs {
        texel0: Rgbaf([0.64, 0.22, 0.47, 0.11]),
        texel1: Rgbaf([0.35, 0.89, 0.58, 0.96]),
        shade: Rgbaf([0.87, 0.43, 0.52, 0.24]),
        prim: Rgbaf([0.58, 0.93, 0.31, 0.69]),
        env: Rgbaf([0.03, 0.38, 0.66, 0.44]),
        lod_frac: 0.36,
        prim_lod_frac: 0.62,
        noise: 0.95,
    },
];

/// `f` matches `target` on every sample in the lane's channels
fn equivalent(lane: Lane, target: &TermEq, f: impl Fn(&Sample, usize) -> f32) -> bool {
    SAMPLES
        .iter()
        .all(|s| lane.channels().all(|ch| (target.value(s, ch) - f(s, ch)).abs() < EPSILON))
}

/// Two RDP equations agree in alpha
fn same_alpha(x: &Equation, y: &Equation) -> bool {
    INPUT_SAMPLES.iter().all(|s| {
        (s.equation(x, &Rgbaf::ZERO, 3) - s.equation(y, &Rgbaf::ZERO, 3)).abs() < EPSILON
    })
}

fn map_eq(eq: &Equation, mut f: impl FnMut(CombineSource) -> Option<Term>) -> Option<TermEq> {
    let eq = eq.simplify();
    Some(TermEq {
        a: f(eq.a)?,
        b: f(eq.b)?,
        c: f(eq.c)?,
        d: f(eq.d)?,
    })
}

/// Extension computing `target`; `source` maps terms onto operand sources
fn build_ext(target: &TermEq, source: impl Fn(Term) -> Option<ExtSource>) -> Option<CombineExt> {
    let (a, a_mode) = match target.a {
        Term::Zero => (ExtSource::Zero, FuncMode::Zero),
        Term::One => (ExtSource::Zero, FuncMode::OneMinusX),
        t => (source(t)?, FuncMode::X),
    };
    let (b, b_mode) = match target.b {
        Term::Zero => (ExtSource::Zero, FuncMode::Zero),
        Term::One => return None,
        t => (source(t)?, FuncMode::NegativeX),
    };
    let operand = |t: Term| match t {
        Term::One => Some((ExtSource::Zero, true)),
        t => Some((source(t)?, false)),
    };
    let (c, c_invert) = operand(target.c)?;
    let (d, d_invert) = operand(target.d)?;
    Some(CombineExt {
        a,
        a_mode,
        b,
        b_mode,
        c,
        c_invert,
        d,
        d_invert,
        shift: 0,
        invert: false,
    })
}

fn unit_source(lane: Lane, term: Term) -> Option<ExtSource> {
    let alpha = lane == Lane::Alpha;
    let pick = |rgb: ExtSource, a: ExtSource| if alpha { a } else { rgb };
    Some(match term {
        Term::Zero => ExtSource::Zero,
        Term::Texture => pick(ExtSource::TextureRgb, ExtSource::TextureAlpha),
        Term::TextureAlpha => ExtSource::TextureAlpha,
        Term::Shade => pick(ExtSource::IteratedRgb, ExtSource::IteratedAlpha),
        Term::ShadeAlpha => ExtSource::IteratedAlpha,
        Term::Constant => pick(ExtSource::ConstantColor, ExtSource::ConstantAlpha),
        Term::ConstantAlpha => ExtSource::ConstantAlpha,
        Term::Lod => ExtSource::LodFrac,
        _ => return None,
    })
}

fn tmu_source(lane: Lane, term: Term) -> Option<ExtSource> {
    let alpha = lane == Lane::Alpha;
    let pick = |rgb: ExtSource, a: ExtSource| if alpha { a } else { rgb };
    Some(match term {
        Term::Zero => ExtSource::Zero,
        Term::Local => pick(ExtSource::LocalTextureRgb, ExtSource::LocalTextureAlpha),
        Term::LocalAlpha => ExtSource::LocalTextureAlpha,
        Term::Other => pick(ExtSource::OtherTextureRgb, ExtSource::OtherTextureAlpha),
        Term::OtherAlpha => ExtSource::OtherTextureAlpha,
        Term::Constant => pick(ExtSource::TmuConstantColor, ExtSource::TmuConstantAlpha),
        Term::ConstantAlpha => ExtSource::TmuConstantAlpha,
        Term::Lod => ExtSource::LodFrac,
        _ => return None,
    })
}

/// Constant claim for a color source in a lane
fn claim_constant(lane: Lane, src: CombineSource, slots: &mut Slots) -> Option<Term> {
    let (id, alpha_only) = match src {
        CombineSource::Primitive => (ConstId::Prim, false),
        CombineSource::Environment => (ConstId::Env, false),
        CombineSource::PrimitiveAlpha => (ConstId::Prim, true),
        CombineSource::EnvironmentAlpha => (ConstId::Env, true),
        CombineSource::PrimLodFraction => (ConstId::PrimLodFrac, true),
        _ => return None,
    };
    if alpha_only {
        return slots.claim_alpha(id).then_some(Term::ConstantAlpha);
    }
    let claimed = match lane {
        Lane::Color => slots.claim_rgb(id),
        Lane::Alpha => slots.claim_alpha(id),
    };
    claimed.then_some(Term::Constant)
}

fn set_tmu_lane(unit: &mut TexUnitState, lane: Lane, combine: ChannelCombine<TexUnitCombine>) {
    match lane {
        Lane::Color => unit.color = combine,
        Lane::Alpha => unit.alpha = combine,
    }
}

fn set_unit_lane(state: &mut CombinerState, lane: Lane, combine: ChannelCombine<NativeCombine>) {
    match lane {
        Lane::Color => state.color = combine,
        Lane::Alpha => state.alpha = combine,
    }
}

/// Partially derived state, copied for every attempt
#[derive(Debug, Clone, Copy)]
struct Work {
    state: CombinerState,
    /// Constant color register claims
    slots: Slots,
    /// Texture unit constant claims
    tmu_slots: [Slots; 2],
    /// Alpha expression the texture unit chain produces
    alpha_tmu: Option<Equation>,
}

/// One way of splitting a lane between texture units and the color/alpha unit
#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// Expression for the texture unit chain
    tmu: Option<Equation>,
    /// Expression for the color/alpha unit; `Combined` reads the chain output
    main: Equation,
    /// Alpha `CombinedAlpha` stands for in `main`
    expected_alpha: Option<Equation>,
}

impl Candidate {
    /// The whole lane computed by the texture units
    fn whole(eq: Equation) -> Self {
        Self {
            tmu: Some(eq),
            main: Equation::pass(CombineSource::Combined),
            expected_alpha: Some(eq),
        }
    }
}

struct Deriver<'a> {
    rdp: &'a RdpCombine,
    options: &'a CombineOptions,
}

impl Deriver<'_> {
    fn unit_of(&self, state: &CombinerState, texel: Texel) -> Option<usize> {
        (0..self.options.tmu_count()).find(|&i| state.tmu[i].texel == Some(texel))
    }

    fn unit_term(&self, lane: Lane, src: CombineSource, slots: &mut Slots) -> Option<Term> {
        Some(match src {
            CombineSource::Combined => Term::Texture,
            CombineSource::CombinedAlpha => Term::TextureAlpha,
            CombineSource::Shade => Term::Shade,
            CombineSource::ShadeAlpha => Term::ShadeAlpha,
            CombineSource::One => Term::One,
            CombineSource::Zero => Term::Zero,
            CombineSource::LodFraction => Term::Lod,
            other => return claim_constant(lane, other, slots),
        })
    }

    fn tmu_term(&self, lane: Lane, src: CombineSource, slots: &mut Slots, state: &CombinerState) -> Option<Term> {
        let texel = match src {
            CombineSource::Texel0 | CombineSource::Texel0Alpha => Some(Texel::T0),
            CombineSource::Texel1 | CombineSource::Texel1Alpha => Some(Texel::T1),
            _ => None,
        };
        if let Some(texel) = texel {
            let alpha = matches!(src, CombineSource::Texel0Alpha | CombineSource::Texel1Alpha);
            return match (self.unit_of(state, texel)?, alpha) {
                (0, false) => Some(Term::Local),
                (0, true) => Some(Term::LocalAlpha),
                (_, false) => Some(Term::Other),
                (_, true) => Some(Term::OtherAlpha),
            };
        }
        Some(match src {
            CombineSource::One => Term::One,
            CombineSource::Zero => Term::Zero,
            CombineSource::LodFraction => Term::Lod,
            other => return claim_constant(lane, other, slots),
        })
    }

    fn native_unit(&self, lane: Lane, target: &TermEq) -> Option<NativeCombine> {
        for function in CombineFunction::ALL {
            for factor in CombineFactor::UNIT {
                for local in CombineLocal::ALL {
                    for other in CombineOther::ALL {
                        let native = NativeCombine {
                            function,
                            factor,
                            local,
                            other,
                        };
                        if equivalent(lane, target, |s, ch| eval::native_unit(&native, &s.unit_inputs(), ch)) {
                            return Some(native);
                        }
                    }
                }
            }
        }
        None
    }

    fn native_tmu(&self, lane: Lane, target: &TermEq) -> Option<TexUnitCombine> {
        for function in CombineFunction::ALL {
            for factor in CombineFactor::TMU {
                for invert in [false, true] {
                    let combine = TexUnitCombine {
                        function,
                        factor,
                        invert,
                    };
                    if equivalent(lane, target, |s, ch| eval::native_tmu(&combine, &s.tmu_inputs(), ch)) {
                        return Some(combine);
                    }
                }
            }
        }
        None
    }

    /// Place `x` on the texture unit chain
    fn solve_tmu(&self, lane: Lane, x: &Equation, work: &Work, allow_ext: bool) -> Option<(Work, CombinePath)> {
        let mut slots = work.tmu_slots[0];
        let target = map_eq(x, |s| self.tmu_term(lane, s, &mut slots, &work.state));

        if let Some(native) = target.as_ref().and_then(|t| self.native_tmu(lane, t)) {
            let mut next = *work;
            set_tmu_lane(&mut next.state.tmu[0], lane, ChannelCombine::Native(native));
            return Some((next, CombinePath::Native));
        }

        if lane == Lane::Color {
            if let Some(next) = self.solve_tmod(x, work) {
                return Some((next, CombinePath::TexMod));
            }
        }

        if !allow_ext {
            return None;
        }
        let target = target?;
        let ext = build_ext(&target, |t| tmu_source(lane, t))?;
        let verified = equivalent(lane, &target, |s, ch| {
            eval::extension(&ext, &ExtInputs::from(&s.tmu_inputs()), ch)
        });
        if !verified {
            return None;
        }
        let mut next = *work;
        next.tmu_slots[0] = slots;
        set_tmu_lane(&mut next.state.tmu[0], lane, ChannelCombine::Extension(ext));
        Some((next, CombinePath::Extension))
    }

    /// Fold `x` into a texture modifier on the unit sampling its texel
    fn solve_tmod(&self, x: &Equation, work: &Work) -> Option<Work> {
        let eq = x.simplify();
        let texel = match eq.texels() {
            [true, false] => Texel::T0,
            [false, true] => Texel::T1,
            _ => return None,
        };
        let foldable = eq
            .operands()
            .iter()
            .all(|&s| !s.is_shade() && !s.is_combined() && s != CombineSource::LodFraction);
        if !foldable {
            return None;
        }
        let unit = self.unit_of(&work.state, texel)?;
        let (mode, [c, c1, c2, f]) = self.match_tmod(&eq, texel)?;

        let mut next = *work;
        next.state.tmu[unit].modifier = TexModifier {
            mode: Some(mode),
            color: self.rdp.constant(c),
            color1: self.rdp.constant(c1),
            color2: self.rdp.constant(c2),
            factor: (self.rdp.constant(f) & 0xFF) as u8,
        };
        set_tmu_lane(&mut next.state.tmu[unit], Lane::Color, ChannelCombine::Native(TexUnitCombine::LOCAL));
        if unit == 1 {
            set_tmu_lane(&mut next.state.tmu[0], Lane::Color, ChannelCombine::Native(TexUnitCombine::OTHER));
        }

        if self.options.extension() && mode.to_extension().is_some() {
            let mut slots = next.tmu_slots[unit];
            let claimed = (!mode.uses_color() || slots.claim_rgb(c)) && (!mode.uses_factor() || slots.claim_alpha(f));
            if claimed && matches!(next.state.tex_color_combiner_to_extension(unit), Ok(true)) {
                next.tmu_slots[unit] = slots;
            }
        }
        log::trace!("TMU{}: modifier {:?}", unit, mode);
        Some(next)
    }

    /// Modifier and constants reproducing `eq` in RGB
    fn match_tmod(&self, eq: &Equation, texel: Texel) -> Option<(TexMod, [ConstId; 4])> {
        const COLORS: [ConstId; 2] = [ConstId::Prim, ConstId::Env];
        const FACTORS: [ConstId; 3] = [ConstId::Prim, ConstId::Env, ConstId::PrimLodFrac];

        let color = |s: &CombineInputs, id: ConstId| match id {
            ConstId::Prim => s.prim,
            ConstId::Env => s.env,
            ConstId::PrimLodFrac => Rgbaf::splat(s.prim_lod_frac),
        };
        let t = |s: &CombineInputs| match texel {
            Texel::T0 => s.texel0,
            Texel::T1 => s.texel1,
        };
        let pick = |used: bool, all: &'static [ConstId]| if used { all } else { &all[..1] };

        // Encodable modifiers first when they can run on the unit
        let encodable = self.options.extension();
        let modes = TexMod::ALL
            .iter()
            .filter(|m| m.to_extension().is_some() == encodable)
            .chain(TexMod::ALL.iter().filter(|m| m.to_extension().is_some() != encodable));

        for &mode in modes {
            for &c in pick(mode.uses_color(), &COLORS) {
                for &c1 in pick(mode.uses_color1(), &COLORS) {
                    for &c2 in pick(mode.uses_color2(), &COLORS) {
                        for &f in pick(mode.uses_factor(), &FACTORS) {
                            let matched = INPUT_SAMPLES.iter().all(|s| {
                                let v = mode.evaluate(
                                    t(s),
                                    color(s, c),
                                    color(s, c1),
                                    color(s, c2),
                                    color(s, f).alpha(),
                                    s.noise,
                                );
                                (0..3).all(|ch| (s.equation(eq, &Rgbaf::ZERO, ch) - v.0[ch]).abs() < EPSILON)
                            });
                            if matched {
                                return Some((mode, [c, c1, c2, f]));
                            }
                        }
                    }
                }
            }
        }
        None
    }

    /// Make the chain's alpha output equal `expected`
    fn texture_alpha(&self, expected: &Equation, work: Work) -> Option<Work> {
        match work.alpha_tmu {
            Some(produced) => same_alpha(&produced, expected).then_some(work),
            None => {
                let (mut next, _) = self.solve_tmu(Lane::Alpha, expected, &work, false)?;
                next.alpha_tmu = Some(*expected);
                Some(next)
            }
        }
    }

    /// Place `main` on the color or alpha unit
    fn solve_unit(
        &self,
        lane: Lane,
        main: &Equation,
        expected_alpha: Option<&Equation>,
        work: &Work,
        allow_ext: bool,
    ) -> Option<(Work, CombinePath)> {
        let mut slots = work.slots;
        let target = map_eq(main, |s| self.unit_term(lane, s, &mut slots))?;

        let mut next = *work;
        if lane == Lane::Color && target.uses(Term::TextureAlpha) {
            next = self.texture_alpha(expected_alpha?, next)?;
        }

        if let Some(native) = self.native_unit(lane, &target) {
            next.slots = slots;
            set_unit_lane(&mut next.state, lane, ChannelCombine::Native(native));
            return Some((next, CombinePath::Native));
        }

        if !allow_ext {
            return None;
        }
        let ext = build_ext(&target, |t| unit_source(lane, t))?;
        let verified = equivalent(lane, &target, |s, ch| {
            eval::extension(&ext, &ExtInputs::from(&s.unit_inputs()), ch)
        });
        if !verified {
            return None;
        }
        next.slots = slots;
        set_unit_lane(&mut next.state, lane, ChannelCombine::Extension(ext));
        Some((next, CombinePath::Extension))
    }

    fn solve_candidate(&self, lane: Lane, candidate: &Candidate, work: &Work, allow_ext: bool) -> Option<(Work, CombinePath)> {
        let (placed, tmu_path) = match &candidate.tmu {
            Some(x) => self.solve_tmu(lane, x, work, allow_ext)?,
            None => (*work, CombinePath::Native),
        };
        let (mut done, main_path) =
            self.solve_unit(lane, &candidate.main, candidate.expected_alpha.as_ref(), &placed, allow_ext)?;
        if lane == Lane::Alpha {
            done.alpha_tmu = candidate.tmu;
        }
        Some((done, tmu_path.max(main_path)))
    }

    fn candidates(&self, eq: &Equation, chain: Option<&Equation>, chain_alpha: &Equation) -> [Option<Candidate>; 2] {
        let eq = eq.simplify();
        if let Some(first) = chain {
            // The chain output is only reachable from a texel-free second cycle
            if eq.texels() != [false, false] {
                return [None, None];
            }
            let chained = Candidate {
                tmu: Some(*first),
                main: eq,
                expected_alpha: Some(*chain_alpha),
            };
            return [Some(chained), None];
        }

        match eq.texels() {
            [false, false] => [
                Some(Candidate {
                    tmu: None,
                    main: eq,
                    expected_alpha: None,
                }),
                None,
            ],
            [true, true] => [Some(Candidate::whole(eq)), None],
            used => {
                let (texel, texel_alpha) = if used[0] {
                    (CombineSource::Texel0, CombineSource::Texel0Alpha)
                } else {
                    (CombineSource::Texel1, CombineSource::Texel1Alpha)
                };
                let main = eq.map(|s| {
                    if s == texel {
                        CombineSource::Combined
                    } else if s == texel_alpha {
                        CombineSource::CombinedAlpha
                    } else {
                        s
                    }
                });
                let split = Candidate {
                    tmu: Some(Equation::pass(texel)),
                    main,
                    expected_alpha: Some(Equation::pass(texel)),
                };
                let whole = (!eq.uses_shade()).then(|| Candidate::whole(eq));
                [Some(split), whole]
            }
        }
    }

    fn derive_lane(
        &self,
        lane: Lane,
        eq: &Equation,
        chain: Option<&Equation>,
        chain_alpha: &Equation,
        work: &Work,
    ) -> (Work, CombinePath) {
        let candidates = self.candidates(eq, chain, chain_alpha);
        let rounds: &[bool] = if self.options.extension() {
            &[false, true]
        } else {
            &[false]
        };
        for &allow_ext in rounds {
            for candidate in candidates.iter().flatten() {
                if let Some(found) = self.solve_candidate(lane, candidate, work, allow_ext) {
                    return found;
                }
            }
        }
        (self.approximate(lane, eq, chain, work), CombinePath::Approximate)
    }

    /// Texture/shade modulation covering the lane's inputs
    fn approximate(&self, lane: Lane, eq: &Equation, chain: Option<&Equation>, work: &Work) -> Work {
        let mut next = *work;
        let mut used = eq.texels();
        let mut shaded = eq.uses_shade();
        if let Some(first) = chain {
            merge(&mut used, first.texels());
            shaded |= first.uses_shade();
        }
        let textured = used != [false, false];

        if textured {
            let (texel, source) = if used[0] {
                (Texel::T0, CombineSource::Texel0)
            } else {
                (Texel::T1, CombineSource::Texel1)
            };
            let combine = match self.unit_of(&next.state, texel) {
                Some(1) => TexUnitCombine::OTHER,
                _ => TexUnitCombine::LOCAL,
            };
            set_tmu_lane(&mut next.state.tmu[0], lane, ChannelCombine::Native(combine));
            if lane == Lane::Alpha {
                next.alpha_tmu = Some(Equation::pass(source));
            }
        }

        let native = match (textured, shaded) {
            (true, true) => NativeCombine {
                function: CombineFunction::ScaleOther,
                factor: CombineFactor::Local,
                local: CombineLocal::Iterated,
                other: CombineOther::Texture,
            },
            (true, false) => NativeCombine::TEXTURE,
            _ => NativeCombine::ITERATED,
        };
        set_unit_lane(&mut next.state, lane, ChannelCombine::Native(native));
        log::debug!("{:?} lane {:?} approximated", lane, eq);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// TMU0 with a pending `t * f + f` modifier and an alpha extension that
    /// reads the unit constant alpha
    fn modifier_with_alpha_claim(factor: u8) -> CombinerState {
        let mut state = CombinerState::default();
        let unit = &mut state.tmu[0];
        unit.modifier = TexModifier {
            mode: Some(TexMod::TexScaleFacAddFac),
            factor,
            ..TexModifier::default()
        };
        unit.alpha = ChannelCombine::Extension(CombineExt {
            a: ExtSource::TmuConstantAlpha,
            a_mode: FuncMode::X,
            c_invert: true,
            ..CombineExt::default()
        });
        unit.constant = 0x0000_0040;
        state
    }

    fn env_alpha_claim() -> [Slots; 2] {
        [
            Slots {
                rgb: None,
                alpha: Some(ConstId::Env),
            },
            Slots::default(),
        ]
    }

    #[test]
    fn test_slots_admit_matching_constants() {
        let mut rdp = RdpCombine::new(CombineMode::from_words(0, 0), CycleType::One);
        rdp.prim_color = 0x1122_3380;
        rdp.env_color = 0x0000_0040;
        let slots = Slots {
            rgb: Some(ConstId::Prim),
            alpha: Some(ConstId::Env),
        };

        assert!(slots.admits(&rdp, 0x1122_3340));
        assert!(!slots.admits(&rdp, 0x1122_3380));
        assert!(!slots.admits(&rdp, 0x0000_0040));
        assert!(Slots::default().admits(&rdp, 0xDEAD_BEEF));
    }

    #[test]
    fn test_forced_extension_keeps_claimed_constant() {
        let mut rdp = RdpCombine::new(CombineMode::from_words(0, 0), CycleType::One);
        rdp.env_color = 0x0000_0040;
        let mut state = modifier_with_alpha_claim(0x80);

        force_extension(&mut state, &env_alpha_claim(), &rdp, 2);

        let unit = &state.tmu[0];
        assert_eq!(unit.constant, 0x0000_0040);
        assert!(!unit.color.is_extension());
        assert!(unit.software_modifier().is_some());
        assert!(unit.alpha.is_extension());
        assert!(state.color.is_extension());
        assert!(state.alpha.is_extension());
    }

    #[test]
    fn test_forced_extension_encodes_compatible_modifier() {
        let mut rdp = RdpCombine::new(CombineMode::from_words(0, 0), CycleType::One);
        rdp.env_color = 0x0000_0040;
        let mut state = modifier_with_alpha_claim(0x40);

        force_extension(&mut state, &env_alpha_claim(), &rdp, 2);

        let unit = &state.tmu[0];
        assert_eq!(unit.constant, 0x0000_0040);
        assert!(unit.color.is_extension());
        assert!(unit.software_modifier().is_none());
    }
}
