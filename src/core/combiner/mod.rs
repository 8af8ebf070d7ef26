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

//! Combiner engine
//!
//! Maps the RDP color combiner and blender onto Glide's fixed-function
//! pipeline: two texture units (TMU1 feeding TMU0), a color unit and an
//! alpha unit, plus the optional combine extension that exposes a general
//! `(a + b) * c + d` per unit.
//!
//! # Components
//!
//! - `mode`: `G_SETCOMBINE` decoding
//! - `derive`: equation to Glide state derivation
//! - `tmod`: texture modifier formulas
//! - `extension`: native to extension conversion
//! - `blender`: other-mode blender decoding
//! - `eval`: numeric evaluation of both sides

mod blender;
mod derive;
pub mod eval;
mod extension;
mod mode;
pub mod tmod;
mod types;

#[cfg(test)]
mod tests;

pub use blender::{AlphaCompare, BlendFactor, BlendState, FORCE_BL};
pub use derive::{
    combine, combine_blender, count_combine, init_combine, CombineOptions, CombineOutcome,
    CombinePath, RdpCombine,
};
pub use eval::Rgbaf;
pub use mode::{CombineMode, CombineSource, CycleMode, CycleType, Equation};
pub use tmod::TexMod;
pub use types::{
    ChannelCombine, CombineExt, CombineFactor, CombineFunction, CombineLocal, CombineOther,
    CombinerState, DetailState, ExtSource, FuncMode, NativeCombine, TexModifier, TexUnitCombine,
    TexUnitState, Texel, TextureUsage,
};
