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

//! Native to extension conversion
//!
//! Every native function/factor pair has an exact extension encoding. These
//! conversions back the `*_combiner_to_extension` operations, which move a
//! channel from its native parameters onto the extension.

use super::tmod::{self, TexMod};
use super::types::{
    ChannelCombine, CombineExt, CombineFactor, CombineFunction, CombineLocal, CombineOther,
    CombinerState, ExtSource, FuncMode, NativeCombine, TexUnitCombine,
};
use crate::core::error::CombinerError;

/// Extension sources standing in for the native inputs
#[derive(Debug, Clone, Copy)]
struct NativeOperands {
    local: ExtSource,
    local_alpha: ExtSource,
    other: ExtSource,
    other_alpha: ExtSource,
    texture: ExtSource,
    texture_alpha: ExtSource,
}

impl NativeOperands {
    /// `(source, invert)` for a factor
    fn factor(&self, factor: CombineFactor) -> (ExtSource, bool) {
        match factor {
            CombineFactor::Zero => (ExtSource::Zero, false),
            CombineFactor::One => (ExtSource::Zero, true),
            CombineFactor::Local => (self.local, false),
            CombineFactor::OtherAlpha => (self.other_alpha, false),
            CombineFactor::LocalAlpha => (self.local_alpha, false),
            CombineFactor::TextureAlpha => (self.texture_alpha, false),
            CombineFactor::TextureRgb => (self.texture, false),
            CombineFactor::LodFraction => (ExtSource::LodFrac, false),
            CombineFactor::OneMinusLocal => (self.local, true),
            CombineFactor::OneMinusOtherAlpha => (self.other_alpha, true),
            CombineFactor::OneMinusLocalAlpha => (self.local_alpha, true),
            CombineFactor::OneMinusTextureAlpha => (self.texture_alpha, true),
            CombineFactor::OneMinusLodFraction => (ExtSource::LodFrac, true),
        }
    }

    fn encode(&self, function: CombineFunction, factor: CombineFactor, invert: bool) -> CombineExt {
        let (c, c_invert) = self.factor(factor);
        let scaled = |a: ExtSource, a_mode: FuncMode, b: ExtSource, b_mode: FuncMode, d: ExtSource| CombineExt {
            a,
            a_mode,
            b,
            b_mode,
            c,
            c_invert,
            d,
            d_invert: false,
            shift: 0,
            invert,
        };
        // x * 1 + 0
        let pass = |x: ExtSource| CombineExt {
            a: x,
            a_mode: FuncMode::X,
            c_invert: true,
            invert,
            ..CombineExt::default()
        };

        let (x, neg, none, zero) = (FuncMode::X, FuncMode::NegativeX, FuncMode::Zero, ExtSource::Zero);
        match function {
            CombineFunction::Zero => CombineExt {
                invert,
                ..CombineExt::default()
            },
            CombineFunction::Local => pass(self.local),
            CombineFunction::LocalAlpha => pass(self.local_alpha),
            CombineFunction::ScaleOther => scaled(self.other, x, zero, none, zero),
            CombineFunction::ScaleOtherAddLocal => scaled(self.other, x, zero, none, self.local),
            CombineFunction::ScaleOtherAddLocalAlpha => {
                scaled(self.other, x, zero, none, self.local_alpha)
            }
            CombineFunction::ScaleOtherMinusLocal => scaled(self.other, x, self.local, neg, zero),
            CombineFunction::ScaleOtherMinusLocalAddLocal => {
                scaled(self.other, x, self.local, neg, self.local)
            }
            CombineFunction::ScaleOtherMinusLocalAddLocalAlpha => {
                scaled(self.other, x, self.local, neg, self.local_alpha)
            }
            CombineFunction::ScaleMinusLocalAddLocal => scaled(zero, none, self.local, neg, self.local),
            CombineFunction::ScaleMinusLocalAddLocalAlpha => {
                scaled(zero, none, self.local, neg, self.local_alpha)
            }
        }
    }
}

impl NativeCombine {
    /// Equivalent extension expression
    ///
    /// `alpha` selects the alpha-unit operand sources.
    pub fn to_extension(&self, alpha: bool) -> CombineExt {
        let pick = |rgb: ExtSource, a: ExtSource| if alpha { a } else { rgb };
        let iterated = pick(ExtSource::IteratedRgb, ExtSource::IteratedAlpha);
        let constant = pick(ExtSource::ConstantColor, ExtSource::ConstantAlpha);
        let texture = pick(ExtSource::TextureRgb, ExtSource::TextureAlpha);

        let (local, local_alpha) = match self.local {
            CombineLocal::Iterated => (iterated, ExtSource::IteratedAlpha),
            CombineLocal::Constant => (constant, ExtSource::ConstantAlpha),
        };
        let (other, other_alpha) = match self.other {
            CombineOther::Iterated => (iterated, ExtSource::IteratedAlpha),
            CombineOther::Texture => (texture, ExtSource::TextureAlpha),
            CombineOther::Constant => (constant, ExtSource::ConstantAlpha),
        };

        NativeOperands {
            local,
            local_alpha,
            other,
            other_alpha,
            texture,
            texture_alpha: ExtSource::TextureAlpha,
        }
        .encode(self.function, self.factor, false)
    }
}

impl TexUnitCombine {
    /// Equivalent texture unit extension expression
    pub fn to_extension(&self, alpha: bool) -> CombineExt {
        let local = if alpha {
            ExtSource::LocalTextureAlpha
        } else {
            ExtSource::LocalTextureRgb
        };
        let other = if alpha {
            ExtSource::OtherTextureAlpha
        } else {
            ExtSource::OtherTextureRgb
        };

        NativeOperands {
            local,
            local_alpha: ExtSource::LocalTextureAlpha,
            other,
            other_alpha: ExtSource::OtherTextureAlpha,
            texture: local,
            texture_alpha: ExtSource::LocalTextureAlpha,
        }
        .encode(self.function, self.factor, self.invert)
    }
}

fn check_tmu(tmu: usize) -> Result<(), CombinerError> {
    if tmu > 1 {
        return Err(CombinerError::InvalidTmu { tmu: tmu as u8 });
    }
    Ok(())
}

impl CombinerState {
    /// Move the color unit onto the extension
    pub fn color_combiner_to_extension(&mut self) {
        if let ChannelCombine::Native(native) = self.color {
            self.color = ChannelCombine::Extension(native.to_extension(false));
        }
    }

    /// Move the alpha unit onto the extension
    pub fn alpha_combiner_to_extension(&mut self) {
        if let ChannelCombine::Native(native) = self.alpha {
            self.alpha = ChannelCombine::Extension(native.to_extension(true));
        }
    }

    /// Move a texture unit's color combine onto the extension
    ///
    /// A pending texture modifier is encoded into the expression when it has
    /// an encoding; the unit constant then carries the modifier color and
    /// factor. Returns whether the modifier (if any) now runs on the unit.
    ///
    /// # Errors
    ///
    /// `InvalidTmu` for a unit index above 1.
    pub fn tex_color_combiner_to_extension(&mut self, tmu: usize) -> Result<bool, CombinerError> {
        check_tmu(tmu)?;
        let unit = &mut self.tmu[tmu];
        let native = match unit.color {
            ChannelCombine::Native(native) => native,
            ChannelCombine::Extension(_) => return Ok(true),
        };

        let encoded = match unit.modifier.mode.map(TexMod::to_extension) {
            // Modifier output replaces the texel: only a pass-through can absorb it
            Some(Some(ext)) if native == TexUnitCombine::LOCAL => Some(ext),
            Some(_) => None,
            None => Some(native.to_extension(false)),
        };

        match encoded {
            Some(ext) => {
                if unit.modifier.mode.is_some() {
                    unit.constant = tmod::unit_constant(&unit.modifier);
                    log::debug!("TMU{}: modifier {:?} on extension", tmu, unit.modifier.mode);
                }
                unit.color = ChannelCombine::Extension(ext);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Move a texture unit's alpha combine onto the extension
    ///
    /// # Errors
    ///
    /// `InvalidTmu` for a unit index above 1.
    pub fn tex_alpha_combiner_to_extension(&mut self, tmu: usize) -> Result<(), CombinerError> {
        check_tmu(tmu)?;
        let unit = &mut self.tmu[tmu];
        if let ChannelCombine::Native(native) = unit.alpha {
            unit.alpha = ChannelCombine::Extension(native.to_extension(true));
        }
        Ok(())
    }
}
