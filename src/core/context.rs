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

//! Render context
//!
//! Owns the configuration, the derived combiner state and the decoder table,
//! and runs the per-draw steps in order: combine derivation, texture load
//! (decode, modifier, addressing) and finally the backend configuration.

use super::backend::RenderBackend;
use super::combiner::{
    self, CombineMode, CombineOptions, CombineOutcome, CombinerState, CycleType, RdpCombine,
};
use super::config::{Config, HardwareCaps};
use super::error::{CombinerError, Result};
use super::texture::{
    self, AxisAddressing, BitDepth, DecodeParams, DecodeTable, HardwareMirror, PixelFormat,
    TextureFormat, TextureLayout,
};

/// One tile to decode into a texture unit
#[derive(Debug, Clone, Copy)]
pub struct TileLoad<'a> {
    /// Texture unit that samples the tile
    pub tmu: usize,
    pub depth: BitDepth,
    pub format: PixelFormat,
    /// TMEM contents starting at the tile
    pub src: &'a [u8],
    pub params: DecodeParams<'a>,
    /// Allocated height in rows (the width is `params.real_width`)
    pub real_height: u32,
    pub s: AxisAddressing,
    pub t: AxisAddressing,
}

/// Result of a tile load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedTexture {
    pub format: TextureFormat,
    /// Axes left to the texture unit's own mirroring
    pub mirror: HardwareMirror,
    /// A software texture modifier rewrote the texels
    pub modified: bool,
}

/// Per-plugin rendering context
#[derive(Debug, Clone)]
pub struct RenderContext {
    config: Config,
    options: CombineOptions,
    state: CombinerState,
    decode_table: DecodeTable,
    noise_seed: u32,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl RenderContext {
    pub fn new(config: Config) -> Self {
        let options = CombineOptions::from_config(&config);
        log::info!(
            "Render context: {} TMU(s), caps {:?}",
            options.tmu_count(),
            options.caps
        );
        Self {
            config,
            options,
            state: CombinerState::default(),
            decode_table: DecodeTable::new(),
            noise_seed: 0x2545_F491,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn options(&self) -> &CombineOptions {
        &self.options
    }

    pub fn caps(&self) -> HardwareCaps {
        self.options.caps
    }

    pub fn state(&self) -> &CombinerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CombinerState {
        &mut self.state
    }

    pub fn decode_table(&self) -> &DecodeTable {
        &self.decode_table
    }

    pub fn init_combine(&mut self) {
        combiner::init_combine(&mut self.state);
    }

    /// Derive the combiner state for the next draw
    pub fn combine(&mut self, rdp: &RdpCombine) -> CombineOutcome {
        let outcome = combiner::combine(&mut self.state, rdp, &self.options);
        if !outcome.is_exact() {
            log::debug!(
                "Approximate combine: color {:?}, alpha {:?}",
                outcome.color,
                outcome.alpha
            );
        }
        outcome
    }

    pub fn combine_blender(&mut self, othermode_l: u32, cycle: CycleType) {
        combiner::combine_blender(&mut self.state, othermode_l, cycle);
    }

    pub fn count_combine(&self, mode: &CombineMode, cycle: CycleType) -> u8 {
        combiner::count_combine(mode, cycle, self.options.caps)
    }

    fn require_extension(&self) -> std::result::Result<(), CombinerError> {
        if self.options.caps.contains(HardwareCaps::COMBINE_EXT) {
            Ok(())
        } else {
            Err(CombinerError::ExtensionUnavailable)
        }
    }

    /// Move the color unit onto the combine extension
    ///
    /// # Errors
    ///
    /// `ExtensionUnavailable` when the hardware lacks the extension.
    pub fn color_combiner_to_extension(&mut self) -> Result<()> {
        self.require_extension()?;
        self.state.color_combiner_to_extension();
        Ok(())
    }

    /// Move the alpha unit onto the combine extension
    ///
    /// # Errors
    ///
    /// `ExtensionUnavailable` when the hardware lacks the extension.
    pub fn alpha_combiner_to_extension(&mut self) -> Result<()> {
        self.require_extension()?;
        self.state.alpha_combiner_to_extension();
        Ok(())
    }

    /// Move a texture unit's color combine onto the combine extension
    ///
    /// Returns whether a pending texture modifier now runs on the unit.
    ///
    /// # Errors
    ///
    /// `ExtensionUnavailable` when the hardware lacks the extension,
    /// `InvalidTmu` for a unit index above 1.
    pub fn tex_color_combiner_to_extension(&mut self, tmu: usize) -> Result<bool> {
        self.require_extension()?;
        Ok(self.state.tex_color_combiner_to_extension(tmu)?)
    }

    /// Move a texture unit's alpha combine onto the combine extension
    ///
    /// # Errors
    ///
    /// `ExtensionUnavailable` when the hardware lacks the extension,
    /// `InvalidTmu` for a unit index above 1.
    pub fn tex_alpha_combiner_to_extension(&mut self, tmu: usize) -> Result<()> {
        self.require_extension()?;
        Ok(self.state.tex_alpha_combiner_to_extension(tmu)?)
    }

    /// Decode a tile into `dst` and prepare it for sampling
    ///
    /// Decodes with the table entry for the tile's depth and format, applies
    /// the unit's software texture modifier, then fills the padding region
    /// according to the per-axis addressing.
    ///
    /// # Errors
    ///
    /// `InvalidTmu` for a unit index above 1. With strict validation enabled,
    /// the first malformed addressing parameter.
    pub fn load_texture(&mut self, dst: &mut [u8], tile: &TileLoad) -> Result<LoadedTexture> {
        if tile.tmu > 1 {
            return Err(CombinerError::InvalidTmu { tmu: tile.tmu as u8 }.into());
        }

        let format = self
            .decode_table
            .decode(tile.depth, tile.format, dst, tile.src, &tile.params);
        let layout = TextureLayout {
            texel: format.texel_size(),
            real_width: tile.params.real_width as u32,
            real_height: tile.real_height,
            s: tile.s,
            t: tile.t,
        };

        if self.config.texture.strict_validation {
            texture::validate_addressing(dst.len(), &layout)?;
        }

        let mut modified = false;
        if let Some(modifier) = self.state.tmu[tile.tmu].software_modifier() {
            let end = layout.byte_len().min(dst.len());
            modified = combiner::tmod::apply_to_texture(&mut dst[..end], format, modifier, self.noise_seed);
            self.noise_seed = self.noise_seed.rotate_left(7) ^ 0x9E37_79B9;
        }

        let mirror = texture::apply_addressing(dst, &layout, self.options.caps);
        log::trace!(
            "TMU{}: loaded {:?} as {:?} (modified {}, hw mirror {:?})",
            tile.tmu,
            tile.format,
            format,
            modified,
            mirror
        );

        Ok(LoadedTexture {
            format,
            mirror,
            modified,
        })
    }

    /// Configure a backend from the current state
    pub fn apply<B: RenderBackend + ?Sized>(&self, backend: &mut B) {
        self.state.apply(backend, self.options.tmu_count());
    }
}
