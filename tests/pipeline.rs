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

//! End-to-end draw setup: config file, combine derivation, texture load and
//! backend configuration

mod common;

use std::fs;

use common::assertions::{assert_texel_copied, texel16};
use common::fixtures::{axis, rgba16_tile, rgba16_tmem};
use rdpglide::core::backend::RenderBackend;
use rdpglide::core::combiner::{CombineExt, CombinePath, NativeCombine};
use rdpglide::core::texture::{AxisMode, TextureFormat};
use rdpglide::core::{CombineMode, Config, CycleType, RdpCombine, RenderContext, Result};
use tempfile::TempDir;

/// TEXEL0 * SHADE for color, TEXEL0 for alpha
const MODULATE: (u32, u32) = (0x0012_7E24, 0xFFFF_F3F9);

#[derive(Default)]
struct CallLog {
    calls: Vec<&'static str>,
}

impl RenderBackend for CallLog {
    fn name(&self) -> &str {
        "call-log"
    }

    fn color_combine(&mut self, _combine: &NativeCombine) {
        self.calls.push("color");
    }

    fn color_combine_ext(&mut self, _ext: &CombineExt) {
        self.calls.push("color_ext");
    }

    fn alpha_combine(&mut self, _combine: &NativeCombine) {
        self.calls.push("alpha");
    }

    fn alpha_combine_ext(&mut self, _ext: &CombineExt) {
        self.calls.push("alpha_ext");
    }
}

fn context_from_toml(contents: &str) -> Result<(TempDir, RenderContext)> {
    let dir = TempDir::new()?;
    let path = dir.path().join("rdpglide.toml");
    fs::write(&path, contents)?;
    let config = Config::load(&path)?;
    Ok((dir, RenderContext::new(config)))
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    assert!(Config::load(dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_modulate_draw_is_native() -> Result<()> {
    let (_dir, mut ctx) = context_from_toml("")?;
    let mode = CombineMode::from_words(MODULATE.0, MODULATE.1);

    let outcome = ctx.combine(&RdpCombine::new(mode, CycleType::One));
    assert_eq!(outcome.color, CombinePath::Native);
    assert_eq!(outcome.alpha, CombinePath::Native);
    assert_eq!(outcome.passes, 1);

    let mut backend = CallLog::default();
    ctx.apply(&mut backend);
    assert_eq!(backend.calls, vec!["color", "alpha"]);
    Ok(())
}

#[test]
fn test_forced_extension_draw() -> Result<()> {
    let (_dir, mut ctx) = context_from_toml(
        r#"
        [combine]
        force_extension = true
        "#,
    )?;
    let mode = CombineMode::from_words(MODULATE.0, MODULATE.1);

    let outcome = ctx.combine(&RdpCombine::new(mode, CycleType::One));
    assert!(outcome.is_exact());

    let mut backend = CallLog::default();
    ctx.apply(&mut backend);
    assert_eq!(backend.calls, vec!["color_ext", "alpha_ext"]);
    Ok(())
}

#[test]
fn test_extension_request_without_hardware() -> Result<()> {
    let (_dir, mut ctx) = context_from_toml(
        r#"
        [hardware]
        combine_ext = false
        tmu_count = 1
        "#,
    )?;
    assert_eq!(ctx.options().tmu_count(), 1);
    assert!(ctx.color_combiner_to_extension().is_err());
    assert!(!ctx.state().combine_ext());
    Ok(())
}

#[test]
fn test_mirror_s_clamp_t_load() -> Result<()> {
    let (_dir, mut ctx) = context_from_toml("")?;
    let src = rgba16_tmem(8, 8);
    let mut dst = vec![0u8; 32 * 16 * 2];
    let tile = rgba16_tile(
        &src,
        8,
        8,
        32,
        16,
        axis(AxisMode::MIRROR, 3, 8),
        axis(AxisMode::CLAMP, 0, 8),
    );

    let loaded = ctx.load_texture(&mut dst, &tile)?;
    assert_eq!(loaded.format, TextureFormat::Argb1555);
    assert!(!loaded.mirror.s);

    for y in 0..8 {
        for i in 0..8 {
            assert_texel_copied(&dst, 32, (8 + i, y), (7 - i, y));
            assert_texel_copied(&dst, 32, (16 + i, y), (i, y));
            assert_texel_copied(&dst, 32, (24 + i, y), (7 - i, y));
        }
    }
    for y in 8..16 {
        for x in 0..32 {
            assert_texel_copied(&dst, 32, (x, y), (x, 7));
        }
    }
    Ok(())
}

#[test]
fn test_hardware_mirror_setting() -> Result<()> {
    let (_dir, mut ctx) = context_from_toml(
        r#"
        [hardware]
        texture_mirror = true
        "#,
    )?;
    let src = rgba16_tmem(8, 8);

    // One-block allocation: the texture unit mirrors by itself
    let mut single = vec![0u8; 8 * 8 * 2];
    let tile = rgba16_tile(
        &src,
        8,
        8,
        8,
        8,
        axis(AxisMode::MIRROR, 3, 8),
        axis(AxisMode::WRAP, 3, 8),
    );
    let loaded = ctx.load_texture(&mut single, &tile)?;
    assert!(loaded.mirror.s);
    assert!(!loaded.mirror.t);

    // Two-block allocation: sampled whole, so the mirror is filled in memory
    let mut double = vec![0u8; 16 * 8 * 2];
    let tile = rgba16_tile(
        &src,
        8,
        8,
        16,
        8,
        axis(AxisMode::MIRROR, 3, 8),
        axis(AxisMode::WRAP, 3, 8),
    );
    let loaded = ctx.load_texture(&mut double, &tile)?;
    assert!(!loaded.mirror.s);
    for y in 0..8 {
        for i in 0..8 {
            assert_texel_copied(&double, 16, (8 + i, y), (7 - i, y));
        }
    }
    assert_ne!(texel16(&double, 16, 8, 0), 0);
    Ok(())
}
