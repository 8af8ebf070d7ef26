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

//! Combiner engine tests
//!
//! Tests are organized into the following modules:
//! - `mode`: `G_SETCOMBINE` decoding and equation helpers
//! - `blender`: Other-mode blender decoding
//! - `tmod`: Texture modifier formulas and encodings
//! - `extension`: Native to extension conversion
//! - `derive`: Combine derivation against RDP evaluation

mod blender;

use super::eval::{CombineInputs, Rgbaf};
use super::{CombineSource, Equation};

/// `(a - b) * c + d`
pub(super) fn eq(a: CombineSource, b: CombineSource, c: CombineSource, d: CombineSource) -> Equation {
    Equation { a, b, c, d }
}

/// Input sets the derived state is checked on
///
/// Constants come from the packed RDP registers so that both sides see the
/// same quantized values.
pub(super) fn check_inputs(prim: u32, env: u32, prim_lod_frac: u8) -> Vec<CombineInputs> {
    let texels = [
        (
            Rgbaf::new(0.25, 0.5, 0.75, 0.4),
            Rgbaf::new(0.9, 0.1, 0.3, 0.7),
        ),
        (
            Rgbaf::new(0.8, 0.35, 0.05, 0.95),
            Rgbaf::new(0.15, 0.6, 0.45, 0.2),
        ),
        (
            Rgbaf::new(0.05, 0.95, 0.55, 0.1),
            Rgbaf::new(0.7, 0.85, 0.25, 0.55),
        ),
    ];
    let shades = [
        Rgbaf::new(0.6, 0.2, 0.9, 0.3),
        Rgbaf::new(0.1, 0.75, 0.4, 0.85),
    ];

    let mut out = Vec::new();
    for (i, &(texel0, texel1)) in texels.iter().enumerate() {
        for (j, &shade) in shades.iter().enumerate() {
            out.push(CombineInputs {
                texel0,
                texel1,
                shade,
                prim: Rgbaf::from_packed(prim),
                env: Rgbaf::from_packed(env),
                lod_frac: 0.2 + 0.25 * i as f32,
                prim_lod_frac: f32::from(prim_lod_frac) / 255.0,
                noise: 0.3 + 0.2 * j as f32,
            });
        }
    }
    out
}
