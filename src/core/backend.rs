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

//! Rendering API binding
//!
//! The derived `CombinerState` reaches the GPU through a `RenderBackend`.
//! Every method mirrors one fixed-function configuration entry point; all of
//! them default to no-ops so that a backend only overrides what it drives.

use super::combiner::{
    BlendState, ChannelCombine, CombineExt, CombinerState, NativeCombine, TexUnitCombine,
};

/// Fixed-function configuration entry points
pub trait RenderBackend {
    fn name(&self) -> &str;

    fn color_combine(&mut self, _combine: &NativeCombine) {}
    fn alpha_combine(&mut self, _combine: &NativeCombine) {}
    fn color_combine_ext(&mut self, _ext: &CombineExt) {}
    fn alpha_combine_ext(&mut self, _ext: &CombineExt) {}
    fn constant_color(&mut self, _rgba: u32) {}

    fn tex_color_combine(&mut self, _tmu: usize, _combine: &TexUnitCombine) {}
    fn tex_alpha_combine(&mut self, _tmu: usize, _combine: &TexUnitCombine) {}
    fn tex_color_combine_ext(&mut self, _tmu: usize, _ext: &CombineExt) {}
    fn tex_alpha_combine_ext(&mut self, _tmu: usize, _ext: &CombineExt) {}
    fn tex_constant_color(&mut self, _tmu: usize, _rgba: u32) {}
    fn tex_lod_bias(&mut self, _tmu: usize, _bias: f32) {}

    fn blend(&mut self, _blend: &BlendState) {}
}

/// Backend that only logs what it is asked to configure
#[derive(Debug, Default)]
pub struct NullBackend {
    calls: usize,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration calls received so far
    pub fn calls(&self) -> usize {
        self.calls
    }

    fn record(&mut self, what: std::fmt::Arguments) {
        self.calls += 1;
        log::debug!("null backend: {}", what);
    }
}

impl RenderBackend for NullBackend {
    fn name(&self) -> &str {
        "null"
    }

    fn color_combine(&mut self, combine: &NativeCombine) {
        self.record(format_args!("color combine {:?}", combine));
    }

    fn alpha_combine(&mut self, combine: &NativeCombine) {
        self.record(format_args!("alpha combine {:?}", combine));
    }

    fn color_combine_ext(&mut self, ext: &CombineExt) {
        self.record(format_args!("color combine ext {:?}", ext));
    }

    fn alpha_combine_ext(&mut self, ext: &CombineExt) {
        self.record(format_args!("alpha combine ext {:?}", ext));
    }

    fn constant_color(&mut self, rgba: u32) {
        self.record(format_args!("constant color {:08X}", rgba));
    }

    fn tex_color_combine(&mut self, tmu: usize, combine: &TexUnitCombine) {
        self.record(format_args!("TMU{} color combine {:?}", tmu, combine));
    }

    fn tex_alpha_combine(&mut self, tmu: usize, combine: &TexUnitCombine) {
        self.record(format_args!("TMU{} alpha combine {:?}", tmu, combine));
    }

    fn tex_color_combine_ext(&mut self, tmu: usize, ext: &CombineExt) {
        self.record(format_args!("TMU{} color combine ext {:?}", tmu, ext));
    }

    fn tex_alpha_combine_ext(&mut self, tmu: usize, ext: &CombineExt) {
        self.record(format_args!("TMU{} alpha combine ext {:?}", tmu, ext));
    }

    fn tex_constant_color(&mut self, tmu: usize, rgba: u32) {
        self.record(format_args!("TMU{} constant color {:08X}", tmu, rgba));
    }

    fn tex_lod_bias(&mut self, tmu: usize, bias: f32) {
        self.record(format_args!("TMU{} LOD bias {}", tmu, bias));
    }

    fn blend(&mut self, blend: &BlendState) {
        self.record(format_args!("blend {:?}", blend));
    }
}

impl CombinerState {
    /// Issue the configuration calls for this state
    ///
    /// Each channel is configured through exactly one entry point: native or
    /// extension, whichever holds the channel. Texture units are configured
    /// upstream first.
    pub fn apply<B: RenderBackend + ?Sized>(&self, backend: &mut B, tmu_count: usize) {
        for tmu in (0..tmu_count.min(self.tmu.len())).rev() {
            let unit = &self.tmu[tmu];
            match &unit.color {
                ChannelCombine::Native(c) => backend.tex_color_combine(tmu, c),
                ChannelCombine::Extension(e) => backend.tex_color_combine_ext(tmu, e),
            }
            match &unit.alpha {
                ChannelCombine::Native(c) => backend.tex_alpha_combine(tmu, c),
                ChannelCombine::Extension(e) => backend.tex_alpha_combine_ext(tmu, e),
            }
            if unit.color.is_extension() || unit.alpha.is_extension() {
                backend.tex_constant_color(tmu, unit.constant);
            }
            backend.tex_lod_bias(tmu, unit.lod_bias);
        }

        match &self.color {
            ChannelCombine::Native(c) => backend.color_combine(c),
            ChannelCombine::Extension(e) => backend.color_combine_ext(e),
        }
        match &self.alpha {
            ChannelCombine::Native(c) => backend.alpha_combine(c),
            ChannelCombine::Extension(e) => backend.alpha_combine_ext(e),
        }
        backend.constant_color(self.ccolor);
        backend.blend(&self.blend);

        log::trace!("Applied combiner state to {} backend", backend.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records the entry point names in call order
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl RenderBackend for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn color_combine(&mut self, _combine: &NativeCombine) {
            self.calls.push("color".into());
        }

        fn alpha_combine(&mut self, _combine: &NativeCombine) {
            self.calls.push("alpha".into());
        }

        fn color_combine_ext(&mut self, _ext: &CombineExt) {
            self.calls.push("color_ext".into());
        }

        fn alpha_combine_ext(&mut self, _ext: &CombineExt) {
            self.calls.push("alpha_ext".into());
        }

        fn constant_color(&mut self, rgba: u32) {
            self.calls.push(format!("constant {:08X}", rgba));
        }

        fn tex_color_combine(&mut self, tmu: usize, _combine: &TexUnitCombine) {
            self.calls.push(format!("tmu{} color", tmu));
        }

        fn tex_alpha_combine(&mut self, tmu: usize, _combine: &TexUnitCombine) {
            self.calls.push(format!("tmu{} alpha", tmu));
        }

        fn tex_color_combine_ext(&mut self, tmu: usize, _ext: &CombineExt) {
            self.calls.push(format!("tmu{} color_ext", tmu));
        }

        fn tex_constant_color(&mut self, tmu: usize, rgba: u32) {
            self.calls.push(format!("tmu{} constant {:08X}", tmu, rgba));
        }
    }

    #[test]
    fn test_native_state_calls() {
        let state = CombinerState {
            ccolor: 0x1122_3344,
            ..CombinerState::default()
        };
        let mut backend = Recorder::default();
        state.apply(&mut backend, 1);

        assert_eq!(
            backend.calls,
            vec!["tmu0 color", "tmu0 alpha", "color", "alpha", "constant 11223344"]
        );
    }

    #[test]
    fn test_extension_channels_use_extension_entry_points() {
        let mut state = CombinerState::default();
        state.color_combiner_to_extension();
        state.tmu[1].constant = 0xAABB_CCDD;
        state.tex_color_combiner_to_extension(1).unwrap();

        let mut backend = Recorder::default();
        state.apply(&mut backend, 2);

        assert_eq!(
            backend.calls,
            vec![
                "tmu1 color_ext",
                "tmu1 alpha",
                "tmu1 constant AABBCCDD",
                "tmu0 color",
                "tmu0 alpha",
                "color_ext",
                "alpha",
                "constant 00000000",
            ]
        );
    }

    #[test]
    fn test_null_backend_counts_calls() {
        let mut backend = NullBackend::new();
        assert_eq!(backend.name(), "null");
        CombinerState::default().apply(&mut backend, 2);
        // 2 units x (color, alpha, lod bias) + color, alpha, constant, blend
        assert_eq!(backend.calls(), 10);
    }
}
