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

//! N64 RDP to Glide translation core
//!
//! This library maps the Reality Display Processor's color combiner, blender
//! and texture addressing onto a Glide-style fixed-function pipeline with one
//! or two texture units and an optional combine extension.
//!
//! # Example
//!
//! ```
//! use rdpglide::core::{CombineMode, CycleType, NullBackend, RdpCombine, RenderContext};
//!
//! let mut ctx = RenderContext::default();
//!
//! // TEXEL0 * SHADE for color, TEXEL0 for alpha
//! let mode = CombineMode::from_words(0x0012_7E24, 0xFFFF_F3F9);
//! let outcome = ctx.combine(&RdpCombine::new(mode, CycleType::One));
//! assert!(outcome.is_exact());
//!
//! let mut backend = NullBackend::new();
//! ctx.apply(&mut backend);
//! ```

pub mod core;
