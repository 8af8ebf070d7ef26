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

//! Plugin core components
//!
//! This module contains everything between the RDP state and the GPU:
//! - Combiner engine (color combiner and blender translation)
//! - Texture transform engine (wrap, mirror, clamp)
//! - Texel decode dispatch
//! - Render context and backend binding

pub mod backend;
pub mod combiner;
pub mod config;
pub mod context;
pub mod error;
pub mod texture;

// Re-export commonly used types
pub use backend::{NullBackend, RenderBackend};
pub use combiner::{CombineMode, CombineOutcome, CombinerState, CycleType, RdpCombine};
pub use config::{Config, HardwareCaps};
pub use context::{LoadedTexture, RenderContext, TileLoad};
pub use error::{CombinerError, PluginError, Result, TextureError};
pub use texture::{DecodeTable, TextureLayout};
