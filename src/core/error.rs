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

/// Error types for texture and combiner processing
use thiserror::Error;

/// Result type for plugin core operations
pub type Result<T> = std::result::Result<T, PluginError>;

/// Main error type for the plugin core
///
/// The texture and combiner routines themselves never fail: degenerate input
/// is an early-return no-op. Errors only surface from configuration loading
/// and from the opt-in strict validation mode.
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Combiner error: {0}")]
    Combiner(#[from] CombinerError),
}

/// Texture-specific error types (strict validation only)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    #[error("Mask {mask} out of range (valid range: 0-10)")]
    InvalidMask { mask: u32 },

    #[error("Addressed size {addressed} is not a power of two")]
    NotPowerOfTwo { addressed: u32 },

    #[error("Row length {requested} exceeds allocated width {real_width}")]
    RowOverflow { requested: u32, real_width: u32 },

    #[error("Buffer too small: {got} bytes (expected at least {expected})")]
    BufferTooSmall { expected: usize, got: usize },
}

/// Combiner-specific error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CombinerError {
    #[error("Invalid texture unit: {tmu} (valid range: 0-1)")]
    InvalidTmu { tmu: u8 },

    #[error("Combine extension unavailable on this hardware")]
    ExtensionUnavailable,
}
