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

//! Plugin configuration
//!
//! Configuration is read from a TOML file. Every field has a default, so an
//! empty file (or no file at all) yields a working configuration that assumes
//! a two-TMU card with the combine extension.
//!
//! # Example
//!
//! ```
//! use rdpglide::core::config::Config;
//!
//! let config = Config::from_toml_str(
//!     r#"
//!     [hardware]
//!     combine_ext = false
//!     tmu_count = 1
//!     "#,
//! )
//! .unwrap();
//!
//! assert!(!config.hardware.combine_ext);
//! assert_eq!(config.hardware.tmu_count, 1);
//! assert!(!config.texture.strict_validation);
//! ```

use std::fs;
use std::path::Path;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::error::{PluginError, Result};

bitflags! {
    /// Hardware capabilities relevant to combiner and texture setup
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct HardwareCaps: u8 {
        /// Combine extension entry points are available
        const COMBINE_EXT = 0x01;
        /// A second texture unit is present
        const DUAL_TMU = 0x02;
        /// The texture unit can mirror addresses itself
        const TEXTURE_MIRROR = 0x04;
    }
}

/// Complete plugin configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hardware: HardwareConfig,
    pub texture: TextureConfig,
    pub combine: CombineConfig,
}

/// Target hardware description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Combine extension available
    pub combine_ext: bool,

    /// Number of texture units (1 or 2)
    pub tmu_count: u8,

    /// Hardware mirror addressing available
    ///
    /// When set, mirrored axes whose allocation is exactly one addressed block
    /// are left to the texture unit. Larger allocations are still expanded in
    /// memory.
    pub texture_mirror: bool,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            combine_ext: true,
            tmu_count: 2,
            texture_mirror: false,
        }
    }
}

/// Texture transform behaviour
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    /// Reject malformed mask/size combinations instead of silently skipping them
    pub strict_validation: bool,
}

/// Combiner derivation behaviour
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombineConfig {
    /// Always use the extension path when it is available
    pub force_extension: bool,

    /// LOD bias applied to both texture units
    pub lod_bias: f32,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if the file does not exist, or a parse error
    /// if the contents are not valid TOML for this schema.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PluginError::ConfigNotFound(path.display().to_string()));
        }

        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded config from {}", path.display());
        log::debug!("Hardware caps: {:?}", config.caps());
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Capability set derived from the hardware section
    pub fn caps(&self) -> HardwareCaps {
        let mut caps = HardwareCaps::empty();
        caps.set(HardwareCaps::COMBINE_EXT, self.hardware.combine_ext);
        caps.set(HardwareCaps::DUAL_TMU, self.hardware.tmu_count >= 2);
        caps.set(HardwareCaps::TEXTURE_MIRROR, self.hardware.texture_mirror);
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.hardware.combine_ext);
        assert_eq!(config.hardware.tmu_count, 2);
        assert_eq!(
            config.caps(),
            HardwareCaps::COMBINE_EXT | HardwareCaps::DUAL_TMU
        );
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_section() {
        let config = Config::from_toml_str("[combine]\nlod_bias = -0.5\n").unwrap();
        assert_eq!(config.combine.lod_bias, -0.5);
        assert!(!config.combine.force_extension);
        assert!(config.hardware.combine_ext);
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml_str("[hardware]\ntmu_count = \"two\"\n");
        assert!(matches!(result, Err(PluginError::ConfigParse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[hardware]\ntexture_mirror = true\ntmu_count = 1").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(config.hardware.texture_mirror);
        assert_eq!(
            config.caps(),
            HardwareCaps::COMBINE_EXT | HardwareCaps::TEXTURE_MIRROR
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(PluginError::ConfigNotFound(_))));
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = Config::default();
        config.texture.strict_validation = true;
        let text = config.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }
}
