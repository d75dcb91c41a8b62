//! Lowering configuration.
//!
//! ```toml
//! target_endianness = "big"
//! fold_constants = true
//! verify = true
//! ```

use serde::Deserialize;

use crate::error::ConfigError;
use crate::ir::binary::Endianness;

/// Knobs that affect how descriptors are lowered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LowerConfig {
    /// Byte order substituted for `native` segments.
    pub target_endianness: Endianness,
    /// Use the value definition resolver to elide statically decided tests.
    pub fold_constants: bool,
    /// Run the SSA validator on every sealed function.
    pub verify: bool,
}

impl Default for LowerConfig {
    fn default() -> Self {
        Self {
            target_endianness: Endianness::Little,
            fold_constants: true,
            verify: true,
        }
    }
}

impl LowerConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LowerConfig = toml::from_str(content)?;
        if config.target_endianness == Endianness::Native {
            return Err(ConfigError::NativeTarget);
        }
        Ok(config)
    }
}
