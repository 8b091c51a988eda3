//! Extension configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

/// Which function families to register, and how the list kernels run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtensionConfig {
    /// Register the `vector` greeting function
    pub greeting: bool,
    /// Register `list_distance` and the `list_*` shorthands
    pub list_functions: bool,
    /// Register the distance aggregates
    pub aggregates: bool,
    /// Minimum batch rows before list kernels fan out over rayon
    pub parallel_threshold: usize,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            greeting: true,
            list_functions: true,
            aggregates: true,
            parallel_threshold: 4096,
        }
    }
}

impl ExtensionConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.parallel_threshold == 0 {
            return Err(Error::InvalidConfig(
                "parallel_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
