//! Designator Configuration
//!
//! Annotation types can be designated as qualifiers or scopes from a TOML
//! file, typically the `raya.toml` of the application:
//!
//! ```toml
//! [inject.designators]
//! "javax.inject.Named" = "QUALIFIER"
//! "javax.inject.Singleton" = "SCOPE"
//! "app.Marker" = "QUALIFIER|SCOPE"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::annotation::Designators;
use crate::error::{InjectError, InjectResult};

/// Top-level configuration document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InjectConfig {
    /// `[inject]` table
    #[serde(default)]
    pub inject: InjectSection,
}

/// `[inject]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InjectSection {
    /// Annotation type name -> designator string
    #[serde(default)]
    pub designators: BTreeMap<String, String>,
}

impl InjectConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> InjectResult<Self> {
        toml::from_str(content).map_err(|e| InjectError::config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> InjectResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            InjectError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve every designator entry, rejecting unknown designator names
    pub fn designators(&self) -> InjectResult<Vec<(String, Designators)>> {
        self.inject
            .designators
            .iter()
            .map(|(name, value)| {
                Designators::from_combined_str(value)
                    .map(|d| (name.clone(), d))
                    .ok_or_else(|| {
                        InjectError::config(format!("Invalid designator for {}: {}", name, value))
                    })
            })
            .collect()
    }
}
