//! Annotation Type Registry
//!
//! Side table from annotation type name to its [`AnnotationType`] descriptor.
//! This stands in for the host's reflective type catalog: the resolver
//! registers (or loads from configuration) every annotation type it knows,
//! then builds [`Annotation`]s from the shared descriptors.

use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::annotation::{Annotation, AnnotationType, Designators};
use crate::config::InjectConfig;
use crate::error::InjectResult;

/// `javax.inject.Inject`
pub const INJECT: &str = "javax.inject.Inject";
/// `javax.inject.Named`
pub const NAMED: &str = "javax.inject.Named";
/// `javax.inject.Singleton`
pub const SINGLETON: &str = "javax.inject.Singleton";

/// Registry of annotation types
#[derive(Debug, Default)]
pub struct AnnotationRegistry {
    types: FxHashMap<String, Arc<AnnotationType>>,
}

impl AnnotationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the standard `javax.inject` annotations
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(INJECT, Designators::NONE);
        registry.register(NAMED, Designators::QUALIFIER);
        registry.register(SINGLETON, Designators::SCOPE);
        registry
    }

    /// Create a registry from configuration
    pub fn from_config(config: &InjectConfig) -> InjectResult<Self> {
        let mut registry = Self::new();
        registry.apply_config(config)?;
        Ok(registry)
    }

    /// Register an annotation type.
    ///
    /// Re-registering a name replaces its designators; annotations built
    /// earlier keep the descriptor they were created with.
    pub fn register(&mut self, name: &str, designators: Designators) -> Arc<AnnotationType> {
        let annotation_type = Arc::new(AnnotationType::new(name).with_designators(designators));
        self.types.insert(name.to_string(), annotation_type.clone());
        annotation_type
    }

    /// Get an annotation type by name
    pub fn get(&self, name: &str) -> Option<Arc<AnnotationType>> {
        self.types.get(name).cloned()
    }

    /// Build an attribute-less annotation of a registered type
    pub fn annotation(&self, name: &str) -> Option<Annotation> {
        self.types.get(name).map(|t| Annotation::new(t.clone()))
    }

    /// Check if a type is registered
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Names of all registered types designated with `designators`
    pub fn names_with(&self, designators: Designators) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .types
            .values()
            .filter(|t| !designators.is_empty() && t.designators().contains(designators))
            .map(|t| t.name())
            .collect();
        names.sort_unstable();
        names
    }

    /// Register every designator entry from `config`
    pub fn apply_config(&mut self, config: &InjectConfig) -> InjectResult<()> {
        for (name, designators) in config.designators()? {
            self.register(&name, designators);
        }
        Ok(())
    }

    /// Load designators from TOML text
    pub fn load_from_toml(&mut self, toml_content: &str) -> InjectResult<()> {
        self.apply_config(&InjectConfig::from_toml_str(toml_content)?)
    }

    /// Load designators from a TOML file
    pub fn load_from_file(&mut self, path: &Path) -> InjectResult<()> {
        self.apply_config(&InjectConfig::load(path)?)
    }
}
