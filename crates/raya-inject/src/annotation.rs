//! Annotation Types and Designators
//!
//! Annotations are tagged values: an annotation type identified by its fully
//! qualified name, plus the set of designators (meta-annotations) that the
//! type carries. Looking up whether an annotation plays the qualifier or scope
//! role is a set-membership test on that designator set.
//!
//! ```text
//! @Qualifier                      AnnotationType {
//! @interface Named { value }  =>      name: "javax.inject.Named",
//!                                     designators: QUALIFIER,
//!                                 }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Designator flags (bitflags) carried by an annotation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Designators(u8);

impl Designators {
    /// Plain annotation, no injection role
    pub const NONE: Self = Self(0x00);
    /// Distinguishes bindings of the same type
    pub const QUALIFIER: Self = Self(0x01);
    /// Declares a binding lifecycle
    pub const SCOPE: Self = Self(0x02);
    /// QUALIFIER | SCOPE
    pub const ALL: Self = Self(0x03);

    /// Create from raw bits
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Check if all flags in `other` are set
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of designators
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if no designator is set
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Parse a single designator name
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NONE" => Some(Self::NONE),
            "QUALIFIER" => Some(Self::QUALIFIER),
            "SCOPE" => Some(Self::SCOPE),
            "ALL" => Some(Self::ALL),
            _ => None,
        }
    }

    /// Parse combined flags from a pipe-separated string (e.g., "QUALIFIER|SCOPE")
    pub fn from_combined_str(s: &str) -> Option<Self> {
        let mut result = Self::NONE;
        for part in s.split('|') {
            result = result.union(Self::from_str(part.trim())?);
        }
        Some(result)
    }
}

impl fmt::Display for Designators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => f.write_str("NONE"),
            Self::QUALIFIER => f.write_str("QUALIFIER"),
            Self::SCOPE => f.write_str("SCOPE"),
            Self::ALL => f.write_str("QUALIFIER|SCOPE"),
            _ => write!(f, "0x{:02X}", self.0),
        }
    }
}

/// A single injection role an annotation type can be designated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Designator {
    /// Qualifier role
    Qualifier,
    /// Scope role
    Scope,
}

impl Designator {
    /// The flag for this role
    pub const fn flag(self) -> Designators {
        match self {
            Self::Qualifier => Designators::QUALIFIER,
            Self::Scope => Designators::SCOPE,
        }
    }
}

impl fmt::Display for Designator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qualifier => f.write_str("qualifier"),
            Self::Scope => f.write_str("scope"),
        }
    }
}

/// Annotation type descriptor.
///
/// Identity is the fully qualified name: equality never looks at designators,
/// so a type is the same type however it was registered.
#[derive(Debug, Clone, Eq)]
pub struct AnnotationType {
    name: String,
    designators: Designators,
}

impl AnnotationType {
    /// Create a plain annotation type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            designators: Designators::NONE,
        }
    }

    /// Create an annotation type designated as a qualifier
    pub fn qualifier(name: impl Into<String>) -> Self {
        Self::new(name).with_designators(Designators::QUALIFIER)
    }

    /// Create an annotation type designated as a scope
    pub fn scope(name: impl Into<String>) -> Self {
        Self::new(name).with_designators(Designators::SCOPE)
    }

    /// Replace the designator set
    pub fn with_designators(mut self, designators: Designators) -> Self {
        self.designators = designators;
        self
    }

    /// Fully qualified type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Designators carried by this type
    pub fn designators(&self) -> Designators {
        self.designators
    }

    /// Check if this type is meta-annotated with `designator`
    pub fn is_designated(&self, designator: Designator) -> bool {
        self.designators.contains(designator.flag())
    }
}

impl PartialEq for AnnotationType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::hash::Hash for AnnotationType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// An annotation instance attached to a member or parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    annotation_type: Arc<AnnotationType>,
    attributes: Vec<(String, Value)>,
}

impl Annotation {
    /// Create an annotation with no attributes
    pub fn new(annotation_type: Arc<AnnotationType>) -> Self {
        Self {
            annotation_type,
            attributes: Vec::new(),
        }
    }

    /// Add an attribute (e.g. `value = "db"` for `@Named("db")`)
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// The declared annotation type
    pub fn annotation_type(&self) -> &AnnotationType {
        &self.annotation_type
    }

    /// Shared handle to the declared annotation type
    pub fn annotation_type_arc(&self) -> &Arc<AnnotationType> {
        &self.annotation_type
    }

    /// Get an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// All attributes in declaration order
    pub fn attributes(&self) -> &[(String, Value)] {
        &self.attributes
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.annotation_type.name)?;
        if !self.attributes.is_empty() {
            f.write_str("(")?;
            for (i, (key, value)) in self.attributes.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}={}", key, value)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}
