//! Reflective Member Handles
//!
//! Rust has no runtime reflection, so injectable members are registered
//! explicitly: each handle carries its declared visibility, the annotations
//! attached to it (and to its parameters), and the body to call.
//!
//! | Member        | Body signature                                      |
//! |---------------|-----------------------------------------------------|
//! | `Method`      | `Fn(Option<&Value>, &[Value]) -> Result<Value, Thrown>` |
//! | `Constructor` | `Fn(&[Value]) -> Result<Value, Thrown>`             |
//! | `Field`       | `Fn(&Value, Value) -> Result<(), Thrown>`           |
//!
//! The only mutable state on a handle is its [`AccessFlag`], which the
//! visibility validator sets for package-visible members.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::annotation::Annotation;
use crate::error::Thrown;
use crate::value::Value;

/// Declared accessibility of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Callable from anywhere
    Public,
    /// Visible within the declaring package only
    Package,
    /// Visible to subclasses
    Protected,
    /// Visible to the declaring type only
    Private,
}

impl Visibility {
    /// Private and protected members are never injected reflectively
    pub fn is_restricted(&self) -> bool {
        matches!(self, Visibility::Private | Visibility::Protected)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => f.write_str("public"),
            Visibility::Package => f.write_str("package-private"),
            Visibility::Protected => f.write_str("protected"),
            Visibility::Private => f.write_str("private"),
        }
    }
}

/// "Suppress access checks" override flag.
///
/// Writes are idempotent stores of `true`, so concurrent validation of the
/// same member needs no locking.
#[derive(Debug, Default)]
pub struct AccessFlag(AtomicBool);

impl AccessFlag {
    /// Create a cleared flag
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Grant the override
    pub fn grant(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Check if the override was granted
    pub fn is_granted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Kind of member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Method
    Method,
    /// Constructor
    Constructor,
    /// Field
    Field,
}

/// Member identity used in diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Declaring type name
    pub declaring_type: String,
    /// Member name (the type's short name for constructors)
    pub name: String,
    /// Parameter type names, in order
    pub parameter_types: Vec<String>,
}

impl Signature {
    /// Method or constructor signature
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        parameter_types: Vec<String>,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            parameter_types,
        }
    }

    /// Number of declared parameters
    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }
}

/// Common view over methods, constructors and fields
pub trait Member: fmt::Display {
    /// Member kind
    fn kind(&self) -> MemberKind;

    /// Identity
    fn signature(&self) -> &Signature;

    /// Declared visibility
    fn visibility(&self) -> Visibility;

    /// Annotations attached to the member, in declaration order
    fn annotations(&self) -> &[Annotation];

    /// Access override flag
    fn access_flag(&self) -> &AccessFlag;

    /// Whether a reflective call would pass access checks right now
    fn is_accessible(&self) -> bool {
        self.visibility() == Visibility::Public || self.access_flag().is_granted()
    }
}

type MethodBody = dyn Fn(Option<&Value>, &[Value]) -> Result<Value, Thrown> + Send + Sync;
type ConstructorBody = dyn Fn(&[Value]) -> Result<Value, Thrown> + Send + Sync;
type FieldSetter = dyn Fn(&Value, Value) -> Result<(), Thrown> + Send + Sync;

fn write_parameters(f: &mut fmt::Formatter<'_>, parameter_types: &[String]) -> fmt::Result {
    write!(f, "({})", parameter_types.join(", "))
}

// ============================================================================
// Method
// ============================================================================

/// Method handle
pub struct Method {
    signature: Signature,
    visibility: Visibility,
    is_static: bool,
    annotations: Vec<Annotation>,
    parameter_annotations: Vec<Vec<Annotation>>,
    access: AccessFlag,
    body: Arc<MethodBody>,
}

impl Method {
    /// Start building a public instance method
    pub fn builder(declaring_type: impl Into<String>, name: impl Into<String>) -> MethodBuilder {
        MethodBuilder {
            signature: Signature::new(declaring_type, name, Vec::new()),
            visibility: Visibility::Public,
            is_static: false,
            annotations: Vec::new(),
            parameter_annotations: Vec::new(),
        }
    }

    /// Whether the method is static (invoked without a target)
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Annotations on each parameter, indexed by position
    pub fn parameter_annotations(&self) -> &[Vec<Annotation>] {
        &self.parameter_annotations
    }

    pub(crate) fn call(&self, target: Option<&Value>, args: &[Value]) -> Result<Value, Thrown> {
        (self.body)(target, args)
    }
}

impl Member for Method {
    fn kind(&self) -> MemberKind {
        MemberKind::Method
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn access_flag(&self) -> &AccessFlag {
        &self.access
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.visibility)?;
        if self.is_static {
            f.write_str("static ")?;
        }
        write!(f, "{}.{}", self.signature.declaring_type, self.signature.name)?;
        write_parameters(f, &self.signature.parameter_types)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("signature", &self.signature)
            .field("visibility", &self.visibility)
            .field("is_static", &self.is_static)
            .field("accessible", &self.is_accessible())
            .finish()
    }
}

/// Builder for [`Method`]
pub struct MethodBuilder {
    signature: Signature,
    visibility: Visibility,
    is_static: bool,
    annotations: Vec<Annotation>,
    parameter_annotations: Vec<Vec<Annotation>>,
}

impl MethodBuilder {
    /// Set declared visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as static
    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Attach an annotation to the method
    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Declare a parameter with its annotations
    pub fn parameter(mut self, type_name: impl Into<String>, annotations: Vec<Annotation>) -> Self {
        self.signature.parameter_types.push(type_name.into());
        self.parameter_annotations.push(annotations);
        self
    }

    /// Finish with the method body
    pub fn body<F>(self, body: F) -> Method
    where
        F: Fn(Option<&Value>, &[Value]) -> Result<Value, Thrown> + Send + Sync + 'static,
    {
        Method {
            signature: self.signature,
            visibility: self.visibility,
            is_static: self.is_static,
            annotations: self.annotations,
            parameter_annotations: self.parameter_annotations,
            access: AccessFlag::new(),
            body: Arc::new(body),
        }
    }
}

// ============================================================================
// Constructor
// ============================================================================

/// Constructor handle
pub struct Constructor {
    signature: Signature,
    visibility: Visibility,
    is_abstract: bool,
    annotations: Vec<Annotation>,
    parameter_annotations: Vec<Vec<Annotation>>,
    access: AccessFlag,
    body: Arc<ConstructorBody>,
}

impl Constructor {
    /// Start building a public constructor for `declaring_type`
    pub fn builder(declaring_type: impl Into<String>) -> ConstructorBuilder {
        let declaring_type = declaring_type.into();
        let name = declaring_type
            .rsplit('.')
            .next()
            .unwrap_or(declaring_type.as_str())
            .to_string();
        ConstructorBuilder {
            signature: Signature::new(declaring_type, name, Vec::new()),
            visibility: Visibility::Public,
            is_abstract: false,
            annotations: Vec::new(),
            parameter_annotations: Vec::new(),
        }
    }

    /// Whether the declaring type is abstract (cannot be instantiated)
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Annotations on each parameter, indexed by position
    pub fn parameter_annotations(&self) -> &[Vec<Annotation>] {
        &self.parameter_annotations
    }

    pub(crate) fn call(&self, args: &[Value]) -> Result<Value, Thrown> {
        (self.body)(args)
    }
}

impl Member for Constructor {
    fn kind(&self) -> MemberKind {
        MemberKind::Constructor
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn access_flag(&self) -> &AccessFlag {
        &self.access
    }
}

impl fmt::Display for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.visibility, self.signature.declaring_type)?;
        write_parameters(f, &self.signature.parameter_types)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("signature", &self.signature)
            .field("visibility", &self.visibility)
            .field("is_abstract", &self.is_abstract)
            .field("accessible", &self.is_accessible())
            .finish()
    }
}

/// Builder for [`Constructor`]
pub struct ConstructorBuilder {
    signature: Signature,
    visibility: Visibility,
    is_abstract: bool,
    annotations: Vec<Annotation>,
    parameter_annotations: Vec<Vec<Annotation>>,
}

impl ConstructorBuilder {
    /// Set declared visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark the declaring type as abstract
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Attach an annotation to the constructor
    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Declare a parameter with its annotations
    pub fn parameter(mut self, type_name: impl Into<String>, annotations: Vec<Annotation>) -> Self {
        self.signature.parameter_types.push(type_name.into());
        self.parameter_annotations.push(annotations);
        self
    }

    /// Finish with the constructor body
    pub fn body<F>(self, body: F) -> Constructor
    where
        F: Fn(&[Value]) -> Result<Value, Thrown> + Send + Sync + 'static,
    {
        Constructor {
            signature: self.signature,
            visibility: self.visibility,
            is_abstract: self.is_abstract,
            annotations: self.annotations,
            parameter_annotations: self.parameter_annotations,
            access: AccessFlag::new(),
            body: Arc::new(body),
        }
    }
}

// ============================================================================
// Field
// ============================================================================

/// Field handle
pub struct Field {
    signature: Signature,
    visibility: Visibility,
    type_name: String,
    annotations: Vec<Annotation>,
    access: AccessFlag,
    setter: Arc<FieldSetter>,
}

impl Field {
    /// Start building a public field
    pub fn builder(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> FieldBuilder {
        FieldBuilder {
            signature: Signature::new(declaring_type, name, Vec::new()),
            visibility: Visibility::Public,
            type_name: type_name.into(),
            annotations: Vec::new(),
        }
    }

    /// Declared field type name
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(crate) fn store(&self, target: &Value, value: Value) -> Result<(), Thrown> {
        (self.setter)(target, value)
    }
}

impl Member for Field {
    fn kind(&self) -> MemberKind {
        MemberKind::Field
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn access_flag(&self) -> &AccessFlag {
        &self.access
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}.{}",
            self.visibility, self.type_name, self.signature.declaring_type, self.signature.name
        )
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("signature", &self.signature)
            .field("type_name", &self.type_name)
            .field("visibility", &self.visibility)
            .field("accessible", &self.is_accessible())
            .finish()
    }
}

/// Builder for [`Field`]
pub struct FieldBuilder {
    signature: Signature,
    visibility: Visibility,
    type_name: String,
    annotations: Vec<Annotation>,
}

impl FieldBuilder {
    /// Set declared visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Attach an annotation to the field
    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Finish with the setter that writes the field on a target
    pub fn setter<F>(self, setter: F) -> Field
    where
        F: Fn(&Value, Value) -> Result<(), Thrown> + Send + Sync + 'static,
    {
        Field {
            signature: self.signature,
            visibility: self.visibility,
            type_name: self.type_name,
            annotations: self.annotations,
            access: AccessFlag::new(),
            setter: Arc::new(setter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationType;

    fn noop_method(visibility: Visibility) -> Method {
        Method::builder("app.Service", "start")
            .visibility(visibility)
            .body(|_, _| Ok(Value::Null))
    }

    #[test]
    fn test_visibility_restricted() {
        assert!(Visibility::Private.is_restricted());
        assert!(Visibility::Protected.is_restricted());
        assert!(!Visibility::Package.is_restricted());
        assert!(!Visibility::Public.is_restricted());
    }

    #[test]
    fn test_access_flag() {
        let flag = AccessFlag::new();
        assert!(!flag.is_granted());
        flag.grant();
        flag.grant();
        assert!(flag.is_granted());
    }

    #[test]
    fn test_is_accessible() {
        assert!(noop_method(Visibility::Public).is_accessible());

        let package = noop_method(Visibility::Package);
        assert!(!package.is_accessible());
        package.access_flag().grant();
        assert!(package.is_accessible());

        assert!(!noop_method(Visibility::Private).is_accessible());
    }

    #[test]
    fn test_method_display() {
        let method = Method::builder("app.Repo", "find")
            .visibility(Visibility::Package)
            .static_method()
            .parameter("i64", Vec::new())
            .parameter("String", Vec::new())
            .body(|_, _| Ok(Value::Null));

        assert_eq!(method.to_string(), "package-private static app.Repo.find(i64, String)");
        assert_eq!(method.signature().arity(), 2);
        assert_eq!(method.kind(), MemberKind::Method);
    }

    #[test]
    fn test_constructor_display() {
        let ctor = Constructor::builder("app.db.Pool")
            .parameter("Config", Vec::new())
            .body(|_| Ok(Value::Null));

        assert_eq!(ctor.to_string(), "public app.db.Pool(Config)");
        assert_eq!(ctor.signature().name, "Pool");
        assert_eq!(ctor.kind(), MemberKind::Constructor);
    }

    #[test]
    fn test_field_display() {
        let field = Field::builder("app.Service", "repo", "Repo")
            .visibility(Visibility::Private)
            .setter(|_, _| Ok(()));

        assert_eq!(field.to_string(), "private Repo app.Service.repo");
        assert_eq!(field.type_name(), "Repo");
        assert_eq!(field.kind(), MemberKind::Field);
    }

    #[test]
    fn test_parameter_annotations() {
        let named = Arc::new(AnnotationType::qualifier("javax.inject.Named"));
        let ctor = Constructor::builder("app.Service")
            .parameter("Repo", vec![Annotation::new(named).with_attribute("value", "main")])
            .parameter("Clock", Vec::new())
            .body(|_| Ok(Value::Null));

        let params = ctor.parameter_annotations();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].len(), 1);
        assert!(params[1].is_empty());
    }
}
