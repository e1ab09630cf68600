//! Raya Inject - member introspection for dependency injection
//!
//! This crate provides the member-level primitives a dependency-injection
//! resolver calls while building its graph:
//! - **Visibility validation**: reject private/protected members, grant the
//!   access override to package-visible ones (`validate_visibility`)
//! - **Classification**: find the single qualifier and scope annotation on a
//!   member or parameter (`find_qualifier`, `find_scope`)
//! - **Presence checks**: exact annotation type lookup (`has_annotation`)
//! - **Safe invocation**: call methods, constructors and field setters,
//!   propagating application errors verbatim and wrapping everything else
//!   (`try_invoke`, `try_new_instance`, `try_set_field`)
//!
//! # Example
//!
//! ```rust,ignore
//! use raya_inject::{
//!     find_qualifier, try_new_instance, validate_visibility, AnnotationRegistry, Constructor,
//!     Value, Visibility,
//! };
//!
//! let registry = AnnotationRegistry::standard();
//! let ctor = Constructor::builder("app.Repo")
//!     .visibility(Visibility::Package)
//!     .parameter("Pool", vec![registry.annotation("javax.inject.Named").unwrap()])
//!     .body(|args| Ok(args[0].clone()));
//!
//! validate_visibility(&ctor)?;
//! let qualifier = find_qualifier(&ctor.parameter_annotations()[0])?;
//! let repo = try_new_instance(&ctor, &[Value::from("pool")])?;
//! ```

#![warn(missing_docs)]

pub mod annotation;
pub mod classify;
pub mod config;
pub mod error;
pub mod invoke;
pub mod member;
pub mod registry;
pub mod value;
pub mod visibility;

pub use annotation::{Annotation, AnnotationType, Designator, Designators};
pub use classify::{find_qualifier, find_scope, has_annotation};
pub use config::{InjectConfig, InjectSection};
pub use error::{BoxError, InjectError, InjectResult, InvocationFailure, ReflectionFailure, Thrown};
pub use invoke::{try_invoke, try_new_instance, try_set_field};
pub use member::{
    AccessFlag, Constructor, ConstructorBuilder, Field, FieldBuilder, Member, MemberKind, Method,
    MethodBuilder, Signature, Visibility,
};
pub use registry::AnnotationRegistry;
pub use value::{format_arguments, Object, Value};
pub use visibility::validate_visibility;
