//! Error types for member introspection and invocation

use std::error::Error as StdError;
use std::fmt;

use crate::annotation::Designator;
use crate::member::Visibility;

/// Boxed error raised by injected code
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type for injection operations
pub type InjectResult<T> = Result<T, InjectError>;

/// Injection error types
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    /// Member is private or protected and can never be injected reflectively
    #[error("{member} must be public or package-protected")]
    AccessViolation {
        /// Member identity
        member: String,
        /// Declared visibility of the member
        visibility: Visibility,
    },

    /// More than one qualifier or more than one scope on the same member
    #[error("Found multiple {designator} annotations: @{existing} and @{found}")]
    AmbiguousMetadata {
        /// Designator role that was duplicated
        designator: Designator,
        /// Type name of the first annotation seen
        existing: String,
        /// Type name of the second annotation seen
        found: String,
    },

    /// Unchecked failure raised by the injected code itself, propagated as-is
    #[error(transparent)]
    Application(BoxError),

    /// Reflection-layer or checked failure, wrapped with diagnostics
    #[error(transparent)]
    Invocation(#[from] InvocationFailure),

    /// Invalid designator configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl InjectError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Borrow the application error if this failure came from injected code
    pub fn application(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::Application(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    /// Take ownership of the application error, handing `self` back otherwise
    pub fn into_application(self) -> Result<BoxError, Self> {
        match self {
            Self::Application(e) => Ok(e),
            other => Err(other),
        }
    }
}

/// Diagnostic wrapper for a failed reflective call.
///
/// The message names the member and the literal arguments; the original
/// failure is always reachable through [`StdError::source`].
#[derive(Debug)]
pub struct InvocationFailure {
    message: String,
    cause: BoxError,
}

impl InvocationFailure {
    /// Create a new invocation failure
    pub fn new(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            cause: cause.into(),
        }
    }

    /// Diagnostic message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The failure that caused the invocation to fail
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    /// Walk the cause chain down to the innermost failure
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self.cause.as_ref();
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }
}

impl fmt::Display for InvocationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for InvocationFailure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.cause.as_ref())
    }
}

/// Root failures raised by the reflection layer rather than the callee
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReflectionFailure {
    /// Non-public member invoked without an access override
    #[error("Illegal access: {member} is {visibility} and not accessible")]
    IllegalAccess {
        /// Member identity
        member: String,
        /// Declared visibility
        visibility: Visibility,
    },

    /// Constructor belongs to a type that cannot be instantiated
    #[error("Cannot instantiate abstract type {type_name}")]
    Instantiation {
        /// Declaring type name
        type_name: String,
    },

    /// Wrong number of arguments
    #[error("Wrong number of arguments: expected {expected}, got {got}")]
    ArgumentCount {
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// Instance member invoked without a receiver
    #[error("{member} requires a target instance")]
    NullTarget {
        /// Member identity
        member: String,
    },
}

/// Failure raised by a member body.
///
/// Member bodies classify what they raise: `Unchecked` failures are
/// meaningful to the resolver's caller and propagate unchanged, `Checked`
/// failures are wrapped in an [`InvocationFailure`]. Panics are treated as
/// fatal and keep unwinding.
#[derive(Debug)]
pub enum Thrown {
    /// Runtime error, propagated verbatim
    Unchecked(BoxError),
    /// Expected failure type, wrapped with diagnostics
    Checked(BoxError),
}

impl Thrown {
    /// Raise an unchecked failure
    pub fn unchecked(error: impl Into<BoxError>) -> Self {
        Self::Unchecked(error.into())
    }

    /// Raise a checked failure
    pub fn checked(error: impl Into<BoxError>) -> Self {
        Self::Checked(error.into())
    }

    /// Check if this failure propagates verbatim
    pub fn is_unchecked(&self) -> bool {
        matches!(self, Self::Unchecked(_))
    }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchecked(e) | Self::Checked(e) => fmt::Display::fmt(e, f),
        }
    }
}
