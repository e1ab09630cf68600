//! Safe Reflective Invocation
//!
//! Every call goes through the same translation:
//!
//! 1. Reflection-layer checks (access override, arity, receiver). A failed
//!    check becomes the cause of an [`InvocationFailure`].
//! 2. The member body runs. `Ok` is returned as-is.
//! 3. `Thrown::Unchecked` propagates unchanged as [`InjectError::Application`].
//!    Panics are fatal and resume unwinding with their original payload.
//! 4. `Thrown::Checked` becomes the cause of an [`InvocationFailure`] whose
//!    message names the member and the literal arguments.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, trace, warn};

use crate::error::{BoxError, InjectError, InjectResult, InvocationFailure, ReflectionFailure, Thrown};
use crate::member::{Constructor, Field, Member, Method};
use crate::value::{format_arguments, Value};

/// Invoke `method` on `target` with `args`.
///
/// Static methods ignore `target`; instance methods require one.
pub fn try_invoke(method: &Method, target: Option<&Value>, args: &[Value]) -> InjectResult<Value> {
    trace!(method = %method, arg_count = args.len(), "invoking method");

    let cause = match check_method_call(method, target, args) {
        Err(failure) => BoxError::from(failure),
        Ok(()) => match run_guarded(method, || method.call(target, args)) {
            Ok(value) => return Ok(value),
            Err(thrown) => translate(thrown)?,
        },
    };

    let target_desc = target.map_or_else(|| "null".to_string(), Value::to_string);
    Err(wrap(
        format!(
            "Unable to invoke {} on {} with arguments {}",
            method,
            target_desc,
            format_arguments(args)
        ),
        cause,
    ))
}

/// Construct a new instance through `constructor` with `args`.
pub fn try_new_instance(constructor: &Constructor, args: &[Value]) -> InjectResult<Value> {
    trace!(constructor = %constructor, arg_count = args.len(), "invoking constructor");

    let cause = match check_constructor_call(constructor, args) {
        Err(failure) => BoxError::from(failure),
        Ok(()) => match run_guarded(constructor, || constructor.call(args)) {
            Ok(value) => return Ok(value),
            Err(thrown) => translate(thrown)?,
        },
    };

    Err(wrap(
        format!(
            "Unable to invoke {} with arguments {}",
            constructor,
            format_arguments(args)
        ),
        cause,
    ))
}

/// Write `value` into `field` on `target`.
pub fn try_set_field(field: &Field, target: &Value, value: Value) -> InjectResult<()> {
    trace!(field = %field, "setting field");

    let value_desc = value.to_string();
    let cause = match check_access(field).and_then(|()| check_target(field, Some(target))) {
        Err(failure) => BoxError::from(failure),
        Ok(()) => match run_guarded(field, || field.store(target, value)) {
            Ok(()) => return Ok(()),
            Err(thrown) => translate(thrown)?,
        },
    };

    Err(wrap(
        format!("Unable to set {} on {} to {}", field, target, value_desc),
        cause,
    ))
}

fn check_method_call(
    method: &Method,
    target: Option<&Value>,
    args: &[Value],
) -> Result<(), ReflectionFailure> {
    check_access(method)?;
    check_arity(method, args)?;
    if method.is_static() {
        Ok(())
    } else {
        check_target(method, target)
    }
}

fn check_constructor_call(constructor: &Constructor, args: &[Value]) -> Result<(), ReflectionFailure> {
    check_access(constructor)?;
    if constructor.is_abstract() {
        return Err(ReflectionFailure::Instantiation {
            type_name: constructor.signature().declaring_type.clone(),
        });
    }
    check_arity(constructor, args)
}

fn check_access<M: Member + ?Sized>(member: &M) -> Result<(), ReflectionFailure> {
    if member.is_accessible() {
        Ok(())
    } else {
        Err(ReflectionFailure::IllegalAccess {
            member: member.to_string(),
            visibility: member.visibility(),
        })
    }
}

fn check_arity<M: Member + ?Sized>(member: &M, args: &[Value]) -> Result<(), ReflectionFailure> {
    let expected = member.signature().arity();
    if args.len() == expected {
        Ok(())
    } else {
        Err(ReflectionFailure::ArgumentCount {
            expected,
            got: args.len(),
        })
    }
}

fn check_target<M: Member + ?Sized>(member: &M, target: Option<&Value>) -> Result<(), ReflectionFailure> {
    match target {
        Some(t) if !t.is_null() => Ok(()),
        _ => Err(ReflectionFailure::NullTarget {
            member: member.to_string(),
        }),
    }
}

/// Run a member body, letting panics continue to unwind after logging them.
fn run_guarded<M, T, F>(member: &M, f: F) -> Result<T, Thrown>
where
    M: Member + ?Sized,
    F: FnOnce() -> Result<T, Thrown>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            warn!(member = %member, panic = panic_message(payload.as_ref()), "injected code panicked");
            panic::resume_unwind(payload)
        }
    }
}

/// Split a callee failure into "propagate verbatim" and "wrap" categories.
fn translate(thrown: Thrown) -> Result<BoxError, InjectError> {
    match thrown {
        Thrown::Unchecked(error) => Err(InjectError::Application(error)),
        Thrown::Checked(error) => Ok(error),
    }
}

fn wrap(message: String, cause: BoxError) -> InjectError {
    debug!(%message, cause = %cause, "wrapping invocation failure");
    InjectError::Invocation(InvocationFailure::new(message, cause))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "Unknown panic"
    }
}
