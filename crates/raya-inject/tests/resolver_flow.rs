//! Integration tests for the resolver-facing flow
//!
//! Each test walks a member through the same steps a graph builder takes:
//! validate visibility, classify annotations, then invoke.

use std::error::Error;
use std::sync::Arc;
use std::thread;

use raya_inject::registry::{INJECT, NAMED, SINGLETON};
use raya_inject::{
    find_qualifier, find_scope, has_annotation, try_invoke, try_new_instance, try_set_field,
    validate_visibility, AnnotationRegistry, Constructor, Designators, Field, InjectError, Member,
    Method, ReflectionFailure, Thrown, Value, Visibility,
};

const PROVIDES: &str = "dagger.Provides";

struct Pool {
    url: String,
    size: i64,
}

struct Repo {
    pool: Arc<Pool>,
}

#[derive(Debug, thiserror::Error)]
#[error("pool exhausted after {0} connections")]
struct PoolExhausted(i64);

fn registry() -> AnnotationRegistry {
    let mut registry = AnnotationRegistry::standard();
    registry.register(PROVIDES, Designators::NONE);
    registry
}

fn provide_pool_method(registry: &AnnotationRegistry) -> Method {
    Method::builder("app.DbModule", "providePool")
        .visibility(Visibility::Package)
        .static_method()
        .annotation(registry.annotation(PROVIDES).unwrap())
        .annotation(registry.annotation(SINGLETON).unwrap())
        .annotation(registry.annotation(NAMED).unwrap().with_attribute("value", "main"))
        .parameter("String", Vec::new())
        .parameter("i64", Vec::new())
        .body(|_, args| {
            let url = args[0]
                .as_str()
                .ok_or_else(|| Thrown::unchecked("url must be a string"))?;
            let size = args[1]
                .as_int()
                .ok_or_else(|| Thrown::unchecked("size must be an int"))?;
            if size > 64 {
                return Err(Thrown::unchecked(PoolExhausted(size)));
            }
            Ok(Value::object(Arc::new(Pool {
                url: url.to_string(),
                size,
            })))
        })
}

mod provider_methods {
    use super::*;

    #[test]
    fn test_validate_classify_invoke() {
        let registry = registry();
        let method = provide_pool_method(&registry);

        validate_visibility(&method).unwrap();

        let annotations = method.annotations();
        assert!(has_annotation(annotations, &registry.get(PROVIDES).unwrap()));
        assert!(!has_annotation(annotations, &registry.get(INJECT).unwrap()));

        let qualifier = find_qualifier(annotations).unwrap().unwrap();
        assert_eq!(qualifier.attribute("value"), Some(&Value::from("main")));
        let scope = find_scope(annotations).unwrap().unwrap();
        assert_eq!(scope.annotation_type().name(), SINGLETON);

        let value = try_invoke(
            &method,
            None,
            &[Value::from("postgres://localhost/app"), Value::Int(8)],
        )
        .unwrap();
        let pool = value.downcast_ref::<Arc<Pool>>().unwrap();
        assert_eq!(pool.url, "postgres://localhost/app");
        assert_eq!(pool.size, 8);
    }

    #[test]
    fn test_application_error_reaches_caller_unchanged() {
        let registry = registry();
        let method = provide_pool_method(&registry);
        validate_visibility(&method).unwrap();

        let err = try_invoke(&method, None, &[Value::from("db"), Value::Int(100)]).unwrap_err();
        assert_eq!(err.to_string(), "pool exhausted after 100 connections");

        let original = err.into_application().unwrap();
        assert_eq!(original.downcast_ref::<PoolExhausted>().unwrap().0, 100);
    }

    #[test]
    fn test_skipped_validation_is_wrapped_with_root_cause() {
        let registry = registry();
        let method = provide_pool_method(&registry);

        let err = try_invoke(&method, None, &[Value::from("db"), Value::Int(4)]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("app.DbModule.providePool"));
        assert!(message.contains("[db, 4]"));

        // unwind the cause chain through the std Error interface
        let mut root: &(dyn Error + 'static) = &err;
        while let Some(next) = root.source() {
            root = next;
        }
        assert!(matches!(
            root.downcast_ref::<ReflectionFailure>(),
            Some(ReflectionFailure::IllegalAccess {
                visibility: Visibility::Package,
                ..
            })
        ));
    }

    #[test]
    fn test_ambiguous_qualifiers_reported_before_invocation() {
        let mut registry = registry();
        registry.register("app.Primary", Designators::QUALIFIER);

        let method = Method::builder("app.DbModule", "provideReplica")
            .annotation(registry.annotation(NAMED).unwrap())
            .annotation(registry.annotation("app.Primary").unwrap())
            .body(|_, _| Ok(Value::Null));

        match find_qualifier(method.annotations()) {
            Err(InjectError::AmbiguousMetadata {
                existing, found, ..
            }) => {
                assert_eq!(existing, NAMED);
                assert_eq!(found, "app.Primary");
            }
            other => panic!("Expected AmbiguousMetadata, got {:?}", other),
        }
        // scope lookup is unaffected by the qualifier conflict
        assert!(find_scope(method.annotations()).unwrap().is_none());
    }
}

mod constructors {
    use super::*;

    fn repo_constructor(registry: &AnnotationRegistry, visibility: Visibility) -> Constructor {
        Constructor::builder("app.Repo")
            .visibility(visibility)
            .annotation(registry.annotation(INJECT).unwrap())
            .parameter(
                "Pool",
                vec![registry.annotation(NAMED).unwrap().with_attribute("value", "main")],
            )
            .body(|args| {
                let pool = args[0]
                    .downcast_ref::<Arc<Pool>>()
                    .ok_or_else(|| Thrown::checked(format!("expected Pool, got {}", args[0].type_name())))?;
                Ok(Value::object(Repo { pool: pool.clone() }))
            })
    }

    #[test]
    fn test_constructor_injection_with_parameter_qualifier() {
        let registry = registry();
        let ctor = repo_constructor(&registry, Visibility::Public);

        validate_visibility(&ctor).unwrap();
        assert!(!ctor.access_flag().is_granted());
        assert!(has_annotation(ctor.annotations(), &registry.get(INJECT).unwrap()));

        let qualifier = find_qualifier(&ctor.parameter_annotations()[0]).unwrap().unwrap();
        assert_eq!(qualifier.to_string(), "@javax.inject.Named(value=main)");

        let pool = Arc::new(Pool {
            url: "db".to_string(),
            size: 2,
        });
        let repo = try_new_instance(&ctor, &[Value::object(pool.clone())]).unwrap();
        assert!(Arc::ptr_eq(&repo.downcast_ref::<Repo>().unwrap().pool, &pool));
    }

    #[test]
    fn test_checked_constructor_failure_is_wrapped() {
        let registry = registry();
        let ctor = repo_constructor(&registry, Visibility::Package);
        validate_visibility(&ctor).unwrap();

        let err = try_new_instance(&ctor, &[Value::Int(3)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to invoke package-private app.Repo(Pool) with arguments [3]"
        );
        assert_eq!(
            err.source().map(|e| e.to_string()),
            Some("expected Pool, got int".to_string())
        );
    }

    #[test]
    fn test_protected_constructor_rejected() {
        let registry = registry();
        let ctor = repo_constructor(&registry, Visibility::Protected);

        let err = validate_visibility(&ctor).unwrap_err();
        assert_eq!(
            err.to_string(),
            "protected app.Repo(Pool) must be public or package-protected"
        );
        assert!(!ctor.access_flag().is_granted());
        assert!(try_new_instance(&ctor, &[Value::Null]).is_err());
    }
}

mod fields {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_field_injection() {
        let registry = registry();
        let field = Field::builder("app.Service", "name", "String")
            .visibility(Visibility::Package)
            .annotation(registry.annotation(INJECT).unwrap())
            .annotation(registry.annotation(NAMED).unwrap().with_attribute("value", "svc"))
            .setter(|target, value| {
                let slot = target
                    .downcast_ref::<Mutex<String>>()
                    .ok_or_else(|| Thrown::unchecked("target is not a service"))?;
                let mut guard = slot
                    .lock()
                    .map_err(|_| Thrown::unchecked("service lock poisoned"))?;
                *guard = value.to_string();
                Ok(())
            });

        validate_visibility(&field).unwrap();
        assert!(find_qualifier(field.annotations()).unwrap().is_some());

        let target = Value::object(Mutex::new(String::new()));
        try_set_field(&field, &target, Value::from("billing")).unwrap();
        let slot = target.downcast_ref::<Mutex<String>>().unwrap();
        assert_eq!(*slot.lock().unwrap(), "billing");

        let err = try_set_field(&field, &Value::Int(1), Value::from("x")).unwrap_err();
        assert_eq!(err.to_string(), "target is not a service");
    }
}

mod concurrency {
    use super::*;

    #[test]
    fn test_concurrent_validation_and_invocation() {
        let registry = registry();
        let method = provide_pool_method(&registry);

        thread::scope(|s| {
            for i in 0..8 {
                let method = &method;
                s.spawn(move || {
                    validate_visibility(method).unwrap();
                    let value =
                        try_invoke(method, None, &[Value::from("db"), Value::Int(i)]).unwrap();
                    assert_eq!(value.downcast_ref::<Arc<Pool>>().unwrap().size, i);
                });
            }
        });

        assert!(method.access_flag().is_granted());
    }
}
