// Tests for the dependency injection container

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use trellis_core::{Container, Error, Provider, Scope, Token};

#[derive(Clone)]
struct ServiceA {
    value: String,
}

struct ServiceB {
    service_a: Arc<ServiceA>,
    name: String,
}

impl Provider for ServiceB {
    fn construct(container: &Container) -> Result<Self, Error> {
        Ok(Self {
            service_a: container.resolve::<ServiceA>()?,
            name: "dependent".to_string(),
        })
    }
}

struct RequestCounter {
    id: usize,
}

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

impl Provider for RequestCounter {
    fn scope() -> Scope {
        Scope::Request
    }

    fn construct(_: &Container) -> Result<Self, Error> {
        Ok(Self {
            id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
        })
    }
}

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

struct English;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".to_string()
    }
}

#[test]
fn test_register_and_resolve_service() {
    let container = Container::new();
    container.register(ServiceA {
        value: "test".to_string(),
    });

    let resolved = container.resolve::<ServiceA>().unwrap();
    assert_eq!(resolved.value, "test");
}

#[test]
fn test_constructor_injection() {
    let container = Container::new();
    container.register(ServiceA {
        value: "dependency".to_string(),
    });
    container.provide::<ServiceB>();

    let resolved = container.resolve::<ServiceB>().unwrap();
    assert_eq!(resolved.name, "dependent");
    assert_eq!(resolved.service_a.value, "dependency");
}

#[test]
fn test_missing_dependency_fails_at_resolution() {
    let container = Container::new();
    container.provide::<ServiceB>();

    let result = container.resolve::<ServiceB>();
    assert!(matches!(result, Err(Error::ProviderNotFound(_))));
}

#[test]
fn test_singleton_identity() {
    let container = Container::new();
    container.register_factory(Scope::Singleton, |_| {
        Ok(ServiceA {
            value: "one".to_string(),
        })
    });

    let a = container.resolve::<ServiceA>().unwrap();
    let b = container.resolve::<ServiceA>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_transient_distinctness() {
    let container = Container::new();
    container.register_factory(Scope::Transient, |_| {
        Ok(ServiceA {
            value: "fresh".to_string(),
        })
    });

    let a = container.resolve::<ServiceA>().unwrap();
    let b = container.resolve::<ServiceA>().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn test_request_scope_identity_and_isolation() {
    let container = Container::new();
    container.provide::<RequestCounter>();

    let first = container.request_scope();
    let a = first.resolve::<RequestCounter>().unwrap();
    let b = first.resolve::<RequestCounter>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    let second = container.request_scope();
    let c = second.resolve::<RequestCounter>().unwrap();
    assert_ne!(a.id, c.id);
}

#[test]
fn test_request_scoped_outside_request_fails() {
    let container = Container::new();
    container.provide::<RequestCounter>();

    let result = container.resolve::<RequestCounter>();
    assert!(matches!(result, Err(Error::DependencyInjection(_))));
}

#[test]
fn test_singletons_are_shared_with_request_scopes() {
    let container = Container::new();
    container.register_factory(Scope::Singleton, |_| {
        Ok(ServiceA {
            value: "shared".to_string(),
        })
    });

    let root = container.resolve::<ServiceA>().unwrap();
    let scoped = container.request_scope().resolve::<ServiceA>().unwrap();
    assert!(Arc::ptr_eq(&root, &scoped));
}

#[test]
fn test_named_value_tokens() {
    let container = Container::new();
    container.register_value("DATABASE_NAME", "MONGO_DB".to_string());
    container.register_value("PORT", 3000u16);

    assert_eq!(
        container.resolve_named::<String>("DATABASE_NAME").unwrap().as_str(),
        "MONGO_DB"
    );
    assert_eq!(*container.resolve_named::<u16>("PORT").unwrap(), 3000);
    assert!(container.has_token(&Token::named("PORT")));
    assert!(!container.has::<ServiceA>());
}

#[test]
fn test_trait_object_binding() {
    let container = Container::new();
    container.register_factory_arc::<dyn Greeter, _>(Scope::Singleton, |_| {
        Ok(Arc::new(English) as Arc<dyn Greeter>)
    });

    let greeter = container.resolve::<dyn Greeter>().unwrap();
    assert_eq!(greeter.greet(), "hello");
}

#[test]
fn test_alias_resolves_same_instance() {
    let container = Container::new();
    container.register(ServiceA {
        value: "target".to_string(),
    });
    container.alias(Token::named("ALIAS"), Token::of::<ServiceA>());

    let direct = container.resolve::<ServiceA>().unwrap();
    let aliased = container.resolve_named::<ServiceA>("ALIAS").unwrap();
    assert!(Arc::ptr_eq(&direct, &aliased));
}

#[test]
fn test_optional_resolution() {
    let container = Container::new();
    let missing = container
        .resolve_optional::<u32>(&Token::named("LIMIT"))
        .unwrap();
    assert!(missing.is_none());

    container.register_value("LIMIT", 5u32);
    let present = container
        .resolve_optional::<u32>(&Token::named("LIMIT"))
        .unwrap();
    assert_eq!(present.as_deref(), Some(&5));
}

#[test]
fn test_optional_resolution_still_reports_build_failures() {
    let container = Container::new();
    container.provide::<ServiceB>();

    let result = container.resolve_optional::<ServiceB>(&Token::of::<ServiceB>());
    assert!(result.is_err());
}

#[test]
fn test_async_factory_registration() {
    let container = Container::new();
    tokio_test::block_on(container.register_async(
        Token::named("CONNECTION"),
        |c: Container| async move {
            let name = c.resolve_named::<String>("DATABASE_NAME")?;
            Ok(format!("connected to {}", name))
        },
    ))
    .unwrap_err();

    container.register_value("DATABASE_NAME", "users".to_string());
    tokio_test::block_on(container.register_async(
        Token::named("CONNECTION"),
        |c: Container| async move {
            let name = c.resolve_named::<String>("DATABASE_NAME")?;
            Ok(format!("connected to {}", name))
        },
    ))
    .unwrap();

    let connection = container.resolve_named::<String>("CONNECTION").unwrap();
    assert_eq!(connection.as_str(), "connected to users");
}

#[test]
fn test_clear_removes_everything() {
    let container = Container::new();
    container.register(ServiceA {
        value: "x".to_string(),
    });
    assert_eq!(container.len(), 1);

    container.clear();
    assert!(container.is_empty());
    assert!(container.resolve::<ServiceA>().is_err());
}
