//! Tests for resource registration and lookup

use bytes::Bytes;
use lumen::error::{RegistryError, ResourceError};
use lumen::handlers::{Echo, EchoSession};
use lumen::http::request::{Method, MethodSet};
use lumen::resource::buffer::MAX_ACCUMULATION_CAPACITY;
use lumen::resource::dynamic::{DynamicResource, DynamicStrategy};
use lumen::resource::registry::{ResourceKind, ResourceRegistry};
use lumen::resource::static_file::StaticResource;
use lumen::resource::upgrade::UpgradeResource;
use lumen::handlers::led::{LedBank, LedControl};
use std::sync::Arc;

fn page(body: &'static [u8]) -> ResourceKind {
    ResourceKind::Static(StaticResource::new(Bytes::from_static(body), "text/html"))
}

fn accumulate(capacity: usize) -> ResourceKind {
    ResourceKind::Dynamic(DynamicResource::new(DynamicStrategy::accumulate(
        capacity,
        LedControl::with_driver(Arc::new(LedBank::new(1))),
    )))
}

#[test]
fn test_resolve_exact_path() {
    let registry = ResourceRegistry::builder()
        .register("/", MethodSet::of(&[Method::GET]), page(b"index"))
        .unwrap()
        .register("/about", MethodSet::of(&[Method::GET]), page(b"about"))
        .unwrap()
        .build();

    let found = registry.resolve("/about", Method::GET).unwrap();
    assert_eq!(found.path, "/about");
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_resolve_unknown_path() {
    let registry = ResourceRegistry::builder()
        .register("/", MethodSet::of(&[Method::GET]), page(b"index"))
        .unwrap()
        .build();

    let err = registry.resolve("/missing", Method::GET).err().unwrap();
    assert_eq!(
        err,
        ResourceError::NotFound {
            path: "/missing".into()
        }
    );
}

#[test]
fn test_no_trailing_slash_normalization() {
    let registry = ResourceRegistry::builder()
        .register("/about", MethodSet::of(&[Method::GET]), page(b"about"))
        .unwrap()
        .build();

    assert!(registry.resolve("/about/", Method::GET).is_err());
    assert!(registry.resolve("/About", Method::GET).is_err());
}

#[test]
fn test_resolve_disallowed_method() {
    let registry = ResourceRegistry::builder()
        .register(
            "/dynamic",
            MethodSet::of(&[Method::GET, Method::POST]),
            ResourceKind::Dynamic(DynamicResource::new(DynamicStrategy::passthrough(Echo))),
        )
        .unwrap()
        .build();

    let err = registry.resolve("/dynamic", Method::DELETE).err().unwrap();
    match err {
        ResourceError::MethodNotAllowed { method, allowed, .. } => {
            assert_eq!(method, Method::DELETE);
            assert_eq!(allowed.allow_header(), "GET, POST");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_first_registered_wins() {
    let registry = ResourceRegistry::builder()
        .register("/", MethodSet::of(&[Method::GET]), page(b"first"))
        .unwrap()
        .register(
            "/",
            MethodSet::of(&[Method::GET]),
            ResourceKind::Upgrade(UpgradeResource::new(EchoSession, 64)),
        )
        .unwrap()
        .build();

    let found = registry.resolve("/", Method::GET).unwrap();
    assert_eq!(found.kind.name(), "static");
}

#[test]
fn test_shadowed_resource_does_not_widen_methods() {
    let registry = ResourceRegistry::builder()
        .register("/x", MethodSet::of(&[Method::GET]), page(b"first"))
        .unwrap()
        .register("/x", MethodSet::of(&[Method::POST]), page(b"second"))
        .unwrap()
        .build();

    assert!(matches!(
        registry.resolve("/x", Method::POST),
        Err(ResourceError::MethodNotAllowed { .. })
    ));
}

#[test]
fn test_empty_method_set_rejected() {
    let result = ResourceRegistry::builder().register("/", MethodSet::EMPTY, page(b"x"));

    assert_eq!(
        result.err(),
        Some(RegistryError::EmptyMethodSet("/".into()))
    );
}

#[test]
fn test_relative_path_rejected() {
    let result =
        ResourceRegistry::builder().register("led", MethodSet::of(&[Method::POST]), page(b"x"));

    assert_eq!(result.err(), Some(RegistryError::InvalidPath("led".into())));
}

#[test]
fn test_capacity_validated_at_registration() {
    let zero = ResourceRegistry::builder().register(
        "/led",
        MethodSet::of(&[Method::POST]),
        accumulate(0),
    );
    assert!(matches!(
        zero.err(),
        Some(RegistryError::InvalidCapacity { capacity: 0, .. })
    ));

    let huge = ResourceRegistry::builder().register(
        "/led",
        MethodSet::of(&[Method::POST]),
        accumulate(MAX_ACCUMULATION_CAPACITY + 1),
    );
    assert!(huge.is_err());

    let ok = ResourceRegistry::builder().register(
        "/led",
        MethodSet::of(&[Method::POST]),
        accumulate(32),
    );
    assert!(ok.is_ok());
}

#[test]
fn test_upgrade_scratch_validated() {
    let result = ResourceRegistry::builder().register(
        "/ws",
        MethodSet::of(&[Method::GET]),
        ResourceKind::Upgrade(UpgradeResource::new(EchoSession, 0)),
    );

    assert!(matches!(
        result.err(),
        Some(RegistryError::InvalidCapacity { .. })
    ));
}

#[test]
fn test_method_set_bits() {
    let set = MethodSet::EMPTY.with(Method::PATCH).with(Method::GET);

    assert!(set.contains(Method::GET));
    assert!(set.contains(Method::PATCH));
    assert!(!set.contains(Method::POST));
    assert_eq!(set.iter().count(), 2);
    assert!(MethodSet::EMPTY.is_empty());
}
