use once_cell::sync::Lazy;
use overlay_di::{injectable, override_key, DiError, InjectKey, Injector};

#[derive(Debug)]
struct Impl {
    tag: &'static str,
}

static A: Lazy<InjectKey<Impl>> = Lazy::new(|| injectable("A", |_| Impl { tag: "a" }));
static A2: Lazy<InjectKey<Impl>> = Lazy::new(|| injectable("A2", |_| Impl { tag: "a2" }));
static A3: Lazy<InjectKey<Impl>> = Lazy::new(|| injectable("A3", |_| Impl { tag: "a3" }));

#[test]
fn test_override_loop_reports_full_chain() {
    let injector = Injector::with_overrides([
        override_key(*A).with_other(*A2),
        override_key(*A2).with_other(*A3),
        override_key(*A3).with_other(*A),
    ]);

    let err = injector.get(*A).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Circular override dependencies: A -> A2 -> A3 -> A"
    );

    match err {
        DiError::CircularOverride(chain) => assert_eq!(chain, vec!["A", "A2", "A3", "A"]),
        other => panic!("expected CircularOverride, got {:?}", other),
    }
}

#[test]
fn test_override_loop_reported_from_any_entry_point() {
    let injector = Injector::with_overrides([
        override_key(*A).with_other(*A2),
        override_key(*A2).with_other(*A3),
        override_key(*A3).with_other(*A),
    ]);

    let err = injector.get(*A2).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Circular override dependencies: A2 -> A3 -> A -> A2"
    );
}

#[test]
fn test_self_override_is_a_loop() {
    let injector = Injector::with_overrides([override_key(*A).with_other(*A)]);

    let err = injector.get(*A).unwrap_err();
    assert_eq!(err.to_string(), "Circular override dependencies: A -> A");
}

#[test]
fn test_self_referencing_factory() {
    static OUROBOROS: Lazy<InjectKey<u32>> =
        Lazy::new(|| injectable("Ouroboros", |cx| *cx.get_required(*OUROBOROS)));

    let injector = Injector::new();
    match injector.get(*OUROBOROS) {
        Err(DiError::Circular(path)) => assert_eq!(path, vec!["Ouroboros", "Ouroboros"]),
        other => panic!("expected Circular error, got {:?}", other),
    }
}

#[test]
fn test_mutual_factory_cycle() {
    #[derive(Debug)]
    struct X;
    struct Y;

    static KX: Lazy<InjectKey<X>> = Lazy::new(|| {
        injectable("X", |cx| {
            let _ = cx.get_required(*KY);
            X
        })
    });
    static KY: Lazy<InjectKey<Y>> = Lazy::new(|| {
        injectable("Y", |cx| {
            let _ = cx.get_required(*KX);
            Y
        })
    });

    let injector = Injector::new();
    let err = injector.get(*KX).unwrap_err();
    assert_eq!(err.to_string(), "Circular dependency: X -> Y -> X");
}

#[test]
fn test_resolution_recovers_after_cycle_error() {
    let looping = Injector::with_overrides([override_key(*A2).with_other(*A2)]);

    assert!(looping.get(*A2).is_err());

    // The failed resolution leaves both the container and the thread-local
    // detection state clean.
    assert_eq!(looping.get_required(*A3).tag, "a3");
    assert_eq!(Injector::new().get_required(*A2).tag, "a2");
}
