use once_cell::sync::Lazy;
use overlay_di::{
    class_key, injectable, override_key, register_class, ClassInjectable, ClassParam,
    ClassParams, DiError, DiResult, InjectKey, Injector,
};
use std::sync::Arc;

#[derive(Debug)]
struct AService {
    foo: String,
}

static A: Lazy<InjectKey<AService>> = Lazy::new(|| {
    injectable("A", |_| AService {
        foo: "a".to_string(),
    })
});

static A2: Lazy<InjectKey<AService>> = Lazy::new(|| {
    injectable("A2", |_| AService {
        foo: "a2".to_string(),
    })
});

// Class-style declarations bridged onto the same resolver.

struct ClassBased1 {
    foo: &'static str,
}

impl ClassInjectable for ClassBased1 {
    fn construct(_params: &mut ClassParams) -> DiResult<Self> {
        Ok(ClassBased1 { foo: "hello" })
    }
}

struct ClassBased2 {
    cb1: Arc<ClassBased1>,
    a: Arc<AService>,
    injector: Arc<Injector>,
}

impl ClassInjectable for ClassBased2 {
    fn parameters() -> Vec<ClassParam> {
        vec![
            ClassParam::class::<ClassBased1>(),
            // The static type alone would not pin this parameter to A, so it
            // carries an explicit key.
            ClassParam::key(*A),
            ClassParam::injector(),
        ]
    }

    fn construct(params: &mut ClassParams) -> DiResult<Self> {
        Ok(ClassBased2 {
            cb1: params.take()?,
            a: params.take()?,
            injector: params.take()?,
        })
    }
}

fn register_classes() {
    // Idempotent; stands in for definition-time marking.
    register_class::<ClassBased1>();
    register_class::<ClassBased2>();
}

#[test]
fn test_class_resolution_and_interop() {
    register_classes();
    let injector = Injector::new();

    let cb2 = injector.get_class_required::<ClassBased2>();
    let cb1 = injector.get_class_required::<ClassBased1>();
    let a = injector.get_required(*A);

    assert_eq!(cb2.cb1.foo, "hello");
    assert!(Arc::ptr_eq(&cb2.cb1, &cb1));
    assert!(Arc::ptr_eq(&cb2.a, &a));
    assert!(cb2.injector.ptr_eq(&injector));
}

#[test]
fn test_class_is_singleton_per_container() {
    register_classes();
    let injector = Injector::new();

    let first = injector.get_class_required::<ClassBased2>();
    let second = injector.get_class_required::<ClassBased2>();
    assert!(Arc::ptr_eq(&first, &second));

    let other = Injector::new();
    assert!(!Arc::ptr_eq(&first, &other.get_class_required::<ClassBased2>()));
}

#[test]
fn test_overrides_reach_class_parameters() {
    register_classes();
    let injector = Injector::with_overrides([override_key(*A).with_other(*A2)]);

    let cb2 = injector.get_class_required::<ClassBased2>();
    assert_eq!(cb2.a.foo, "a2");
    assert!(Arc::ptr_eq(&cb2.a, &injector.get_required(*A)));
}

#[test]
fn test_functional_factory_can_inject_classes() {
    register_classes();

    static MIXED: Lazy<InjectKey<String>> = Lazy::new(|| {
        injectable("Mixed", |cx| {
            let cb1 = cx.get_class_required::<ClassBased1>();
            let a = cx.get_required(*A);
            format!("{}-{}", cb1.foo, a.foo)
        })
    });

    let injector = Injector::new();
    assert_eq!(*injector.get_required(*MIXED), "hello-a");
}

#[test]
fn test_class_keys_can_be_overridden() {
    let real = register_class::<ClassBased1>();

    static FAKE_CB1: Lazy<InjectKey<ClassBased1>> =
        Lazy::new(|| injectable("FakeClassBased1", |_| ClassBased1 { foo: "fake" }));

    let injector = Injector::with_overrides([override_key(real).with_other(*FAKE_CB1)]);
    assert_eq!(injector.get_class_required::<ClassBased1>().foo, "fake");
}

#[test]
fn test_unregistered_class_is_an_error() {
    #[derive(Debug)]
    struct Lonely;

    impl ClassInjectable for Lonely {
        fn construct(_params: &mut ClassParams) -> DiResult<Self> {
            Ok(Lonely)
        }
    }

    assert!(matches!(
        class_key::<Lonely>(),
        Err(DiError::NotInjectable("Lonely"))
    ));

    let injector = Injector::new();
    let err = injector.get_class::<Lonely>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Lonely is not registered as a class injectable"
    );
}

#[test]
fn test_unregistered_class_parameter_fails_at_construction() {
    #[derive(Debug)]
    struct Orphan;

    impl ClassInjectable for Orphan {
        fn construct(_params: &mut ClassParams) -> DiResult<Self> {
            Ok(Orphan)
        }
    }

    #[derive(Debug)]
    struct Parent {
        #[allow(dead_code)]
        orphan: Arc<Orphan>,
    }

    impl ClassInjectable for Parent {
        fn parameters() -> Vec<ClassParam> {
            vec![ClassParam::class::<Orphan>()]
        }

        fn construct(params: &mut ClassParams) -> DiResult<Self> {
            Ok(Parent {
                orphan: params.take()?,
            })
        }
    }

    register_class::<Parent>();

    let injector = Injector::new();
    let err = injector.get_class::<Parent>().unwrap_err();
    assert!(matches!(err, DiError::NotInjectable("Orphan")));
}

#[test]
fn test_unknown_parameter_fails_when_constructed() {
    #[derive(Debug)]
    struct Vague {
        #[allow(dead_code)]
        mailer: Option<Arc<AService>>,
    }

    impl ClassInjectable for Vague {
        fn parameters() -> Vec<ClassParam> {
            vec![ClassParam::unknown("dyn Mailer")]
        }

        fn construct(params: &mut ClassParams) -> DiResult<Self> {
            Ok(Vague {
                mailer: params.take().ok(),
            })
        }
    }

    // Registration itself only warns.
    register_class::<Vague>();

    let injector = Injector::new();
    let err = injector.get_class::<Vague>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot construct Vague: parameter 0 has no known binding"
    );
}

#[test]
fn test_failed_factory_is_retried_after_registration() {
    #[derive(Debug)]
    struct Late;

    impl ClassInjectable for Late {
        fn construct(_params: &mut ClassParams) -> DiResult<Self> {
            Ok(Late)
        }
    }

    #[derive(Debug)]
    struct Holder {
        #[allow(dead_code)]
        late: Arc<Late>,
    }

    static NEEDS_LATE: Lazy<InjectKey<Holder>> = Lazy::new(|| {
        injectable("NeedsLate", |cx| Holder {
            late: cx.get_class_required::<Late>(),
        })
    });

    let injector = Injector::new();

    // Late is not registered yet; the factory fails and caches nothing.
    let err = injector.get(*NEEDS_LATE).unwrap_err();
    assert!(matches!(err, DiError::NotInjectable("Late")));

    // After fixing the configuration, the same container retries the factory.
    register_class::<Late>();
    assert!(injector.get(*NEEDS_LATE).is_ok());
}
