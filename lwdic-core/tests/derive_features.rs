use lwdic_core::{Container, ContainerError, FailurePolicy};

mod greeters {
    use lwdic_core::Bean;

    pub const NAMESPACE: &str = module_path!();

    pub trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    pub trait Farewell: Send + Sync {
        fn bye(&self) -> String;
    }

    #[derive(Bean, Default)]
    #[named("english")]
    #[implements(Greeter, Farewell)]
    pub struct EnglishGreeter;

    impl Greeter for EnglishGreeter {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    impl Farewell for EnglishGreeter {
        fn bye(&self) -> String {
            "goodbye".to_string()
        }
    }

    #[derive(Bean, Default)]
    #[implements(Greeter)]
    pub struct GermanGreeter;

    impl Greeter for GermanGreeter {
        fn greet(&self) -> String {
            "hallo".to_string()
        }
    }
}

mod lifecycle {
    use lwdic_core::Bean;

    pub const NAMESPACE: &str = module_path!();

    #[derive(Bean)]
    #[bean(injectable = false)]
    pub struct Disabled {
        pub reason: String,
    }

    #[derive(Bean)]
    #[bean(constructor = "try_new")]
    pub struct Flaky;

    impl Flaky {
        fn try_new() -> anyhow::Result<Self> {
            Err(anyhow::anyhow!("backing store unavailable"))
        }
    }

    #[derive(Bean)]
    #[bean(constructor = "try_new")]
    pub struct Configured {
        pub port: u16,
    }

    impl Configured {
        fn try_new() -> anyhow::Result<Self> {
            Ok(Self { port: 8080 })
        }
    }
}

mod unresolved {
    use lwdic_core::{Bean, Inject};

    pub const NAMESPACE: &str = module_path!();

    pub trait Missing: Send + Sync {}

    #[derive(Bean, Default)]
    pub struct Consumer {
        #[inject]
        pub missing: Inject<dyn Missing>,

        #[inject]
        #[named("limit")]
        pub limit: Inject<u32>,

        pub untouched: u32,
    }
}

use greeters::{EnglishGreeter, Farewell, GermanGreeter, Greeter};

#[test]
fn test_interface_conflict_is_deferred_to_lookup() {
    let mut container = Container::new();
    let report = container.scan_package(greeters::NAMESPACE).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.registered.len(), 2);

    assert!(matches!(
        container.get_bean_by_type::<dyn Greeter>(),
        Err(ContainerError::BeanConflict { ref candidates, .. }) if candidates.len() == 2
    ));
    assert_eq!(container.get_bean_by_type::<dyn Farewell>().unwrap().bye(), "goodbye");
    assert_eq!(container.get_bean_by_type::<GermanGreeter>().unwrap().greet(), "hallo");
}

#[test]
fn test_alias_replaces_type_key() {
    let mut container = Container::new();
    let report = container.scan_package(greeters::NAMESPACE).unwrap();

    let english = report
        .registered
        .iter()
        .find(|bean| bean.primary_key == "english")
        .unwrap();
    assert_eq!(english.keys.len(), 3);

    assert!(matches!(
        container.get_bean_by_type::<EnglishGreeter>(),
        Err(ContainerError::NoSuitableBean { .. })
    ));
    let by_name = container.get_bean_by_name_and_type::<dyn Greeter>("english").unwrap();
    assert_eq!(by_name.greet(), "hello");

    // 名称存在但类型不兼容
    assert!(matches!(
        container.get_bean_by_name_and_type::<GermanGreeter>("english"),
        Err(ContainerError::NoSuitableBean { .. })
    ));
}

#[test]
fn test_skipped_and_failed_candidates() {
    let mut container = Container::new();
    let report = container.scan_package(lifecycle::NAMESPACE).unwrap();

    assert_eq!(report.skipped, vec![std::any::type_name::<lifecycle::Disabled>()]);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].reason.contains("backing store unavailable"));

    assert_eq!(container.bean_count(), 1);
    assert_eq!(
        container.get_bean_by_type::<lifecycle::Configured>().unwrap().port,
        8080
    );
    assert!(!container.contains_key(std::any::type_name::<lifecycle::Disabled>()));
}

#[test]
fn test_collect_all_reports_each_field() {
    let mut container = Container::new();
    container.scan_package(unresolved::NAMESPACE).unwrap();

    match container.start().unwrap_err() {
        ContainerError::InjectionFailed { failures } => {
            let fields: Vec<&str> = failures.iter().map(|f| f.field.as_str()).collect();
            assert_eq!(fields, vec!["missing", "limit"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_fail_fast_stops_at_first_field() {
    let mut container = Container::builder()
        .failure_policy(FailurePolicy::FailFast)
        .build();
    container.scan_package(unresolved::NAMESPACE).unwrap();
    container.add_bean("limit", 3_u32).unwrap();

    let err = container.start().unwrap_err();
    assert!(matches!(err, ContainerError::NoSuitableBean { .. }));

    let consumer = container.get_bean_by_type::<unresolved::Consumer>().unwrap();
    assert!(!consumer.limit.is_injected());
    assert_eq!(consumer.untouched, 0);
}

#[test]
fn test_scanning_unrelated_namespace_is_empty() {
    let mut container = Container::new();
    let report = container.scan_package("derive_features::nothing_here").unwrap();
    assert!(report.registered.is_empty());
    assert_eq!(container.key_count(), 0);
}
