//! `#[chorus::capability]` expansion and support construction.

use chorus::{
    ChorusError, CollectionHolder, DispatchError, ListenerResult, ListenerSupport,
    holders::StrongHolder, testing::CallLog,
};
use std::sync::Arc;

mod common;
use common::{CountingListener, TestListener};

// ============================================================================
// Descriptions
// ============================================================================

#[test]
fn test_description_lists_methods_and_arguments() {
    let support = ListenerSupport::<dyn TestListener>::new().unwrap();
    let description = support.description();

    assert_eq!(description.name, "TestListener");
    let names: Vec<_> = description.methods.iter().map(|m| m.name).collect();
    assert_eq!(names, vec!["ping", "value"]);

    let value = description.method("value").unwrap();
    assert_eq!(value.arguments, &["u32", "String"]);
    assert_eq!(description.method("ping").unwrap().arity(), 0);
    assert!(description.method("missing").is_none());
}

#[chorus::capability(name = "Renamed")]
trait Named {
    fn go(&self) -> ListenerResult;
}

#[test]
fn test_description_name_can_be_overridden() {
    let support = ListenerSupport::<dyn Named>::new().unwrap();
    assert_eq!(support.description().name, "Renamed");
}

// ============================================================================
// Argument And Error Types
// ============================================================================

#[chorus::capability]
trait Batch: Send + Sync {
    fn items(&self, items: Vec<u32>) -> ListenerResult;
}

struct Summer {
    sums: Arc<CallLog<u32>>,
}

impl Batch for Summer {
    fn items(&self, items: Vec<u32>) -> ListenerResult {
        self.sums.record(items.into_iter().sum());
        Ok(())
    }
}

#[test]
fn test_each_listener_gets_its_own_copy_of_the_arguments() {
    let support = ListenerSupport::<dyn Batch>::new().unwrap();
    let sums = Arc::new(CallLog::new());
    for _ in 0..3 {
        support
            .register(Arc::new(Summer {
                sums: Arc::clone(&sums),
            }))
            .unwrap();
    }

    support.fire().items(vec![1, 2, 3]).unwrap();

    assert_eq!(sums.entries(), vec![6, 6, 6]);
}

#[chorus::capability]
trait Typed {
    fn check(&self, ok: bool) -> Result<(), ChorusError>;
}

struct Checker;

impl Typed for Checker {
    fn check(&self, ok: bool) -> Result<(), ChorusError> {
        if ok {
            Ok(())
        } else {
            Err(ChorusError::Custom("check failed".into()))
        }
    }
}

#[test]
fn test_custom_error_type_round_trips() {
    let support = ListenerSupport::<dyn Typed>::new().unwrap();
    support.register(Arc::new(Checker)).unwrap();

    support.fire().check(true).unwrap();
    let err = support.fire().check(false).unwrap_err();

    match err {
        ChorusError::Dispatch(DispatchError::Listener { method, source }) => {
            assert_eq!(method, "check");
            assert_eq!(source.to_string(), "check failed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_supports_can_share_a_holder() {
    let holder: Arc<dyn CollectionHolder<dyn TestListener>> = Arc::new(StrongHolder::new());
    let first = ListenerSupport::with_holder(Arc::clone(&holder)).unwrap();
    let second = ListenerSupport::with_holder(holder).unwrap();

    let listener = Arc::new(CountingListener::default());
    first.register(listener.clone()).unwrap();
    second.fire().ping().unwrap();

    assert_eq!(second.size(), 1);
    assert_eq!(listener.calls(), 1);
}

#[test]
fn test_nothing_starts_until_first_use() {
    let support = ListenerSupport::<dyn TestListener>::builder()
        .designated_thread_name("lazy")
        .build()
        .unwrap();
    let names = Arc::new(CallLog::new());
    support
        .register(common::ThreadNameListener::new(&names))
        .unwrap();

    // Handles alone start nothing; the first deferred call starts the thread.
    let _ = support.fire_in_parallel();
    let wait = support.fire_on_designated_and_wait();
    assert!(names.is_empty());

    wait.ping().unwrap();
    assert_eq!(names.entries(), vec![Some("lazy".to_string())]);
}
