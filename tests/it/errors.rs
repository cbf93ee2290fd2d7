use std::panic::{catch_unwind, AssertUnwindSafe};

use intermock::error::{ConfigError, HandleError};
use intermock::expect::{Expectations, Matching};
use intermock::*;

intercept! {
    fn err_alpha() -> i32 as ErrAlphaFn { 1 }
}

intercept! {
    fn err_beta() -> i32 as ErrBetaFn { 2 }
}

intercept! {
    fn err_gamma() -> i32 as ErrGammaFn { 3 }
}

intercept! {
    fn err_delta(v: i32) -> i32 as ErrDeltaFn { v }
}

fn no_expectations<T: Target>() -> Expectations<T> {
    Expectations::build(|_| {}).unwrap()
}

#[test]
fn double_install_is_rejected_while_enabled() {
    let first = Mocker::<ErrAlphaFn>::create(no_expectations()).unwrap();

    assert_eq!(
        Err(ConfigError::AlreadyIntercepted { name: "err_alpha" }),
        Mocker::<ErrAlphaFn>::create(no_expectations()).map(|_| ()),
    );

    first.clear();
    first.verify().unwrap();
}

#[test]
fn deferred_install_replaces_only_disabled_records() {
    let stale = Mocker::<ErrBetaFn>::create_deferred(no_expectations()).unwrap();
    let fresh = Mocker::<ErrBetaFn>::create(
        Expectations::build(|each| {
            each.call(matching!()).once().returns(9);
        })
        .unwrap(),
    )
    .unwrap();

    // The stale handle's clear must not tear down the replacement.
    stale.clear();
    assert!(is_intercepted::<ErrBetaFn>());
    assert_eq!(9, err_beta());

    assert_eq!(
        Err(HandleError::UseAfterClear { name: "err_beta" }),
        stale.enable()
    );

    fresh.verify().unwrap();
    fresh.clear();
    assert_eq!(2, err_beta());
}

#[test]
fn unsupported_target_is_rejected_at_install() {
    struct Malformed;

    impl Target for Malformed {
        type Inputs = ();
        type Output = ();
        const NAME: &'static str = "Malformed";
        const KIND: TargetKind = TargetKind::Method;
        const ARITY: usize = 0;

        fn debug_inputs(_: &()) -> String {
            String::from("()")
        }
    }

    assert_eq!(
        Err(ConfigError::UnsupportedTarget {
            name: "Malformed",
            reason: "a method target must capture its receiver",
        }),
        Mocker::<Malformed>::create(no_expectations()).map(|_| ()),
    );
}

#[test]
fn wildcard_matcher_arity_mismatch_fails_at_setup() {
    // A raw all-accepting closure can declare any placeholder count; the
    // mismatch must surface when the expectations are built, not at call time.
    let result = Expectations::<ErrDeltaFn>::build(|each| {
        each.call(Matching::new(|_| true, 2)).returns(0);
    });

    assert_eq!(
        result.err(),
        Some(ConfigError::ArityMismatch {
            name: "err_delta",
            declared: 2,
            expected: 1,
        })
    );
}

#[test]
fn dropping_an_unverified_handle_reports_unfulfilled_expectations() {
    let result = catch_unwind(AssertUnwindSafe(|| {
        let _mocker = Mocker::<ErrGammaFn>::create(
            Expectations::build(|each| {
                each.call(matching!()).once().returns(30);
            })
            .unwrap(),
        )
        .unwrap();
    }));

    let payload = *result.unwrap_err().downcast::<String>().unwrap();
    assert!(payload.contains("err_gamma"));

    // The interception is gone even though verification failed.
    assert!(!is_intercepted::<ErrGammaFn>());
    assert_eq!(3, err_gamma());
}
