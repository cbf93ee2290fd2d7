use std::panic::{catch_unwind, AssertUnwindSafe};

use intermock::expect::Expectations;
use intermock::*;

intercept! {
    fn guard_alpha() -> i32 as GuardAlphaFn { 1 }
}

intercept! {
    fn guard_beta() -> i32 as GuardBetaFn { 2 }
}

intercept! {
    fn guard_gamma() -> i32 as GuardGammaFn { 3 }
}

intercept! {
    fn guard_delta() -> i32 as GuardDeltaFn { 4 }
}

fn expect_one_call<T: Target<Output = i32>>(value: i32) -> Expectations<T> {
    Expectations::build(|each| {
        each.call(expect::Matching::any()).once().returns(value);
    })
    .unwrap()
}

#[test]
fn guard_verifies_and_clears_on_normal_exit() {
    {
        let alpha = Mocker::<GuardAlphaFn>::create(expect_one_call(10)).unwrap();
        let _guard = mock_guard!(alpha);

        assert_eq!(10, guard_alpha());
    }

    assert!(!is_intercepted::<GuardAlphaFn>());
    assert_eq!(1, guard_alpha());
}

#[test]
fn guard_reports_unfulfilled_expectations_and_still_clears() {
    let result = catch_unwind(AssertUnwindSafe(|| {
        let beta = Mocker::<GuardBetaFn>::create(expect_one_call(20)).unwrap();
        let gamma = Mocker::<GuardGammaFn>::create(expect_one_call(30)).unwrap();
        let _guard = mock_guard!(beta, gamma);

        // Neither target is called; the guard must report both on exit.
    }));

    let payload = *result.unwrap_err().downcast::<String>().unwrap();
    assert!(payload.contains("guard_beta"));
    assert!(payload.contains("guard_gamma"));

    assert!(!is_intercepted::<GuardBetaFn>());
    assert!(!is_intercepted::<GuardGammaFn>());
}

#[test]
fn guard_tolerates_manually_cleared_and_dropped_handles() {
    let delta = Mocker::<GuardDeltaFn>::create(expect_one_call(40)).unwrap();
    let guard = MockGuard::new().watch(&delta);
    assert_eq!(1, guard.watched_count());

    assert_eq!(40, guard_delta());
    delta.verify().unwrap();
    delta.clear();
    delta.clear();
    drop(delta);

    // The weak reference no longer upgrades; teardown is a quiet no-op.
    drop(guard);
    assert!(!is_intercepted::<GuardDeltaFn>());
}
