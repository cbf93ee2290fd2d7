use intermock::expect::Expectations;
use intermock::*;
use pretty_assertions::assert_eq;

pub trait Service {
    fn func(&self, b: i32) -> i32;
}

pub struct ProdService;

intercept_impl! {
    impl Service for ProdService {
        fn func(&self, b: i32) -> i32 as ProdServiceFunc { 888 + b }
    }
}

#[test]
fn redirects_calls_reached_through_a_base_reference() {
    let mocker = Mocker::<ProdServiceFunc>::create(
        Expectations::build(|each| {
            each.call(matching!(_, _)).times(2).returns(114);
        })
        .unwrap(),
    )
    .unwrap();

    let concrete = ProdService;
    let base: &dyn Service = &concrete;

    // Both dispatch paths reach the same trampoline.
    assert_eq!(114, base.func(123));
    assert_eq!(114, concrete.func(123));

    mocker.clear();
    assert_eq!(1011, base.func(123));

    mocker.verify().unwrap();
}

pub struct BackupService;

intercept_impl! {
    impl Service for BackupService {
        fn func(&self, b: i32) -> i32 as BackupServiceFunc { 888 + b }
    }
}

#[test]
fn boxed_base_references_are_redirected_too() {
    let mocker = Mocker::<BackupServiceFunc>::create_deferred(
        Expectations::build(|each| {
            each.call(matching!(_, 5)).once().returns(-5);
        })
        .unwrap(),
    )
    .unwrap();

    let boxed: Box<dyn Service> = Box::new(BackupService);
    assert_eq!(893, boxed.func(5));

    mocker.enable().unwrap();
    assert_eq!(-5, boxed.func(5));

    mocker.clear();
    mocker.verify().unwrap();
}
