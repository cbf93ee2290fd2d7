use intermock::expect::Expectations;
use intermock::*;

intercept! {
    fn thread_walk(v: i32) -> i32 as ThreadWalkFn { v }
}

#[test]
fn redirection_applies_to_threads_spawned_by_the_code_under_test() {
    let mocker = Mocker::<ThreadWalkFn>::create(
        Expectations::build(|each| {
            each.call(matching!(_)).at_least(4).answers(|(v,)| v * 10);
        })
        .unwrap(),
    )
    .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| std::thread::spawn(move || thread_walk(i)))
        .collect();
    let mut results: Vec<i32> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    results.sort_unstable();

    assert_eq!(vec![0, 10, 20, 30], results);

    mocker.verify().unwrap();
    mocker.clear();
    assert_eq!(5, thread_walk(5));
}
