//! Scope-bound teardown of mocker handles.

use std::sync::Weak;

use crate::mocker::ErasedMocker;
use crate::{Mocker, Target};

/// Ties one or more [Mocker] handles to a lexical scope.
///
/// On every exit path, including panics, the guard verifies and clears each
/// watched handle exactly once. Handles already cleared or dropped are
/// tolerated. Verification failures are aggregated into a single panic so a
/// failing assertion cannot leave an interception behind.
///
/// The guard holds weak references only; it never keeps a handle alive.
#[derive(Default)]
pub struct MockGuard {
    watched: Vec<Weak<dyn ErasedMocker>>,
}

impl MockGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch<T: Target>(mut self, mocker: &Mocker<T>) -> Self {
        self.watched.push(mocker.erased());
        self
    }

    pub fn watched_count(&self) -> usize {
        self.watched.len()
    }
}

impl Drop for MockGuard {
    fn drop(&mut self) {
        let mut failures = Vec::new();

        for weak in self.watched.drain(..) {
            let Some(core) = weak.upgrade() else {
                continue;
            };
            if let Err(error) = core.teardown() {
                failures.push(error.to_string());
            }
        }

        if failures.is_empty() || std::thread::panicking() {
            return;
        }
        panic!("{}", failures.join("\n"));
    }
}

/// Build a [MockGuard] watching each given [Mocker].
///
/// ```ignore
/// let _guard = mock_guard!(mocker_a, mocker_b);
/// ```
#[macro_export]
macro_rules! mock_guard {
    ($($mocker:expr),+ $(,)?) => {
        $crate::MockGuard::new()$(.watch(&$mocker))+
    };
}
