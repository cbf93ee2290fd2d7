//! The owning handle of one interception.

use core::any::TypeId;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::error::{ConfigError, HandleError, VerifyError};
use crate::registry::{self, OwnerToken};
use crate::{Collaborator, Target};

/// The owning token of one active (or formerly active) interception.
///
/// Created by [Mocker::create] or [Mocker::create_deferred]; while enabled,
/// every call to the target anywhere in the process is redirected into the
/// handle's collaborator. Dropping the handle clears the interception and,
/// if the handle was never verified, verifies it (panicking on failure, the
/// same way unfulfilled expectations surface in any mock library).
pub struct Mocker<T: Target> {
    core: Arc<MockerCore<T>>,
}

pub(crate) struct MockerCore<T: Target> {
    collab: Arc<dyn Collaborator<T>>,
    enabled: Arc<AtomicBool>,
    owner: OwnerToken,
    cleared: AtomicBool,
    verified: AtomicBool,
}

impl<T: Target> Mocker<T> {
    /// Install interception for `T`, enabled immediately.
    pub fn create<C: Collaborator<T>>(collab: C) -> Result<Self, ConfigError> {
        Self::install(Arc::new(collab), true)
    }

    /// Install interception for `T` in the disabled state; calls keep
    /// reaching the original until [Mocker::enable].
    pub fn create_deferred<C: Collaborator<T>>(collab: C) -> Result<Self, ConfigError> {
        Self::install(Arc::new(collab), false)
    }

    /// Like [Mocker::create], for a collaborator shared with other handles
    /// or with test code.
    pub fn create_shared(collab: Arc<dyn Collaborator<T>>) -> Result<Self, ConfigError> {
        Self::install(collab, true)
    }

    fn install(collab: Arc<dyn Collaborator<T>>, enabled: bool) -> Result<Self, ConfigError> {
        let enabled = Arc::new(AtomicBool::new(enabled));
        let owner = registry::install::<T>(collab.clone(), enabled.clone())?;

        Ok(Self {
            core: Arc::new(MockerCore {
                collab,
                enabled,
                owner,
                cleared: AtomicBool::new(false),
                verified: AtomicBool::new(false),
            }),
        })
    }

    /// Start redirecting calls. Idempotent while the handle is live.
    pub fn enable(&self) -> Result<(), HandleError> {
        if self.core.cleared.load(Ordering::Acquire) {
            return Err(HandleError::UseAfterClear { name: T::NAME });
        }
        self.core.enabled.store(true, Ordering::Release);
        Ok(())
    }

    /// Stop redirecting calls without removing the record. Idempotent.
    pub fn disable(&self) {
        self.core.enabled.store(false, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        !self.core.cleared.load(Ordering::Acquire) && self.core.enabled.load(Ordering::Acquire)
    }

    /// Ask the collaborator for the verdict on everything recorded so far.
    ///
    /// Marks the handle verified: the drop-time safety net will not re-verify.
    pub fn verify(&self) -> Result<(), VerifyError> {
        self.core.verify()
    }

    /// Disable and remove the interception; subsequent calls to the target
    /// reach the original implementation. Idempotent. Verification is
    /// deferred to [Mocker::verify], a [crate::MockGuard] or drop.
    pub fn clear(&self) {
        self.core.clear();
    }

    /// The expectation-matching collaborator this handle routes into.
    pub fn collaborator(&self) -> &Arc<dyn Collaborator<T>> {
        &self.core.collab
    }

    pub(crate) fn erased(&self) -> Weak<dyn ErasedMocker> {
        let core: Arc<dyn ErasedMocker> = self.core.clone();
        Arc::downgrade(&core)
    }
}

impl<T: Target> MockerCore<T> {
    fn clear(&self) {
        if self.cleared.swap(true, Ordering::AcqRel) {
            return;
        }
        self.enabled.store(false, Ordering::Release);
        registry::remove(TypeId::of::<T>(), self.owner);
    }

    fn verify(&self) -> Result<(), VerifyError> {
        self.verified.store(true, Ordering::Release);

        let mut failures = Vec::new();
        self.collab.verify(&mut failures);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(VerifyError::new(T::NAME, failures))
        }
    }
}

/// Type-erased view of a [MockerCore], for [crate::MockGuard].
pub(crate) trait ErasedMocker: Send + Sync {
    /// Verify (unless already verified) and clear. Called exactly once per
    /// guard teardown.
    fn teardown(&self) -> Result<(), VerifyError>;
}

impl<T: Target> ErasedMocker for MockerCore<T> {
    fn teardown(&self) -> Result<(), VerifyError> {
        let result = if self.verified.swap(true, Ordering::AcqRel) {
            Ok(())
        } else {
            self.verify()
        };
        self.clear();
        result
    }
}

impl<T: Target> Drop for MockerCore<T> {
    fn drop(&mut self) {
        self.clear();

        if self.verified.load(Ordering::Acquire) {
            return;
        }
        // A panic mid-flight must not be shadowed by a verification panic.
        if std::thread::panicking() {
            return;
        }
        if let Err(error) = self.verify() {
            panic!("{error}");
        }
    }
}
