//! The process-wide redirection table.
//!
//! Maps a target's [TypeId] to its active substitution record. Installs and
//! removals go through the write lock and are serialized; call-site lookups
//! take the read lock only, so threads spawned by the code under test can
//! reach intercepted callables concurrently with unrelated installs.

use core::any::{Any, TypeId};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::error::ConfigError;
use crate::{Collaborator, Target, TargetKind};

static TABLE: Lazy<RwLock<HashMap<TypeId, DynRecord>>> = Lazy::new(Default::default);
static NEXT_OWNER: AtomicUsize = AtomicUsize::new(0);

/// Identifies the handle that installed a record. A replaced record's stale
/// owner can no longer remove the replacement.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct OwnerToken(usize);

/// One active substitution: target info, shared enabled flag and the
/// type-erased collaborator the trampoline routes into.
struct DynRecord {
    owner: OwnerToken,
    enabled: Arc<AtomicBool>,
    handler: Arc<dyn Any + Send + Sync>,
}

/// Concrete payload behind the `dyn Any`, recovered per dispatch.
struct HandlerBox<T: Target>(Arc<dyn Collaborator<T>>);

#[derive(Clone, Copy)]
pub(crate) struct TargetInfo {
    pub name: &'static str,
    pub kind: TargetKind,
    pub arity: usize,
}

impl TargetInfo {
    pub fn of<T: Target>() -> Self {
        Self {
            name: T::NAME,
            kind: T::KIND,
            arity: T::ARITY,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.kind.captures_receiver() && self.arity == 0 {
            return Err(ConfigError::UnsupportedTarget {
                name: self.name,
                reason: "a method target must capture its receiver",
            });
        }
        Ok(())
    }
}

/// Register a substitution record for `T`.
///
/// Rejects the install while an enabled record exists. A disabled record is
/// replaced; its owner keeps a stale token, which makes the older handle's
/// `clear` a no-op instead of tearing down the replacement.
pub(crate) fn install<T: Target>(
    collab: Arc<dyn Collaborator<T>>,
    enabled: Arc<AtomicBool>,
) -> Result<OwnerToken, ConfigError> {
    let info = TargetInfo::of::<T>();
    info.validate()?;

    let owner = OwnerToken(NEXT_OWNER.fetch_add(1, Ordering::Relaxed));

    let mut table = TABLE.write().unwrap();
    if let Some(existing) = table.get(&TypeId::of::<T>()) {
        if existing.enabled.load(Ordering::Acquire) {
            return Err(ConfigError::AlreadyIntercepted { name: info.name });
        }
    }
    table.insert(
        TypeId::of::<T>(),
        DynRecord {
            owner,
            enabled,
            handler: Arc::new(HandlerBox::<T>(collab)),
        },
    );
    Ok(owner)
}

/// Drop the record for `target` if `owner` still owns it. Idempotent.
pub(crate) fn remove(target: TypeId, owner: OwnerToken) {
    let mut table = TABLE.write().unwrap();
    if let Some(record) = table.get(&target) {
        if record.owner == owner {
            table.remove(&target);
        }
    }
}

/// Fetch the collaborator for `T` if an enabled record exists.
///
/// Runs on every trampoline invocation and must stay cheap: one read lock,
/// one hash lookup, two refcount bumps.
pub(crate) fn active_handler<T: Target>() -> Option<Arc<dyn Collaborator<T>>> {
    let handler = {
        let table = TABLE.read().unwrap();
        let record = table.get(&TypeId::of::<T>())?;
        if !record.enabled.load(Ordering::Acquire) {
            return None;
        }
        record.handler.clone()
    };

    handler
        .downcast_ref::<HandlerBox<T>>()
        .map(|boxed| boxed.0.clone())
}

/// Whether an enabled interception is currently installed for `T`.
pub fn is_intercepted<T: Target>() -> bool {
    let table = TABLE.read().unwrap();
    table
        .get(&TypeId::of::<T>())
        .map(|record| record.enabled.load(Ordering::Acquire))
        .unwrap_or(false)
}
