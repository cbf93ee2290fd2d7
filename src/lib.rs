//!
//! `intermock` redirects calls to free functions, static methods and instance
//! methods (including dyn-dispatched ones) into a programmable mock, without
//! touching the production call sites, and fully reversibly per test case.
//!
//! A target is declared once, at its definition, with one of the interception
//! macros. The macro generates the callable with its original signature plus a
//! marker type implementing [Target]. Test code then installs a [Mocker] for
//! that marker type:
//!
//! ```rust
//! use intermock::*;
//! use intermock::expect::Expectations;
//!
//! intercept! {
//!     fn greeting() -> &'static str as GreetingFn { "Non mocked." }
//! }
//!
//! fn test() {
//!     let mocker = Mocker::<GreetingFn>::create(
//!         Expectations::build(|each| {
//!             each.call(matching!()).once().returns("Hello world.");
//!         })
//!         .unwrap(),
//!     )
//!     .unwrap();
//!
//!     assert_eq!("Hello world.", greeting());
//!
//!     mocker.clear();
//!     assert_eq!("Non mocked.", greeting());
//! }
//! ```
//!
//! While no mocker is installed (or after [Mocker::clear]), the generated
//! callable runs its original body; the only residue of interception is the
//! redirection lookup itself.
//!
//! The expectation-matching engine is pluggable: anything implementing
//! [Collaborator] can be installed. The [expect] module ships a compact
//! reference implementation covering matchers, call counts and responders.

#![forbid(unsafe_code)]

pub mod error;
pub mod expect;

mod dispatch;
mod guard;
mod macros;
mod mocker;
mod registry;

pub use dispatch::{dispatch, Disposition};
pub use guard::MockGuard;
pub use mocker::Mocker;
pub use registry::is_intercepted;

use core::any::TypeId;
use core::fmt;

/// A marker type identifying one interceptable callable.
///
/// Implementations are generated by the interception macros ([intercept!],
/// [intercept_static!], [intercept_methods!], [intercept_impl!]); the marker's
/// [TypeId] is the key of the process-wide redirection table.
pub trait Target: Sized + 'static {
    /// The captured parameters, as a tuple. For instance methods the first
    /// element is the [Receiver].
    type Inputs: 'static;
    /// The return type of the intercepted callable.
    type Output: 'static;

    /// Path-like name of the callable, used in failure reports.
    const NAME: &'static str;
    const KIND: TargetKind;
    /// Number of captured parameters, receiver included where applicable.
    const ARITY: usize;

    /// Render the captured inputs for failure reports.
    fn debug_inputs(inputs: &Self::Inputs) -> String;
}

/// The dispatch shape of an interceptable callable.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TargetKind {
    FreeFunction,
    StaticMethod,
    /// Non-virtual instance method; the receiver is captured as the first input.
    Method,
    /// Method reached through dynamic dispatch. Interception happens at the
    /// dispatch level, so calls through a base-type reference are redirected too.
    VirtualMethod,
}

impl TargetKind {
    pub const fn captures_receiver(self) -> bool {
        matches!(self, Self::Method | Self::VirtualMethod)
    }
}

/// Type-erased, non-owning capture of a method receiver: identity plus type
/// tag. Never extends the receiver's lifetime.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Receiver {
    addr: usize,
    type_id: TypeId,
    type_name: &'static str,
}

impl Receiver {
    pub fn capture<R: 'static>(receiver: &R) -> Self {
        Self {
            addr: receiver as *const R as usize,
            type_id: TypeId::of::<R>(),
            type_name: core::any::type_name::<R>(),
        }
    }

    /// Whether the captured receiver has concrete type `R`.
    pub fn is<R: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<R>()
    }

    /// Whether this capture refers to exactly `receiver`.
    pub fn refers_to<R: 'static>(&self, receiver: &R) -> bool {
        *self == Self::capture(receiver)
    }

    pub fn addr(&self) -> usize {
        self.addr
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.type_name, self.addr)
    }
}

/// The expectation-matching side of an interception.
///
/// The core hands every redirected call to [Collaborator::on_call] and asks
/// for the verdict at verification time. Mismatches are the collaborator's to
/// record; the core guarantees they surface by the end of the owning scope.
pub trait Collaborator<T: Target>: Send + Sync + 'static {
    /// Evaluate one redirected call.
    fn on_call(&self, inputs: T::Inputs) -> Outcome<T>;

    /// Push one report per unfulfilled expectation or recorded mismatch.
    fn verify(&self, failures: &mut Vec<String>);
}

/// Verdict of a collaborator for one redirected call.
pub enum Outcome<T: Target> {
    /// A configured behavior matched and produced the output.
    Matched(T::Output),
    /// A configured behavior matched and elected to run the original.
    Forwarded(T::Inputs),
    /// No configured behavior matched. The collaborator has recorded the
    /// mismatch; the inputs are handed back so the original can still run.
    Unmatched(T::Inputs),
}
