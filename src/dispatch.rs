//! The uniform trampoline entry point.
//!
//! Every generated trampoline funnels its captured inputs through
//! [dispatch] and acts on the returned [Disposition].

use crate::registry;
use crate::{Outcome, Target};

/// What a trampoline should do with one invocation.
#[must_use]
pub enum Disposition<T: Target> {
    /// The collaborator produced the output; return it to the caller as-is.
    Intercepted(T::Output),
    /// Run the original body with the captured inputs. Taken when no enabled
    /// substitution exists, when a configured behavior forwards, and when a
    /// mismatch was recorded (the mismatch surfaces at verification, not as a
    /// crash at the call site).
    CallOriginal(T::Inputs),
}

/// Route one call through the redirection table.
pub fn dispatch<T: Target>(inputs: T::Inputs) -> Disposition<T> {
    let Some(handler) = registry::active_handler::<T>() else {
        return Disposition::CallOriginal(inputs);
    };

    match handler.on_call(inputs) {
        Outcome::Matched(output) => Disposition::Intercepted(output),
        Outcome::Forwarded(inputs) | Outcome::Unmatched(inputs) => {
            Disposition::CallOriginal(inputs)
        }
    }
}
