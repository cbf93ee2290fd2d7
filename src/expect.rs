//! A compact expectation-matching collaborator.
//!
//! [Expectations] implements [Collaborator] with a list of call patterns,
//! each combining an input matcher, a count expectation and a responder.
//! Patterns are tried in declaration order; a matching but saturated pattern
//! is skipped, so overrunning an exact count records an unexpected call
//! instead of silently over-counting.
//!
//! Anything more elaborate (ordered sequences across targets, mismatch
//! diffing) belongs in an external collaborator behind the same trait.

use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::ConfigError;
use crate::{Collaborator, Outcome, Target};

/// An input matcher plus the number of placeholders it was declared with.
///
/// Built by the [crate::matching!] macro, which counts written placeholders,
/// or by [Matching::new] for hand-rolled closures. The placeholder count is
/// validated against the target's capture arity when the expectations are
/// built; a wildcard-only matcher is the case where the two can genuinely
/// disagree without the compiler noticing.
pub struct Matching<T: Target> {
    func: Box<dyn Fn(&T::Inputs) -> bool + Send + Sync>,
    n_placeholders: usize,
}

impl<T: Target> Matching<T> {
    pub fn new(
        func: impl Fn(&T::Inputs) -> bool + Send + Sync + 'static,
        n_placeholders: usize,
    ) -> Self {
        Self {
            func: Box::new(func),
            n_placeholders,
        }
    }

    /// Matches every call; arity-correct for any target by construction.
    pub fn any() -> Self {
        Self {
            func: Box::new(|_| true),
            n_placeholders: T::ARITY,
        }
    }
}

/// Builder scope for the call patterns of one target.
pub struct Each<T: Target> {
    builders: Vec<PatternBuilder<T>>,
}

impl<T: Target> Each<T> {
    /// Start the next call pattern, tried after every previously declared one.
    /// The returned builder configures count and response.
    pub fn call(&mut self, matching: Matching<T>) -> &mut PatternBuilder<T> {
        self.builders.push(PatternBuilder {
            matching,
            responder: None,
            count: None,
        });
        self.builders.last_mut().unwrap()
    }
}

pub struct PatternBuilder<T: Target> {
    matching: Matching<T>,
    responder: Option<Responder<T>>,
    count: Option<CountExpectation>,
}

impl<T: Target> PatternBuilder<T> {
    /// Respond with a clone of `value` on every match.
    pub fn returns(&mut self, value: T::Output) -> &mut Self
    where
        T::Output: Clone + Send + Sync,
    {
        self.responder = Some(Responder::Value(Box::new(CloneCell(value))));
        self
    }

    /// Respond with `value` exactly once; a later match records a failure and
    /// falls back to the original.
    pub fn returns_once(&mut self, value: T::Output) -> &mut Self
    where
        T::Output: Send,
    {
        self.responder = Some(Responder::Value(Box::new(TakeCell(Mutex::new(Some(
            value,
        ))))));
        self
    }

    /// Respond with a clone of a value that is not `Send`. The value may only
    /// be produced on the thread that configured it.
    #[cfg(feature = "fragile")]
    pub fn returns_fragile(&mut self, value: T::Output) -> &mut Self
    where
        T::Output: Clone,
    {
        self.responder = Some(Responder::Value(Box::new(FragileCell(Mutex::new(
            fragile::Fragile::new(value),
        )))));
        self
    }

    /// Compute the response from the captured inputs.
    pub fn answers(
        &mut self,
        func: impl Fn(T::Inputs) -> T::Output + Send + Sync + 'static,
    ) -> &mut Self {
        self.responder = Some(Responder::Answer(Box::new(func)));
        self
    }

    /// Count the match, then run the original implementation.
    pub fn forwards_to_original(&mut self) -> &mut Self {
        self.responder = Some(Responder::Forward);
        self
    }

    /// Expect this pattern to match exactly `n` times.
    pub fn times(&mut self, n: usize) -> &mut Self {
        self.count = Some(CountExpectation::Exactly(n));
        self
    }

    /// Expect this pattern to match at least `n` times.
    pub fn at_least(&mut self, n: usize) -> &mut Self {
        self.count = Some(CountExpectation::AtLeast(n));
        self
    }

    pub fn once(&mut self) -> &mut Self {
        self.times(1)
    }

    fn into_pattern(self) -> Result<CallPattern<T>, ConfigError> {
        if self.matching.n_placeholders != T::ARITY {
            return Err(ConfigError::ArityMismatch {
                name: T::NAME,
                declared: self.matching.n_placeholders,
                expected: T::ARITY,
            });
        }

        Ok(CallPattern {
            matching: self.matching,
            responder: self.responder.unwrap_or(Responder::Forward),
            count: self.count.unwrap_or(CountExpectation::AtLeast(1)),
            calls: AtomicUsize::new(0),
        })
    }
}

/// A [Collaborator] holding the configured call patterns for one target,
/// plus the mismatches recorded against them.
pub struct Expectations<T: Target> {
    patterns: Vec<CallPattern<T>>,
    mismatches: Mutex<Vec<String>>,
}

impl<T: Target> Expectations<T> {
    /// Configure patterns through an [Each] scope, then validate placeholder
    /// arities. Fails fast at setup time, never at call time.
    pub fn build(f: impl FnOnce(&mut Each<T>)) -> Result<Self, ConfigError> {
        let mut each = Each {
            builders: Vec::new(),
        };
        f(&mut each);

        let mut patterns = Vec::with_capacity(each.builders.len());
        for builder in each.builders {
            patterns.push(builder.into_pattern()?);
        }

        Ok(Self {
            patterns,
            mismatches: Mutex::new(Vec::new()),
        })
    }

    /// The mismatch reports recorded so far. Exposed so test code can assert
    /// on unexpected calls without tearing the handle down.
    pub fn recorded_mismatches(&self) -> Vec<String> {
        self.mismatches.lock().unwrap().clone()
    }

    fn record(&self, report: String) {
        self.mismatches.lock().unwrap().push(report);
    }
}

impl<T: Target> Collaborator<T> for Expectations<T> {
    fn on_call(&self, inputs: T::Inputs) -> Outcome<T> {
        for (pat_index, pattern) in self.patterns.iter().enumerate() {
            if !(pattern.matching.func)(&inputs) || pattern.saturated() {
                continue;
            }
            pattern.calls.fetch_add(1, Ordering::Relaxed);

            return match &pattern.responder {
                Responder::Value(cell) => match cell.produce() {
                    Some(output) => Outcome::Matched(output),
                    None => {
                        self.record(format!(
                            "{}{}: response of call pattern #{pat_index} already consumed",
                            T::NAME,
                            T::debug_inputs(&inputs)
                        ));
                        Outcome::Unmatched(inputs)
                    }
                },
                Responder::Answer(func) => Outcome::Matched(func(inputs)),
                Responder::Forward => Outcome::Forwarded(inputs),
            };
        }

        self.record(format!(
            "{}{}: unexpected call, no matching call pattern",
            T::NAME,
            T::debug_inputs(&inputs)
        ));
        Outcome::Unmatched(inputs)
    }

    fn verify(&self, failures: &mut Vec<String>) {
        failures.extend(self.mismatches.lock().unwrap().iter().cloned());

        for (pat_index, pattern) in self.patterns.iter().enumerate() {
            pattern.verify(pat_index, failures);
        }
    }
}

struct CallPattern<T: Target> {
    matching: Matching<T>,
    responder: Responder<T>,
    count: CountExpectation,
    calls: AtomicUsize,
}

impl<T: Target> CallPattern<T> {
    fn saturated(&self) -> bool {
        match self.count {
            CountExpectation::Exactly(target) => {
                self.calls.load(Ordering::Relaxed) >= target
            }
            CountExpectation::AtLeast(_) => false,
        }
    }

    fn verify(&self, pat_index: usize, failures: &mut Vec<String>) {
        let actual = NCalls(self.calls.load(Ordering::Relaxed));

        match self.count {
            CountExpectation::Exactly(target) if actual.0 != target => {
                failures.push(format!(
                    "{}: expected call pattern #{pat_index} to match exactly {}, but it matched {actual}",
                    T::NAME,
                    NCalls(target)
                ));
            }
            CountExpectation::AtLeast(target) if actual.0 < target => {
                failures.push(format!(
                    "{}: expected call pattern #{pat_index} to match at least {}, but it matched {actual}",
                    T::NAME,
                    NCalls(target)
                ));
            }
            _ => {}
        }
    }
}

enum CountExpectation {
    Exactly(usize),
    AtLeast(usize),
}

enum Responder<T: Target> {
    Value(Box<dyn Cell<T::Output>>),
    #[allow(clippy::type_complexity)]
    Answer(Box<dyn Fn(T::Inputs) -> T::Output + Send + Sync>),
    Forward,
}

trait Cell<V>: Send + Sync {
    fn produce(&self) -> Option<V>;
}

struct CloneCell<V>(V);

impl<V: Clone + Send + Sync> Cell<V> for CloneCell<V> {
    fn produce(&self) -> Option<V> {
        Some(self.0.clone())
    }
}

struct TakeCell<V>(Mutex<Option<V>>);

impl<V: Send> Cell<V> for TakeCell<V> {
    fn produce(&self) -> Option<V> {
        self.0.lock().unwrap().take()
    }
}

#[cfg(feature = "fragile")]
struct FragileCell<V>(Mutex<fragile::Fragile<V>>);

#[cfg(feature = "fragile")]
impl<V: Clone> Cell<V> for FragileCell<V> {
    fn produce(&self) -> Option<V> {
        Some(self.0.lock().unwrap().get().clone())
    }
}

struct NCalls(usize);

impl fmt::Display for NCalls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "no calls"),
            1 => write!(f, "1 call"),
            n => write!(f, "{n} calls"),
        }
    }
}
