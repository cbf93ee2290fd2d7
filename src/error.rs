use std::fmt;

/// Setup-time failure. Fatal to the current test case; nothing was installed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// An enabled interception already exists for the target. Two active
    /// substitutions for one target would make routing ambiguous.
    AlreadyIntercepted { name: &'static str },
    /// A matcher declared a different number of placeholders than the target
    /// captures (receiver included).
    ArityMismatch {
        name: &'static str,
        declared: usize,
        expected: usize,
    },
    /// The target declaration itself is malformed and cannot be trampolined.
    UnsupportedTarget {
        name: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyIntercepted { name } => {
                write!(
                    f,
                    "cannot intercept {name}: an enabled interception already exists"
                )
            }
            Self::ArityMismatch {
                name,
                declared,
                expected,
            } => {
                write!(
                    f,
                    "{name}: matcher declares {declared} placeholder(s), but the target captures {expected} parameter(s)"
                )
            }
            Self::UnsupportedTarget { name, reason } => {
                write!(f, "{name} cannot be intercepted: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Misuse of a [crate::Mocker] after it was cleared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandleError {
    UseAfterClear { name: &'static str },
}

impl fmt::Display for HandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UseAfterClear { name } => {
                write!(f, "{name}: handle was already cleared")
            }
        }
    }
}

impl std::error::Error for HandleError {}

/// Aggregated verification failures for one target, as reported by its
/// collaborator.
#[derive(Clone, Debug)]
pub struct VerifyError {
    name: &'static str,
    failures: Vec<String>,
}

impl VerifyError {
    pub(crate) fn new(name: &'static str, failures: Vec<String>) -> Self {
        Self { name, failures }
    }

    pub fn target_name(&self) -> &'static str {
        self.name
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "verification of {} failed:", self.name)?;
        for failure in &self.failures {
            write!(f, "\n- {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for VerifyError {}
