//! Poll failure policy.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What the poll loop does after a failed fetch.
///
/// Either way the metrics endpoint keeps serving the last
/// successfully recorded values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log the failure and try again after the normal interval.
    #[default]
    Resilient,
    /// Stop polling permanently after the first failure.
    FailFast,
}

impl FailurePolicy {
    /// Whether a failure ends the polling lifetime.
    pub fn halts_on_failure(self) -> bool {
        matches!(self, Self::FailFast)
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resilient => write!(f, "resilient"),
            Self::FailFast => write!(f, "fail-fast"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "resilient" => Ok(Self::Resilient),
            "fail-fast" | "failfast" | "fail_fast" => Ok(Self::FailFast),
            other => Err(format!(
                "unknown failure policy '{other}' (expected 'resilient' or 'fail-fast')"
            )),
        }
    }
}
