//! Error taxonomy shared by the classifier, strategies and dispatcher.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized error type assigned by the classifier.
///
/// Types are mutually exclusive; every processed error carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    /// Identity could not be established (bad credentials, expired session).
    Authentication,
    /// Identity is known but lacks permission for the action.
    Authorization,
    /// Input was rejected; the user has to correct it.
    Validation,
    /// Transport-level failure talking to a remote dependency.
    Network,
    /// Persistence layer failure.
    Database,
    /// Domain rule rejected the operation.
    BusinessLogic,
    /// Environment or deployment misconfiguration.
    Configuration,
    /// Anything the classifier could not place.
    System,
}

impl ErrorType {
    /// All types, in declaration order.
    pub const ALL: [ErrorType; 8] = [
        Self::Authentication,
        Self::Authorization,
        Self::Validation,
        Self::Network,
        Self::Database,
        Self::BusinessLogic,
        Self::Configuration,
        Self::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::Validation => "validation",
            Self::Network => "network",
            Self::Database => "database",
            Self::BusinessLogic => "business_logic",
            Self::Configuration => "configuration",
            Self::System => "system",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity drives the fallback response shape and escalation.
///
/// Ordered: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Cosmetic; the user can carry on.
    Low,
    /// The action failed but can be retried by the user.
    Medium,
    /// Limited recovery options; the user is interrupted.
    High,
    /// Data integrity at risk; requires operator support.
    Critical,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the delay between caller-visible retries grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Same delay for every attempt.
    Fixed,
    /// `base * 2^(attempt - 1)`, capped.
    Exponential,
}
