use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::CandidateId;
use crate::order::Quantity;

// ---------------------------------------------------------------------------
// Port / session errors
// ---------------------------------------------------------------------------

/// Errors a storefront port may return for a single operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PortError {
    /// Network or navigation failure.
    Transport(String),
    /// The operation did not complete within the step timeout.
    Timeout { op: String, after_ms: u64 },
    /// The storefront answered but refused the operation.
    Rejected(String),
    /// A response payload could not be decoded.
    Decode(String),
}

impl fmt::Display for PortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortError::Transport(msg) => write!(f, "transport error: {msg}"),
            PortError::Timeout { op, after_ms } => {
                write!(f, "timeout: {op} did not complete within {after_ms}ms")
            }
            PortError::Rejected(msg) => write!(f, "rejected by storefront: {msg}"),
            PortError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for PortError {}

/// Why a session could not be established. Run-fatal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AuthFailure {
    BadCredentials,
    Transport(String),
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::BadCredentials => write!(f, "credentials rejected by storefront"),
            AuthFailure::Transport(msg) => write!(f, "session transport error: {msg}"),
        }
    }
}

impl std::error::Error for AuthFailure {}

/// Match-pattern derivation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum PatternError {
    NoDigitRun(String),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::NoDigitRun(code) => {
                write!(f, "product code '{code}' contains no digit run")
            }
        }
    }
}

impl std::error::Error for PatternError {}

// ---------------------------------------------------------------------------
// Per-line failure
// ---------------------------------------------------------------------------

/// Step of the per-line procedure at which a failure happened.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    PrimarySearch,
    PrimaryExpand,
    FallbackSearch,
    FallbackExpand,
    Commit,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::PrimarySearch => "primary_search",
            FailureStage::PrimaryExpand => "primary_expand",
            FailureStage::FallbackSearch => "fallback_search",
            FailureStage::FallbackExpand => "fallback_expand",
            FailureStage::Commit => "commit",
        }
    }
}

/// A line that could not be resolved. Never escapes the line boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineFailure {
    InvalidLine { error: PatternError },
    Transport { stage: FailureStage, error: PortError },
}

impl fmt::Display for LineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineFailure::InvalidLine { error } => write!(f, "invalid line: {error}"),
            LineFailure::Transport { stage, error } => {
                write!(f, "{} failed: {error}", stage.as_str())
            }
        }
    }
}

impl std::error::Error for LineFailure {}

// ---------------------------------------------------------------------------
// Resolution outcomes
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPath {
    Primary,
    Fallback,
}

impl ResolutionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionPath::Primary => "primary",
            ResolutionPath::Fallback => "fallback",
        }
    }
}

/// Terminal state of one order line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Fulfilled {
        path: ResolutionPath,
        candidate: CandidateId,
        variant_code: String,
        quantity: Quantity,
    },
    NoCandidateFamily,
    NoVariantMatch,
    SoldOut,
    ExhaustedFallback,
}

impl ResolutionOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ResolutionOutcome::Fulfilled { .. } => OutcomeKind::Fulfilled,
            ResolutionOutcome::NoCandidateFamily => OutcomeKind::NoCandidateFamily,
            ResolutionOutcome::NoVariantMatch => OutcomeKind::NoVariantMatch,
            ResolutionOutcome::SoldOut => OutcomeKind::SoldOut,
            ResolutionOutcome::ExhaustedFallback => OutcomeKind::ExhaustedFallback,
        }
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, ResolutionOutcome::Fulfilled { .. })
    }
}

/// What was recorded for a line: a terminal outcome or a contained failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum LineOutcome {
    Resolved(ResolutionOutcome),
    Failed(LineFailure),
}

impl LineOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            LineOutcome::Resolved(o) => o.kind(),
            LineOutcome::Failed(_) => OutcomeKind::Failed,
        }
    }

    pub fn resolved(&self) -> Option<&ResolutionOutcome> {
        match self {
            LineOutcome::Resolved(o) => Some(o),
            LineOutcome::Failed(_) => None,
        }
    }
}

/// Flat classification used for summaries and the CSV export.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Fulfilled,
    NoCandidateFamily,
    NoVariantMatch,
    SoldOut,
    ExhaustedFallback,
    Failed,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Fulfilled => "FULFILLED",
            OutcomeKind::NoCandidateFamily => "NO_CANDIDATE_FAMILY",
            OutcomeKind::NoVariantMatch => "NO_VARIANT_MATCH",
            OutcomeKind::SoldOut => "SOLD_OUT",
            OutcomeKind::ExhaustedFallback => "EXHAUSTED_FALLBACK",
            OutcomeKind::Failed => "FAILED",
        }
    }
}
