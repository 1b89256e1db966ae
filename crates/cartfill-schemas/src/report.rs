use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::order::OrderLine;
use crate::outcome::{AuthFailure, LineOutcome, OutcomeKind};

/// One processed order line. `position` is 1-based input order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub position: usize,
    pub line: OrderLine,
    pub outcome: LineOutcome,
    /// Cart commits attempted for this line (0 or 1).
    pub commits: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    SessionFailed(AuthFailure),
}

/// Auditable result of a full run. Records appear in input order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at_utc: DateTime<Utc>,
    pub finished_at_utc: DateTime<Utc>,
    pub status: RunStatus,
    pub records: Vec<LineRecord>,
}

impl RunReport {
    pub fn is_session_failure(&self) -> bool {
        matches!(self.status, RunStatus::SessionFailed(_))
    }

    pub fn total_commits(&self) -> usize {
        self.records.iter().map(|r| r.commits).sum()
    }

    pub fn summary(&self) -> RunSummary {
        let mut s = RunSummary {
            lines: self.records.len(),
            ..RunSummary::default()
        };
        for r in &self.records {
            match r.outcome.kind() {
                OutcomeKind::Fulfilled => s.fulfilled += 1,
                OutcomeKind::NoCandidateFamily => s.no_candidate_family += 1,
                OutcomeKind::NoVariantMatch => s.no_variant_match += 1,
                OutcomeKind::SoldOut => s.sold_out += 1,
                OutcomeKind::ExhaustedFallback => s.exhausted_fallback += 1,
                OutcomeKind::Failed => s.failed += 1,
            }
        }
        s
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub lines: usize,
    pub fulfilled: usize,
    pub no_candidate_family: usize,
    pub no_variant_match: usize,
    pub sold_out: usize,
    pub exhausted_fallback: usize,
    pub failed: usize,
}
