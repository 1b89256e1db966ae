//! Per-line resolution procedure.
//!
//! Primary path: search the primary code, expand the FIRST family candidate,
//! commit on an available matching variant. Fallback path: search the fallback
//! code, expand EVERY family candidate in listed order, commit on the first
//! available matching variant. Without a commit the outcome is concluded from
//! what was observed along the way.
//!
//! Every port call is bounded by `EnginePolicy::step_timeout`. A transport
//! error or timeout ends the line as `LineFailure::Transport`; nothing escapes
//! the line boundary.

use std::future::Future;
use std::time::Duration;

use cartfill_schemas::{
    CandidateProduct, FailureStage, LineFailure, LineOutcome, OrderLine, PortError,
    QuantityField, ResolutionOutcome, ResolutionPath, VariantSlot,
};
use tracing::{debug, info, warn};

use crate::gateway::{CartGateway, CommitPermit};
use crate::matching::{first_matching_variant, MatchPattern};
use crate::ports::{CartPort, CatalogPort, Session, VariantPort};

pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnginePolicy {
    pub step_timeout: Duration,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }
}

/// Result of resolving one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineResolution {
    pub outcome: LineOutcome,
    /// Commit calls made for this line. Never more than 1.
    pub commits: usize,
}

/// What the procedure saw before concluding without a commit.
#[derive(Default)]
struct Observed {
    sold_out: bool,
    family_seen: bool,
    fallback_empty: bool,
}

impl Observed {
    fn conclude(&self) -> ResolutionOutcome {
        if self.sold_out {
            ResolutionOutcome::SoldOut
        } else if self.fallback_empty {
            ResolutionOutcome::ExhaustedFallback
        } else if !self.family_seen {
            ResolutionOutcome::NoCandidateFamily
        } else {
            ResolutionOutcome::NoVariantMatch
        }
    }
}

pub struct ResolutionEngine<'p, C, V, K>
where
    C: CatalogPort + ?Sized,
    V: VariantPort + ?Sized,
    K: CartPort + ?Sized,
{
    catalog: &'p C,
    variants: &'p V,
    gateway: CartGateway<'p, K>,
    policy: EnginePolicy,
}

impl<'p, C, V, K> ResolutionEngine<'p, C, V, K>
where
    C: CatalogPort + ?Sized,
    V: VariantPort + ?Sized,
    K: CartPort + ?Sized,
{
    pub fn new(catalog: &'p C, variants: &'p V, cart: &'p K, policy: EnginePolicy) -> Self {
        Self {
            catalog,
            variants,
            gateway: CartGateway::new(cart),
            policy,
        }
    }

    pub fn policy(&self) -> EnginePolicy {
        self.policy
    }

    /// Resolve one order line. `position` is the line's 1-based input position.
    pub async fn resolve(&self, position: usize, line: &OrderLine, session: &Session) -> LineResolution {
        let permit = CommitPermit::issue(position);
        let mut commits = 0usize;

        let outcome = match self.resolve_line(permit, line, session, &mut commits).await {
            Ok(outcome) => {
                match &outcome {
                    ResolutionOutcome::Fulfilled { path, variant_code, .. } => info!(
                        position,
                        path = path.as_str(),
                        variant = variant_code.as_str(),
                        quantity = line.quantity.as_str(),
                        "line fulfilled"
                    ),
                    other => info!(position, outcome = other.kind().as_str(), "line not fulfilled"),
                }
                LineOutcome::Resolved(outcome)
            }
            Err(failure) => {
                warn!(position, error = %failure, "line failed");
                LineOutcome::Failed(failure)
            }
        };

        LineResolution { outcome, commits }
    }

    async fn resolve_line(
        &self,
        permit: CommitPermit,
        line: &OrderLine,
        session: &Session,
        commits: &mut usize,
    ) -> Result<ResolutionOutcome, LineFailure> {
        let pattern = MatchPattern::derive(&line.primary_code)
            .map_err(|error| LineFailure::InvalidLine { error })?;
        debug!(code = line.primary_code.as_str(), pattern = pattern.as_str(), "derived match pattern");

        let mut seen = Observed::default();

        // ---- primary path: first family candidate only ----
        let candidates = self
            .step(
                FailureStage::PrimarySearch,
                "search",
                self.catalog.search(&line.primary_code, session),
            )
            .await?;
        debug!(count = candidates.len(), "primary search");

        if let Some(candidate) = candidates.iter().find(|c| pattern.matches_family(&c.code)) {
            seen.family_seen = true;
            let variants = self
                .step(
                    FailureStage::PrimaryExpand,
                    "expand",
                    self.variants.expand(candidate, session),
                )
                .await?;

            match first_matching_variant(&variants, &line.primary_code).map(|v| (v, &v.slot)) {
                Some((v, VariantSlot::Available(field))) => {
                    return self
                        .commit(permit, ResolutionPath::Primary, candidate, &v.displayed_code, field, line, session, commits)
                        .await;
                }
                Some((v, VariantSlot::SoldOut)) => {
                    debug!(candidate = %candidate.id, variant = v.displayed_code.as_str(), "primary variant sold out");
                    seen.sold_out = true;
                }
                None => debug!(candidate = %candidate.id, "no matching variant on primary candidate"),
            }
        }

        // ---- fallback path: every family candidate ----
        if !line.has_fallback() {
            seen.fallback_empty = true;
            return Ok(seen.conclude());
        }

        let candidates = self
            .step(
                FailureStage::FallbackSearch,
                "search",
                self.catalog.search(&line.fallback_code, session),
            )
            .await?;
        debug!(count = candidates.len(), term = line.fallback_code.as_str(), "fallback search");

        if candidates.is_empty() {
            seen.fallback_empty = true;
        }

        for candidate in candidates.iter().filter(|c| pattern.matches_family(&c.code)) {
            seen.family_seen = true;
            let variants = self
                .step(
                    FailureStage::FallbackExpand,
                    "expand",
                    self.variants.expand(candidate, session),
                )
                .await?;

            match first_matching_variant(&variants, &line.primary_code).map(|v| (v, &v.slot)) {
                Some((v, VariantSlot::Available(field))) => {
                    return self
                        .commit(permit, ResolutionPath::Fallback, candidate, &v.displayed_code, field, line, session, commits)
                        .await;
                }
                Some((v, VariantSlot::SoldOut)) => {
                    debug!(candidate = %candidate.id, variant = v.displayed_code.as_str(), "fallback variant sold out");
                    seen.sold_out = true;
                }
                None => {}
            }
        }

        Ok(seen.conclude())
    }

    #[allow(clippy::too_many_arguments)]
    async fn commit(
        &self,
        permit: CommitPermit,
        path: ResolutionPath,
        candidate: &CandidateProduct,
        variant_code: &str,
        field: &QuantityField,
        line: &OrderLine,
        session: &Session,
        commits: &mut usize,
    ) -> Result<ResolutionOutcome, LineFailure> {
        *commits += 1;
        let receipt = self
            .step(
                FailureStage::Commit,
                "commit",
                self.gateway.commit(permit, field, &line.quantity, session),
            )
            .await?;
        if let Some(msg) = receipt.message.as_deref() {
            debug!(message = msg, "cart acknowledged");
        }

        Ok(ResolutionOutcome::Fulfilled {
            path,
            candidate: candidate.id.clone(),
            variant_code: variant_code.to_string(),
            quantity: line.quantity.clone(),
        })
    }

    async fn step<T, F>(&self, stage: FailureStage, op: &str, fut: F) -> Result<T, LineFailure>
    where
        F: Future<Output = Result<T, PortError>>,
    {
        let limit = self.policy.step_timeout;
        let res = match tokio::time::timeout(limit, fut).await {
            Ok(res) => res,
            Err(_) => Err(PortError::Timeout {
                op: op.to_string(),
                after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            }),
        };
        res.map_err(|error| LineFailure::Transport { stage, error })
    }
}
