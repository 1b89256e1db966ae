use std::time::Duration;

use cartfill_resolve::{
    CartPort, CatalogPort, Credentials, EnginePolicy, ResolutionEngine, SessionPort, VariantPort,
};
use cartfill_schemas::{LineRecord, OrderLine, RunReport, RunStatus};
use chrono::Utc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(1000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// Pause between consecutive lines. Not applied before the first or after
    /// the last line.
    pub cooldown: Duration,
    pub engine: EnginePolicy,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            engine: EnginePolicy::default(),
        }
    }
}

pub struct FulfillmentDriver<'p, S, C, V, K>
where
    S: SessionPort + ?Sized,
    C: CatalogPort + ?Sized,
    V: VariantPort + ?Sized,
    K: CartPort + ?Sized,
{
    sessions: &'p S,
    engine: ResolutionEngine<'p, C, V, K>,
    cooldown: Duration,
}

impl<'p, S, C, V, K> FulfillmentDriver<'p, S, C, V, K>
where
    S: SessionPort + ?Sized,
    C: CatalogPort + ?Sized,
    V: VariantPort + ?Sized,
    K: CartPort + ?Sized,
{
    pub fn new(
        sessions: &'p S,
        catalog: &'p C,
        variants: &'p V,
        cart: &'p K,
        config: DriverConfig,
    ) -> Self {
        Self {
            sessions,
            engine: ResolutionEngine::new(catalog, variants, cart, config.engine),
            cooldown: config.cooldown,
        }
    }

    /// Run every line and return the report. Never panics on port failures.
    pub async fn run(&self, lines: &[OrderLine], credentials: &Credentials) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at_utc = Utc::now();
        info!(%run_id, lines = lines.len(), "fulfillment run starting");

        let session = match self.sessions.authenticate(credentials).await {
            Ok(session) => session,
            Err(failure) => {
                warn!(%run_id, error = %failure, "authentication failed; no lines processed");
                return RunReport {
                    run_id,
                    started_at_utc,
                    finished_at_utc: Utc::now(),
                    status: RunStatus::SessionFailed(failure),
                    records: Vec::new(),
                };
            }
        };
        info!(reused = session.reused, "session established");

        let mut records = Vec::with_capacity(lines.len());
        for (idx, line) in lines.iter().enumerate() {
            if idx > 0 && !self.cooldown.is_zero() {
                tokio::time::sleep(self.cooldown).await;
            }

            let position = idx + 1;
            let span = info_span!("line", position, code = line.primary_code.as_str());
            let res = self
                .engine
                .resolve(position, line, &session)
                .instrument(span)
                .await;

            records.push(LineRecord {
                position,
                line: line.clone(),
                outcome: res.outcome,
                commits: res.commits,
            });
        }

        let report = RunReport {
            run_id,
            started_at_utc,
            finished_at_utc: Utc::now(),
            status: RunStatus::Completed,
            records,
        };

        let s = report.summary();
        info!(
            %run_id,
            lines = s.lines,
            fulfilled = s.fulfilled,
            sold_out = s.sold_out,
            no_candidate_family = s.no_candidate_family,
            no_variant_match = s.no_variant_match,
            exhausted_fallback = s.exhausted_fallback,
            failed = s.failed,
            "fulfillment run finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cartfill_resolve::{CommitReceipt, Session};
    use cartfill_schemas::{
        AuthFailure, CandidateProduct, PortError, Quantity, QuantityField, Variant,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Empty {
        accept: bool,
        searches: AtomicUsize,
    }

    #[async_trait]
    impl SessionPort for Empty {
        async fn authenticate(&self, _c: &Credentials) -> Result<Session, AuthFailure> {
            if self.accept {
                Ok(Session::new("t"))
            } else {
                Err(AuthFailure::BadCredentials)
            }
        }
    }

    #[async_trait]
    impl CatalogPort for Empty {
        async fn search(&self, _t: &str, _s: &Session) -> Result<Vec<CandidateProduct>, PortError> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }
    }

    #[async_trait]
    impl VariantPort for Empty {
        async fn expand(&self, _c: &CandidateProduct, _s: &Session) -> Result<Vec<Variant>, PortError> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl CartPort for Empty {
        async fn commit(
            &self,
            _f: &QuantityField,
            _q: &Quantity,
            _s: &Session,
        ) -> Result<CommitReceipt, PortError> {
            Err(PortError::Rejected("unexpected".to_string()))
        }
    }

    fn lines() -> Vec<OrderLine> {
        vec![
            OrderLine::new("A100B", "2", "HLP1").unwrap(),
            OrderLine::new("B200", "1", "").unwrap(),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn records_every_line_in_order() {
        let p = Empty {
            accept: true,
            searches: AtomicUsize::new(0),
        };
        let driver = FulfillmentDriver::new(&p, &p, &p, &p, DriverConfig::default());
        let report = driver.run(&lines(), &Credentials::new("a", "b")).await;

        assert_eq!(report.status, RunStatus::Completed);
        let positions: Vec<usize> = report.records.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert_eq!(report.records[1].line.primary_code, "B200");
        assert_eq!(report.total_commits(), 0);
    }

    #[tokio::test]
    async fn bad_credentials_stop_the_run() {
        let p = Empty {
            accept: false,
            searches: AtomicUsize::new(0),
        };
        let driver = FulfillmentDriver::new(&p, &p, &p, &p, DriverConfig::default());
        let report = driver.run(&lines(), &Credentials::new("a", "b")).await;

        assert_eq!(report.status, RunStatus::SessionFailed(AuthFailure::BadCredentials));
        assert!(report.records.is_empty());
        assert_eq!(p.searches.load(Ordering::SeqCst), 0);
    }
}
