//! Scripted storefront doubles for scenario tests.
//!
//! `ScriptedStorefront` implements the catalog, variant and cart ports from
//! canned data and records every call in order. Faults (errors or hangs) can be
//! injected per search term or candidate. No network I/O.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use cartfill_resolve::{
    CartPort, CatalogPort, CommitReceipt, Credentials, Session, SessionPort, VariantPort,
};
use cartfill_schemas::{
    AuthFailure, CandidateId, CandidateProduct, OrderLine, PortError, Quantity, QuantityField,
    Variant,
};

/// Shorthand for building a valid order line in tests.
pub fn line(code: &str, quantity: &str, fallback: &str) -> OrderLine {
    match OrderLine::new(code, quantity, fallback) {
        Ok(l) => l,
        Err(e) => panic!("invalid test order line {code}/{quantity}: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Call log
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Search(String),
    Expand(CandidateId),
    Commit { field: QuantityField, quantity: Quantity },
}

// ---------------------------------------------------------------------------
// ScriptedStorefront
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ScriptedStorefront {
    results: HashMap<String, Vec<CandidateProduct>>,
    variants: HashMap<CandidateId, Vec<Variant>>,
    search_faults: HashMap<String, PortError>,
    expand_faults: HashMap<CandidateId, PortError>,
    commit_faults: HashMap<QuantityField, PortError>,
    hung_terms: HashSet<String>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedStorefront {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search results for `term`, in listed order. Unscripted terms return
    /// no candidates.
    pub fn with_search(mut self, term: &str, candidates: Vec<CandidateProduct>) -> Self {
        self.results.insert(term.to_string(), candidates);
        self
    }

    pub fn with_variants(mut self, candidate: &str, variants: Vec<Variant>) -> Self {
        self.variants.insert(CandidateId::new(candidate), variants);
        self
    }

    pub fn fail_search(mut self, term: &str, error: PortError) -> Self {
        self.search_faults.insert(term.to_string(), error);
        self
    }

    pub fn fail_expand(mut self, candidate: &str, error: PortError) -> Self {
        self.expand_faults.insert(CandidateId::new(candidate), error);
        self
    }

    pub fn fail_commit(mut self, field: &str, error: PortError) -> Self {
        self.commit_faults.insert(QuantityField::new(field), error);
        self
    }

    /// Searches for `term` never complete.
    pub fn hang_search(mut self, term: &str) -> Self {
        self.hung_terms.insert(term.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock_calls().clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.lock_calls()
            .iter()
            .filter_map(|c| match c {
                Call::Search(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn expansions(&self) -> Vec<CandidateId> {
        self.lock_calls()
            .iter()
            .filter_map(|c| match c {
                Call::Expand(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn commits(&self) -> Vec<(QuantityField, Quantity)> {
        self.lock_calls()
            .iter()
            .filter_map(|c| match c {
                Call::Commit { field, quantity } => Some((field.clone(), quantity.clone())),
                _ => None,
            })
            .collect()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<Call>> {
        // A poisoned log only means another test thread panicked mid-push.
        self.calls.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn record(&self, call: Call) {
        self.lock_calls().push(call);
    }
}

#[async_trait]
impl CatalogPort for ScriptedStorefront {
    async fn search(
        &self,
        term: &str,
        _session: &Session,
    ) -> Result<Vec<CandidateProduct>, PortError> {
        self.record(Call::Search(term.to_string()));
        if self.hung_terms.contains(term) {
            std::future::pending::<()>().await;
        }
        if let Some(e) = self.search_faults.get(term) {
            return Err(e.clone());
        }
        Ok(self.results.get(term).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl VariantPort for ScriptedStorefront {
    async fn expand(
        &self,
        candidate: &CandidateProduct,
        _session: &Session,
    ) -> Result<Vec<Variant>, PortError> {
        self.record(Call::Expand(candidate.id.clone()));
        if let Some(e) = self.expand_faults.get(&candidate.id) {
            return Err(e.clone());
        }
        Ok(self.variants.get(&candidate.id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl CartPort for ScriptedStorefront {
    async fn commit(
        &self,
        field: &QuantityField,
        quantity: &Quantity,
        _session: &Session,
    ) -> Result<CommitReceipt, PortError> {
        self.record(Call::Commit {
            field: field.clone(),
            quantity: quantity.clone(),
        });
        if let Some(e) = self.commit_faults.get(field) {
            return Err(e.clone());
        }
        Ok(CommitReceipt {
            field: field.clone(),
            quantity: quantity.clone(),
            message: Some("added to basket".to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// ScriptedSession
// ---------------------------------------------------------------------------

pub struct ScriptedSession {
    verdict: Result<Session, AuthFailure>,
    attempts: AtomicUsize,
}

impl ScriptedSession {
    pub fn accepting() -> Self {
        Self {
            verdict: Ok(Session::new("scripted-token")),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn rejecting(failure: AuthFailure) -> Self {
        Self {
            verdict: Err(failure),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionPort for ScriptedSession {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<Session, AuthFailure> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.verdict.clone()
    }
}
