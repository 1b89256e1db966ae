//! Deterministic in-memory storefront.
//!
//! Serves a fixture catalog through the storefront ports and keeps accepted
//! commits in an in-memory basket. No randomness, no I/O after load.
//!
//! - search: products whose code contains the term, or that list it as a
//!   variant code or in `search_terms` (all case-insensitive); fixture order
//!   is preserved.
//! - quantity field handle: `"{product_id}#{variant_index}"`.
//! - `stock == 0` means sold out; commits against it are rejected.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use cartfill_resolve::{
    CartPort, CatalogPort, CommitReceipt, Credentials, Session, SessionPort, VariantPort,
};
use cartfill_schemas::{
    AuthFailure, CandidateProduct, PortError, Quantity, QuantityField, Variant,
};
use tracing::debug;

pub mod types;

use types::{BasketLine, PaperCatalog, PaperProduct, PaperVariant};

#[derive(Debug, Default)]
pub struct PaperStorefront {
    catalog: PaperCatalog,
    basket: Mutex<Vec<BasketLine>>,
}

impl PaperStorefront {
    pub fn new(catalog: PaperCatalog) -> Self {
        Self {
            catalog,
            basket: Mutex::new(Vec::new()),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let catalog: PaperCatalog = serde_json::from_str(raw).context("parse paper catalog json")?;
        Ok(Self::new(catalog))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read paper catalog: {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("load paper catalog: {}", path.display()))
    }

    pub fn catalog(&self) -> &PaperCatalog {
        &self.catalog
    }

    /// Accepted commits, in commit order.
    pub fn basket(&self) -> Vec<BasketLine> {
        self.lock_basket().clone()
    }

    fn lock_basket(&self) -> std::sync::MutexGuard<'_, Vec<BasketLine>> {
        self.basket.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn product(&self, id: &str) -> Option<&PaperProduct> {
        self.catalog.products.iter().find(|p| p.id == id)
    }

    fn resolve_field(&self, field: &QuantityField) -> Option<(&PaperProduct, &PaperVariant)> {
        let (product_id, idx) = field.as_str().rsplit_once('#')?;
        let idx: usize = idx.parse().ok()?;
        let product = self.product(product_id)?;
        product.variants.get(idx).map(|v| (product, v))
    }
}

fn field_handle(product_id: &str, idx: usize) -> String {
    format!("{product_id}#{idx}")
}

#[async_trait]
impl CatalogPort for PaperStorefront {
    async fn search(
        &self,
        term: &str,
        _session: &Session,
    ) -> Result<Vec<CandidateProduct>, PortError> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let hits: Vec<CandidateProduct> = self
            .catalog
            .products
            .iter()
            .filter(|p| {
                p.code.to_lowercase().contains(&needle)
                    || p.variants.iter().any(|v| v.code.trim().to_lowercase() == needle)
                    || p.search_terms.iter().any(|t| t.trim().to_lowercase() == needle)
            })
            .map(|p| CandidateProduct::new(p.id.clone(), p.code.clone()))
            .collect();
        debug!(term, count = hits.len(), "paper search");
        Ok(hits)
    }
}

#[async_trait]
impl VariantPort for PaperStorefront {
    async fn expand(
        &self,
        candidate: &CandidateProduct,
        _session: &Session,
    ) -> Result<Vec<Variant>, PortError> {
        let product = self
            .product(candidate.id.as_str())
            .ok_or_else(|| PortError::Rejected(format!("unknown product '{}'", candidate.id)))?;
        Ok(product
            .variants
            .iter()
            .enumerate()
            .map(|(i, v)| {
                if v.stock == 0 {
                    Variant::sold_out(v.code.clone())
                } else {
                    Variant::available(v.code.clone(), field_handle(&product.id, i))
                }
            })
            .collect())
    }
}

#[async_trait]
impl CartPort for PaperStorefront {
    async fn commit(
        &self,
        field: &QuantityField,
        quantity: &Quantity,
        _session: &Session,
    ) -> Result<CommitReceipt, PortError> {
        let (product, variant) = self
            .resolve_field(field)
            .ok_or_else(|| PortError::Rejected(format!("unknown quantity field '{}'", field.as_str())))?;
        if variant.stock == 0 {
            return Err(PortError::Rejected(format!("variant '{}' is sold out", variant.code)));
        }

        self.lock_basket().push(BasketLine {
            field: field.as_str().to_string(),
            product_id: product.id.clone(),
            variant_code: variant.code.clone(),
            quantity: quantity.as_str().to_string(),
        });

        Ok(CommitReceipt {
            field: field.clone(),
            quantity: quantity.clone(),
            message: Some(format!("paper basket: {} x {}", quantity, variant.code)),
        })
    }
}

// ---------------------------------------------------------------------------
// PaperSession
// ---------------------------------------------------------------------------

/// Session port for PAPER runs. Accepts any credentials unless built with
/// [`PaperSession::rejecting`].
#[derive(Debug, Clone, Default)]
pub struct PaperSession {
    reject: bool,
}

impl PaperSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self { reject: true }
    }
}

#[async_trait]
impl SessionPort for PaperSession {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<Session, AuthFailure> {
        if self.reject {
            return Err(AuthFailure::BadCredentials);
        }
        Ok(Session::new("paper"))
    }
}
