//! Storefront port contracts.
//!
//! Adapters (HTTP storefront, paper storefront, scripted test doubles) implement
//! these traits. The resolution engine never sees anything beneath them.

use std::fmt;

use async_trait::async_trait;
use cartfill_schemas::{
    AuthFailure, CandidateProduct, PortError, Quantity, QuantityField, Variant,
};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Authenticated storefront context threaded through every port call.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    /// True when the session was restored from persisted state instead of a
    /// fresh login.
    pub reused: bool,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            reused: false,
        }
    }

    pub fn restored(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            reused: true,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("reused", &self.reused)
            .finish()
    }
}

/// Login credentials. Never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What the storefront acknowledged after a quantity was placed in the cart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitReceipt {
    pub field: QuantityField,
    pub quantity: Quantity,
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SessionPort: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Session, AuthFailure>;
}

#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Candidates for `term`, in the order the storefront lists them.
    /// An empty vector is the "no results" signal.
    async fn search(
        &self,
        term: &str,
        session: &Session,
    ) -> Result<Vec<CandidateProduct>, PortError>;
}

#[async_trait]
pub trait VariantPort: Send + Sync {
    /// Variants under `candidate`, in listed order.
    async fn expand(
        &self,
        candidate: &CandidateProduct,
        session: &Session,
    ) -> Result<Vec<Variant>, PortError>;
}

/// Raw cart mutation. Only [`crate::CartGateway`] should call this.
#[async_trait]
pub trait CartPort: Send + Sync {
    async fn commit(
        &self,
        field: &QuantityField,
        quantity: &Quantity,
        session: &Session,
    ) -> Result<CommitReceipt, PortError>;
}
