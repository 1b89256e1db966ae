//! cartfill-resolve
//!
//! Product resolution for a single order line:
//! - code normalization and match-pattern derivation (`matching`)
//! - the storefront port contracts (`ports`)
//! - the single commit choke-point (`gateway`)
//! - the per-line decision procedure (`engine`)
//!
//! The engine depends only on the port traits. Transport details (URLs,
//! selectors, polling) belong to adapter crates.
//!
//! `CommitPermit` can only be issued inside this crate, and
//! `CartGateway::commit` consumes it. One permit is issued per line, so a line
//! can reach the cart at most once.

mod engine;
mod gateway;
mod matching;
mod ports;

pub use engine::{EnginePolicy, LineResolution, ResolutionEngine, DEFAULT_STEP_TIMEOUT};
pub use gateway::{CartGateway, CommitPermit};
pub use matching::{codes_match, first_matching_variant, normalize_code, MatchPattern, PATTERN_SUFFIX};
pub use ports::{
    CartPort, CatalogPort, CommitReceipt, Credentials, Session, SessionPort, VariantPort,
};
