//! cartfill-schemas
//!
//! Shared data model for the cart-fulfillment workspace: order lines, catalog
//! candidates and variants, per-line outcomes, and the run report.
//!
//! Pure types. No IO, no storefront calls.

mod catalog;
mod order;
mod outcome;
mod report;

pub use catalog::{CandidateId, CandidateProduct, QuantityField, Variant, VariantSlot};
pub use order::{OrderLine, OrderLineError, Quantity};
pub use outcome::{
    AuthFailure, FailureStage, LineFailure, LineOutcome, OutcomeKind, PatternError, PortError,
    ResolutionOutcome, ResolutionPath,
};
pub use report::{LineRecord, RunReport, RunStatus, RunSummary};
