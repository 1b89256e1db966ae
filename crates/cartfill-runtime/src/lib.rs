//! cartfill-runtime
//!
//! Fulfillment driver: authenticates once, then feeds order lines through the
//! resolution engine strictly in input order, one at a time, with a cooldown
//! between consecutive lines. Every line yields a `LineRecord`; only an
//! authentication failure stops the run.

mod driver;

pub use driver::{DriverConfig, FulfillmentDriver, DEFAULT_COOLDOWN};
