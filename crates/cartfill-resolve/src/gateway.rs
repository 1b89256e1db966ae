//! Cart Gateway: the single choke-point for cart mutation.
//!
//! `CartGateway::commit` takes a [`CommitPermit`] by value. Permits are only
//! minted inside this crate (`CommitPermit::issue` is `pub(crate)`, and the
//! `_priv` field blocks struct-literal construction), and the engine mints
//! exactly one per order line. A second commit for the same line does not
//! compile: the permit has already been moved.
//!
//! A failed commit consumes the permit too. There is no retry.

use cartfill_schemas::{PortError, Quantity, QuantityField};
use tracing::debug;

use crate::ports::{CartPort, CommitReceipt, Session};

// ---------------------------------------------------------------------------
// CommitPermit
// ---------------------------------------------------------------------------

/// Single-use right to mutate the cart for one order line.
#[derive(Debug)]
pub struct CommitPermit {
    position: usize,
    _priv: (),
}

impl CommitPermit {
    pub(crate) fn issue(position: usize) -> Self {
        Self { position, _priv: () }
    }

    /// 1-based order line this permit was issued for.
    pub fn position(&self) -> usize {
        self.position
    }
}

// ---------------------------------------------------------------------------
// CartGateway
// ---------------------------------------------------------------------------

pub struct CartGateway<'p, K: CartPort + ?Sized> {
    cart: &'p K,
}

impl<'p, K: CartPort + ?Sized> CartGateway<'p, K> {
    pub fn new(cart: &'p K) -> Self {
        Self { cart }
    }

    /// Place `quantity` into `field`, consuming the line's permit.
    pub async fn commit(
        &self,
        permit: CommitPermit,
        field: &QuantityField,
        quantity: &Quantity,
        session: &Session,
    ) -> Result<CommitReceipt, PortError> {
        let CommitPermit { position, .. } = permit;
        debug!(position, field = field.as_str(), quantity = quantity.as_str(), "cart commit");
        self.cart.commit(field, quantity, session).await
    }
}
