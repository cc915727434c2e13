// 🔁 State Propagator - quota → sale → client cascade after one leaf change
//
// Every write is unconditional (no dirty check) and every step runs in order:
// quota write happens-before the sale rollup, which happens-before the client
// rollup. Any failure aborts the rest of the cascade; there is no partial
// commit recovery.
//
// Concurrent cascades on the same sale or client are not serialised here.
// Two cascades may read the same children and the later write wins.

use crate::entities::{ClientId, QuotaId, SaleId};
use crate::error::Result;
use crate::severity::{classify_quota_by_due_date, roll_up_severity, Severity};
use crate::store::Store;
use std::sync::Arc;
use tracing::debug;

/// Outcome of a single propagation step, as persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagatedState {
    pub is_paid: bool,
    pub state: Severity,
}

pub struct StatePropagator<S> {
    store: Arc<S>,
}

impl<S> Clone for StatePropagator<S> {
    fn clone(&self) -> Self {
        StatePropagator {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> StatePropagator<S> {
    pub fn new(store: Arc<S>) -> Self {
        StatePropagator { store }
    }

    /// Recompute a quota's paid flag and state, then cascade to its sale and client.
    pub fn propagate_from_quota(&self, quota_id: QuotaId) -> Result<PropagatedState> {
        let quota = self.store.get_quota(quota_id)?;

        let total_paid = self.store.sum_payments(quota_id)?;
        let is_paid = quota.is_settled_by(total_paid);
        let state = classify_quota_by_due_date(quota.due_date);

        self.store.update_quota_payment_status(quota_id, is_paid, state)?;
        debug!(
            quota_id = %quota_id,
            is_paid,
            state = %state,
            total_paid = %total_paid,
            "quota state persisted"
        );

        self.propagate_from_sale(quota.sale_id)?;
        self.propagate_from_client(quota.client_id)?;

        Ok(PropagatedState { is_paid, state })
    }

    /// Recompute a sale from its quotas.
    ///
    /// Does not cascade to the client: callers that need the client updated
    /// must call [`propagate_from_client`](Self::propagate_from_client) themselves.
    pub fn propagate_from_sale(&self, sale_id: SaleId) -> Result<PropagatedState> {
        let quotas = self.store.get_quotas_by_sale(sale_id)?;

        let is_paid = quotas.iter().all(|q| q.is_paid);
        let state = roll_up_severity(quotas.iter().map(|q| (q.is_paid, q.state)));

        self.store.update_sale_payment_status(sale_id, is_paid, state)?;
        debug!(
            sale_id = %sale_id,
            quotas = quotas.len(),
            is_paid,
            state = %state,
            "sale state persisted"
        );

        Ok(PropagatedState { is_paid, state })
    }

    /// Recompute a client from all of its sales, paid or not
    pub fn propagate_from_client(&self, client_id: ClientId) -> Result<Severity> {
        let sales = self.store.get_sales_by_client(client_id)?;

        let state = roll_up_severity(sales.iter().map(|s| (false, s.state)));

        self.store.update_client_state(client_id, state)?;
        debug!(client_id = %client_id, sales = sales.len(), state = %state, "client state persisted");

        Ok(state)
    }
}
