// 📅 Quota Entity - one scheduled installment of a sale
//
// Parent linkage is denormalized: a quota carries both its sale id and its
// client id so propagation can reach either without a join. The record is an
// immutable snapshot; the store owns the data.

use super::ids::{ClientId, QuotaId, SaleId};
use super::payment::Payment;
use crate::money::Cents;
use crate::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quota {
    pub id: QuotaId,

    /// Position in the sale's schedule (1-based)
    pub number: u32,

    pub sale_id: SaleId,
    pub client_id: ClientId,

    /// Money owed
    pub amount: Cents,

    pub due_date: Option<DateTime<Utc>>,

    /// Derived: payments on this quota sum to at least `amount`
    pub is_paid: bool,

    /// Derived from `due_date` only
    pub state: Severity,

    /// Loaded on demand, ordered by date
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payments: Vec<Payment>,
}

impl Quota {
    /// Whether `total_paid` settles this quota (exact comparison, no tolerance)
    pub fn is_settled_by(&self, total_paid: Cents) -> bool {
        total_paid >= self.amount
    }
}

/// Quota row to insert as part of a new sale (ids assigned by the store)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuota {
    pub number: u32,
    pub amount: Cents,
    pub due_date: DateTime<Utc>,
}

/// Candidate row for the bulk reconciler's quota pass
#[derive(Debug, Clone, PartialEq)]
pub struct UnpaidQuota {
    pub id: QuotaId,
    pub due_date: Option<DateTime<Utc>>,
    pub state: Severity,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quota(amount: i64) -> Quota {
        Quota {
            id: QuotaId(1),
            number: 1,
            sale_id: SaleId(1),
            client_id: ClientId(1),
            amount: Cents::new(amount),
            due_date: None,
            is_paid: false,
            state: Severity::Ok,
            payments: Vec::new(),
        }
    }

    #[test]
    fn test_exact_payment_settles_quota() {
        let q = quota(100_000);
        assert!(q.is_settled_by(Cents::new(100_000)));
        assert!(q.is_settled_by(Cents::new(100_001)));
        assert!(!q.is_settled_by(Cents::new(99_999)));
    }
}
