// 💵 Payment Entity - money recorded against a single quota
//
// Immutable once written: payments are only ever created or deleted.

use super::ids::{ClientId, PaymentId, QuotaId};
use crate::error::Result;
use crate::money::Cents;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub quota_id: QuotaId,

    /// Stamped from the owning quota when the payment is created
    pub client_id: ClientId,

    pub amount: Cents,
    pub date: DateTime<Utc>,
}

/// Payment request before it is written to the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub quota_id: QuotaId,
    pub amount: Cents,

    /// Defaults to now when absent
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl NewPayment {
    pub fn new(quota_id: QuotaId, amount: Cents) -> Self {
        NewPayment {
            quota_id,
            amount,
            date: None,
        }
    }

    /// Amount must be positive and within `Cents::MAX`
    pub fn validate(&self) -> Result<()> {
        self.amount.check_amount("payment amount")?;
        Ok(())
    }

    /// Effective payment date
    pub fn date_or_now(&self) -> DateTime<Utc> {
        self.date.unwrap_or_else(Utc::now)
    }
}
