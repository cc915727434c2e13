// 🧾 Sale Entity - a credit purchase paid off in quotas
//
// A sale is paid when every quota is paid; its state is the worst state among
// its unpaid quotas. Both are derived and only written by propagation.

use super::ids::{ClientId, SaleId};
use super::quota::{NewQuota, Quota};
use crate::error::{Error, Result};
use crate::money::Cents;
use crate::severity::Severity;
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub client_id: ClientId,
    pub description: String,
    pub amount: Cents,
    pub date: DateTime<Utc>,
    pub is_paid: bool,
    pub state: Severity,

    /// Ordered by quota number; empty unless loaded
    #[serde(default)]
    pub quotas: Vec<Quota>,
}

/// Lightweight view used for client rollups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleSummary {
    pub id: SaleId,
    pub description: String,
    pub is_paid: bool,
    pub state: Severity,
}

/// `(id, stored state)` pair used by the reconciler for sales and clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateRow<Id> {
    pub id: Id,
    pub state: Severity,
}

// ============================================================================
// NEW SALE + INSTALLMENT SCHEDULE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSale {
    pub client_id: ClientId,

    #[serde(default)]
    pub description: String,

    /// Total price of the sale
    pub amount: Cents,

    /// Sale date; the first quota falls due on this date
    pub date: DateTime<Utc>,

    /// Number of quotas to generate
    pub installments: u32,

    /// Amount owed per quota
    pub quota_amount: Cents,
}

/// Longest schedule accepted: ten years of monthly quotas
pub const MAX_INSTALLMENTS: u32 = 120;

impl NewSale {
    pub fn validate(&self) -> Result<()> {
        if self.installments == 0 {
            return Err(Error::InvalidInput(
                "a sale needs at least one installment".to_string(),
            ));
        }
        if self.installments > MAX_INSTALLMENTS {
            return Err(Error::InvalidInput(format!(
                "a sale can have at most {} installments, got {}",
                MAX_INSTALLMENTS, self.installments
            )));
        }
        self.amount.check_amount("sale amount")?;
        self.quota_amount.check_amount("quota amount")?;
        Ok(())
    }

    /// Monthly schedule: quota `n` falls due `n - 1` calendar months after the
    /// sale date. Day-of-month overflow clamps to the last day of the month.
    pub fn schedule(&self) -> Result<Vec<NewQuota>> {
        (0..self.installments)
            .map(|offset| {
                let due_date = self
                    .date
                    .checked_add_months(Months::new(offset))
                    .ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "installment {} falls outside the supported date range",
                            offset + 1
                        ))
                    })?;

                Ok(NewQuota {
                    number: offset + 1,
                    amount: self.quota_amount,
                    due_date,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_sale(installments: u32, date: DateTime<Utc>) -> NewSale {
        NewSale {
            client_id: ClientId(1),
            description: "Heladera (1)".to_string(),
            amount: Cents::from_major(3000.0),
            date,
            installments,
            quota_amount: Cents::from_major(1000.0),
        }
    }

    #[test]
    fn test_schedule_is_monthly_starting_at_sale_date() {
        let date = Utc.with_ymd_and_hms(2025, 1, 10, 9, 30, 0).unwrap();
        let quotas = new_sale(3, date).schedule().unwrap();

        assert_eq!(quotas.len(), 3);
        assert_eq!(quotas[0].number, 1);
        assert_eq!(quotas[0].due_date, date);
        assert_eq!(quotas[1].due_date, Utc.with_ymd_and_hms(2025, 2, 10, 9, 30, 0).unwrap());
        assert_eq!(quotas[2].due_date, Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap());
        assert!(quotas.iter().all(|q| q.amount == Cents::from_major(1000.0)));
    }

    #[test]
    fn test_schedule_clamps_to_month_end() {
        let date = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let quotas = new_sale(2, date).schedule().unwrap();
        assert_eq!(quotas[1].due_date, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_validate() {
        let date = Utc::now();
        assert!(new_sale(3, date).validate().is_ok());
        assert!(new_sale(0, date).validate().is_err());

        let mut free = new_sale(3, date);
        free.quota_amount = Cents::ZERO;
        assert!(free.validate().is_err());
    }

    #[test]
    fn test_validate_caps_installments() {
        let date = Utc::now();
        assert!(new_sale(MAX_INSTALLMENTS, date).validate().is_ok());

        let err = new_sale(MAX_INSTALLMENTS + 1, date).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(new_sale(u32::MAX, date).validate().is_err());
    }

    #[test]
    fn test_validate_caps_amounts() {
        let date = Utc::now();
        let over = Cents::new(Cents::MAX.raw() + 1);

        let mut sale = new_sale(3, date);
        sale.amount = over;
        assert!(sale.validate().unwrap_err().to_string().contains("sale amount"));

        let mut sale = new_sale(3, date);
        sale.quota_amount = over;
        assert!(sale.validate().unwrap_err().to_string().contains("quota amount"));

        let mut sale = new_sale(3, date);
        sale.amount = Cents::MAX;
        sale.quota_amount = Cents::MAX;
        assert!(sale.validate().is_ok());
    }
}
