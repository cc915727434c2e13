// 📊 Collection statistics - read models behind the dashboard charts
//
// All amounts are cents. Months are "YYYY-MM" keys and days are calendar dates,
// both taken in UTC from the stored timestamps.

use crate::error::{Error, Result};
use crate::money::Cents;
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Quota amounts falling due in one month, split by paid flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaMonthlySummary {
    /// "YYYY-MM"
    pub month: String,
    pub total_amount: Cents,
    pub amount_paid: Cents,
    pub amount_not_paid: Cents,
}

/// Payments received on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCollection {
    pub collection_date: NaiveDate,
    pub total_collected: Cents,
    pub payment_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_clients: u64,
    pub total_sales: u64,

    /// Sales not yet paid off
    pub active_sales: u64,

    /// Sum of all sale prices
    pub total_revenue: Cents,

    /// Outstanding balance on unpaid quotas, net of partial payments
    pub pending_amount: Cents,

    /// Payments dated in the current month
    pub collected_this_month: Cents,

    pub quotas_due_this_month: Cents,

    /// Payments (any date) against quotas due in the current month
    pub collected_from_quotas_due_this_month: Cents,

    pub quotas_due_next_month: Cents,
    pub paid_quotas_due_this_month: u64,
    pub count_quotas_due_this_month: u64,
    pub paid_quotas_due_last_month: u64,
    pub count_quotas_due_last_month: u64,
}

/// "YYYY-MM" keys of the months the dashboard looks at, relative to `now`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardMonths {
    pub last: String,
    pub this: String,
    pub next: String,
}

impl DashboardMonths {
    pub fn around(now: DateTime<Utc>) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
            .ok_or_else(|| Error::InvalidInput(format!("no month start for {}", now)))?;
        let last = first
            .checked_sub_months(Months::new(1))
            .ok_or_else(|| Error::InvalidInput(format!("no month before {}", first)))?;
        let next = first
            .checked_add_months(Months::new(1))
            .ok_or_else(|| Error::InvalidInput(format!("no month after {}", first)))?;

        Ok(DashboardMonths {
            last: month_key(last),
            this: month_key(first),
            next: month_key(next),
        })
    }
}

/// "YYYY-MM" for any date-like value
pub fn month_key<D: Datelike>(date: D) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_dashboard_months_cross_year_boundaries() {
        let jan = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 0).unwrap();
        assert_eq!(
            DashboardMonths::around(jan).unwrap(),
            DashboardMonths {
                last: "2024-12".to_string(),
                this: "2025-01".to_string(),
                next: "2025-02".to_string(),
            }
        );

        let dec = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
        let months = DashboardMonths::around(dec).unwrap();
        assert_eq!(months.last, "2024-11");
        assert_eq!(months.next, "2025-01");
    }

    #[test]
    fn test_month_key_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(987, 3, 9).unwrap();
        assert_eq!(month_key(date), "0987-03");
    }
}
