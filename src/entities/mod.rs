// Entity Models
//
// Value-type records. Parents are referenced by id only (no back-pointers);
// callers re-fetch through the store when they need the parent.

pub mod ids;
pub mod client;
pub mod sale;
pub mod quota;
pub mod payment;
pub mod stats;

pub use ids::{ClientId, PaymentId, QuotaId, SaleId};
pub use client::{complete_status_counts, Client, ClientStatusCount, NewClient};
pub use sale::{NewSale, Sale, SaleSummary, StateRow, MAX_INSTALLMENTS};
pub use quota::{NewQuota, Quota, UnpaidQuota};
pub use payment::{NewPayment, Payment};
pub use stats::{
    month_key, DailyCollection, DashboardMonths, DashboardStats, QuotaMonthlySummary,
};
