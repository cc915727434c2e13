// 🗄️ Persistence boundary consumed by the propagator and the reconciler
//
// Every call is a blocking round-trip to the store and may fail with
// NotFound / InvalidId / Timeout / Persistence. Implementations:
// - db::SqliteStore      (production, rusqlite)
// - memory::InMemoryStore (tests; `testing` feature)

use crate::entities::{
    Client, ClientId, DailyCollection, DashboardMonths, DashboardStats, NewClient, NewPayment,
    NewSale, Payment, PaymentId, Quota, QuotaId, QuotaMonthlySummary, Sale, SaleId, SaleSummary,
    StateRow, UnpaidQuota,
};
use crate::error::{Error, Result};
use crate::money::Cents;
use crate::severity::Severity;
use chrono::{DateTime, NaiveDate, Utc};

pub trait QuotaStore {
    fn get_quota(&self, id: QuotaId) -> Result<Quota>;

    /// All quotas of a sale, ordered by number
    fn get_quotas_by_sale(&self, sale_id: SaleId) -> Result<Vec<Quota>>;

    fn update_quota_payment_status(&self, id: QuotaId, is_paid: bool, state: Severity) -> Result<()>;

    /// Edit amount and due date (state fields untouched)
    fn update_quota(&self, id: QuotaId, amount: Cents, due_date: DateTime<Utc>) -> Result<()>;

    /// Reconciler: every quota not yet paid
    fn list_unpaid_quotas(&self) -> Result<Vec<UnpaidQuota>>;

    /// Reconciler: state-only write
    fn update_quota_state(&self, id: QuotaId, state: Severity) -> Result<()>;
}

pub trait SaleStore {
    /// Sale row without its quotas
    fn get_sale(&self, id: SaleId) -> Result<Sale>;

    fn get_sales_by_client(&self, client_id: ClientId) -> Result<Vec<SaleSummary>>;

    fn update_sale_payment_status(&self, id: SaleId, is_paid: bool, state: Severity) -> Result<()>;

    /// Removes the sale together with its quotas and their payments
    fn delete_sale(&self, id: SaleId) -> Result<()>;

    /// Insert the sale and its generated schedule atomically
    fn create_sale_with_quotas(&self, sale: &NewSale) -> Result<SaleId>;

    /// Reconciler: sales having at least one quota in a non-OK state
    fn list_sales_with_non_ok_quotas(&self) -> Result<Vec<StateRow<SaleId>>>;

    /// Reconciler: state-only write
    fn update_sale_state(&self, id: SaleId, state: Severity) -> Result<()>;
}

pub trait ClientStore {
    fn insert_client(&self, client: &NewClient) -> Result<Client>;

    fn get_client(&self, id: ClientId) -> Result<Client>;

    fn update_client_state(&self, id: ClientId, state: Severity) -> Result<()>;

    /// Reconciler: clients having at least one sale in a non-OK state
    fn list_clients_with_non_ok_sales(&self) -> Result<Vec<StateRow<ClientId>>>;

    /// `(state, number of clients)`; states with no clients may be omitted
    fn count_clients_by_state(&self) -> Result<Vec<(Severity, u64)>>;
}

pub trait PaymentLedger {
    /// Payments on a quota, ordered by date
    fn get_payments_by_quota(&self, quota_id: QuotaId) -> Result<Vec<Payment>>;

    fn get_payment(&self, id: PaymentId) -> Result<Payment>;

    /// Insert a payment; the client reference is stamped from the owning quota
    fn create_payment(&self, payment: &NewPayment) -> Result<Payment>;

    fn delete_payment(&self, id: PaymentId) -> Result<()>;

    /// Sum of all payments on a quota (zero when there are none).
    /// A total outside the `i64` range is a persistence error, not a wrap.
    fn sum_payments(&self, quota_id: QuotaId) -> Result<Cents> {
        let payments = self.get_payments_by_quota(quota_id)?;
        Cents::checked_sum(payments.into_iter().map(|p| p.amount)).ok_or_else(|| {
            Error::Persistence(format!("payments on quota {} overflow the amount range", quota_id))
        })
    }
}

/// Aggregates for the dashboard charts; read-only
pub trait StatsStore {
    /// Quota amounts per due month, ascending; one year or all of them.
    /// Quotas without a due date are left out.
    fn quota_monthly_summary(&self, year: Option<i32>) -> Result<Vec<QuotaMonthlySummary>>;

    /// Years that have at least one quota falling due, newest first
    fn quota_years(&self) -> Result<Vec<i32>>;

    /// Payments per day within `[start, end]`, ascending; days without payments are absent
    fn daily_collections(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyCollection>>;

    fn dashboard_stats(&self, months: &DashboardMonths) -> Result<DashboardStats>;
}

/// Everything the engine and its read models need from one backing store
pub trait Store:
    QuotaStore + SaleStore + ClientStore + PaymentLedger + StatsStore + Send + Sync
{
}

impl<T> Store for T where
    T: QuotaStore + SaleStore + ClientStore + PaymentLedger + StatsStore + Send + Sync
{
}
