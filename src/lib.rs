// Installment Tracker - Core Library
// State propagation for installment sales: quota → sale → client severity,
// kept current on every mutation and by a periodic reconciler.

pub mod error;
pub mod money;
pub mod severity;
pub mod entities;
pub mod store;
pub mod db;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod propagator;
pub mod service;
pub mod reconciliation;
pub mod config;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{Error, Result};
pub use money::Cents;
pub use severity::{
    classify_quota_at, classify_quota_by_due_date, months_past, roll_up_severity, Severity,
};
pub use entities::{
    Client, ClientId, ClientStatusCount, NewClient,
    Sale, SaleId, SaleSummary, NewSale, StateRow,
    Quota, QuotaId, NewQuota, UnpaidQuota,
    Payment, PaymentId, NewPayment,
    QuotaMonthlySummary, DailyCollection, DashboardStats, DashboardMonths,
};
pub use store::{ClientStore, PaymentLedger, QuotaStore, SaleStore, StatsStore, Store};
pub use db::{setup_database, SqliteStore};
#[cfg(any(test, feature = "testing"))]
pub use memory::InMemoryStore;
pub use propagator::{PropagatedState, StatePropagator};
pub use service::InstallmentService;
pub use reconciliation::{
    spawn_reconciler, BulkStateReconciler, PassSummary, ReconciliationReport,
};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
