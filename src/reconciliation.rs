// ⚖️ Reconciliation Engine - correct state drift caused by time passing
//
// A quota crosses the WARNING or SUSPENDED threshold without any write to
// trigger propagation. This job re-evaluates everything that can drift, in
// three passes that run strictly in sequence:
//
//   1. quotas  - every unpaid quota, re-classified by due date
//   2. sales   - every sale with a non-OK quota, re-rolled from fresh quotas
//   3. clients - every client with a non-OK sale, re-rolled from fresh sales
//
// Each pass selects its candidates from the writes of the previous one.
// Inside a pass, rows are evaluated concurrently (bounded by a semaphore),
// then the resulting updates are applied one by one. A failed row is logged
// and skipped; a failed candidate query aborts the whole run.

use crate::entities::{ClientId, QuotaId, SaleId, StateRow, UnpaidQuota};
use crate::error::{Error, Result};
use crate::severity::{classify_quota_at, roll_up_severity, Severity};
use crate::store::Store;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Default number of rows evaluated at once within a pass
pub const DEFAULT_CONCURRENCY: usize = 16;

// ============================================================================
// RECONCILIATION REPORT
// ============================================================================

/// Counters for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    /// Rows returned by the candidate query
    pub candidates: usize,

    /// Rows whose recomputed state differs from the stored one
    pub updates: usize,

    pub applied: usize,

    /// Evaluation or write failures (logged and skipped)
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub quotas: PassSummary,
    pub sales: PassSummary,
    pub clients: PassSummary,
}

impl ReconciliationReport {
    /// Nothing had drifted: no pass found a state to change
    pub fn is_clean(&self) -> bool {
        self.quotas.updates == 0 && self.sales.updates == 0 && self.clients.updates == 0
    }

    pub fn total_applied(&self) -> usize {
        self.quotas.applied + self.sales.applied + self.clients.applied
    }

    pub fn total_failed(&self) -> usize {
        self.quotas.failed + self.sales.failed + self.clients.failed
    }

    pub fn summary(&self) -> String {
        format!(
            "Reconciliation {}: quotas {}/{} updated, sales {}/{} updated, clients {}/{} updated, {} failed",
            self.run_id,
            self.quotas.applied,
            self.quotas.candidates,
            self.sales.applied,
            self.sales.candidates,
            self.clients.applied,
            self.clients.candidates,
            self.total_failed()
        )
    }
}

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

pub struct BulkStateReconciler<S> {
    store: Arc<S>,

    /// Max rows evaluated at once within a pass
    concurrency: usize,

    /// Held for the whole run so scheduled and manual runs never overlap
    run_guard: Mutex<()>,
}

impl<S: Store + 'static> BulkStateReconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_concurrency(store, DEFAULT_CONCURRENCY)
    }

    /// Concurrency below 1 is raised to 1
    pub fn with_concurrency(store: Arc<S>, concurrency: usize) -> Self {
        BulkStateReconciler {
            store,
            concurrency: concurrency.max(1),
            run_guard: Mutex::new(()),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run all three passes against the current time
    pub async fn run_full_reconciliation(&self) -> Result<ReconciliationReport> {
        let _guard = self.run_guard.lock().await;

        let run_id = Uuid::new_v4();
        let span = info_span!("reconciliation", run_id = %run_id);
        self.run(run_id, Utc::now()).instrument(span).await
    }

    async fn run(&self, run_id: Uuid, now: DateTime<Utc>) -> Result<ReconciliationReport> {
        let started = Instant::now();
        info!(concurrency = self.concurrency, "reconciliation started");

        let quotas = self.reconcile_quotas(now).await?;
        let sales = self.reconcile_sales().await?;
        let clients = self.reconcile_clients().await?;

        let report = ReconciliationReport {
            run_id,
            started_at: now,
            finished_at: Utc::now(),
            quotas,
            sales,
            clients,
        };

        info!(
            quotas_updated = report.quotas.applied,
            sales_updated = report.sales.applied,
            clients_updated = report.clients.applied,
            failed = report.total_failed(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reconciliation finished"
        );

        Ok(report)
    }

    // ------------------------------------------------------------------------
    // Passes
    // ------------------------------------------------------------------------

    async fn reconcile_quotas(&self, now: DateTime<Utc>) -> Result<PassSummary> {
        let candidates = self.fetch_candidates("quota", |s| s.list_unpaid_quotas()).await?;

        self.run_pass("quota", candidates, move |_, quota: UnpaidQuota| {
            let state = classify_quota_at(quota.due_date, now);
            Ok((state != quota.state).then_some((quota.id, state)))
        }, |s, (id, state): (QuotaId, Severity)| s.update_quota_state(id, state))
        .await
    }

    async fn reconcile_sales(&self) -> Result<PassSummary> {
        let candidates = self
            .fetch_candidates("sale", |s| s.list_sales_with_non_ok_quotas())
            .await?;

        self.run_pass("sale", candidates, |s, row: StateRow<SaleId>| {
            let quotas = s.get_quotas_by_sale(row.id)?;
            let state = roll_up_severity(quotas.iter().map(|q| (q.is_paid, q.state)));
            Ok((state != row.state).then_some((row.id, state)))
        }, |s, (id, state): (SaleId, Severity)| s.update_sale_state(id, state))
        .await
    }

    async fn reconcile_clients(&self) -> Result<PassSummary> {
        let candidates = self
            .fetch_candidates("client", |s| s.list_clients_with_non_ok_sales())
            .await?;

        self.run_pass("client", candidates, |s, row: StateRow<ClientId>| {
            let sales = s.get_sales_by_client(row.id)?;
            let state = roll_up_severity(sales.iter().map(|sale| (false, sale.state)));
            Ok((state != row.state).then_some((row.id, state)))
        }, |s, (id, state): (ClientId, Severity)| s.update_client_state(id, state))
        .await
    }

    // ------------------------------------------------------------------------
    // Pass machinery
    // ------------------------------------------------------------------------

    async fn fetch_candidates<T, F>(&self, pass: &'static str, query: F) -> Result<Vec<T>>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<Vec<T>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let fetched = tokio::task::spawn_blocking(move || query(store.as_ref()))
            .await
            .map_err(|e| Error::Persistence(format!("candidate query task failed: {}", e)))
            .and_then(|rows| rows);

        fetched.map_err(|e| {
            error!(pass, error = %e, "candidate query failed, aborting run");
            e
        })
    }

    /// Evaluate every candidate concurrently, then apply the resulting
    /// updates sequentially in id order.
    async fn run_pass<T, U, E, A>(
        &self,
        pass: &'static str,
        candidates: Vec<T>,
        evaluate: E,
        apply: A,
    ) -> Result<PassSummary>
    where
        T: Send + 'static,
        U: Ord + Copy + std::fmt::Debug + Send + 'static,
        E: Fn(&S, T) -> Result<Option<U>> + Send + Sync + 'static,
        A: Fn(&S, U) -> Result<()> + Send + 'static,
    {
        let mut summary = PassSummary {
            candidates: candidates.len(),
            ..PassSummary::default()
        };

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let evaluate = Arc::new(evaluate);
        let mut tasks = JoinSet::new();

        for row in candidates {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| Error::Persistence(format!("evaluation pool closed: {}", e)))?;
            let store = Arc::clone(&self.store);
            let evaluate = Arc::clone(&evaluate);

            tasks.spawn_blocking(move || {
                let _permit = permit;
                (*evaluate)(store.as_ref(), row)
            });
        }

        let mut updates = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(Some(update))) => updates.push(update),
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    summary.failed += 1;
                    warn!(pass, error = %e, "row evaluation failed, skipped");
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(pass, error = %e, "row evaluation task aborted");
                }
            }
        }

        updates.sort();
        summary.updates = updates.len();

        let store = Arc::clone(&self.store);
        let span = tracing::Span::current();
        let (applied, failed) = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            let mut applied = 0;
            let mut failed = 0;
            for update in updates {
                match apply(store.as_ref(), update) {
                    Ok(()) => {
                        applied += 1;
                        debug!(pass, ?update, "state corrected");
                    }
                    Err(e) => {
                        failed += 1;
                        error!(pass, ?update, error = %e, "state write failed, skipped");
                    }
                }
            }
            (applied, failed)
        })
        .await
        .map_err(|e| Error::Persistence(format!("apply task failed: {}", e)))?;

        summary.applied = applied;
        summary.failed += failed;

        info!(
            pass,
            candidates = summary.candidates,
            updates = summary.updates,
            applied = summary.applied,
            failed = summary.failed,
            "pass complete"
        );

        Ok(summary)
    }
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// Run the reconciler once now, then every `every`, until `shutdown` turns true
/// (or its sender is dropped). A failed run is logged and retried on the next tick.
pub fn spawn_reconciler<S: Store + 'static>(
    reconciler: Arc<BulkStateReconciler<S>>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match reconciler.run_full_reconciliation().await {
                        Ok(report) => info!("{}", report.summary()),
                        Err(e) => error!(error = %e, "scheduled reconciliation failed, waiting for next tick"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("reconciler scheduler stopped");
                        break;
                    }
                }
            }
        }
    })
}

// ============================================================================
// TESTS
// ============================================================================
