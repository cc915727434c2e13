// 🧭 Installment Service - the mutations that drive propagation
//
// Each entry point is one externally triggered operation:
// - payment created / deleted → propagate from the quota
// - quota edited → propagate from the quota
// - sale created → sale rollup then client rollup (failure tolerated)
// - sale deleted → client rollup over the remaining sales
//
// Plus the read models the outer adapters serve (detail views and the
// dashboard chart aggregates).

use crate::entities::{
    complete_status_counts, Client, ClientId, ClientStatusCount, DailyCollection, DashboardMonths,
    DashboardStats, NewClient, NewPayment, NewSale, Payment, PaymentId, Quota, QuotaId,
    QuotaMonthlySummary, Sale, SaleId,
};
use crate::error::{Error, Result};
use crate::money::Cents;
use crate::propagator::StatePropagator;
use crate::store::Store;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, warn};

pub struct InstallmentService<S> {
    store: Arc<S>,
    propagator: StatePropagator<S>,
}

impl<S> Clone for InstallmentService<S> {
    fn clone(&self) -> Self {
        InstallmentService {
            store: Arc::clone(&self.store),
            propagator: self.propagator.clone(),
        }
    }
}

impl<S: Store> InstallmentService<S> {
    pub fn new(store: Arc<S>) -> Self {
        InstallmentService {
            propagator: StatePropagator::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn propagator(&self) -> &StatePropagator<S> {
        &self.propagator
    }

    // ========================================================================
    // CLIENTS
    // ========================================================================

    pub fn create_client(&self, new_client: &NewClient) -> Result<Client> {
        let client = self.store.insert_client(new_client)?;
        info!(client_id = %client.id, "client created");
        Ok(client)
    }

    pub fn get_client(&self, id: ClientId) -> Result<Client> {
        self.store.get_client(id)
    }

    /// Clients per state, every state present
    pub fn client_status_counts(&self) -> Result<Vec<ClientStatusCount>> {
        let counts = self.store.count_clients_by_state()?;
        Ok(complete_status_counts(&counts))
    }

    // ========================================================================
    // SALES
    // ========================================================================

    /// Insert a sale with its schedule, then bring sale and client state up to date.
    ///
    /// The sale is durable once inserted, so a propagation failure afterwards
    /// is logged and the new id is still returned.
    pub fn create_sale(&self, new_sale: &NewSale) -> Result<SaleId> {
        new_sale.validate()?;
        let sale_id = self.store.create_sale_with_quotas(new_sale)?;
        info!(
            sale_id = %sale_id,
            client_id = %new_sale.client_id,
            installments = new_sale.installments,
            "sale created"
        );

        if let Err(e) = self
            .propagator
            .propagate_from_sale(sale_id)
            .and_then(|_| self.propagator.propagate_from_client(new_sale.client_id))
        {
            warn!(sale_id = %sale_id, error = %e, "state propagation after sale creation failed");
        }

        Ok(sale_id)
    }

    /// Sale detail with its quotas ordered by number
    pub fn get_sale(&self, id: SaleId) -> Result<Sale> {
        let mut sale = self.store.get_sale(id)?;
        sale.quotas = self.store.get_quotas_by_sale(id)?;
        Ok(sale)
    }

    /// Delete a sale (quotas and payments go with it) and re-roll its client
    pub fn delete_sale(&self, id: SaleId) -> Result<()> {
        let sale = self.store.get_sale(id)?;
        self.store.delete_sale(id)?;
        info!(sale_id = %id, client_id = %sale.client_id, "sale deleted");

        self.propagator.propagate_from_client(sale.client_id)?;
        Ok(())
    }

    // ========================================================================
    // QUOTAS
    // ========================================================================

    /// Quota detail with its payments ordered by date
    pub fn get_quota(&self, id: QuotaId) -> Result<Quota> {
        let mut quota = self.store.get_quota(id)?;
        quota.payments = self.store.get_payments_by_quota(id)?;
        Ok(quota)
    }

    pub fn update_quota(&self, id: QuotaId, amount: Cents, due_date: DateTime<Utc>) -> Result<Quota> {
        amount.check_amount("quota amount")?;
        self.store.update_quota(id, amount, due_date)?;
        self.propagator.propagate_from_quota(id)?;
        self.store.get_quota(id)
    }

    // ========================================================================
    // PAYMENTS
    // ========================================================================

    pub fn create_payment(&self, new_payment: &NewPayment) -> Result<Payment> {
        new_payment.validate()?;
        let payment = self.store.create_payment(new_payment)?;
        info!(
            payment_id = %payment.id,
            quota_id = %payment.quota_id,
            amount = %payment.amount,
            "payment recorded"
        );

        self.propagator.propagate_from_quota(payment.quota_id)?;
        Ok(payment)
    }

    pub fn delete_payment(&self, id: PaymentId) -> Result<()> {
        let payment = self.store.get_payment(id)?;
        self.store.delete_payment(id)?;
        info!(payment_id = %id, quota_id = %payment.quota_id, "payment deleted");

        self.propagator.propagate_from_quota(payment.quota_id)?;
        Ok(())
    }

    // ========================================================================
    // CHARTS
    // ========================================================================

    /// Quota amounts per due month for one year, or for all years when `None`
    pub fn quota_monthly_summary(&self, year: Option<i32>) -> Result<Vec<QuotaMonthlySummary>> {
        self.store.quota_monthly_summary(year)
    }

    pub fn available_years(&self) -> Result<Vec<i32>> {
        self.store.quota_years()
    }

    /// Payments per day over an inclusive date range
    pub fn daily_collections(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyCollection>> {
        if start > end {
            return Err(Error::InvalidInput(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        self.store.daily_collections(start, end)
    }

    pub fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.dashboard_stats_at(Utc::now())
    }

    /// Dashboard figures with "this month" taken from `now`
    pub fn dashboard_stats_at(&self, now: DateTime<Utc>) -> Result<DashboardStats> {
        let months = DashboardMonths::around(now)?;
        self.store.dashboard_stats(&months)
    }
}
