// 🧠 In-memory store
//
// Same contract as the SQLite store, held in `Arc<RwLock<..>>` tables the way
// the entity registries keep their versions. Compiled for this crate's tests
// and, behind the `testing` feature, for downstream test suites.
//
// It also carries two test hooks:
// - injected failures (per-row writes, candidate listings)
// - a write counter, to assert that a run performed no writes

use crate::entities::{
    month_key, Client, ClientId, DailyCollection, DashboardMonths, DashboardStats, NewClient,
    NewPayment, NewSale, Payment, PaymentId, Quota, QuotaId, QuotaMonthlySummary, Sale, SaleId,
    SaleSummary, StateRow, UnpaidQuota,
};
use crate::error::{Error, Result};
use crate::money::Cents;
use crate::severity::Severity;
use crate::store::{ClientStore, PaymentLedger, QuotaStore, SaleStore, StatsStore};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct Tables {
    next_id: i64,
    clients: BTreeMap<ClientId, Client>,
    sales: BTreeMap<SaleId, Sale>,
    quotas: BTreeMap<QuotaId, Quota>,
    payments: BTreeMap<PaymentId, Payment>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
struct Faults {
    /// `(entity, id)` pairs whose writes fail
    writes: BTreeSet<(&'static str, i64)>,
    /// entity names whose reconciler listings fail
    listings: BTreeSet<&'static str>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    faults: Arc<RwLock<Faults>>,
    writes: Arc<AtomicU64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `(entity, id)` fail with a persistence error
    pub fn fail_writes_to(&self, entity: &'static str, id: i64) {
        if let Ok(mut faults) = self.faults.write() {
            faults.writes.insert((entity, id));
        }
    }

    /// Make the reconciler candidate listing for `entity` fail
    pub fn fail_listing(&self, entity: &'static str) {
        if let Ok(mut faults) = self.faults.write() {
            faults.listings.insert(entity);
        }
    }

    pub fn clear_faults(&self) {
        if let Ok(mut faults) = self.faults.write() {
            *faults = Faults::default();
        }
    }

    /// Number of successful writes since creation
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Write a quota's derived fields directly, bypassing propagation.
    /// Lets tests stage drift the way time passing would.
    pub fn force_quota_state(&self, id: QuotaId, is_paid: bool, state: Severity) -> Result<()> {
        let mut tables = self.tables.write()?;
        let quota = tables
            .quotas
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("quota", id))?;
        quota.is_paid = is_paid;
        quota.state = state;
        Ok(())
    }

    fn check_write(&self, entity: &'static str, id: i64) -> Result<()> {
        let faults = self.faults.read()?;
        if faults.writes.contains(&(entity, id)) {
            return Err(Error::Persistence(format!("injected write failure on {} {}", entity, id)));
        }
        Ok(())
    }

    fn check_listing(&self, entity: &'static str) -> Result<()> {
        let faults = self.faults.read()?;
        if faults.listings.contains(entity) {
            return Err(Error::Persistence(format!("injected listing failure on {}", entity)));
        }
        Ok(())
    }

    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// QUOTAS
// ============================================================================

impl QuotaStore for InMemoryStore {
    fn get_quota(&self, id: QuotaId) -> Result<Quota> {
        let tables = self.tables.read()?;
        tables
            .quotas
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("quota", id))
    }

    fn get_quotas_by_sale(&self, sale_id: SaleId) -> Result<Vec<Quota>> {
        let tables = self.tables.read()?;
        let mut quotas: Vec<Quota> = tables
            .quotas
            .values()
            .filter(|q| q.sale_id == sale_id)
            .cloned()
            .collect();
        quotas.sort_by_key(|q| q.number);
        Ok(quotas)
    }

    fn update_quota_payment_status(&self, id: QuotaId, is_paid: bool, state: Severity) -> Result<()> {
        self.check_write("quota", id.get())?;
        let mut tables = self.tables.write()?;
        let quota = tables
            .quotas
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("quota", id))?;
        quota.is_paid = is_paid;
        quota.state = state;
        self.wrote();
        Ok(())
    }

    fn update_quota(&self, id: QuotaId, amount: Cents, due_date: DateTime<Utc>) -> Result<()> {
        self.check_write("quota", id.get())?;
        let mut tables = self.tables.write()?;
        let quota = tables
            .quotas
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("quota", id))?;
        quota.amount = amount;
        quota.due_date = Some(due_date);
        self.wrote();
        Ok(())
    }

    fn list_unpaid_quotas(&self) -> Result<Vec<UnpaidQuota>> {
        self.check_listing("quota")?;
        let tables = self.tables.read()?;
        Ok(tables
            .quotas
            .values()
            .filter(|q| !q.is_paid)
            .map(|q| UnpaidQuota {
                id: q.id,
                due_date: q.due_date,
                state: q.state,
            })
            .collect())
    }

    fn update_quota_state(&self, id: QuotaId, state: Severity) -> Result<()> {
        self.check_write("quota", id.get())?;
        let mut tables = self.tables.write()?;
        let quota = tables
            .quotas
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("quota", id))?;
        quota.state = state;
        self.wrote();
        Ok(())
    }
}

// ============================================================================
// SALES
// ============================================================================

impl SaleStore for InMemoryStore {
    fn get_sale(&self, id: SaleId) -> Result<Sale> {
        let tables = self.tables.read()?;
        tables
            .sales
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("sale", id))
    }

    fn get_sales_by_client(&self, client_id: ClientId) -> Result<Vec<SaleSummary>> {
        let tables = self.tables.read()?;
        Ok(tables
            .sales
            .values()
            .filter(|s| s.client_id == client_id)
            .map(|s| SaleSummary {
                id: s.id,
                description: s.description.clone(),
                is_paid: s.is_paid,
                state: s.state,
            })
            .collect())
    }

    fn update_sale_payment_status(&self, id: SaleId, is_paid: bool, state: Severity) -> Result<()> {
        self.check_write("sale", id.get())?;
        let mut tables = self.tables.write()?;
        let sale = tables
            .sales
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("sale", id))?;
        sale.is_paid = is_paid;
        sale.state = state;
        self.wrote();
        Ok(())
    }

    fn delete_sale(&self, id: SaleId) -> Result<()> {
        self.check_write("sale", id.get())?;
        let mut tables = self.tables.write()?;
        if tables.sales.remove(&id).is_none() {
            return Err(Error::not_found("sale", id));
        }

        let quota_ids: BTreeSet<QuotaId> = tables
            .quotas
            .values()
            .filter(|q| q.sale_id == id)
            .map(|q| q.id)
            .collect();
        tables.quotas.retain(|qid, _| !quota_ids.contains(qid));
        tables.payments.retain(|_, p| !quota_ids.contains(&p.quota_id));
        self.wrote();
        Ok(())
    }

    fn create_sale_with_quotas(&self, new_sale: &NewSale) -> Result<SaleId> {
        let schedule = new_sale.schedule()?;
        let mut tables = self.tables.write()?;
        if !tables.clients.contains_key(&new_sale.client_id) {
            return Err(Error::not_found("client", new_sale.client_id));
        }

        let sale_id = SaleId(tables.next_id());
        tables.sales.insert(
            sale_id,
            Sale {
                id: sale_id,
                client_id: new_sale.client_id,
                description: new_sale.description.clone(),
                amount: new_sale.amount,
                date: new_sale.date,
                is_paid: false,
                state: Severity::Ok,
                quotas: Vec::new(),
            },
        );

        for quota in schedule {
            let quota_id = QuotaId(tables.next_id());
            tables.quotas.insert(
                quota_id,
                Quota {
                    id: quota_id,
                    number: quota.number,
                    sale_id,
                    client_id: new_sale.client_id,
                    amount: quota.amount,
                    due_date: Some(quota.due_date),
                    is_paid: false,
                    state: Severity::Ok,
                    payments: Vec::new(),
                },
            );
        }

        self.wrote();
        Ok(sale_id)
    }

    fn list_sales_with_non_ok_quotas(&self) -> Result<Vec<StateRow<SaleId>>> {
        self.check_listing("sale")?;
        let tables = self.tables.read()?;
        let flagged: BTreeSet<SaleId> = tables
            .quotas
            .values()
            .filter(|q| q.state != Severity::Ok)
            .map(|q| q.sale_id)
            .collect();

        Ok(flagged
            .into_iter()
            .filter_map(|id| tables.sales.get(&id))
            .map(|s| StateRow { id: s.id, state: s.state })
            .collect())
    }

    fn update_sale_state(&self, id: SaleId, state: Severity) -> Result<()> {
        self.check_write("sale", id.get())?;
        let mut tables = self.tables.write()?;
        let sale = tables
            .sales
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("sale", id))?;
        sale.state = state;
        self.wrote();
        Ok(())
    }
}

// ============================================================================
// CLIENTS
// ============================================================================

impl ClientStore for InMemoryStore {
    fn insert_client(&self, new_client: &NewClient) -> Result<Client> {
        let mut tables = self.tables.write()?;
        let client = Client {
            id: ClientId(tables.next_id()),
            name: new_client.name.clone(),
            lastname: new_client.lastname.clone(),
            dni: new_client.dni.clone(),
            state: Severity::Ok,
        };
        tables.clients.insert(client.id, client.clone());
        self.wrote();
        Ok(client)
    }

    fn get_client(&self, id: ClientId) -> Result<Client> {
        let tables = self.tables.read()?;
        tables
            .clients
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("client", id))
    }

    fn update_client_state(&self, id: ClientId, state: Severity) -> Result<()> {
        self.check_write("client", id.get())?;
        let mut tables = self.tables.write()?;
        let client = tables
            .clients
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("client", id))?;
        client.state = state;
        self.wrote();
        Ok(())
    }

    fn list_clients_with_non_ok_sales(&self) -> Result<Vec<StateRow<ClientId>>> {
        self.check_listing("client")?;
        let tables = self.tables.read()?;
        let flagged: BTreeSet<ClientId> = tables
            .sales
            .values()
            .filter(|s| s.state != Severity::Ok)
            .map(|s| s.client_id)
            .collect();

        Ok(flagged
            .into_iter()
            .filter_map(|id| tables.clients.get(&id))
            .map(|c| StateRow { id: c.id, state: c.state })
            .collect())
    }

    fn count_clients_by_state(&self) -> Result<Vec<(Severity, u64)>> {
        let tables = self.tables.read()?;
        let mut counts: BTreeMap<Severity, u64> = BTreeMap::new();
        for client in tables.clients.values() {
            *counts.entry(client.state).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}

// ============================================================================
// PAYMENTS
// ============================================================================

impl PaymentLedger for InMemoryStore {
    fn get_payments_by_quota(&self, quota_id: QuotaId) -> Result<Vec<Payment>> {
        let tables = self.tables.read()?;
        let mut payments: Vec<Payment> = tables
            .payments
            .values()
            .filter(|p| p.quota_id == quota_id)
            .cloned()
            .collect();
        payments.sort_by_key(|p| p.date);
        Ok(payments)
    }

    fn get_payment(&self, id: PaymentId) -> Result<Payment> {
        let tables = self.tables.read()?;
        tables
            .payments
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("payment", id))
    }

    fn create_payment(&self, new_payment: &NewPayment) -> Result<Payment> {
        let mut tables = self.tables.write()?;
        let client_id = tables
            .quotas
            .get(&new_payment.quota_id)
            .map(|q| q.client_id)
            .ok_or_else(|| Error::not_found("quota", new_payment.quota_id))?;

        let payment = Payment {
            id: PaymentId(tables.next_id()),
            quota_id: new_payment.quota_id,
            client_id,
            amount: new_payment.amount,
            date: new_payment.date_or_now(),
        };
        tables.payments.insert(payment.id, payment.clone());
        self.wrote();
        Ok(payment)
    }

    fn delete_payment(&self, id: PaymentId) -> Result<()> {
        self.check_write("payment", id.get())?;
        let mut tables = self.tables.write()?;
        if tables.payments.remove(&id).is_none() {
            return Err(Error::not_found("payment", id));
        }
        self.wrote();
        Ok(())
    }
}

// ============================================================================
// STATISTICS
// ============================================================================

fn total(acc: Cents, amount: Cents) -> Result<Cents> {
    acc.checked_add(amount)
        .ok_or_else(|| Error::Persistence("amount total overflows".to_string()))
}

impl StatsStore for InMemoryStore {
    fn quota_monthly_summary(&self, year: Option<i32>) -> Result<Vec<QuotaMonthlySummary>> {
        let tables = self.tables.read()?;
        // month -> (paid, not paid)
        let mut months: BTreeMap<String, (Cents, Cents)> = BTreeMap::new();
        for quota in tables.quotas.values() {
            let Some(due) = quota.due_date else { continue };
            if year.is_some_and(|y| due.year() != y) {
                continue;
            }
            let (paid, not_paid) = months.entry(month_key(due)).or_default();
            if quota.is_paid {
                *paid = total(*paid, quota.amount)?;
            } else {
                *not_paid = total(*not_paid, quota.amount)?;
            }
        }

        months
            .into_iter()
            .map(|(month, (paid, not_paid))| {
                Ok(QuotaMonthlySummary {
                    month,
                    total_amount: total(paid, not_paid)?,
                    amount_paid: paid,
                    amount_not_paid: not_paid,
                })
            })
            .collect()
    }

    fn quota_years(&self) -> Result<Vec<i32>> {
        let tables = self.tables.read()?;
        let years: BTreeSet<i32> = tables
            .quotas
            .values()
            .filter_map(|q| q.due_date.map(|d| d.year()))
            .collect();
        Ok(years.into_iter().rev().collect())
    }

    fn daily_collections(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyCollection>> {
        let tables = self.tables.read()?;
        let mut days: BTreeMap<NaiveDate, (Cents, u64)> = BTreeMap::new();
        for payment in tables.payments.values() {
            let day = payment.date.date_naive();
            if day < start || day > end {
                continue;
            }
            let (collected, count) = days.entry(day).or_default();
            *collected = total(*collected, payment.amount)?;
            *count += 1;
        }

        Ok(days
            .into_iter()
            .map(|(collection_date, (total_collected, payment_count))| DailyCollection {
                collection_date,
                total_collected,
                payment_count,
            })
            .collect())
    }

    fn dashboard_stats(&self, months: &DashboardMonths) -> Result<DashboardStats> {
        let tables = self.tables.read()?;
        let mut stats = DashboardStats {
            total_clients: tables.clients.len() as u64,
            total_sales: tables.sales.len() as u64,
            active_sales: tables.sales.values().filter(|s| !s.is_paid).count() as u64,
            ..DashboardStats::default()
        };
        for sale in tables.sales.values() {
            stats.total_revenue = total(stats.total_revenue, sale.amount)?;
        }

        let mut paid_by_quota: BTreeMap<QuotaId, Cents> = BTreeMap::new();
        for payment in tables.payments.values() {
            let paid = paid_by_quota.entry(payment.quota_id).or_default();
            *paid = total(*paid, payment.amount)?;
            if month_key(payment.date) == months.this {
                stats.collected_this_month = total(stats.collected_this_month, payment.amount)?;
            }
        }

        for quota in tables.quotas.values() {
            let paid = paid_by_quota.get(&quota.id).copied().unwrap_or_default();
            if !quota.is_paid {
                let left = Cents::new(quota.amount.raw().saturating_sub(paid.raw()).max(0));
                stats.pending_amount = total(stats.pending_amount, left)?;
            }

            let Some(due) = quota.due_date else { continue };
            let month = month_key(due);
            if month == months.this {
                stats.quotas_due_this_month = total(stats.quotas_due_this_month, quota.amount)?;
                stats.collected_from_quotas_due_this_month =
                    total(stats.collected_from_quotas_due_this_month, paid)?;
                stats.count_quotas_due_this_month += 1;
                if quota.is_paid {
                    stats.paid_quotas_due_this_month += 1;
                }
            } else if month == months.next {
                stats.quotas_due_next_month = total(stats.quotas_due_next_month, quota.amount)?;
            } else if month == months.last {
                stats.count_quotas_due_last_month += 1;
                if quota.is_paid {
                    stats.paid_quotas_due_last_month += 1;
                }
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn seeded() -> (InMemoryStore, Client, SaleId) {
        let store = InMemoryStore::new();
        let client = store
            .insert_client(&NewClient {
                name: "Ana".to_string(),
                lastname: "Gómez".to_string(),
                dni: "30111222".to_string(),
            })
            .unwrap();
        let sale_id = store
            .create_sale_with_quotas(&NewSale {
                client_id: client.id,
                description: "TV (1)".to_string(),
                amount: Cents::from_major(3000.0),
                date: Utc::now() - Duration::days(10),
                installments: 3,
                quota_amount: Cents::from_major(1000.0),
            })
            .unwrap();
        (store, client, sale_id)
    }

    #[test]
    fn test_create_sale_generates_quotas() {
        let (store, client, sale_id) = seeded();
        let quotas = store.get_quotas_by_sale(sale_id).unwrap();

        assert_eq!(quotas.len(), 3);
        assert_eq!(quotas.iter().map(|q| q.number).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(quotas.iter().all(|q| q.client_id == client.id && !q.is_paid));
        assert_eq!(store.get_sales_by_client(client.id).unwrap().len(), 1);
    }

    #[test]
    fn test_create_sale_for_unknown_client_fails() {
        let store = InMemoryStore::new();
        let err = store
            .create_sale_with_quotas(&NewSale {
                client_id: ClientId(99),
                description: String::new(),
                amount: Cents::from_major(100.0),
                date: Utc::now(),
                installments: 1,
                quota_amount: Cents::from_major(100.0),
            })
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_payment_stamps_client_and_sums() {
        let (store, client, sale_id) = seeded();
        let quota = store.get_quotas_by_sale(sale_id).unwrap()[0].clone();

        let p1 = store
            .create_payment(&NewPayment::new(quota.id, Cents::from_major(400.0)))
            .unwrap();
        store
            .create_payment(&NewPayment::new(quota.id, Cents::from_major(250.5)))
            .unwrap();

        assert_eq!(p1.client_id, client.id);
        assert_eq!(store.sum_payments(quota.id).unwrap(), Cents::from_major(650.5));

        store.delete_payment(p1.id).unwrap();
        assert_eq!(store.sum_payments(quota.id).unwrap(), Cents::from_major(250.5));
        assert!(store.get_payment(p1.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_sale_cascades() {
        let (store, client, sale_id) = seeded();
        let quota = store.get_quotas_by_sale(sale_id).unwrap()[0].clone();
        let payment = store
            .create_payment(&NewPayment::new(quota.id, Cents::from_major(10.0)))
            .unwrap();

        store.delete_sale(sale_id).unwrap();

        assert!(store.get_sale(sale_id).unwrap_err().is_not_found());
        assert!(store.get_quota(quota.id).unwrap_err().is_not_found());
        assert!(store.get_payment(payment.id).unwrap_err().is_not_found());
        assert!(store.get_sales_by_client(client.id).unwrap().is_empty());
    }

    #[test]
    fn test_injected_write_failure() {
        let (store, _, sale_id) = seeded();
        store.fail_writes_to("sale", sale_id.get());

        let err = store
            .update_sale_state(sale_id, Severity::Warning)
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));

        store.clear_faults();
        store.update_sale_state(sale_id, Severity::Warning).unwrap();
        assert_eq!(store.get_sale(sale_id).unwrap().state, Severity::Warning);
    }

    #[test]
    fn test_updates_on_missing_rows_are_not_found() {
        let store = InMemoryStore::new();
        assert!(store.update_quota_state(QuotaId(1), Severity::Ok).unwrap_err().is_not_found());
        assert!(store.update_client_state(ClientId(1), Severity::Ok).unwrap_err().is_not_found());
        assert!(store
            .update_sale_payment_status(SaleId(1), true, Severity::Ok)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_overflowing_payment_total_is_an_error() {
        let (store, _, sale_id) = seeded();
        let quota = store.get_quotas_by_sale(sale_id).unwrap()[0].clone();
        store
            .create_payment(&NewPayment::new(quota.id, Cents::new(i64::MAX)))
            .unwrap();
        store
            .create_payment(&NewPayment::new(quota.id, Cents::new(1)))
            .unwrap();

        assert!(matches!(store.sum_payments(quota.id), Err(Error::Persistence(_))));
    }

    #[test]
    fn test_monthly_summary_matches_quota_flags() {
        let (store, _, sale_id) = seeded();
        let quotas = store.get_quotas_by_sale(sale_id).unwrap();
        store
            .update_quota_payment_status(quotas[0].id, true, Severity::Ok)
            .unwrap();

        let summary = store.quota_monthly_summary(None).unwrap();
        assert_eq!(summary.len(), 3);
        let paid: Vec<Cents> = summary.iter().map(|m| m.amount_paid).collect();
        assert_eq!(paid.iter().filter(|&&c| c == Cents::from_major(1000.0)).count(), 1);
        assert!(summary
            .iter()
            .all(|m| m.total_amount == Cents::from_major(1000.0)));

        let this_year = quotas[0].due_date.unwrap().year();
        assert!(store.quota_years().unwrap().contains(&this_year));
    }
}
