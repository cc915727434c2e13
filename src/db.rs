// 🗃️ SQLite store - production implementation of the store traits
//
// One connection behind `Arc<Mutex<..>>`, WAL journal, foreign keys ON.
// Conventions:
// - money is stored as integer cents
// - dates are RFC3339 TEXT (UTC)
// - states are `states.id` (1 = OK, 2 = WARNING, 3 = SUSPENDED)
//
// The store timeout bounds both waits a call can make: for the shared
// connection inside this process (`try_lock_for`) and for the database file
// against other processes (SQLite busy timeout). Either one running out
// surfaces as `Error::Timeout`.

use crate::entities::{
    Client, ClientId, DailyCollection, DashboardMonths, DashboardStats, NewClient, NewPayment,
    NewSale, Payment, PaymentId, Quota, QuotaId, QuotaMonthlySummary, Sale, SaleId, SaleSummary,
    StateRow, UnpaidQuota,
};
use crate::error::{Error, Result};
use crate::money::Cents;
use crate::severity::Severity;
use crate::store::{ClientStore, PaymentLedger, QuotaStore, SaleStore, StatsStore};
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // ==========================================================================
    // States (lookup table, fixed rows)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS states (
            id INTEGER PRIMARY KEY,
            name TEXT UNIQUE NOT NULL
        )",
        [],
    )?;

    for state in Severity::ALL {
        conn.execute(
            "INSERT OR IGNORE INTO states (id, name) VALUES (?1, ?2)",
            params![state.id(), state.as_str()],
        )?;
    }

    // ==========================================================================
    // Clients
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS clients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            lastname TEXT NOT NULL,
            dni TEXT NOT NULL DEFAULT '',
            state_id INTEGER NOT NULL DEFAULT 1 REFERENCES states(id),
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Sales
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sales (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
            description TEXT NOT NULL,
            amount INTEGER NOT NULL,
            date TEXT NOT NULL,
            is_paid INTEGER NOT NULL DEFAULT 0,
            state_id INTEGER NOT NULL DEFAULT 1 REFERENCES states(id),
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Quotas (installments)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS quotas (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            number INTEGER NOT NULL,
            sale_id INTEGER NOT NULL REFERENCES sales(id) ON DELETE CASCADE,
            client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
            amount INTEGER NOT NULL,
            due_date TEXT,
            is_paid INTEGER NOT NULL DEFAULT 0,
            state_id INTEGER NOT NULL DEFAULT 1 REFERENCES states(id)
        )",
        [],
    )?;

    // ==========================================================================
    // Payments
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS payments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            quota_id INTEGER NOT NULL REFERENCES quotas(id) ON DELETE CASCADE,
            client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
            amount INTEGER NOT NULL,
            date TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sales_client ON sales(client_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_quotas_sale ON quotas(sale_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_quotas_unpaid ON quotas(is_paid, state_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_payments_quota ON payments(quota_id)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ROW DECODING
// ============================================================================

fn state_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Severity> {
    let id: i64 = row.get(idx)?;
    Severity::from_id(id).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, id))
}

fn parse_date(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_date(idx, &text)
}

fn optional_date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| parse_date(idx, &t)).transpose()
}

fn day_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn cents_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Cents> {
    Ok(Cents::new(row.get(idx)?))
}

fn count_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let count: i64 = row.get(idx)?;
    Ok(count.max(0) as u64)
}

const QUOTA_COLUMNS: &str = "id, number, sale_id, client_id, amount, due_date, is_paid, state_id";

fn quota_from_row(row: &Row<'_>) -> rusqlite::Result<Quota> {
    Ok(Quota {
        id: QuotaId(row.get(0)?),
        number: row.get(1)?,
        sale_id: SaleId(row.get(2)?),
        client_id: ClientId(row.get(3)?),
        amount: cents_at(row, 4)?,
        due_date: optional_date_at(row, 5)?,
        is_paid: row.get(6)?,
        state: state_at(row, 7)?,
        payments: Vec::new(),
    })
}

const PAYMENT_COLUMNS: &str = "id, quota_id, client_id, amount, date";

fn payment_from_row(row: &Row<'_>) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: PaymentId(row.get(0)?),
        quota_id: QuotaId(row.get(1)?),
        client_id: ClientId(row.get(2)?),
        amount: cents_at(row, 3)?,
        date: date_at(row, 4)?,
    })
}

/// Map "no row touched" to NotFound for single-row writes
fn expect_one(affected: usize, entity: &'static str, id: impl ToString) -> Result<()> {
    if affected == 0 {
        Err(Error::not_found(entity, id))
    } else {
        Ok(())
    }
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    timeout: Duration,
}

impl SqliteStore {
    /// Open (or create) the database file and make sure the schema exists
    pub fn open(path: impl AsRef<Path>, timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, timeout)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, Duration::from_secs(10))
    }

    pub fn from_connection(conn: Connection, timeout: Duration) -> Result<Self> {
        conn.busy_timeout(timeout)?;
        setup_database(&conn)?;
        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
            timeout,
        })
    }

    /// The shared connection, waiting at most the store timeout for it
    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.try_lock_for(self.timeout).ok_or(Error::Timeout)
    }
}

impl QuotaStore for SqliteStore {
    fn get_quota(&self, id: QuotaId) -> Result<Quota> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM quotas WHERE id = ?1", QUOTA_COLUMNS),
            params![id.get()],
            quota_from_row,
        )
        .optional()?
        .ok_or_else(|| Error::not_found("quota", id))
    }

    fn get_quotas_by_sale(&self, sale_id: SaleId) -> Result<Vec<Quota>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM quotas WHERE sale_id = ?1 ORDER BY number",
            QUOTA_COLUMNS
        ))?;

        let quotas = stmt
            .query_map(params![sale_id.get()], quota_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(quotas)
    }

    fn update_quota_payment_status(&self, id: QuotaId, is_paid: bool, state: Severity) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "UPDATE quotas SET is_paid = ?1, state_id = ?2 WHERE id = ?3",
            params![is_paid, state.id(), id.get()],
        )?;
        expect_one(affected, "quota", id)
    }

    fn update_quota(&self, id: QuotaId, amount: Cents, due_date: DateTime<Utc>) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "UPDATE quotas SET amount = ?1, due_date = ?2 WHERE id = ?3",
            params![amount.raw(), due_date.to_rfc3339(), id.get()],
        )?;
        expect_one(affected, "quota", id)
    }

    fn list_unpaid_quotas(&self) -> Result<Vec<UnpaidQuota>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, due_date, state_id FROM quotas WHERE is_paid = 0 ORDER BY id",
        )?;

        let quotas = stmt
            .query_map([], |row| {
                Ok(UnpaidQuota {
                    id: QuotaId(row.get(0)?),
                    due_date: optional_date_at(row, 1)?,
                    state: state_at(row, 2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(quotas)
    }

    fn update_quota_state(&self, id: QuotaId, state: Severity) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "UPDATE quotas SET state_id = ?1 WHERE id = ?2",
            params![state.id(), id.get()],
        )?;
        expect_one(affected, "quota", id)
    }
}

impl SaleStore for SqliteStore {
    fn get_sale(&self, id: SaleId) -> Result<Sale> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, client_id, description, amount, date, is_paid, state_id
             FROM sales WHERE id = ?1",
            params![id.get()],
            |row| {
                Ok(Sale {
                    id: SaleId(row.get(0)?),
                    client_id: ClientId(row.get(1)?),
                    description: row.get(2)?,
                    amount: cents_at(row, 3)?,
                    date: date_at(row, 4)?,
                    is_paid: row.get(5)?,
                    state: state_at(row, 6)?,
                    quotas: Vec::new(),
                })
            },
        )
        .optional()?
        .ok_or_else(|| Error::not_found("sale", id))
    }

    fn get_sales_by_client(&self, client_id: ClientId) -> Result<Vec<SaleSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, description, is_paid, state_id FROM sales WHERE client_id = ?1 ORDER BY id",
        )?;

        let sales = stmt
            .query_map(params![client_id.get()], |row| {
                Ok(SaleSummary {
                    id: SaleId(row.get(0)?),
                    description: row.get(1)?,
                    is_paid: row.get(2)?,
                    state: state_at(row, 3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sales)
    }

    fn update_sale_payment_status(&self, id: SaleId, is_paid: bool, state: Severity) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "UPDATE sales SET is_paid = ?1, state_id = ?2 WHERE id = ?3",
            params![is_paid, state.id(), id.get()],
        )?;
        expect_one(affected, "sale", id)
    }

    fn delete_sale(&self, id: SaleId) -> Result<()> {
        let conn = self.conn()?;
        // quotas and payments go with it (ON DELETE CASCADE)
        let affected = conn.execute("DELETE FROM sales WHERE id = ?1", params![id.get()])?;
        expect_one(affected, "sale", id)
    }

    fn create_sale_with_quotas(&self, new_sale: &NewSale) -> Result<SaleId> {
        let schedule = new_sale.schedule()?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let client_exists: Option<i64> = tx
            .query_row(
                "SELECT id FROM clients WHERE id = ?1",
                params![new_sale.client_id.get()],
                |row| row.get(0),
            )
            .optional()?;
        if client_exists.is_none() {
            return Err(Error::not_found("client", new_sale.client_id));
        }

        tx.execute(
            "INSERT INTO sales (client_id, description, amount, date, is_paid, state_id)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![
                new_sale.client_id.get(),
                new_sale.description,
                new_sale.amount.raw(),
                new_sale.date.to_rfc3339(),
                Severity::Ok.id(),
            ],
        )?;
        let sale_id = SaleId(tx.last_insert_rowid());

        {
            let mut stmt = tx.prepare(
                "INSERT INTO quotas (number, sale_id, client_id, amount, due_date, is_paid, state_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
            )?;
            for quota in &schedule {
                stmt.execute(params![
                    quota.number,
                    sale_id.get(),
                    new_sale.client_id.get(),
                    quota.amount.raw(),
                    quota.due_date.to_rfc3339(),
                    Severity::Ok.id(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(sale_id)
    }

    fn list_sales_with_non_ok_quotas(&self) -> Result<Vec<StateRow<SaleId>>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT s.id, s.state_id
             FROM sales s
             JOIN quotas q ON q.sale_id = s.id
             WHERE q.state_id != ?1
             ORDER BY s.id",
        )?;

        let rows = stmt
            .query_map(params![Severity::Ok.id()], |row| {
                Ok(StateRow {
                    id: SaleId(row.get(0)?),
                    state: state_at(row, 1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn update_sale_state(&self, id: SaleId, state: Severity) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "UPDATE sales SET state_id = ?1 WHERE id = ?2",
            params![state.id(), id.get()],
        )?;
        expect_one(affected, "sale", id)
    }
}

impl ClientStore for SqliteStore {
    fn insert_client(&self, new_client: &NewClient) -> Result<Client> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO clients (name, lastname, dni, state_id) VALUES (?1, ?2, ?3, ?4)",
            params![
                new_client.name,
                new_client.lastname,
                new_client.dni,
                Severity::Ok.id()
            ],
        )?;

        Ok(Client {
            id: ClientId(conn.last_insert_rowid()),
            name: new_client.name.clone(),
            lastname: new_client.lastname.clone(),
            dni: new_client.dni.clone(),
            state: Severity::Ok,
        })
    }

    fn get_client(&self, id: ClientId) -> Result<Client> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, name, lastname, dni, state_id FROM clients WHERE id = ?1",
            params![id.get()],
            |row| {
                Ok(Client {
                    id: ClientId(row.get(0)?),
                    name: row.get(1)?,
                    lastname: row.get(2)?,
                    dni: row.get(3)?,
                    state: state_at(row, 4)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| Error::not_found("client", id))
    }

    fn update_client_state(&self, id: ClientId, state: Severity) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "UPDATE clients SET state_id = ?1 WHERE id = ?2",
            params![state.id(), id.get()],
        )?;
        expect_one(affected, "client", id)
    }

    fn list_clients_with_non_ok_sales(&self) -> Result<Vec<StateRow<ClientId>>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT c.id, c.state_id
             FROM clients c
             JOIN sales s ON s.client_id = c.id
             WHERE s.state_id != ?1
             ORDER BY c.id",
        )?;

        let rows = stmt
            .query_map(params![Severity::Ok.id()], |row| {
                Ok(StateRow {
                    id: ClientId(row.get(0)?),
                    state: state_at(row, 1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn count_clients_by_state(&self) -> Result<Vec<(Severity, u64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT state_id, COUNT(*) FROM clients GROUP BY state_id ORDER BY state_id",
        )?;

        let counts = stmt
            .query_map([], |row| Ok((state_at(row, 0)?, count_at(row, 1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(counts)
    }
}

impl PaymentLedger for SqliteStore {
    fn get_payments_by_quota(&self, quota_id: QuotaId) -> Result<Vec<Payment>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM payments WHERE quota_id = ?1 ORDER BY date, id",
            PAYMENT_COLUMNS
        ))?;

        let payments = stmt
            .query_map(params![quota_id.get()], payment_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(payments)
    }

    fn get_payment(&self, id: PaymentId) -> Result<Payment> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM payments WHERE id = ?1", PAYMENT_COLUMNS),
            params![id.get()],
            payment_from_row,
        )
        .optional()?
        .ok_or_else(|| Error::not_found("payment", id))
    }

    fn create_payment(&self, new_payment: &NewPayment) -> Result<Payment> {
        let conn = self.conn()?;
        let client_id: i64 = conn
            .query_row(
                "SELECT client_id FROM quotas WHERE id = ?1",
                params![new_payment.quota_id.get()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| Error::not_found("quota", new_payment.quota_id))?;

        let date = new_payment.date_or_now();
        conn.execute(
            "INSERT INTO payments (quota_id, client_id, amount, date) VALUES (?1, ?2, ?3, ?4)",
            params![
                new_payment.quota_id.get(),
                client_id,
                new_payment.amount.raw(),
                date.to_rfc3339()
            ],
        )?;

        Ok(Payment {
            id: PaymentId(conn.last_insert_rowid()),
            quota_id: new_payment.quota_id,
            client_id: ClientId(client_id),
            amount: new_payment.amount,
            date,
        })
    }

    fn delete_payment(&self, id: PaymentId) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM payments WHERE id = ?1", params![id.get()])?;
        expect_one(affected, "payment", id)
    }

    fn sum_payments(&self, quota_id: QuotaId) -> Result<Cents> {
        let conn = self.conn()?;
        let total: i64 = conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM payments WHERE quota_id = ?1",
            params![quota_id.get()],
            |row| row.get(0),
        )?;
        Ok(Cents::new(total))
    }
}

impl StatsStore for SqliteStore {
    fn quota_monthly_summary(&self, year: Option<i32>) -> Result<Vec<QuotaMonthlySummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT strftime('%Y-%m', due_date) AS month,
                    SUM(amount),
                    COALESCE(SUM(CASE WHEN is_paid = 1 THEN amount END), 0),
                    COALESCE(SUM(CASE WHEN is_paid = 0 THEN amount END), 0)
             FROM quotas
             WHERE due_date IS NOT NULL
               AND (?1 IS NULL OR strftime('%Y', due_date) = ?1)
             GROUP BY month
             ORDER BY month",
        )?;

        let year = year.map(|y| format!("{:04}", y));
        let summaries = stmt
            .query_map(params![year], |row| {
                Ok(QuotaMonthlySummary {
                    month: row.get(0)?,
                    total_amount: cents_at(row, 1)?,
                    amount_paid: cents_at(row, 2)?,
                    amount_not_paid: cents_at(row, 3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    fn quota_years(&self) -> Result<Vec<i32>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT CAST(strftime('%Y', due_date) AS INTEGER) AS year
             FROM quotas
             WHERE due_date IS NOT NULL
             ORDER BY year DESC",
        )?;

        let years = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i32>, _>>()?;

        Ok(years)
    }

    fn daily_collections(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyCollection>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT date(date) AS day, SUM(amount), COUNT(*)
             FROM payments
             WHERE date(date) BETWEEN ?1 AND ?2
             GROUP BY day
             ORDER BY day",
        )?;

        let collections = stmt
            .query_map(params![start.to_string(), end.to_string()], |row| {
                Ok(DailyCollection {
                    collection_date: day_at(row, 0)?,
                    total_collected: cents_at(row, 1)?,
                    payment_count: count_at(row, 2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(collections)
    }

    fn dashboard_stats(&self, months: &DashboardMonths) -> Result<DashboardStats> {
        let conn = self.conn()?;
        // ?1 = last month, ?2 = this month, ?3 = next month
        let stats = conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM clients),
                (SELECT COUNT(*) FROM sales),
                (SELECT COUNT(*) FROM sales WHERE is_paid = 0),
                (SELECT COALESCE(SUM(amount), 0) FROM sales),
                (SELECT COALESCE(SUM(MAX(q.amount - COALESCE(p.paid, 0), 0)), 0)
                   FROM quotas q
                   LEFT JOIN (SELECT quota_id, SUM(amount) AS paid
                              FROM payments GROUP BY quota_id) p ON p.quota_id = q.id
                   WHERE q.is_paid = 0),
                (SELECT COALESCE(SUM(amount), 0) FROM payments
                   WHERE strftime('%Y-%m', date) = ?2),
                (SELECT COALESCE(SUM(amount), 0) FROM quotas
                   WHERE strftime('%Y-%m', due_date) = ?2),
                (SELECT COALESCE(SUM(p.amount), 0) FROM payments p
                   JOIN quotas q ON q.id = p.quota_id
                   WHERE strftime('%Y-%m', q.due_date) = ?2),
                (SELECT COALESCE(SUM(amount), 0) FROM quotas
                   WHERE strftime('%Y-%m', due_date) = ?3),
                (SELECT COUNT(*) FROM quotas
                   WHERE is_paid = 1 AND strftime('%Y-%m', due_date) = ?2),
                (SELECT COUNT(*) FROM quotas WHERE strftime('%Y-%m', due_date) = ?2),
                (SELECT COUNT(*) FROM quotas
                   WHERE is_paid = 1 AND strftime('%Y-%m', due_date) = ?1),
                (SELECT COUNT(*) FROM quotas WHERE strftime('%Y-%m', due_date) = ?1)",
            params![months.last, months.this, months.next],
            |row| {
                Ok(DashboardStats {
                    total_clients: count_at(row, 0)?,
                    total_sales: count_at(row, 1)?,
                    active_sales: count_at(row, 2)?,
                    total_revenue: cents_at(row, 3)?,
                    pending_amount: cents_at(row, 4)?,
                    collected_this_month: cents_at(row, 5)?,
                    quotas_due_this_month: cents_at(row, 6)?,
                    collected_from_quotas_due_this_month: cents_at(row, 7)?,
                    quotas_due_next_month: cents_at(row, 8)?,
                    paid_quotas_due_this_month: count_at(row, 9)?,
                    count_quotas_due_this_month: count_at(row, 10)?,
                    paid_quotas_due_last_month: count_at(row, 11)?,
                    count_quotas_due_last_month: count_at(row, 12)?,
                })
            },
        )?;

        Ok(stats)
    }
}
