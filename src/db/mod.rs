mod backup;
#[cfg(test)]
pub(crate) mod memory;
mod schema;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, StorageError};
use crate::models::*;

pub(crate) use backup::{list_backups, restore_from, BACKUP_PREFIX};

/// Durable home of the two ledger collections.
///
/// Every core operation receives its store explicitly, so tests can swap the
/// SQLite file for an in-memory double. Reads return rows in insertion order.
pub(crate) trait LedgerStore {
    fn insert_transaction(&mut self, txn: &Transaction) -> Result<i64>;
    fn insert_budget(&mut self, budget: &Budget) -> Result<i64>;
    fn transactions(&self, user_id: i64, category: Option<&str>) -> Result<Vec<Transaction>>;
    fn budgets(&self, user_id: i64, category: Option<&str>) -> Result<Vec<Budget>>;
}

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let mut db = Self { conn };
        db.migrate()?;
        verify_schema(&db.conn)?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        verify_schema(&db.conn)?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database (or one that predates versioning): apply the full schema
            let tx = self.conn.transaction()?;
            tx.execute_batch(schema::SCHEMA_V1)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tx.commit()?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })?;

        if current > schema::CURRENT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: current,
                supported: schema::CURRENT_VERSION,
            }
            .into());
        }

        let tx = self.conn.transaction()?;
        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tx.execute_batch(sql)?;
            }
        }
        if current < schema::CURRENT_VERSION {
            tx.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }
        tx.commit()?;

        Ok(())
    }

    /// Write a consistent snapshot of the whole database to `path`.
    /// Fails if `path` already exists.
    pub(crate) fn backup_to(&self, path: &Path) -> Result<()> {
        if path.exists() {
            return Err(StorageError::Unavailable(format!(
                "backup target already exists: {}",
                path.display()
            ))
            .into());
        }
        self.conn
            .execute("VACUUM INTO ?1", params![path.to_string_lossy().into_owned()])?;
        Ok(())
    }
}

impl LedgerStore for Database {
    fn insert_transaction(&mut self, txn: &Transaction) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO transactions (user_id, category, amount, type, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                txn.user_id,
                txn.category,
                txn.amount.to_string(),
                txn.kind,
                format_timestamp(&txn.timestamp),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_budget(&mut self, budget: &Budget) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO budgets (user_id, category, amount) VALUES (?1, ?2, ?3)",
            params![budget.user_id, budget.category, budget.amount.to_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn transactions(&self, user_id: i64, category: Option<&str>) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, category, amount, type, timestamp
             FROM transactions
             WHERE user_id = ?1 AND (?2 IS NULL OR category = ?2)
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![user_id, category], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Value>(3)?,
                row.get::<_, TransactionType>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut txns = Vec::new();
        for row in rows {
            let (id, user_id, category, amount, kind, timestamp) = row?;
            txns.push(Transaction {
                id: Some(id),
                user_id,
                category,
                amount: decimal_from_value(&amount)
                    .ok_or_else(|| corrupt("transactions", "amount", id, &amount))?,
                kind,
                timestamp: parse_timestamp(&timestamp).ok_or_else(|| {
                    corrupt("transactions", "timestamp", id, &Value::Text(timestamp.clone()))
                })?,
            });
        }
        Ok(txns)
    }

    fn budgets(&self, user_id: i64, category: Option<&str>) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, category, amount
             FROM budgets
             WHERE user_id = ?1 AND (?2 IS NULL OR category = ?2)
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![user_id, category], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Value>(3)?,
            ))
        })?;

        let mut budgets = Vec::new();
        for row in rows {
            let (id, user_id, category, amount) = row?;
            budgets.push(Budget {
                id: Some(id),
                user_id,
                category,
                amount: decimal_from_value(&amount)
                    .ok_or_else(|| corrupt("budgets", "amount", id, &amount))?,
            });
        }
        Ok(budgets)
    }
}

/// Fail with a storage error unless both ledger tables carry the expected columns.
fn verify_schema(conn: &Connection) -> Result<()> {
    for sql in [
        "SELECT id, user_id, category, amount, type, timestamp FROM transactions LIMIT 0",
        "SELECT id, user_id, category, amount FROM budgets LIMIT 0",
    ] {
        conn.prepare(sql).map_err(|e| {
            StorageError::Unavailable(format!("missing or incompatible ledger schema: {e}"))
        })?;
    }
    Ok(())
}

/// Amount cells may hold text, integers or floats depending on who wrote the file.
fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(i) => Some(Decimal::from(*i)),
        Value::Real(f) => Decimal::from_str(&f.to_string()).ok(),
        Value::Text(s) => Decimal::from_str(s.trim()).ok(),
        Value::Null | Value::Blob(_) => None,
    }
}

fn corrupt(table: &'static str, column: &'static str, id: i64, value: &Value) -> StorageError {
    StorageError::Corrupt {
        table,
        column,
        id,
        detail: format!("unreadable value {value:?}"),
    }
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// RFC 3339 first, then SQLite's `CURRENT_TIMESTAMP` layout, then a bare date.
/// Zone-less values are taken as UTC.
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
