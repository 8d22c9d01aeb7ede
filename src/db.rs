use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::ledger::{signed_total, Ledger};

/// Date format persisted in the `data` column (DD/MM/YYYY)
pub const DATE_FORMAT: &str = "%d/%m/%Y";

pub type TransactionId = i64;

// ============================================================================
// TRANSACTION KIND
// ============================================================================

/// Income/expense classification of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
}

impl TransactionKind {
    /// Label stored in the `tipo` column
    pub fn as_stored(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Receita",
            TransactionKind::Expense => "Despesa",
        }
    }

    /// Label shown in the window
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            TransactionKind::Income => TransactionKind::Expense,
            TransactionKind::Expense => TransactionKind::Income,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown transaction kind {0:?}")]
pub struct UnknownKind(pub String);

impl FromStr for TransactionKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Receita" => Ok(TransactionKind::Income),
            "Despesa" => Ok(TransactionKind::Expense),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

/// One recorded income or expense entry. Immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
}

impl Transaction {
    /// `+amount` for income, `-amount` for expense
    pub fn signed_amount(&self) -> f64 {
        signed(self.kind, self.amount)
    }

    /// Date as shown in the list and stored in the database
    pub fn date_text(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

pub(crate) fn signed(kind: TransactionKind, amount: f64) -> f64 {
    match kind {
        TransactionKind::Income => amount,
        TransactionKind::Expense => -amount,
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Create the `transacoes` table if it does not exist yet. Safe to call on
/// every start.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS transacoes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tipo TEXT NOT NULL,
            descricao TEXT NOT NULL,
            valor REAL NOT NULL,
            data TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create transacoes table")?;

    Ok(())
}

fn decode_kind(row: &Row, index: usize) -> rusqlite::Result<TransactionKind> {
    let text: String = row.get(index)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

/// Stored date text that is not zero-padded `DD/MM/YYYY`
#[derive(Debug, thiserror::Error)]
#[error("date {0:?} is not zero-padded DD/MM/YYYY")]
pub struct MalformedDate(pub String);

// `list_all` orders on fixed substr offsets, so only the exact padded
// form is accepted
fn decode_date(row: &Row, index: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(index)?;
    let conversion = |e: Box<dyn std::error::Error + Send + Sync>| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, e)
    };

    let date =
        NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|e| conversion(Box::new(e)))?;
    if date.format(DATE_FORMAT).to_string() != text {
        return Err(conversion(Box::new(MalformedDate(text))));
    }

    Ok(date)
}

// ============================================================================
// SQLITE LEDGER
// ============================================================================

/// Ledger backed by a single SQLite connection held for its whole lifetime.
///
/// Statements run in autocommit mode, so every write is on disk by the time
/// the call returns.
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Number of stored transactions
    #[cfg(test)]
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM transacoes", [], |row| row.get(0))?;

        Ok(count)
    }
}

impl Ledger for SqliteLedger {
    fn add(
        &mut self,
        kind: TransactionKind,
        description: &str,
        amount: f64,
        date: NaiveDate,
    ) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO transacoes (tipo, descricao, valor, data) VALUES (?1, ?2, ?3, ?4)",
                params![
                    kind.as_stored(),
                    description,
                    amount,
                    date.format(DATE_FORMAT).to_string()
                ],
            )
            .context("Failed to insert transaction")?;

        tracing::info!(
            id = self.conn.last_insert_rowid(),
            kind = kind.as_stored(),
            amount,
            "transaction added"
        );

        Ok(())
    }

    fn remove(&mut self, id: TransactionId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM transacoes WHERE id = ?1", params![id])
            .context("Failed to delete transaction")?;

        tracing::info!(id, deleted, "transaction removed");

        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Transaction>> {
        // data is DD/MM/YYYY text; order on year, month, day so the
        // newest calendar date comes first
        let mut stmt = self.conn.prepare(
            "SELECT id, tipo, descricao, valor, data
             FROM transacoes
             ORDER BY substr(data, 7, 4) DESC,
                      substr(data, 4, 2) DESC,
                      substr(data, 1, 2) DESC,
                      id DESC",
        )?;

        let transactions = stmt
            .query_map([], |row| {
                Ok(Transaction {
                    id: row.get(0)?,
                    kind: decode_kind(row, 1)?,
                    description: row.get(2)?,
                    amount: row.get(3)?,
                    date: decode_date(row, 4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read transactions")?;

        tracing::debug!(count = transactions.len(), "transactions loaded");

        Ok(transactions)
    }

    fn balance(&self) -> Result<f64> {
        let mut stmt = self.conn.prepare("SELECT tipo, valor FROM transacoes")?;

        let entries = stmt
            .query_map([], |row| Ok((decode_kind(row, 0)?, row.get::<_, f64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read amounts")?;

        Ok(signed_total(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32, month: u32, year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        let ledger = SqliteLedger::from_connection(conn).unwrap();
        assert_eq!(ledger.count().unwrap(), 0);
    }

    #[test]
    fn test_add_assigns_fresh_ids() {
        let mut ledger = SqliteLedger::in_memory().unwrap();
        let today = date(19, 10, 2026);

        ledger.add(TransactionKind::Income, "Salary", 1000.0, today).unwrap();
        ledger.add(TransactionKind::Expense, "Rent", 400.0, today).unwrap();

        let rows = ledger.list_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_ne!(rows[0].id, rows[1].id);

        let rent = &rows[0];
        assert_eq!(rent.kind, TransactionKind::Expense);
        assert_eq!(rent.description, "Rent");
        assert_eq!(rent.amount, 400.0);
        assert_eq!(rent.date, today);
        assert_eq!(rent.date_text(), "19/10/2026");
    }

    #[test]
    fn test_balance_scenario() {
        let mut ledger = SqliteLedger::in_memory().unwrap();
        let today = date(1, 3, 2026);

        ledger.add(TransactionKind::Income, "Salary", 1000.0, today).unwrap();
        assert_eq!(ledger.balance().unwrap(), 1000.0);

        ledger.add(TransactionKind::Expense, "Rent", 400.0, today).unwrap();
        assert_eq!(ledger.balance().unwrap(), 600.0);

        let rent_id = ledger
            .list_all()
            .unwrap()
            .into_iter()
            .find(|tx| tx.description == "Rent")
            .map(|tx| tx.id)
            .unwrap();
        ledger.remove(rent_id).unwrap();

        assert_eq!(ledger.balance().unwrap(), 1000.0);
        let rows = ledger.list_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Salary");
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut ledger = SqliteLedger::in_memory().unwrap();
        ledger
            .add(TransactionKind::Expense, "Coffee", 4.5, date(2, 2, 2026))
            .unwrap();

        let before = ledger.list_all().unwrap();
        ledger.remove(9999).unwrap();

        assert_eq!(ledger.list_all().unwrap(), before);
        assert_eq!(ledger.balance().unwrap(), -4.5);
    }

    #[test]
    fn test_list_orders_by_calendar_date_then_id() {
        let mut ledger = SqliteLedger::in_memory().unwrap();

        // Day-first text would sort 31/01 above 05/02; calendar order must not
        ledger.add(TransactionKind::Expense, "jan", 1.0, date(31, 1, 2026)).unwrap();
        ledger.add(TransactionKind::Expense, "feb-a", 1.0, date(5, 2, 2026)).unwrap();
        ledger.add(TransactionKind::Expense, "old", 1.0, date(28, 12, 2025)).unwrap();
        ledger.add(TransactionKind::Expense, "feb-b", 1.0, date(5, 2, 2026)).unwrap();

        let order: Vec<String> = ledger
            .list_all()
            .unwrap()
            .into_iter()
            .map(|tx| tx.description)
            .collect();

        assert_eq!(order, vec!["feb-b", "feb-a", "jan", "old"]);
    }

    #[test]
    fn test_reads_rows_written_by_other_tools() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO transacoes (tipo, descricao, valor, data)
             VALUES ('Receita', 'Freelance', 250.0, '07/09/2025')",
            [],
        )
        .unwrap();

        let ledger = SqliteLedger::from_connection(conn).unwrap();
        let rows = ledger.list_all().unwrap();

        assert_eq!(rows[0].kind, TransactionKind::Income);
        assert_eq!(rows[0].date, date(7, 9, 2025));
        assert_eq!(ledger.balance().unwrap(), 250.0);
    }

    #[test]
    fn test_unpadded_date_is_a_storage_error() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO transacoes (tipo, descricao, valor, data)
             VALUES ('Despesa', 'Coffee', 3.0, '7/9/2025')",
            [],
        )
        .unwrap();

        let ledger = SqliteLedger::from_connection(conn).unwrap();
        let err = ledger.list_all().unwrap_err();
        assert!(format!("{err:#}").contains("7/9/2025"));
    }

    #[test]
    fn test_unknown_kind_is_a_storage_error() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO transacoes (tipo, descricao, valor, data)
             VALUES ('Transfer', 'x', 1.0, '01/01/2026')",
            [],
        )
        .unwrap();

        let ledger = SqliteLedger::from_connection(conn).unwrap();
        assert!(ledger.list_all().is_err());
        assert!(ledger.balance().is_err());
    }

    #[test]
    fn test_writes_are_durable_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("financeiro.db");

        {
            let mut ledger = SqliteLedger::open(&path).unwrap();
            ledger
                .add(TransactionKind::Income, "Bonus", 99.9, date(10, 10, 2026))
                .unwrap();
        }

        assert!(path.exists());
        let ledger = SqliteLedger::open(&path).unwrap();
        assert_eq!(ledger.count().unwrap(), 1);
        assert_eq!(ledger.balance().unwrap(), 99.9);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!("Receita".parse::<TransactionKind>().unwrap(), TransactionKind::Income);
        assert_eq!("Despesa".parse::<TransactionKind>().unwrap(), TransactionKind::Expense);
        assert!("Income".parse::<TransactionKind>().is_err());

        assert_eq!(TransactionKind::default(), TransactionKind::Expense);
        assert_eq!(TransactionKind::Income.toggle(), TransactionKind::Expense);
        assert_eq!(TransactionKind::Expense.to_string(), "Expense");
    }
}
