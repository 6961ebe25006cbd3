use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::aggregator::ShiftTotals;
use crate::error::{LedgerError, Result};
use crate::models::{Shift, Transaction};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS shifts (
    id INTEGER PRIMARY KEY,
    start_date TEXT NOT NULL,
    end_date TEXT,
    tips REAL DEFAULT 0,
    promotions REAL DEFAULT 0,
    net_fare REAL DEFAULT 0,
    tolls REAL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    statement_period TEXT NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    record_count INTEGER,
    checksum TEXT
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    transaction_date TEXT NOT NULL,
    event_date TEXT,
    event_type TEXT NOT NULL,
    amount REAL NOT NULL,
    tolls_reimbursed REAL,
    statement_period TEXT NOT NULL,
    shift_id INTEGER,
    import_date TEXT NOT NULL,
    source_row INTEGER NOT NULL,
    needs_manual_verification INTEGER DEFAULT 0,
    import_id INTEGER,
    FOREIGN KEY (shift_id) REFERENCES shifts(id) ON DELETE SET NULL,
    FOREIGN KEY (import_id) REFERENCES imports(id)
);

CREATE INDEX IF NOT EXISTS idx_transactions_shift ON transactions(shift_id);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Shifts
// ---------------------------------------------------------------------------

fn shift_from_row(row: &Row) -> rusqlite::Result<Shift> {
    Ok(Shift {
        id: row.get(0)?,
        start_date: row.get(1)?,
        end_date: row.get(2)?,
    })
}

pub fn add_shift(conn: &Connection, start: NaiveDateTime, end: Option<NaiveDateTime>) -> Result<i64> {
    if end.is_some_and(|e| e <= start) {
        return Err(LedgerError::Other("shift must end after it starts".to_string()));
    }
    conn.execute(
        "INSERT INTO shifts (start_date, end_date) VALUES (?1, ?2)",
        rusqlite::params![start, end],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn end_shift(conn: &Connection, shift_id: i64, end: NaiveDateTime) -> Result<()> {
    let shift = get_shift(conn, shift_id)?;
    if end <= shift.start_date {
        return Err(LedgerError::Other("shift must end after it starts".to_string()));
    }
    conn.execute(
        "UPDATE shifts SET end_date = ?1 WHERE id = ?2",
        rusqlite::params![end, shift_id],
    )?;
    Ok(())
}

/// Delete a shift. Its transactions are kept and become unmatched.
pub fn delete_shift(conn: &Connection, shift_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE transactions SET shift_id = NULL WHERE shift_id = ?1",
        [shift_id],
    )?;
    let deleted = conn.execute("DELETE FROM shifts WHERE id = ?1", [shift_id])?;
    if deleted == 0 {
        return Err(LedgerError::UnknownShift(shift_id));
    }
    Ok(())
}

pub fn get_shift(conn: &Connection, shift_id: i64) -> Result<Shift> {
    conn.query_row(
        "SELECT id, start_date, end_date FROM shifts WHERE id = ?1",
        [shift_id],
        shift_from_row,
    )
    .optional()?
    .ok_or(LedgerError::UnknownShift(shift_id))
}

pub fn load_shifts(conn: &Connection) -> Result<Vec<Shift>> {
    let mut stmt = conn.prepare("SELECT id, start_date, end_date FROM shifts ORDER BY start_date, id")?;
    let rows = stmt
        .query_map([], shift_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn load_shift_totals(conn: &Connection, shift_id: i64) -> Result<ShiftTotals> {
    let totals = conn
        .query_row(
            "SELECT s.tips, s.promotions, s.net_fare, s.tolls, \
             (SELECT count(*) FROM transactions t WHERE t.shift_id = s.id), \
             (SELECT count(*) FROM transactions t WHERE t.shift_id = s.id AND t.needs_manual_verification = 1) \
             FROM shifts s WHERE s.id = ?1",
            [shift_id],
            |row| {
                Ok(ShiftTotals {
                    tips: row.get(0)?,
                    promotions: row.get(1)?,
                    net_fare: row.get(2)?,
                    tolls: row.get(3)?,
                    transaction_count: row.get::<_, i64>(4)? as usize,
                    needs_verification: row.get::<_, i64>(5)? as usize,
                })
            },
        )
        .optional()?;
    totals.ok_or(LedgerError::UnknownShift(shift_id))
}

/// Overwrite a shift's earnings fields with freshly computed totals.
pub fn write_shift_totals(conn: &Connection, shift_id: i64, totals: &ShiftTotals) -> Result<()> {
    conn.execute(
        "UPDATE shifts SET tips = ?1, promotions = ?2, net_fare = ?3, tolls = ?4 WHERE id = ?5",
        rusqlite::params![totals.tips, totals.promotions, totals.net_fare, totals.tolls, shift_id],
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

const TXN_COLUMNS: &str = "id, transaction_date, event_date, event_type, amount, tolls_reimbursed, \
     statement_period, shift_id, import_date, source_row, needs_manual_verification";

fn transaction_from_row(row: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        transaction_date: row.get(1)?,
        event_date: row.get(2)?,
        event_type: row.get(3)?,
        amount: row.get(4)?,
        tolls_reimbursed: row.get(5)?,
        statement_period: row.get(6)?,
        shift_id: row.get(7)?,
        import_date: row.get(8)?,
        source_row: row.get::<_, i64>(9)? as usize,
        needs_manual_verification: row.get(10)?,
    })
}

pub fn load_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!("SELECT {TXN_COLUMNS} FROM transactions ORDER BY id"))?;
    let rows = stmt
        .query_map([], transaction_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn load_shift_transactions(conn: &Connection, shift_id: i64) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TXN_COLUMNS} FROM transactions WHERE shift_id = ?1 ORDER BY transaction_date, id"
    ))?;
    let rows = stmt
        .query_map([shift_id], transaction_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Remove every stored row of a statement period. A new document for a period
/// replaces the earlier import's rows wholesale; rows are never merged.
pub fn delete_period_transactions(conn: &Connection, statement_period: &str) -> Result<usize> {
    let removed = conn.execute(
        "DELETE FROM transactions WHERE statement_period = ?1",
        [statement_period],
    )?;
    Ok(removed)
}

pub fn insert_transaction(conn: &Connection, txn: &Transaction, import_id: Option<i64>) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions (transaction_date, event_date, event_type, amount, tolls_reimbursed, \
         statement_period, shift_id, import_date, source_row, needs_manual_verification, import_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            txn.transaction_date,
            txn.event_date,
            txn.event_type,
            txn.amount,
            txn.tolls_reimbursed,
            txn.statement_period,
            txn.shift_id,
            txn.import_date,
            txn.source_row as i64,
            txn.needs_manual_verification,
            import_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn set_assignment(conn: &Connection, transaction_id: i64, shift_id: Option<i64>) -> Result<()> {
    conn.execute(
        "UPDATE transactions SET shift_id = ?1 WHERE id = ?2",
        rusqlite::params![shift_id, transaction_id],
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Imports
// ---------------------------------------------------------------------------

pub fn import_exists(conn: &Connection, checksum: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
    Ok(stmt.exists([checksum])?)
}

pub fn record_import(
    conn: &Connection,
    filename: &str,
    statement_period: &str,
    record_count: usize,
    checksum: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO imports (filename, statement_period, record_count, checksum) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![filename, statement_period, record_count as i64, checksum],
    )?;
    Ok(conn.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn dt(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn sample_txn(shift_id: Option<i64>) -> Transaction {
        Transaction {
            id: None,
            transaction_date: dt(11, 16),
            event_date: Some(dt(11, 15)),
            event_type: "UberX".to_string(),
            amount: 12.34,
            tolls_reimbursed: Some(2.5),
            statement_period: "Oct 6, 2025 4 AM - Oct 13, 2025 4 AM".to_string(),
            shift_id,
            import_date: dt(14, 9),
            source_row: 3,
            needs_manual_verification: true,
        }
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["shifts", "transactions", "imports"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_transaction_roundtrip() {
        let (_dir, conn) = test_db();
        let shift_id = add_shift(&conn, dt(11, 8), Some(dt(11, 18))).unwrap();
        let id = insert_transaction(&conn, &sample_txn(Some(shift_id)), None).unwrap();
        let loaded = load_transactions(&conn).unwrap();
        assert_eq!(loaded.len(), 1);
        let mut expected = sample_txn(Some(shift_id));
        expected.id = Some(id);
        assert_eq!(loaded[0], expected);
    }

    #[test]
    fn test_identical_rows_are_both_kept() {
        let (_dir, conn) = test_db();
        let mut second = sample_txn(None);
        second.source_row = 7;
        insert_transaction(&conn, &sample_txn(None), None).unwrap();
        insert_transaction(&conn, &second, None).unwrap();
        assert_eq!(load_transactions(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_period_transactions() {
        let (_dir, conn) = test_db();
        let mut other = sample_txn(None);
        other.statement_period = "Oct 13, 2025 4 AM - Oct 20, 2025 4 AM".to_string();
        insert_transaction(&conn, &sample_txn(None), None).unwrap();
        insert_transaction(&conn, &sample_txn(None), None).unwrap();
        insert_transaction(&conn, &other, None).unwrap();

        let removed = delete_period_transactions(&conn, &sample_txn(None).statement_period).unwrap();
        assert_eq!(removed, 2);
        let left = load_transactions(&conn).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].statement_period, other.statement_period);
    }

    #[test]
    fn test_delete_shift_keeps_transactions() {
        let (_dir, conn) = test_db();
        let shift_id = add_shift(&conn, dt(11, 8), Some(dt(11, 18))).unwrap();
        insert_transaction(&conn, &sample_txn(Some(shift_id)), None).unwrap();
        delete_shift(&conn, shift_id).unwrap();
        let loaded = load_transactions(&conn).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].shift_id, None);
        assert!(matches!(delete_shift(&conn, shift_id), Err(LedgerError::UnknownShift(_))));
    }

    #[test]
    fn test_add_shift_rejects_inverted_range() {
        let (_dir, conn) = test_db();
        assert!(add_shift(&conn, dt(11, 18), Some(dt(11, 8))).is_err());
        let open = add_shift(&conn, dt(11, 18), None).unwrap();
        end_shift(&conn, open, dt(11, 23)).unwrap();
        assert_eq!(get_shift(&conn, open).unwrap().end_date, Some(dt(11, 23)));
    }

    #[test]
    fn test_write_and_load_shift_totals() {
        let (_dir, conn) = test_db();
        let shift_id = add_shift(&conn, dt(11, 8), Some(dt(11, 18))).unwrap();
        insert_transaction(&conn, &sample_txn(Some(shift_id)), None).unwrap();
        let totals = ShiftTotals {
            tips: 4.0,
            promotions: 20.0,
            net_fare: 12.34,
            tolls: 2.5,
            transaction_count: 1,
            needs_verification: 1,
        };
        write_shift_totals(&conn, shift_id, &totals).unwrap();
        assert_eq!(load_shift_totals(&conn, shift_id).unwrap(), totals);
    }

    #[test]
    fn test_import_checksum() {
        let (_dir, conn) = test_db();
        assert!(!import_exists(&conn, "abc").unwrap());
        record_import(&conn, "stmt.json", "p", 2, "abc").unwrap();
        assert!(import_exists(&conn, "abc").unwrap());
    }
}
