use log::debug;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::clients::client_exists;
use crate::error::{Result, VaultixError};
use crate::models::{Transaction, TransactionDraft, TransactionFilter};

const COLUMNS: &str = "id, client_id, amount, kind, date, category, location";

fn from_row(row: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        client_id: row.get(1)?,
        amount: row.get(2)?,
        kind: row.get(3)?,
        date: row.get(4)?,
        category: row.get(5)?,
        location: row.get(6)?,
    })
}

fn require_client(conn: &Connection, client_id: i64) -> Result<()> {
    if client_exists(conn, client_id)? {
        Ok(())
    } else {
        Err(VaultixError::UnknownClient(client_id))
    }
}

pub fn insert_transaction(conn: &Connection, id: Option<i64>, draft: &TransactionDraft) -> Result<i64> {
    require_client(conn, draft.client_id)?;
    if let Some(id) = id {
        if get_transaction(conn, id)?.is_some() {
            return Err(VaultixError::DuplicateId("transaction", id));
        }
    }
    conn.execute(
        "INSERT INTO transactions (id, client_id, amount, kind, date, category, location) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            id,
            draft.client_id,
            draft.amount,
            draft.kind,
            draft.date,
            draft.category,
            draft.location,
        ],
    )?;
    let new_id = conn.last_insert_rowid();
    debug!("Inserted transaction {new_id} for client {}", draft.client_id);
    Ok(new_id)
}

/// Matching transactions, newest first.
pub fn list_transactions(conn: &Connection, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    if let Some(client_id) = filter.client_id {
        params.push(Value::Integer(client_id));
        clauses.push(format!("client_id = ?{}", params.len()));
    }
    if let Some(kind) = &filter.kind {
        params.push(Value::Text(kind.clone()));
        clauses.push(format!("kind = ?{} COLLATE NOCASE", params.len()));
    }

    let mut sql = format!("SELECT {COLUMNS} FROM transactions");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY date DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let txn = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM transactions WHERE id = ?1"),
            [id],
            from_row,
        )
        .optional()?;
    Ok(txn)
}

pub fn update_transaction(conn: &Connection, id: i64, draft: &TransactionDraft) -> Result<usize> {
    require_client(conn, draft.client_id)?;
    let changed = conn.execute(
        "UPDATE transactions SET client_id = ?1, amount = ?2, kind = ?3, date = ?4, \
         category = ?5, location = ?6 WHERE id = ?7",
        rusqlite::params![
            draft.client_id,
            draft.amount,
            draft.kind,
            draft.date,
            draft.category,
            draft.location,
            id,
        ],
    )?;
    debug!("Updated transaction {id} ({changed} row(s))");
    Ok(changed)
}

pub fn delete_transaction(conn: &Connection, id: i64) -> Result<usize> {
    let removed = conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
    debug!("Deleted transaction {id} ({removed} row(s))");
    Ok(removed)
}

pub fn count_transactions(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?;
    Ok(count as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{draft as client_draft, insert_client};
    use crate::db::test_db;

    fn spend(client_id: i64, amount: f64, date: &str) -> TransactionDraft {
        TransactionDraft {
            client_id,
            amount,
            kind: "Gasto".to_string(),
            date: date.to_string(),
            category: "Comida".to_string(),
            location: "CDMX".to_string(),
        }
    }

    #[test]
    fn test_insert_requires_existing_client() {
        let (_dir, conn) = test_db();
        let err = insert_transaction(&conn, None, &spend(9, 10.0, "2024-01-01")).unwrap_err();
        assert!(matches!(err, VaultixError::UnknownClient(9)));
        assert_eq!(count_transactions(&conn).unwrap(), 0);
    }

    #[test]
    fn test_list_for_client_newest_first() {
        let (_dir, conn) = test_db();
        let a = insert_client(&conn, None, &client_draft("Ana")).unwrap();
        let b = insert_client(&conn, None, &client_draft("Beto")).unwrap();
        insert_transaction(&conn, None, &spend(a, 1.0, "2024-01-05")).unwrap();
        insert_transaction(&conn, None, &spend(a, 2.0, "2024-03-01")).unwrap();
        insert_transaction(&conn, None, &spend(b, 3.0, "2024-12-31")).unwrap();
        insert_transaction(&conn, None, &spend(a, 4.0, "2023-07-19")).unwrap();

        let dates: Vec<String> = list_transactions(&conn, &TransactionFilter::for_client(a))
            .unwrap()
            .into_iter()
            .map(|t| t.date)
            .collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-01-05", "2023-07-19"]);
    }

    #[test]
    fn test_list_by_kind_ignores_case() {
        let (_dir, conn) = test_db();
        let a = insert_client(&conn, None, &client_draft("Ana")).unwrap();
        insert_transaction(&conn, None, &spend(a, 1.0, "2024-01-05")).unwrap();
        let mut income = spend(a, 50.0, "2024-01-06");
        income.kind = "Ingreso".to_string();
        insert_transaction(&conn, None, &income).unwrap();

        let filter = TransactionFilter {
            kind: Some("ingreso".to_string()),
            ..Default::default()
        };
        let rows = list_transactions(&conn, &filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, 50.0);
    }

    #[test]
    fn test_update_amount_changes_only_target() {
        let (_dir, conn) = test_db();
        let a = insert_client(&conn, None, &client_draft("Ana")).unwrap();
        let t1 = insert_transaction(&conn, None, &spend(a, 10.0, "2024-01-01")).unwrap();
        let t2 = insert_transaction(&conn, None, &spend(a, 15.0, "2024-01-02")).unwrap();
        let before = get_transaction(&conn, t2).unwrap().unwrap();

        assert_eq!(update_transaction(&conn, t1, &spend(a, 20.0, "2024-01-01")).unwrap(), 1);

        assert_eq!(get_transaction(&conn, t1).unwrap().unwrap().amount, 20.0);
        assert_eq!(get_transaction(&conn, t2).unwrap().unwrap(), before);
    }

    #[test]
    fn test_update_rejects_unknown_client() {
        let (_dir, conn) = test_db();
        let a = insert_client(&conn, None, &client_draft("Ana")).unwrap();
        let t = insert_transaction(&conn, None, &spend(a, 10.0, "2024-01-01")).unwrap();
        let err = update_transaction(&conn, t, &spend(a + 100, 10.0, "2024-01-01")).unwrap_err();
        assert!(matches!(err, VaultixError::UnknownClient(_)));
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let (_dir, conn) = test_db();
        let a = insert_client(&conn, None, &client_draft("Ana")).unwrap();
        let t1 = insert_transaction(&conn, None, &spend(a, 10.0, "2024-01-01")).unwrap();
        insert_transaction(&conn, None, &spend(a, 11.0, "2024-01-02")).unwrap();

        assert_eq!(delete_transaction(&conn, t1).unwrap(), 1);
        assert!(get_transaction(&conn, t1).unwrap().is_none());
        assert_eq!(count_transactions(&conn).unwrap(), 1);
        assert_eq!(delete_transaction(&conn, t1).unwrap(), 0);
    }
}
