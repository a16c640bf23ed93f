use log::debug;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::{Result, VaultixError};
use crate::models::{Client, ClientDraft, ClientFilter, Removed};

const COLUMNS: &str = "id, name, email, phone, active, premium, registered_at, latitude, longitude";

fn from_row(row: &Row) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        active: row.get(4)?,
        premium: row.get(5)?,
        registered_at: row.get(6)?,
        latitude: row.get(7)?,
        longitude: row.get(8)?,
    })
}

pub fn client_exists(conn: &Connection, id: i64) -> Result<bool> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM clients WHERE id = ?1")?;
    Ok(stmt.exists([id])?)
}

/// Inserts a client and returns its row id. With `id = None` SQLite assigns
/// the next autoincrement value.
pub fn insert_client(conn: &Connection, id: Option<i64>, draft: &ClientDraft) -> Result<i64> {
    if let Some(id) = id {
        if client_exists(conn, id)? {
            return Err(VaultixError::DuplicateId("client", id));
        }
    }
    conn.execute(
        "INSERT INTO clients (id, name, email, phone, active, premium, registered_at, latitude, longitude) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            id,
            draft.name,
            draft.email,
            draft.phone,
            draft.active,
            draft.premium,
            draft.registered_at,
            draft.latitude,
            draft.longitude,
        ],
    )?;
    let new_id = conn.last_insert_rowid();
    debug!("Inserted client {new_id}");
    Ok(new_id)
}

pub fn list_clients(conn: &Connection, filter: &ClientFilter) -> Result<Vec<Client>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    if let Some(active) = filter.active {
        params.push(Value::Integer(active as i64));
        clauses.push(format!("active = ?{}", params.len()));
    }
    if let Some(premium) = filter.premium {
        params.push(Value::Integer(premium as i64));
        clauses.push(format!("premium = ?{}", params.len()));
    }
    if let Some(name) = &filter.name {
        params.push(Value::Text(name.to_lowercase()));
        clauses.push(format!("instr(lower(name), ?{}) > 0", params.len()));
    }

    let mut sql = format!("SELECT {COLUMNS} FROM clients");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY name ASC, id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_client(conn: &Connection, id: i64) -> Result<Option<Client>> {
    let client = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM clients WHERE id = ?1"),
            [id],
            from_row,
        )
        .optional()?;
    Ok(client)
}

/// Full-record replace. Returns the number of rows changed (0 when the id
/// does not exist).
pub fn update_client(conn: &Connection, id: i64, draft: &ClientDraft) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE clients SET name = ?1, email = ?2, phone = ?3, active = ?4, premium = ?5, \
         registered_at = ?6, latitude = ?7, longitude = ?8 WHERE id = ?9",
        rusqlite::params![
            draft.name,
            draft.email,
            draft.phone,
            draft.active,
            draft.premium,
            draft.registered_at,
            draft.latitude,
            draft.longitude,
            id,
        ],
    )?;
    debug!("Updated client {id} ({changed} row(s))");
    Ok(changed)
}

/// Deletes a client together with its transactions, atomically.
pub fn delete_client(conn: &Connection, id: i64) -> Result<Removed> {
    let tx = conn.unchecked_transaction()?;
    let transactions = tx.execute("DELETE FROM transactions WHERE client_id = ?1", [id])?;
    let clients = tx.execute("DELETE FROM clients WHERE id = ?1", [id])?;
    tx.commit()?;
    debug!("Deleted client {id}: {clients} client row(s), {transactions} transaction(s)");
    Ok(Removed {
        clients,
        transactions,
    })
}

pub fn count_clients(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT count(*) FROM clients", [], |r| r.get(0))?;
    Ok(count as usize)
}

#[cfg(test)]
pub(crate) fn draft(name: &str) -> ClientDraft {
    ClientDraft {
        name: name.to_string(),
        email: format!("{}@mail.com", name.to_lowercase()),
        phone: "5551234567".to_string(),
        active: true,
        premium: false,
        registered_at: "2024-01-01".to_string(),
        latitude: None,
        longitude: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let (_dir, conn) = test_db();
        let a = insert_client(&conn, None, &draft("Ana")).unwrap();
        let b = insert_client(&conn, None, &draft("Beto")).unwrap();
        assert!(b > a);
        assert_eq!(count_clients(&conn).unwrap(), 2);
    }

    #[test]
    fn test_insert_with_explicit_id() {
        let (_dir, conn) = test_db();
        let id = insert_client(&conn, Some(42), &draft("Ana")).unwrap();
        assert_eq!(id, 42);
        let err = insert_client(&conn, Some(42), &draft("Beto")).unwrap_err();
        assert!(matches!(err, VaultixError::DuplicateId("client", 42)));
    }

    #[test]
    fn test_list_orders_by_name() {
        let (_dir, conn) = test_db();
        for name in ["Zoe", "Ana", "Marco"] {
            insert_client(&conn, None, &draft(name)).unwrap();
        }
        let names: Vec<String> = list_clients(&conn, &ClientFilter::default())
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Ana", "Marco", "Zoe"]);
    }

    #[test]
    fn test_list_applies_filter() {
        let (_dir, conn) = test_db();
        let mut premium = draft("Mariana");
        premium.premium = true;
        insert_client(&conn, None, &premium).unwrap();
        insert_client(&conn, None, &draft("Ana")).unwrap();
        insert_client(&conn, None, &draft("Pedro")).unwrap();

        let filter = ClientFilter {
            name: Some("ANA".to_string()),
            ..Default::default()
        };
        assert_eq!(list_clients(&conn, &filter).unwrap().len(), 2);

        let filter = ClientFilter {
            premium: Some(true),
            name: Some("ana".to_string()),
            ..Default::default()
        };
        let rows = list_clients(&conn, &filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Mariana");
    }

    #[test]
    fn test_location_roundtrips() {
        let (_dir, conn) = test_db();
        let mut d = draft("Ana");
        d.latitude = Some(19.4326);
        d.longitude = Some(-99.1332);
        let id = insert_client(&conn, None, &d).unwrap();
        let c = get_client(&conn, id).unwrap().unwrap();
        assert_eq!(c.latitude, Some(19.4326));
        assert_eq!(c.longitude, Some(-99.1332));
    }

    #[test]
    fn test_update_replaces_only_target() {
        let (_dir, conn) = test_db();
        let a = insert_client(&conn, None, &draft("Ana")).unwrap();
        let b = insert_client(&conn, None, &draft("Beto")).unwrap();
        let before_b = get_client(&conn, b).unwrap().unwrap();

        let mut changed = draft("Ana Maria");
        changed.premium = true;
        assert_eq!(update_client(&conn, a, &changed).unwrap(), 1);

        let after_a = get_client(&conn, a).unwrap().unwrap();
        assert_eq!(after_a.to_draft(), changed);
        assert_eq!(get_client(&conn, b).unwrap().unwrap(), before_b);
    }

    #[test]
    fn test_update_missing_returns_zero() {
        let (_dir, conn) = test_db();
        assert_eq!(update_client(&conn, 99, &draft("Ana")).unwrap(), 0);
    }

    #[test]
    fn test_delete_cascades_transactions() {
        let (_dir, conn) = test_db();
        let a = insert_client(&conn, None, &draft("Ana")).unwrap();
        let b = insert_client(&conn, None, &draft("Beto")).unwrap();
        for client in [a, a, a, b] {
            conn.execute(
                "INSERT INTO transactions (client_id, amount, kind, date, category, location) \
                 VALUES (?1, 10.0, 'Gasto', '2024-01-01', 'Comida', 'CDMX')",
                [client],
            )
            .unwrap();
        }

        let removed = delete_client(&conn, a).unwrap();
        assert_eq!(removed, Removed { clients: 1, transactions: 3 });
        assert!(get_client(&conn, a).unwrap().is_none());
        let orphans: i64 = conn
            .query_row("SELECT count(*) FROM transactions WHERE client_id = ?1", [a], |r| r.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
        let remaining: i64 = conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0)).unwrap();
        assert_eq!(remaining, 1);
    }

    #[test]
    fn test_delete_missing_is_zero() {
        let (_dir, conn) = test_db();
        assert_eq!(delete_client(&conn, 5).unwrap(), Removed::default());
    }
}
