use std::path::Path;

use log::{info, warn};
use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i32 = 2;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS clients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NOT NULL,
    active INTEGER NOT NULL,
    registered_at TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    premium INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id INTEGER NOT NULL,
    amount REAL NOT NULL,
    kind TEXT NOT NULL,
    date TEXT NOT NULL,
    category TEXT NOT NULL,
    location TEXT NOT NULL,
    FOREIGN KEY (client_id) REFERENCES clients(id)
);

CREATE INDEX IF NOT EXISTS idx_transactions_client ON transactions(client_id);
";

const DROP_TABLES: &str = "
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS clients;
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn schema_version(conn: &Connection) -> Result<i32> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))?;
    Ok(())
}

fn recreate(conn: &Connection) -> Result<()> {
    conn.execute_batch(DROP_TABLES)?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// v1 databases predate client geolocation.
fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
    let altered = conn.execute_batch(
        "BEGIN;
         ALTER TABLE clients ADD COLUMN latitude REAL;
         ALTER TABLE clients ADD COLUMN longitude REAL;
         COMMIT;",
    );
    if let Err(e) = altered {
        warn!("Adding location columns failed ({e}); recreating tables, existing rows are lost");
        if !conn.is_autocommit() {
            conn.execute_batch("ROLLBACK;")?;
        }
        recreate(conn)?;
    }
    Ok(())
}

/// Creates the schema on a fresh database and upgrades older ones.
/// Unknown versions are dropped and recreated.
pub fn init_db(conn: &Connection) -> Result<()> {
    let version = schema_version(conn)?;
    match version {
        SCHEMA_VERSION => conn.execute_batch(SCHEMA)?,
        0 => {
            conn.execute_batch(SCHEMA)?;
            info!("Created schema version {SCHEMA_VERSION}");
        }
        1 => {
            migrate_v1_to_v2(conn)?;
            info!("Migrated schema from version 1 to {SCHEMA_VERSION}");
        }
        other => {
            warn!("Unsupported schema version {other}; dropping and recreating tables");
            recreate(conn)?;
        }
    }
    set_schema_version(conn, SCHEMA_VERSION)
}

#[cfg(test)]
pub(crate) fn test_db() -> (tempfile::TempDir, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let conn = get_connection(&dir.path().join("test.db")).unwrap();
    init_db(&conn).unwrap();
    (dir, conn)
}
