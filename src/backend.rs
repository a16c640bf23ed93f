use std::fmt;
use std::path::Path;

use clap::ValueEnum;
use log::info;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::clients;
use crate::db::{get_connection, init_db};
use crate::error::{Result, VaultixError};
use crate::flatfile::FlatFile;
use crate::models::{
    sort_clients, sort_transactions, Client, ClientDraft, ClientFilter, Removed, Transaction,
    TransactionDraft, TransactionFilter,
};
use crate::transactions;
use crate::validate;

pub const DB_FILE: &str = "vaultix.db";
pub const CLIENTS_FILE: &str = "clients.csv";
pub const TRANSACTIONS_FILE: &str = "transactions.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// SQLite database (vaultix.db)
    #[default]
    Sqlite,
    /// Comma-delimited text files (clients.csv, transactions.csv)
    File,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::File => write!(f, "file"),
        }
    }
}

/// An open store. Both variants honour the same contract: drafts are
/// validated, transactions must point at an existing client, and deleting
/// a client removes its transactions.
pub enum Backend {
    Sqlite(Connection),
    Files {
        clients: FlatFile<Client>,
        transactions: FlatFile<Transaction>,
    },
}

impl Backend {
    pub fn open(kind: BackendKind, data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let backend = match kind {
            BackendKind::Sqlite => {
                let conn = get_connection(&data_dir.join(DB_FILE))?;
                init_db(&conn)?;
                Self::Sqlite(conn)
            }
            BackendKind::File => Self::Files {
                clients: FlatFile::open(data_dir.join(CLIENTS_FILE))?,
                transactions: FlatFile::open(data_dir.join(TRANSACTIONS_FILE))?,
            },
        };
        info!("Opened {kind} store in {}", data_dir.display());
        Ok(backend)
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Sqlite(_) => BackendKind::Sqlite,
            Self::Files { .. } => BackendKind::File,
        }
    }

    /// Stores a new client. Without an explicit id the store picks one.
    pub fn add_client(&mut self, id: Option<i64>, draft: &ClientDraft) -> Result<i64> {
        validate::client(draft)?;
        match self {
            Self::Sqlite(conn) => clients::insert_client(conn, id, draft),
            Self::Files { clients, .. } => {
                let id = match id {
                    Some(id) => id,
                    None => clients.next_id()?,
                };
                clients.append(Client::from_draft(id, draft))?;
                Ok(id)
            }
        }
    }

    /// Clients matching `filter`, by name ascending.
    pub fn clients(&self, filter: &ClientFilter) -> Result<Vec<Client>> {
        match self {
            Self::Sqlite(conn) => clients::list_clients(conn, filter),
            Self::Files { clients, .. } => {
                let mut rows: Vec<Client> = clients
                    .read_all()
                    .into_iter()
                    .filter(|c| filter.matches(c))
                    .collect();
                sort_clients(&mut rows);
                Ok(rows)
            }
        }
    }

    pub fn client(&self, id: i64) -> Result<Option<Client>> {
        match self {
            Self::Sqlite(conn) => clients::get_client(conn, id),
            Self::Files { clients, .. } => Ok(clients.find_by_id(id).cloned()),
        }
    }

    pub fn update_client(&mut self, id: i64, draft: &ClientDraft) -> Result<usize> {
        validate::client(draft)?;
        match self {
            Self::Sqlite(conn) => clients::update_client(conn, id, draft),
            Self::Files { clients, .. } => clients.update(Client::from_draft(id, draft)),
        }
    }

    pub fn delete_client(&mut self, id: i64) -> Result<Removed> {
        match self {
            Self::Sqlite(conn) => clients::delete_client(conn, id),
            Self::Files {
                clients,
                transactions,
            } => {
                let removed_txns = transactions.retain(|t| t.client_id != id)?;
                let removed_clients = clients.delete(id)?;
                Ok(Removed {
                    clients: removed_clients,
                    transactions: removed_txns,
                })
            }
        }
    }

    pub fn add_transaction(&mut self, id: Option<i64>, draft: &TransactionDraft) -> Result<i64> {
        validate::transaction(draft)?;
        match self {
            Self::Sqlite(conn) => transactions::insert_transaction(conn, id, draft),
            Self::Files {
                clients,
                transactions,
            } => {
                if !clients.contains(draft.client_id) {
                    return Err(VaultixError::UnknownClient(draft.client_id));
                }
                let id = match id {
                    Some(id) => id,
                    None => transactions.next_id()?,
                };
                transactions.append(Transaction::from_draft(id, draft))?;
                Ok(id)
            }
        }
    }

    /// Transactions matching `filter`, newest first.
    pub fn transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        match self {
            Self::Sqlite(conn) => transactions::list_transactions(conn, filter),
            Self::Files { transactions, .. } => {
                let mut rows: Vec<Transaction> = transactions
                    .read_all()
                    .into_iter()
                    .filter(|t| filter.matches(t))
                    .collect();
                sort_transactions(&mut rows);
                Ok(rows)
            }
        }
    }

    pub fn transaction(&self, id: i64) -> Result<Option<Transaction>> {
        match self {
            Self::Sqlite(conn) => transactions::get_transaction(conn, id),
            Self::Files { transactions, .. } => Ok(transactions.find_by_id(id).cloned()),
        }
    }

    pub fn update_transaction(&mut self, id: i64, draft: &TransactionDraft) -> Result<usize> {
        validate::transaction(draft)?;
        match self {
            Self::Sqlite(conn) => transactions::update_transaction(conn, id, draft),
            Self::Files {
                clients,
                transactions,
            } => {
                if !clients.contains(draft.client_id) {
                    return Err(VaultixError::UnknownClient(draft.client_id));
                }
                transactions.update(Transaction::from_draft(id, draft))
            }
        }
    }

    pub fn delete_transaction(&mut self, id: i64) -> Result<usize> {
        match self {
            Self::Sqlite(conn) => transactions::delete_transaction(conn, id),
            Self::Files { transactions, .. } => transactions.delete(id),
        }
    }

    /// (clients, transactions)
    pub fn counts(&self) -> Result<(usize, usize)> {
        match self {
            Self::Sqlite(conn) => Ok((
                clients::count_clients(conn)?,
                transactions::count_transactions(conn)?,
            )),
            Self::Files {
                clients,
                transactions,
            } => Ok((clients.len(), transactions.len())),
        }
    }
}
