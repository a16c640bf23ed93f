pub mod clients;
pub mod init;
pub mod menu;
pub mod status;
pub mod transactions;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::backend::{Backend, BackendKind};
use crate::error::Result;
use crate::settings::{load_settings, shellexpand_path};

#[derive(Parser)]
#[command(name = "vaultix", version, about = "Keep clients and their transactions in SQLite or flat files.")]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Overrides for the saved settings.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Storage backend (default: the one chosen at `vaultix init`)
    #[arg(long, global = true, value_enum)]
    pub backend: Option<BackendKind>,
    /// Data directory (default: the one chosen at `vaultix init`)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

impl StoreArgs {
    pub fn resolve(&self) -> (BackendKind, PathBuf) {
        let settings = load_settings();
        let kind = self.backend.unwrap_or(settings.backend);
        let dir = match &self.data_dir {
            Some(dir) => PathBuf::from(shellexpand_path(dir)),
            None => PathBuf::from(settings.data_dir),
        };
        (kind, dir)
    }

    pub fn open(&self) -> Result<Backend> {
        let (kind, dir) = self.resolve();
        Backend::open(kind, &dir)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save the data directory and backend given by --data-dir/--backend,
    /// and initialize the store there.
    Init,
    /// Manage clients.
    Clients {
        #[command(subcommand)]
        command: ClientsCommands,
    },
    /// Manage transactions.
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommands,
    },
    /// Numbered console menu (the default when no command is given).
    Menu,
    /// Show the active store and record counts.
    Status,
}

#[derive(Subcommand)]
pub enum ClientsCommands {
    /// Add a client.
    Add {
        /// Display name
        name: String,
        #[arg(long)]
        email: String,
        /// 7-15 digits
        #[arg(long)]
        phone: String,
        /// Mark the client inactive
        #[arg(long)]
        inactive: bool,
        #[arg(long)]
        premium: bool,
        /// Registration date YYYY-MM-DD (default: today)
        #[arg(long)]
        registered: Option<String>,
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,
        /// Explicit client ID (default: next free ID)
        #[arg(long)]
        id: Option<i64>,
    },
    /// List clients, ordered by name.
    List {
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        premium: Option<bool>,
        /// Only names containing this text
        #[arg(long)]
        name: Option<String>,
    },
    /// Show one client.
    Show { id: i64 },
    /// Update a client; omitted fields keep their value.
    Update {
        /// Client ID (shown in `vaultix clients list`)
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        premium: Option<bool>,
        #[arg(long)]
        registered: Option<String>,
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,
        /// Remove the stored location
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        clear_location: bool,
    },
    /// Delete a client and all of its transactions.
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// Record a transaction for a client.
    Add {
        /// Owning client ID
        #[arg(long)]
        client: i64,
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
        /// Type label, e.g. Ingreso or Gasto
        #[arg(long = "type")]
        kind: String,
        #[arg(long)]
        category: String,
        /// Location or payment method
        #[arg(long)]
        location: String,
        /// Date YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Explicit transaction ID (default: next free ID)
        #[arg(long)]
        id: Option<i64>,
    },
    /// List transactions, newest first.
    List {
        /// Only this client's transactions
        #[arg(long)]
        client: Option<i64>,
        #[arg(long = "type")]
        kind: Option<String>,
    },
    /// Show one transaction.
    Show { id: i64 },
    /// Update a transaction; omitted fields keep their value.
    Update {
        id: i64,
        #[arg(long)]
        client: Option<i64>,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<f64>,
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a transaction.
    Delete { id: i64 },
}
