use crate::backend::{Backend, BackendKind, CLIENTS_FILE, DB_FILE, TRANSACTIONS_FILE};
use crate::cli::StoreArgs;
use crate::error::Result;
use crate::settings::settings_path;

pub fn run(store: &StoreArgs) -> Result<()> {
    let (kind, data_dir) = store.resolve();

    println!("Settings:   {}", settings_path().display());
    println!("Data dir:   {}", data_dir.display());
    println!("Backend:    {kind}");
    let files: &[&str] = match kind {
        BackendKind::Sqlite => &[DB_FILE],
        BackendKind::File => &[CLIENTS_FILE, TRANSACTIONS_FILE],
    };
    for name in files {
        println!("Store file: {}", data_dir.join(name).display());
    }

    if files.iter().all(|name| data_dir.join(name).exists()) {
        let backend = Backend::open(kind, &data_dir)?;
        let (clients, transactions) = backend.counts()?;
        println!();
        println!("Clients:       {clients}");
        println!("Transactions:  {transactions}");
    } else {
        println!();
        println!("Store not found. Run `vaultix init` to set up.");
    }
    Ok(())
}
