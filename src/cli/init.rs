use std::io::BufRead;
use std::path::PathBuf;

use colored::Colorize;

use crate::backend::Backend;
use crate::cli::StoreArgs;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, shellexpand_path};

pub fn run(store: &StoreArgs) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = &store.data_dir {
        settings.data_dir = shellexpand_path(dir);
    } else if !settings_path().exists() {
        // First run: offer the default data dir.
        println!("Data directory [{}]: ", settings.data_dir);
        if let Some(chosen) = read_data_dir(std::io::stdin().lock())? {
            settings.data_dir = shellexpand_path(&chosen);
        }
    }
    if let Some(kind) = store.backend {
        settings.backend = kind;
    }

    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    let backend = Backend::open(settings.backend, &resolved)?;
    let (clients, transactions) = backend.counts()?;

    println!(
        "{}",
        format!(
            "Initialized vaultix ({}) at {}",
            settings.backend,
            resolved.display()
        )
        .green()
    );
    if clients > 0 || transactions > 0 {
        println!("Found {clients} client(s) and {transactions} transaction(s).");
    }
    Ok(())
}

/// One line from `input`; `None` when it is blank or input has ended.
fn read_data_dir<R: BufRead>(mut input: R) -> Result<Option<String>> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let chosen = line.trim();
    Ok((!chosen.is_empty()).then(|| chosen.to_string()))
}
