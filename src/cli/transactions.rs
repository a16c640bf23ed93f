use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{StoreArgs, TransactionsCommands};
use crate::error::{Result, VaultixError};
use crate::fmt::money;
use crate::models::{Transaction, TransactionDraft, TransactionFilter};
use crate::validate::today;

pub fn run(store: &StoreArgs, command: TransactionsCommands) -> Result<()> {
    let mut backend = store.open()?;
    match command {
        TransactionsCommands::Add {
            client,
            amount,
            kind,
            category,
            location,
            date,
            id,
        } => {
            let draft = TransactionDraft {
                client_id: client,
                amount,
                kind,
                date: date.unwrap_or_else(today),
                category,
                location,
            };
            let id = backend.add_transaction(id, &draft)?;
            println!(
                "{}",
                format!("Added transaction {id}: {} for client {client}", money(amount)).green()
            );
        }
        TransactionsCommands::List { client, kind } => {
            if let Some(client_id) = client {
                if backend.client(client_id)?.is_none() {
                    return Err(VaultixError::UnknownClient(client_id));
                }
            }
            let rows = backend.transactions(&TransactionFilter {
                client_id: client,
                kind,
            })?;
            if rows.is_empty() {
                println!("No transactions found.");
            } else {
                println!("Transactions\n{}", transaction_table(&rows));
            }
        }
        TransactionsCommands::Show { id } => {
            let txn = backend
                .transaction(id)?
                .ok_or(VaultixError::NotFound("transaction", id))?;
            println!("{}", transaction_table(std::slice::from_ref(&txn)));
        }
        TransactionsCommands::Update {
            id,
            client,
            amount,
            kind,
            category,
            location,
            date,
        } => {
            let current = backend
                .transaction(id)?
                .ok_or(VaultixError::NotFound("transaction", id))?;
            let mut draft = current.to_draft();
            if let Some(v) = client {
                draft.client_id = v;
            }
            if let Some(v) = amount {
                draft.amount = v;
            }
            if let Some(v) = kind {
                draft.kind = v;
            }
            if let Some(v) = category {
                draft.category = v;
            }
            if let Some(v) = location {
                draft.location = v;
            }
            if let Some(v) = date {
                draft.date = v;
            }
            backend.update_transaction(id, &draft)?;
            println!("{}", format!("Updated transaction {id}").green());
        }
        TransactionsCommands::Delete { id } => {
            if backend.delete_transaction(id)? == 0 {
                return Err(VaultixError::NotFound("transaction", id));
            }
            println!("{}", format!("Deleted transaction {id}").green());
        }
    }
    Ok(())
}

pub fn transaction_table(rows: &[Transaction]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Client", "Date", "Type", "Category", "Location", "Amount"]);
    for t in rows {
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(t.client_id),
            Cell::new(&t.date),
            Cell::new(&t.kind),
            Cell::new(&t.category),
            Cell::new(&t.location),
            Cell::new(money(t.amount)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
