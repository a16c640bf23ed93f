use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{ClientsCommands, StoreArgs};
use crate::error::{Result, VaultixError};
use crate::fmt::{coords, yes_no};
use crate::models::{Client, ClientDraft, ClientFilter};
use crate::validate::today;

pub fn run(store: &StoreArgs, command: ClientsCommands) -> Result<()> {
    let mut backend = store.open()?;
    match command {
        ClientsCommands::Add {
            name,
            email,
            phone,
            inactive,
            premium,
            registered,
            lat,
            lon,
            id,
        } => {
            let draft = ClientDraft {
                name,
                email,
                phone,
                active: !inactive,
                premium,
                registered_at: registered.unwrap_or_else(today),
                latitude: lat,
                longitude: lon,
            };
            let id = backend.add_client(id, &draft)?;
            println!("{}", format!("Added client {id}: {}", draft.name).green());
        }
        ClientsCommands::List {
            active,
            premium,
            name,
        } => {
            let filter = ClientFilter {
                active,
                premium,
                name,
            };
            let rows = backend.clients(&filter)?;
            if rows.is_empty() {
                println!("No clients found.");
            } else {
                println!("Clients\n{}", client_table(&rows));
            }
        }
        ClientsCommands::Show { id } => {
            let client = backend
                .client(id)?
                .ok_or(VaultixError::NotFound("client", id))?;
            print_client(&client);
        }
        ClientsCommands::Update {
            id,
            name,
            email,
            phone,
            active,
            premium,
            registered,
            lat,
            lon,
            clear_location,
        } => {
            let current = backend
                .client(id)?
                .ok_or(VaultixError::NotFound("client", id))?;
            let mut draft = current.to_draft();
            if let Some(v) = name {
                draft.name = v;
            }
            if let Some(v) = email {
                draft.email = v;
            }
            if let Some(v) = phone {
                draft.phone = v;
            }
            if let Some(v) = active {
                draft.active = v;
            }
            if let Some(v) = premium {
                draft.premium = v;
            }
            if let Some(v) = registered {
                draft.registered_at = v;
            }
            if clear_location {
                draft.latitude = None;
                draft.longitude = None;
            } else if lat.is_some() {
                draft.latitude = lat;
                draft.longitude = lon;
            }
            if draft == current.to_draft() {
                println!("Nothing to change for client {id}.");
                return Ok(());
            }
            backend.update_client(id, &draft)?;
            println!("{}", format!("Updated client {id}: {}", draft.name).green());
        }
        ClientsCommands::Delete { id } => {
            let removed = backend.delete_client(id)?;
            if removed.clients == 0 {
                return Err(VaultixError::NotFound("client", id));
            }
            println!(
                "{}",
                format!(
                    "Deleted client {id} and {} transaction(s)",
                    removed.transactions
                )
                .green()
            );
        }
    }
    Ok(())
}

pub fn client_table(rows: &[Client]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Name", "Email", "Phone", "Active", "Premium", "Registered", "Location",
    ]);
    for c in rows {
        table.add_row(vec![
            Cell::new(c.id),
            Cell::new(&c.name),
            Cell::new(&c.email),
            Cell::new(&c.phone),
            Cell::new(yes_no(c.active)),
            Cell::new(yes_no(c.premium)),
            Cell::new(&c.registered_at),
            Cell::new(coords(c.latitude, c.longitude)),
        ]);
    }
    table
}

fn print_client(c: &Client) {
    println!("ID:          {}", c.id);
    println!("Name:        {}", c.name.bold());
    println!("Email:       {}", c.email);
    println!("Phone:       {}", c.phone);
    println!("Active:      {}", yes_no(c.active));
    println!("Premium:     {}", yes_no(c.premium));
    println!("Registered:  {}", c.registered_at);
    let location = coords(c.latitude, c.longitude);
    println!("Location:    {}", if location.is_empty() { "(none)" } else { location.as_str() });
}
