//! Numbered console menu. Reads one line per prompt, so it can be driven
//! from a pipe as well as a terminal. End of input behaves like "Exit".

use std::io::{BufRead, Write};

use colored::Colorize;

use crate::backend::Backend;
use crate::cli::clients::client_table;
use crate::cli::transactions::transaction_table;
use crate::cli::StoreArgs;
use crate::error::{Result, VaultixError};
use crate::fmt::yes_no;
use crate::models::{ClientDraft, ClientFilter, TransactionDraft, TransactionFilter};
use crate::validate::today;

const OPTIONS: &[&str] = &[
    "Create client",
    "List clients",
    "Update client",
    "Delete client",
    "Client transactions",
    "Create transaction",
    "Update transaction",
    "Delete transaction",
    "Exit",
];

pub fn run(store: &StoreArgs) -> Result<()> {
    let mut backend = store.open()?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    Menu::new(&mut backend, stdin.lock(), stdout.lock()).run()
}

pub struct Menu<'a, R, W> {
    backend: &'a mut Backend,
    input: R,
    out: W,
    eof: bool,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(backend: &'a mut Backend, input: R, out: W) -> Self {
        Self {
            backend,
            input,
            out,
            eof: false,
        }
    }

    pub fn run(mut self) -> Result<()> {
        loop {
            writeln!(self.out, "\n=== Main menu ({}) ===", self.backend.kind())?;
            for (i, label) in OPTIONS.iter().enumerate() {
                writeln!(self.out, "{}. {label}", i + 1)?;
            }
            let Some(choice) = self.ask("Select an option: ")? else {
                break;
            };
            let outcome = match choice.parse::<usize>() {
                Ok(1) => self.create_client(),
                Ok(2) => self.list_clients(),
                Ok(3) => self.update_client(),
                Ok(4) => self.delete_client(),
                Ok(5) => self.client_transactions(),
                Ok(6) => self.create_transaction(),
                Ok(7) => self.update_transaction(),
                Ok(8) => self.delete_transaction(),
                Ok(9) => break,
                _ => {
                    writeln!(self.out, "{}", "Not a valid option, try again.".yellow())?;
                    Ok(())
                }
            };
            // Storage and IO failures end the session; bad input does not.
            match outcome {
                Err(e @ (VaultixError::Invalid(_)
                | VaultixError::UnknownClient(_)
                | VaultixError::DuplicateId(..)
                | VaultixError::IdsExhausted(_)
                | VaultixError::NotFound(..))) => {
                    writeln!(self.out, "{}", format!("Error: {e}").red())?;
                }
                other => other?,
            }
            if self.eof {
                break;
            }
        }
        writeln!(self.out, "Goodbye.")?;
        self.out.flush()?;
        Ok(())
    }

    /// Prints `label` and reads one trimmed line. `None` at end of input.
    fn ask(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.eof = true;
            writeln!(self.out)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Like `ask`, but blank input keeps `current`.
    fn ask_keep(&mut self, label: &str, current: &str) -> Result<Option<String>> {
        let answer = self.ask(&format!("{label} (current: {current}): "))?;
        Ok(answer.map(|a| if a.is_empty() { current.to_string() } else { a }))
    }

    fn ask_id(&mut self, label: &str) -> Result<Option<i64>> {
        match self.ask(label)? {
            Some(raw) => parse_number(&raw, "ID").map(Some),
            None => Ok(None),
        }
    }

    fn create_client(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Create client ---")?;
        let Some(name) = self.ask("Name: ")? else { return Ok(()) };
        let Some(email) = self.ask("Email: ")? else { return Ok(()) };
        let Some(phone) = self.ask("Phone: ")? else { return Ok(()) };
        let Some(active) = self.ask("Active? (yes/no) [yes]: ")? else { return Ok(()) };
        let Some(premium) = self.ask("Premium? (yes/no) [no]: ")? else { return Ok(()) };
        let Some(registered) = self.ask(&format!("Registration date (YYYY-MM-DD) [{}]: ", today()))? else {
            return Ok(());
        };
        let Some(lat) = self.ask("Latitude (blank for none): ")? else { return Ok(()) };
        let Some(lon) = self.ask("Longitude (blank for none): ")? else { return Ok(()) };

        let draft = ClientDraft {
            name,
            email,
            phone,
            active: parse_yes_no(&active, true)?,
            premium: parse_yes_no(&premium, false)?,
            registered_at: if registered.is_empty() { today() } else { registered },
            latitude: parse_optional_number(&lat, "latitude")?,
            longitude: parse_optional_number(&lon, "longitude")?,
        };
        let id = self.backend.add_client(None, &draft)?;
        writeln!(self.out, "{}", format!("Client {id} created.").green())?;
        Ok(())
    }

    fn list_clients(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Clients ---")?;
        let rows = self.backend.clients(&ClientFilter::default())?;
        if rows.is_empty() {
            writeln!(self.out, "No clients registered.")?;
        } else {
            writeln!(self.out, "{}", client_table(&rows))?;
        }
        Ok(())
    }

    fn update_client(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Update client ---")?;
        let Some(id) = self.ask_id("Client ID to update: ")? else { return Ok(()) };
        let current = self
            .backend
            .client(id)?
            .ok_or(VaultixError::NotFound("client", id))?;
        let mut draft = current.to_draft();

        let Some(name) = self.ask_keep("Name", &current.name)? else { return Ok(()) };
        let Some(email) = self.ask_keep("Email", &current.email)? else { return Ok(()) };
        let Some(phone) = self.ask_keep("Phone", &current.phone)? else { return Ok(()) };
        let Some(active) = self.ask_keep("Active? (yes/no)", yes_no(current.active))? else {
            return Ok(());
        };
        let Some(premium) = self.ask_keep("Premium? (yes/no)", yes_no(current.premium))? else {
            return Ok(());
        };

        draft.name = name;
        draft.email = email;
        draft.phone = phone;
        draft.active = parse_yes_no(&active, current.active)?;
        draft.premium = parse_yes_no(&premium, current.premium)?;

        self.backend.update_client(id, &draft)?;
        writeln!(self.out, "{}", format!("Client {id} updated.").green())?;
        Ok(())
    }

    fn delete_client(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Delete client ---")?;
        let Some(id) = self.ask_id("Client ID to delete: ")? else { return Ok(()) };
        let removed = self.backend.delete_client(id)?;
        if removed.clients == 0 {
            return Err(VaultixError::NotFound("client", id));
        }
        writeln!(
            self.out,
            "{}",
            format!(
                "Client {id} and {} transaction(s) deleted.",
                removed.transactions
            )
            .green()
        )?;
        Ok(())
    }

    fn client_transactions(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Client transactions ---")?;
        let Some(id) = self.ask_id("Client ID: ")? else { return Ok(()) };
        if self.backend.client(id)?.is_none() {
            return Err(VaultixError::UnknownClient(id));
        }
        let rows = self.backend.transactions(&TransactionFilter::for_client(id))?;
        if rows.is_empty() {
            writeln!(self.out, "No transactions recorded for this client.")?;
        } else {
            writeln!(self.out, "{}", transaction_table(&rows))?;
        }
        Ok(())
    }

    fn create_transaction(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Create transaction ---")?;
        let Some(client_id) = self.ask_id("Client ID: ")? else { return Ok(()) };
        let Some(amount) = self.ask("Amount: ")? else { return Ok(()) };
        let Some(kind) = self.ask("Type (e.g. Ingreso, Gasto): ")? else { return Ok(()) };
        let Some(category) = self.ask("Category: ")? else { return Ok(()) };
        let Some(location) = self.ask("Location / payment method: ")? else { return Ok(()) };
        let Some(date) = self.ask(&format!("Date (YYYY-MM-DD) [{}]: ", today()))? else {
            return Ok(());
        };

        let draft = TransactionDraft {
            client_id,
            amount: parse_number(&amount, "amount")?,
            kind,
            date: if date.is_empty() { today() } else { date },
            category,
            location,
        };
        let id = self.backend.add_transaction(None, &draft)?;
        writeln!(self.out, "{}", format!("Transaction {id} created.").green())?;
        Ok(())
    }

    fn update_transaction(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Update transaction ---")?;
        let Some(id) = self.ask_id("Transaction ID to update: ")? else { return Ok(()) };
        let current = self
            .backend
            .transaction(id)?
            .ok_or(VaultixError::NotFound("transaction", id))?;
        let mut draft = current.to_draft();

        let Some(date) = self.ask_keep("Date", &current.date)? else { return Ok(()) };
        let Some(amount) = self.ask_keep("Amount", &current.amount.to_string())? else {
            return Ok(());
        };
        let Some(kind) = self.ask_keep("Type", &current.kind)? else { return Ok(()) };
        let Some(category) = self.ask_keep("Category", &current.category)? else { return Ok(()) };
        let Some(location) = self.ask_keep("Location", &current.location)? else { return Ok(()) };

        draft.date = date;
        draft.amount = parse_number(&amount, "amount")?;
        draft.kind = kind;
        draft.category = category;
        draft.location = location;

        self.backend.update_transaction(id, &draft)?;
        writeln!(self.out, "{}", format!("Transaction {id} updated.").green())?;
        Ok(())
    }

    fn delete_transaction(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Delete transaction ---")?;
        let Some(id) = self.ask_id("Transaction ID to delete: ")? else { return Ok(()) };
        if self.backend.delete_transaction(id)? == 0 {
            return Err(VaultixError::NotFound("transaction", id));
        }
        writeln!(self.out, "{}", format!("Transaction {id} deleted.").green())?;
        Ok(())
    }
}

fn parse_yes_no(raw: &str, default: bool) -> Result<bool> {
    match raw.to_lowercase().as_str() {
        "" => Ok(default),
        "y" | "yes" | "si" | "sí" => Ok(true),
        "n" | "no" => Ok(false),
        other => Err(VaultixError::Invalid(format!("expected yes or no, got '{other}'"))),
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| VaultixError::Invalid(format!("'{raw}' is not a valid {what}")))
}

fn parse_optional_number(raw: &str, what: &str) -> Result<Option<f64>> {
    if raw.is_empty() {
        Ok(None)
    } else {
        parse_number(raw, what).map(Some)
    }
}
