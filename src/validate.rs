use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{Result, VaultixError};
use crate::models::{ClientDraft, TransactionDraft};

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email pattern")
    })
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{7,15}$").expect("valid phone pattern"))
}

fn invalid(msg: impl Into<String>) -> VaultixError {
    VaultixError::Invalid(msg.into())
}

fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} is required")));
    }
    Ok(())
}

/// Accepts `YYYY-MM-DD` calendar dates only.
/// Dates are stored and sorted as text, so only the zero-padded form passes.
pub fn date(field: &str, value: &str) -> Result<()> {
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(parsed) if parsed.format("%Y-%m-%d").to_string() == value => Ok(()),
        _ => Err(invalid(format!("{field} must be a YYYY-MM-DD date, got '{value}'"))),
    }
}

pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

pub fn client(draft: &ClientDraft) -> Result<()> {
    required("name", &draft.name)?;
    required("email", &draft.email)?;
    required("phone", &draft.phone)?;
    if !email_re().is_match(&draft.email) {
        return Err(invalid(format!("'{}' is not a valid email address", draft.email)));
    }
    if !phone_re().is_match(&draft.phone) {
        return Err(invalid("phone must be 7-15 digits"));
    }
    date("registration date", &draft.registered_at)?;
    match (draft.latitude, draft.longitude) {
        (None, None) => {}
        (Some(lat), Some(lon)) => {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(invalid(format!("latitude {lat} is out of range")));
            }
            if !(-180.0..=180.0).contains(&lon) {
                return Err(invalid(format!("longitude {lon} is out of range")));
            }
        }
        _ => return Err(invalid("latitude and longitude must be given together")),
    }
    Ok(())
}

pub fn transaction(draft: &TransactionDraft) -> Result<()> {
    if !draft.amount.is_finite() {
        return Err(invalid("amount must be a number"));
    }
    required("type", &draft.kind)?;
    required("category", &draft.category)?;
    required("location", &draft.location)?;
    date("date", &draft.date)
}
