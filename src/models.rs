use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub active: bool,
    pub premium: bool,
    pub registered_at: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Every client field except the identifier. Used for inserts and
/// full-record updates.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub active: bool,
    pub premium: bool,
    pub registered_at: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Client {
    pub fn from_draft(id: i64, draft: &ClientDraft) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            active: draft.active,
            premium: draft.premium,
            registered_at: draft.registered_at.clone(),
            latitude: draft.latitude,
            longitude: draft.longitude,
        }
    }

    pub fn to_draft(&self) -> ClientDraft {
        ClientDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            active: self.active,
            premium: self.premium,
            registered_at: self.registered_at.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub client_id: i64,
    pub amount: f64,
    /// Type label, e.g. "Ingreso" or "Gasto".
    pub kind: String,
    pub date: String,
    pub category: String,
    /// Where the transaction happened, or how it was paid.
    pub location: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub client_id: i64,
    pub amount: f64,
    pub kind: String,
    pub date: String,
    pub category: String,
    pub location: String,
}

impl Transaction {
    pub fn from_draft(id: i64, draft: &TransactionDraft) -> Self {
        Self {
            id,
            client_id: draft.client_id,
            amount: draft.amount,
            kind: draft.kind.clone(),
            date: draft.date.clone(),
            category: draft.category.clone(),
            location: draft.location.clone(),
        }
    }

    pub fn to_draft(&self) -> TransactionDraft {
        TransactionDraft {
            client_id: self.client_id,
            amount: self.amount,
            kind: self.kind.clone(),
            date: self.date.clone(),
            category: self.category.clone(),
            location: self.location.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    pub active: Option<bool>,
    pub premium: Option<bool>,
    /// Case-insensitive substring of the client name.
    pub name: Option<String>,
}

impl ClientFilter {
    pub fn matches(&self, client: &Client) -> bool {
        if self.active.is_some_and(|a| a != client.active) {
            return false;
        }
        if self.premium.is_some_and(|p| p != client.premium) {
            return false;
        }
        if let Some(name) = &self.name {
            if !client.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub client_id: Option<i64>,
    pub kind: Option<String>,
}

impl TransactionFilter {
    pub fn for_client(client_id: i64) -> Self {
        Self {
            client_id: Some(client_id),
            kind: None,
        }
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        if self.client_id.is_some_and(|id| id != txn.client_id) {
            return false;
        }
        if let Some(kind) = &self.kind {
            if !txn.kind.eq_ignore_ascii_case(kind) {
                return false;
            }
        }
        true
    }
}

/// Rows removed by a client delete, including the cascaded transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Removed {
    pub clients: usize,
    pub transactions: usize,
}

/// Default client order: name ascending, then id.
pub fn sort_clients(clients: &mut [Client]) {
    clients.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
}

/// Default transaction order: newest date first, then highest id.
pub fn sort_transactions(txns: &mut [Transaction]) {
    txns.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}
