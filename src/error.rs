use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultixError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown client: {0}")]
    UnknownClient(i64),

    #[error("No {0} with ID {1}")]
    NotFound(&'static str, i64),

    #[error("A {0} with ID {1} already exists")]
    DuplicateId(&'static str, i64),

    #[error("No {0} IDs left")]
    IdsExhausted(&'static str),

    #[error("Cannot write to {0}")]
    NotWritable(String),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, VaultixError>;
