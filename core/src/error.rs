use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FabError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store '{target}' unreachable after {attempts} attempt(s): {source}")]
    StoreUnavailable {
        target:   String,
        attempts: u32,
        #[source]
        source:   rusqlite::Error,
    },

    #[error("Master data missing: table '{table}' is empty")]
    MasterDataMissing { table: &'static str },

    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    #[error("Machine {machine_id} not found")]
    UnknownMachine { machine_id: i64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type FabResult<T> = Result<T, FabError>;
