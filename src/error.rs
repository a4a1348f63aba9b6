use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while persisting or reloading the transaction store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },

    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Rejected console input. The store is never touched when one of these is raised.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("invalid transaction type '{0}'")]
    InvalidKind(String),

    #[error("invalid date '{0}'")]
    InvalidDate(String),
}
