use thiserror::Error;

/// Everything that can end a session early.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write record: {0}")]
    Csv(#[from] csv::Error),
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error("input closed: {0}")]
    Input(String),
}

pub type Result<T> = std::result::Result<T, Error>;
