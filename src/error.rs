use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("keymap file not found: {}", .0.display())]
    MapNotFound(PathBuf),

    #[error("malformed key event {line:?}: expected 5 fields, found {found}")]
    MalformedLine { line: String, found: usize },

    #[error("failed to open serial port {port} at {baud} baud")]
    TransportOpen {
        port: String,
        baud: u32,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("keymap file has no {0:?} column")]
    MissingColumn(&'static str),

    #[error("keymap csv error")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Errors a polling loop reports and then keeps going past.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::MalformedLine { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
