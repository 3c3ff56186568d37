//! Error types for the order log

use std::path::PathBuf;

/// Order log error type
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Spreadsheet write error: {0}")]
    Encode(#[from] rust_xlsxwriter::XlsxError),

    #[error("Spreadsheet read error: {0}")]
    Decode(#[from] calamine::XlsxError),

    #[error("Spreadsheet has no worksheet: {0}")]
    NoWorksheet(String),

    #[error("Spreadsheet too large: {0} rows")]
    TooManyRows(usize),
}

/// Result type alias for order log operations
pub type Result<T> = std::result::Result<T, LogError>;

impl LogError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LogError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = LogError::io(
            "/var/x/rendelesek_2025-01-01.xlsx",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("rendelesek_2025-01-01.xlsx"));
        assert!(msg.contains("denied"));
    }
}
