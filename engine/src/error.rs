use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// File unreadable under every attempted reader. Fatal to the
    /// ingestion attempt; no partial table is ever returned.
    #[error("corrupt or unreadable file: {0}")]
    Corrupt(String),

    #[error("unsupported file type '{0}': expected a .csv or .xlsx file")]
    UnsupportedExtension(String),

    /// The schema resolved, but required fields are still missing. Carries
    /// the column names that were available so the user can remap manually.
    #[error("missing required columns: {} (available: {})", .missing.join(", "), .available.join(", "))]
    MissingRequiredColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
