//! Domain error types.

/// Top-level error type for eqindex.
#[derive(Debug, thiserror::Error)]
pub enum EqindexError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    /// Malformed date string handed to a store query. Fails loudly rather
    /// than producing an empty result set.
    #[error("invalid date {input:?} (expected YYYY-MM-DD)")]
    InvalidDate { input: String },

    #[error("fetch failed for {ticker}: {reason}")]
    Fetch { ticker: String, reason: String },

    #[error("export failed: {reason}")]
    Export { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&EqindexError> for std::process::ExitCode {
    fn from(err: &EqindexError) -> Self {
        let code: u8 = match err {
            EqindexError::Io(_) => 1,
            EqindexError::ConfigParse { .. }
            | EqindexError::ConfigMissing { .. }
            | EqindexError::ConfigInvalid { .. } => 2,
            EqindexError::Database { .. } | EqindexError::DatabaseQuery { .. } => 3,
            EqindexError::InvalidDate { .. } => 4,
            EqindexError::Fetch { .. } => 5,
            EqindexError::Export { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
