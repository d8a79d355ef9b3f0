/// Ledger lookups and insertions
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The ledger holds no record for this cell
    #[error("no calculation record for compound '{compound}' and sample '{sample}'")]
    NotFound {
        /// Requested compound
        compound: String,
        /// Requested sample
        sample: String,
    },

    /// A record for this cell already exists; records are never replaced
    #[error("calculation record for compound '{compound}' and sample '{sample}' already exists")]
    Duplicate {
        /// Compound of the rejected record
        compound: String,
        /// Sample of the rejected record
        sample: String,
    },

    /// JSON export failed
    #[error("failed to serialise ledger: {0}")]
    Json(#[from] serde_json::Error),
}
