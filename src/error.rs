use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not load document: {0}")]
    DocumentLoad(String),

    #[error("Unknown layout family: {0}")]
    UnknownLayout(String),

    #[error("Unknown shift: {0}")]
    UnknownShift(i64),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// A per-block problem found during an import. None of these abort the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportIssue {
    /// The block had no recoverable transaction date and was skipped.
    BlockParse { row: usize, message: String },
    /// No amount could be resolved; the transaction was kept and flagged.
    AmbiguousAmount { row: usize, event_type: String },
    /// The time-of-day line was missing; the transaction was kept and flagged.
    MissingTime { row: usize, event_type: String },
    /// The transaction fell outside every shift window.
    NoMatch { row: usize, event_type: String },
}

impl ImportIssue {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::BlockParse { .. })
    }

    pub fn row(&self) -> usize {
        match self {
            Self::BlockParse { row, .. }
            | Self::AmbiguousAmount { row, .. }
            | Self::MissingTime { row, .. }
            | Self::NoMatch { row, .. } => *row,
        }
    }
}

impl std::fmt::Display for ImportIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlockParse { row, message } => write!(f, "row {row}: skipped block ({message})"),
            Self::AmbiguousAmount { row, event_type } => {
                write!(f, "row {row}: no amount found for \"{event_type}\", needs verification")
            }
            Self::MissingTime { row, event_type } => {
                write!(f, "row {row}: no time of day for \"{event_type}\", needs verification")
            }
            Self::NoMatch { row, event_type } => {
                write!(f, "row {row}: \"{event_type}\" matches no shift")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_block_parse_is_error() {
        let parse = ImportIssue::BlockParse { row: 3, message: "bad date".into() };
        let amount = ImportIssue::AmbiguousAmount { row: 4, event_type: "UberX".into() };
        assert!(parse.is_error());
        assert!(!amount.is_error());
        assert_eq!(amount.row(), 4);
    }

    #[test]
    fn test_issue_display() {
        let issue = ImportIssue::NoMatch { row: 7, event_type: "Tip".into() };
        assert_eq!(issue.to_string(), "row 7: \"Tip\" matches no shift");
    }
}
