use thiserror::Error;

/// Errors produced while classifying actions or decomposing transactions.
///
/// All of these are scoped to the single action or transaction that
/// produced them: the batch loops catch them, log, and continue with the
/// remaining input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The indexer's address book is expected to cover every referenced
    /// address; a miss indicates a caller bug and fails only the action
    /// that referenced it.
    #[error("Address not found in address book: {0}")] UnknownAddress(String),

    #[error("Invalid address: {0}")] InvalidAddress(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
