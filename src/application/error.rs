use thiserror::Error;

use crate::domain::{ParseAmountError, RecordId, UserId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("Debt not found: {0}")]
    DebtNotFound(RecordId),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Ledger has no users to split between")]
    NoUsers,

    #[error("User id {0} appears more than once")]
    DuplicateUser(UserId),

    #[error("Record id {0} is used by more than one debt or audit")]
    DuplicateRecordId(RecordId),

    #[error("No debt or audit ids left to issue")]
    RecordIdsExhausted,

    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),

    #[error("Ledger service is no longer running")]
    ServiceUnavailable,
}

impl From<ParseAmountError> for AppError {
    fn from(err: ParseAmountError) -> Self {
        AppError::InvalidAmount(err.to_string())
    }
}
