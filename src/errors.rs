use thiserror::Error;

use crate::types::CardId;

#[derive(Error, Debug)]
pub enum TempoError {
    #[error("card not found: {id}")]
    CardNotFound {
        id: CardId,
    },

    #[error("duplicate card id in portfolio: {id}")]
    DuplicateCardId {
        id: CardId,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid reminder offset: {days} days, expected 1 to 14")]
    InvalidReminderOffset {
        days: u32,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TempoError>;
