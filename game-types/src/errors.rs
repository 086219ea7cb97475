use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::Locale;

/// Player-facing failure taxonomy. None of these end the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, thiserror::Error)]
#[ts(export)]
pub enum GameError {
    #[error("'{word}' is not in the word list")]
    RejectedGuess { word: String },
    #[error("word lists for '{locale}' are not loaded yet")]
    ResourceUnavailable { locale: Locale },
    #[error("saved game discarded: {reason}")]
    StaleOrMissingData { reason: String },
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}
