use game_persistence::StorageError;
use game_types::GameError;

use crate::EvaluationError;

/// Failures inside the engine. Only `Game` ever reaches the player.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl From<EvaluationError> for GameError {
    fn from(error: EvaluationError) -> Self {
        GameError::InvalidInput {
            reason: error.to_string(),
        }
    }
}
