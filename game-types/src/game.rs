use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{AggregateStats, ElapsedTime, Locale};

/// Letters per word and cells per row
pub const WORD_LENGTH: usize = 5;

/// Rows on the board, which is also the number of attempts
pub const MAX_ATTEMPTS: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Verdict {
    Correct, // Right letter in the right position
    Present, // Letter is in the word, somewhere else
    Absent,  // Letter not in the word (or already accounted for)
}

impl Verdict {
    fn rank(self) -> u8 {
        match self {
            Verdict::Absent => 0,
            Verdict::Present => 1,
            Verdict::Correct => 2,
        }
    }

    /// Keyboard keys only ever move towards `Correct`
    pub fn strongest(self, other: Verdict) -> Verdict {
        if other.rank() > self.rank() { other } else { self }
    }
}

/// How a full row is treated when the player submits it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RowClassification {
    Correct, // Exact match with the target word
    Invalid, // Not in the accepted word list
    Next,    // Valid word, not the answer
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GamePhase {
    Entering,
    RowFull,
    Won,
    Lost,
}

impl GamePhase {
    pub fn is_finalized(&self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }
}

/// Snapshot of the board cursor owned by the game session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionState {
    pub phase: GamePhase,
    pub current_row: u8,
    pub current_column: u8,
    pub current_word: String,
    pub current_attempt: u8,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Entering,
            current_row: 1,
            current_column: 1,
            current_word: String::new(),
            current_attempt: 1,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// One submitted row as it is stored on the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuessRow {
    pub word: String,
    pub row: u8,
    pub date: String, // ISO 8601 string
}

/// A row after evaluation, as replayed onto the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EvaluatedRow {
    pub row: u8,
    pub word: String,
    pub verdicts: Vec<Verdict>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameResult {
    Won,
    Lost,
}

/// Everything the end-of-game reveal shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GameOutcome {
    pub locale: Locale,
    pub result: GameResult,
    pub points: u8,
    /// Attempt the game ended on, 7 when all attempts were used without a match
    pub tries: u8,
    #[ts(type = "string | null")]
    pub elapsed: Option<ElapsedTime>,
    /// Answer in its display form (accents preserved)
    pub answer: String,
    pub puzzle_number: u32,
    pub stats: AggregateStats,
}
