use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use game_persistence::{GameStorage, RowsRecord};
use game_types::{
    AggregateStats, ElapsedTime, EvaluatedRow, GameError, GameOutcome, GamePhase, GameResult,
    GuessRow, Locale, MAX_ATTEMPTS, RowClassification, SessionState, Verdict, WORD_LENGTH,
};
use tracing::{debug, info, warn};

use crate::{
    AnswerEntry, Clock, EngineError, Evaluator, GameEvent, GameEventBus, GameEventHandler,
    RecordAge, StatsAggregator, WordLibrary, normalize_word, puzzle_number, record_age,
};

/// Time between finishing a game and revealing its outcome
pub const REVEAL_DELAY: Duration = Duration::from_millis(1000);

const FULL_ROW_COLUMN: u8 = WORD_LENGTH as u8 + 1;

/// What a call to `submit_row` did
#[derive(Debug, Clone, PartialEq)]
pub enum RowSubmission {
    /// Row not full, or the game is already over
    Ignored,
    /// Row cleared, no attempt used
    Rejected(GameError),
    /// Row evaluated, play continues on the next row
    Accepted(Vec<Verdict>),
    /// Row evaluated and the game is over. The reveal is pending.
    Finished(GameOutcome),
}

#[derive(Debug, Clone)]
struct PendingReveal {
    due: DateTime<FixedOffset>,
    outcome: GameOutcome,
}

/// Pick the locale to start in: an explicit request, then the stored
/// preference, then the default. The choice is stored for next time.
pub fn resolve_initial_locale(storage: &mut GameStorage, requested: Option<Locale>) -> Locale {
    let locale = requested
        .or_else(|| storage.locale_preference())
        .unwrap_or_default();

    if let Err(e) = storage.set_locale_preference(locale) {
        warn!("Failed to store locale preference: {}", e);
    }
    locale
}

/// A single player's daily game for one locale at a time.
///
/// The session owns the board cursor, the replayed rows and the keyboard
/// state. Every change is published on the event bus; storage failures are
/// logged and never stop play.
pub struct GameSession {
    locale: Locale,
    state: SessionState,
    rows: Vec<EvaluatedRow>,
    keyboard: BTreeMap<char, Verdict>,
    words: WordLibrary,
    storage: GameStorage,
    clock: Arc<dyn Clock>,
    events: GameEventBus,
    stats: StatsAggregator,
    outcome: Option<GameOutcome>,
    pending_reveal: Option<PendingReveal>,
    replayed: bool,
}

impl GameSession {
    pub fn new(
        requested: Option<Locale>,
        words: WordLibrary,
        mut storage: GameStorage,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let locale = resolve_initial_locale(&mut storage, requested);
        let stats = StatsAggregator::new(storage.load_stats(locale));

        Self {
            locale,
            state: SessionState::new(),
            rows: Vec::new(),
            keyboard: BTreeMap::new(),
            words,
            storage,
            clock,
            events: GameEventBus::new(),
            stats,
            outcome: None,
            pending_reveal: None,
            replayed: false,
        }
    }

    pub fn add_handler(&mut self, handler: Box<dyn GameEventHandler>) {
        self.events.add_handler(handler);
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn rows(&self) -> &[EvaluatedRow] {
        &self.rows
    }

    pub fn keyboard(&self) -> &BTreeMap<char, Verdict> {
        &self.keyboard
    }

    pub fn stats(&self) -> &AggregateStats {
        self.stats.stats()
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_finalized(&self) -> bool {
        self.state.phase.is_finalized()
    }

    /// Elapsed time of today's finished game, `00:00:00` when there is none
    pub fn today_time(&self) -> ElapsedTime {
        self.storage
            .today_time(self.locale)
            .unwrap_or(ElapsedTime::ZERO)
    }

    /// Drop yesterday's record, then replay whatever is left
    pub fn start(&mut self) {
        self.invalidate_if_stale();
        self.resume();
    }

    /// Install word lists for a locale. Replays the saved game if it was
    /// waiting on these lists; letters typed meanwhile are kept when there is
    /// no saved game.
    pub fn install_word_lists(
        &mut self,
        locale: Locale,
        answers: Vec<AnswerEntry>,
        dictionary: Vec<String>,
    ) {
        let catalog = self.words.catalog_mut(locale);
        catalog.install_answers(answers);
        catalog.install_dictionary(dictionary);

        if locale != self.locale || self.replayed {
            return;
        }

        let saved = match self.storage.load_rows(locale) {
            RowsRecord::Missing => false,
            RowsRecord::Present(rows) => !rows.is_empty(),
            RowsRecord::Malformed(_) => true,
        };
        if !saved {
            debug!("Word lists for {} arrived with no saved game", locale);
            self.replayed = self.words.is_loaded(locale);
            return;
        }
        self.resume();
    }

    pub fn submit_letter(&mut self, ch: char) {
        if self.state.phase != GamePhase::Entering || !ch.is_alphabetic() {
            return;
        }

        let mut upper = ch.to_uppercase();
        let letter = match (upper.next(), upper.next()) {
            (Some(single), None) => single,
            _ => ch,
        };

        if self.state.current_row == 1
            && self.state.current_column == 1
            && self.storage.session_start(self.locale).is_none()
        {
            let now = self.clock.now().with_timezone(&Utc);
            debug!("Starting session timer for {} at {}", self.locale, now);
            if let Err(e) = self.storage.set_session_start(self.locale, now) {
                warn!("Failed to store session start: {}", e);
            }
        }

        if self.state.current_column == 3 && !self.words.is_loaded(self.locale) {
            self.events.publish(GameEvent::PrefetchRequested {
                locale: self.locale,
            });
        }

        let (row, column) = (self.state.current_row, self.state.current_column);
        self.state.current_word.push(letter);
        self.state.current_column += 1;
        if self.state.current_column == FULL_ROW_COLUMN {
            self.state.phase = GamePhase::RowFull;
        }

        self.events.publish(GameEvent::CellContent {
            row,
            column,
            letter: Some(letter),
        });
    }

    pub fn delete_letter(&mut self) {
        if self.is_finalized() || self.state.current_column == 1 {
            return;
        }

        self.state.current_column -= 1;
        self.state.current_word.pop();
        self.state.phase = GamePhase::Entering;

        self.events.publish(GameEvent::CellContent {
            row: self.state.current_row,
            column: self.state.current_column,
            letter: None,
        });
    }

    pub fn submit_row(&mut self) -> RowSubmission {
        if self.is_finalized() || self.state.current_word.chars().count() != WORD_LENGTH {
            return RowSubmission::Ignored;
        }

        // A row typed before midnight must not land in yesterday's record
        if self.invalidate_if_stale() {
            return self.reject_row(GameError::StaleOrMissingData {
                reason: "a new day started before the row was submitted".to_string(),
            });
        }

        let word = std::mem::take(&mut self.state.current_word);
        match self.accept_row(word) {
            Ok(submission) => submission,
            Err(EngineError::Game(reason)) => self.reject_row(reason),
            Err(e) => {
                warn!("Row {} could not be played: {}", self.state.current_row, e);
                self.reject_row(GameError::InvalidInput {
                    reason: e.to_string(),
                })
            }
        }
    }

    fn accept_row(&mut self, word: String) -> Result<RowSubmission, EngineError> {
        let today = self.today();
        let catalog = self.words.catalog_mut(self.locale);
        let target = if catalog.is_loaded() {
            catalog.target_for(today).map(|target| target.word.clone())
        } else {
            None
        };
        let Some(target) = target else {
            self.events.publish(GameEvent::PrefetchRequested {
                locale: self.locale,
            });
            return Err(GameError::ResourceUnavailable {
                locale: self.locale,
            }
            .into());
        };

        let classification = if word == target {
            RowClassification::Correct
        } else if !catalog.is_valid_guess(&word) {
            RowClassification::Invalid
        } else {
            RowClassification::Next
        };
        debug!("Row {} '{}' classified as {:?}", self.state.current_row, word, classification);

        if classification == RowClassification::Invalid {
            return Err(GameError::RejectedGuess { word }.into());
        }

        let verdicts = Evaluator::evaluate(&word, &target).map_err(GameError::from)?;
        let row = self.state.current_row;
        self.apply_row(row, &word, &verdicts);

        let stored = GuessRow {
            word,
            row,
            date: self
                .clock
                .now()
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        if let Err(e) = self.storage.append_row(self.locale, stored) {
            warn!("Failed to save row {}: {}", row, e);
        }

        if classification == RowClassification::Correct {
            return Ok(RowSubmission::Finished(self.finalize(GameResult::Won)));
        }
        if self.state.current_attempt >= MAX_ATTEMPTS {
            return Ok(RowSubmission::Finished(self.finalize(GameResult::Lost)));
        }

        self.state.current_row += 1;
        self.state.current_attempt += 1;
        self.state.current_column = 1;
        self.state.phase = GamePhase::Entering;
        Ok(RowSubmission::Accepted(verdicts))
    }

    fn reject_row(&mut self, reason: GameError) -> RowSubmission {
        let row = self.state.current_row;
        info!("Rejected row {} for {}: {}", row, self.locale, reason);

        for column in 1..FULL_ROW_COLUMN {
            self.events.publish(GameEvent::CellContent {
                row,
                column,
                letter: None,
            });
        }
        self.state.current_word.clear();
        self.state.current_column = 1;
        self.state.phase = GamePhase::Entering;

        self.events.publish(GameEvent::GuessRejected {
            row,
            reason: reason.clone(),
        });
        RowSubmission::Rejected(reason)
    }

    /// Record the finished game: timers, stats and the deferred reveal. Runs
    /// once per game because every caller is gated on a non-final phase.
    fn finalize(&mut self, result: GameResult) -> GameOutcome {
        let now = self.clock.now();
        let elapsed = self.storage.session_start(self.locale).map(|start| {
            ElapsedTime::from_secs(u64::try_from((now - start).num_seconds()).unwrap_or(0))
        });

        let points = match result {
            GameResult::Won => MAX_ATTEMPTS + 1 - self.state.current_attempt,
            GameResult::Lost => {
                self.state.current_attempt = MAX_ATTEMPTS + 1;
                0
            }
        };
        self.state.phase = match result {
            GameResult::Won => GamePhase::Won,
            GameResult::Lost => GamePhase::Lost,
        };

        self.stats.record_outcome(points, elapsed);
        if let Err(e) = self.save_finished_game(elapsed) {
            warn!("Failed to store finished game for {}: {}", self.locale, e);
        }

        let outcome = self.build_outcome(result, points, elapsed);
        info!(
            "Game over for {}: {:?} on attempt {} with {} points",
            self.locale, result, outcome.tries, points
        );

        self.events.publish(GameEvent::GameFinalized {
            outcome: outcome.clone(),
        });
        self.pending_reveal = Some(PendingReveal {
            due: now + chrono::Duration::milliseconds(REVEAL_DELAY.as_millis() as i64),
            outcome: outcome.clone(),
        });
        self.outcome = Some(outcome.clone());
        outcome
    }

    fn save_finished_game(&mut self, elapsed: Option<ElapsedTime>) -> Result<(), EngineError> {
        self.storage.clear_session_start(self.locale)?;
        if let Some(elapsed) = elapsed {
            self.storage.set_today_time(self.locale, elapsed)?;
        }
        self.storage.save_stats(self.locale, self.stats.stats())?;
        Ok(())
    }

    fn build_outcome(
        &mut self,
        result: GameResult,
        points: u8,
        elapsed: Option<ElapsedTime>,
    ) -> GameOutcome {
        let today = self.today();
        let answer = self
            .words
            .catalog_mut(self.locale)
            .target_for(today)
            .map(|target| target.display.clone())
            .unwrap_or_default();

        GameOutcome {
            locale: self.locale,
            result,
            points,
            tries: self.state.current_attempt,
            elapsed,
            answer,
            puzzle_number: puzzle_number(today),
            stats: self.stats.stats().clone(),
        }
    }

    /// When the pending reveal is due, if there is one
    pub fn next_reveal_due(&self) -> Option<DateTime<FixedOffset>> {
        self.pending_reveal.as_ref().map(|pending| pending.due)
    }

    /// Reveal the outcome once its delay has passed. Returns it when fired.
    pub fn fire_due_reveal(&mut self) -> Option<GameOutcome> {
        let due = self.next_reveal_due()?;
        if self.clock.now() < due {
            return None;
        }

        let pending = self.pending_reveal.take()?;
        self.events.publish(GameEvent::OutcomeRevealed {
            outcome: pending.outcome.clone(),
        });
        Some(pending.outcome)
    }

    /// Rebuild today's board from the stored rows.
    ///
    /// Waits (and asks for a prefetch) when the locale's word lists are not
    /// loaded. A finished game is revealed straight away without touching
    /// the stats again.
    pub fn resume(&mut self) {
        self.reset_board();

        if !self.words.is_loaded(self.locale) {
            debug!("Word lists for {} not loaded, deferring replay", self.locale);
            self.events.publish(GameEvent::PrefetchRequested {
                locale: self.locale,
            });
            return;
        }
        self.replayed = true;

        let rows = match self.storage.load_rows(self.locale) {
            RowsRecord::Missing => return,
            RowsRecord::Present(rows) if rows.is_empty() => return,
            RowsRecord::Present(rows) => rows,
            RowsRecord::Malformed(reason) => {
                self.discard_record(&reason);
                return;
            }
        };

        let today = self.today();
        let Some(target) = self
            .words
            .catalog_mut(self.locale)
            .target_for(today)
            .map(|target| target.word.clone())
        else {
            return;
        };

        if let Err(reason) = check_record(&rows, &target) {
            self.discard_record(&reason);
            return;
        }

        let mut evaluated = Vec::with_capacity(rows.len());
        for stored in &rows {
            let word = normalize_word(&stored.word);
            match Evaluator::evaluate(&word, &target) {
                Ok(verdicts) => evaluated.push((stored.row, word, verdicts)),
                Err(e) => {
                    self.discard_record(&e.to_string());
                    return;
                }
            }
        }
        for (row, word, verdicts) in &evaluated {
            self.apply_row(*row, word, verdicts);
        }

        let played = rows.len() as u8;
        let won = evaluated
            .last()
            .is_some_and(|(_, _, verdicts)| Evaluator::is_solved(verdicts));
        info!("Replayed {} rows for {}", played, self.locale);

        self.state.current_row = played;
        self.state.current_attempt = played;
        self.state.current_column = FULL_ROW_COLUMN;

        let result = if won {
            GameResult::Won
        } else if played >= MAX_ATTEMPTS {
            GameResult::Lost
        } else {
            self.state.current_row = played + 1;
            self.state.current_attempt = played + 1;
            self.state.current_column = 1;
            self.state.phase = GamePhase::Entering;
            return;
        };

        let points = match result {
            GameResult::Won => {
                self.state.phase = GamePhase::Won;
                MAX_ATTEMPTS + 1 - played
            }
            GameResult::Lost => {
                self.state.phase = GamePhase::Lost;
                self.state.current_attempt = MAX_ATTEMPTS + 1;
                0
            }
        };

        let elapsed = self.storage.today_time(self.locale);
        let outcome = self.build_outcome(result, points, elapsed);
        self.outcome = Some(outcome.clone());
        self.events.publish(GameEvent::OutcomeRevealed { outcome });
    }

    /// Wipe the stored game when it belongs to an earlier day. Returns true
    /// when something was wiped.
    pub fn invalidate_if_stale(&mut self) -> bool {
        let reference = match self.storage.load_rows(self.locale) {
            RowsRecord::Present(rows) if !rows.is_empty() => Some(rows[0].date.clone()),
            RowsRecord::Malformed(reason) => {
                self.discard_record(&reason);
                self.reset_board();
                return true;
            }
            _ => self.storage.session_start_marker(self.locale),
        };

        match record_age(reference.as_deref(), self.clock.now()) {
            RecordAge::Stale { reason } => {
                self.discard_record(&reason);
                self.words.catalog_mut(self.locale).reset_daily_cache();
                self.reset_board();
                self.replayed = self.words.is_loaded(self.locale);
                true
            }
            RecordAge::Today | RecordAge::Empty => false,
        }
    }

    /// Change the active locale and pick up that locale's saved game
    pub fn switch_locale(&mut self, locale: Locale) {
        if locale == self.locale {
            return;
        }

        info!("Switching locale from {} to {}", self.locale, locale);
        self.locale = locale;
        if let Err(e) = self.storage.set_locale_preference(locale) {
            warn!("Failed to store locale preference: {}", e);
        }
        self.stats = StatsAggregator::new(self.storage.load_stats(locale));
        self.words.catalog_mut(locale).reset_daily_cache();
        self.replayed = false;

        self.events.publish(GameEvent::LocaleChanged { locale });
        self.start();
    }

    fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn discard_record(&mut self, reason: &str) {
        let error = GameError::StaleOrMissingData {
            reason: reason.to_string(),
        };
        warn!("Discarding saved game for {}: {}", self.locale, error);
        if let Err(e) = self.storage.clear_game(self.locale) {
            warn!("Failed to clear saved game for {}: {}", self.locale, e);
        }
    }

    fn reset_board(&mut self) {
        self.state = SessionState::new();
        self.rows.clear();
        self.keyboard.clear();
        self.outcome = None;
        self.pending_reveal = None;
        self.events.publish(GameEvent::BoardCleared);
    }

    /// Paint an evaluated row and fold its letters into the keyboard
    fn apply_row(&mut self, row: u8, word: &str, verdicts: &[Verdict]) {
        for (index, (letter, verdict)) in word.chars().zip(verdicts).enumerate() {
            let column = index as u8 + 1;
            self.events.publish(GameEvent::CellContent {
                row,
                column,
                letter: Some(letter),
            });
            self.events.publish(GameEvent::CellVerdict {
                row,
                column,
                verdict: *verdict,
            });

            let strongest = self
                .keyboard
                .get(&letter)
                .map_or(*verdict, |known| known.strongest(*verdict));
            if self.keyboard.insert(letter, strongest) != Some(strongest) {
                self.events.publish(GameEvent::KeyVerdict {
                    letter,
                    verdict: strongest,
                });
            }
        }

        self.rows.push(EvaluatedRow {
            row,
            word: word.to_string(),
            verdicts: verdicts.to_vec(),
        });
    }
}

/// Reject stored sequences that could not have come from a real game
fn check_record(rows: &[GuessRow], target: &str) -> Result<(), String> {
    if rows.len() > usize::from(MAX_ATTEMPTS) {
        return Err(format!("{} rows stored, at most {} allowed", rows.len(), MAX_ATTEMPTS));
    }

    for (index, stored) in rows.iter().enumerate() {
        let expected = index + 1;
        if usize::from(stored.row) != expected {
            return Err(format!("row {} stored in position {}", stored.row, expected));
        }

        let word = normalize_word(&stored.word);
        if word.chars().count() != WORD_LENGTH {
            return Err(format!("row {} has '{}', not {} letters", stored.row, word, WORD_LENGTH));
        }
        if word == target && expected != rows.len() {
            return Err(format!("row {} already solved the puzzle", stored.row));
        }
    }

    Ok(())
}
