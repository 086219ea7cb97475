#![allow(dead_code)]

use chrono::{DateTime, FixedOffset};
use game_core::{
    BoardRenderer, GameEvent, GameEventHandler, GameSession, ManualClock, RenderingHandler,
    RowSubmission, WordCatalog, WordLibrary,
};
use game_persistence::{GameStorage, MemoryStore};
use game_types::{GameError, GameOutcome, GuessRow, Locale, Verdict};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Day 2 after launch: TESTS in Spanish, HOUSE in English
pub const TODAY: &str = "2025-07-20T10:00:00+00:00";
pub const TODAY_MORNING: &str = "2025-07-20T08:00:00.000Z";
pub const YESTERDAY: &str = "2025-07-19T21:30:00.000Z";

pub const DICTIONARY: &[&str] = &[
    "tests", "house", "mouse", "toast", "steel", "steee", "ottoo", "ootto", "hello", "world",
    "water", "stone", "bread", "cream", "train", "plane", "llama", "helos",
];

pub fn at(timestamp: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(timestamp).unwrap()
}

pub fn spanish_catalog() -> WordCatalog {
    WordCatalog::with_words(Locale::Es, &["house", "mouse", "tests"], DICTIONARY)
}

pub fn english_catalog() -> WordCatalog {
    WordCatalog::with_words(Locale::En, &["tests", "mouse", "house"], DICTIONARY)
}

/// Both locales loaded
pub fn create_test_library() -> WordLibrary {
    WordLibrary::new()
        .with_catalog(spanish_catalog())
        .with_catalog(english_catalog())
}

/// Event collector for testing event emissions
#[derive(Clone, Default)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<GameEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_events(&self) -> Vec<GameEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn has_event_type(&self, check_fn: impl Fn(&GameEvent) -> bool) -> bool {
        self.events.lock().unwrap().iter().any(check_fn)
    }

    pub fn count_matching(&self, check_fn: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| check_fn(e)).count()
    }
}

impl GameEventHandler for EventCollector {
    fn handle_event(&mut self, event: GameEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Debug, Default)]
pub struct BoardState {
    pub cells: BTreeMap<(u8, u8), char>,
    pub verdicts: BTreeMap<(u8, u8), Verdict>,
    pub keys: BTreeMap<char, Verdict>,
    pub revealed: Vec<GameOutcome>,
    pub rejections: Vec<(u8, GameError)>,
}

/// What a player would see, rebuilt from renderer calls only
#[derive(Clone, Default)]
pub struct BoardMirror {
    state: Arc<Mutex<BoardState>>,
}

impl BoardMirror {
    pub fn row_text(&self, row: u8) -> String {
        let state = self.state.lock().unwrap();
        (1..=5)
            .filter_map(|column| state.cells.get(&(row, column)))
            .collect()
    }

    pub fn row_verdicts(&self, row: u8) -> Vec<Verdict> {
        let state = self.state.lock().unwrap();
        (1..=5)
            .filter_map(|column| state.verdicts.get(&(row, column)).copied())
            .collect()
    }

    pub fn key(&self, letter: char) -> Option<Verdict> {
        self.state.lock().unwrap().keys.get(&letter).copied()
    }

    pub fn revealed(&self) -> Vec<GameOutcome> {
        self.state.lock().unwrap().revealed.clone()
    }

    pub fn rejections(&self) -> Vec<(u8, GameError)> {
        self.state.lock().unwrap().rejections.clone()
    }

    pub fn is_blank(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.cells.is_empty() && state.verdicts.is_empty() && state.keys.is_empty()
    }
}

impl BoardRenderer for BoardMirror {
    fn set_cell_content(&mut self, row: u8, column: u8, letter: Option<char>) {
        let mut state = self.state.lock().unwrap();
        match letter {
            Some(letter) => state.cells.insert((row, column), letter),
            None => state.cells.remove(&(row, column)),
        };
    }

    fn set_cell_verdict(&mut self, row: u8, column: u8, verdict: Verdict) {
        self.state
            .lock()
            .unwrap()
            .verdicts
            .insert((row, column), verdict);
    }

    fn set_key_verdict(&mut self, letter: char, verdict: Verdict) {
        self.state.lock().unwrap().keys.insert(letter, verdict);
    }

    fn reveal_outcome(&mut self, outcome: &GameOutcome) {
        self.state.lock().unwrap().revealed.push(outcome.clone());
    }

    fn show_rejection(&mut self, row: u8, reason: &GameError) {
        self.state
            .lock()
            .unwrap()
            .rejections
            .push((row, reason.clone()));
    }

    fn clear_board(&mut self) {
        *self.state.lock().unwrap() = BoardState::default();
    }
}

/// A session plus handles on everything around it
pub struct TestGame {
    pub session: GameSession,
    pub clock: ManualClock,
    pub store: MemoryStore,
    pub events: EventCollector,
    pub board: BoardMirror,
}

impl TestGame {
    pub fn type_word(&mut self, word: &str) {
        for letter in word.chars() {
            self.session.submit_letter(letter);
        }
    }

    pub fn play(&mut self, word: &str) -> RowSubmission {
        self.type_word(word);
        self.session.submit_row()
    }

    /// Open a new session on the same store and clock, as a reload would
    pub fn reload(self) -> TestGame {
        create_game_with(self.store, self.clock, create_test_library(), None)
    }
}

pub fn create_game_with(
    store: MemoryStore,
    clock: ManualClock,
    library: WordLibrary,
    locale: Option<Locale>,
) -> TestGame {
    let storage = GameStorage::new(Box::new(store.clone()));
    let mut session = GameSession::new(locale, library, storage, Arc::new(clock.clone()));

    let events = EventCollector::new();
    let board = BoardMirror::default();
    session.add_handler(Box::new(events.clone()));
    session.add_handler(Box::new(RenderingHandler::new(board.clone())));
    session.start();

    TestGame {
        session,
        clock,
        store,
        events,
        board,
    }
}

/// Fresh Spanish game on an empty store, target TESTS
pub fn create_test_game() -> TestGame {
    create_game_with(
        MemoryStore::new(),
        ManualClock::new(at(TODAY)),
        create_test_library(),
        Some(Locale::Es),
    )
}

/// Spanish game opened on a store that already holds `rows`
pub fn create_game_with_rows(rows: &[GuessRow]) -> TestGame {
    let store = MemoryStore::new();
    seed_rows(&store, Locale::Es, rows);
    create_game_with(
        store,
        ManualClock::new(at(TODAY)),
        create_test_library(),
        Some(Locale::Es),
    )
}

pub fn stored_row(word: &str, row: u8, date: &str) -> GuessRow {
    GuessRow {
        word: word.to_string(),
        row,
        date: date.to_string(),
    }
}

pub fn seed_rows(store: &MemoryStore, locale: Locale, rows: &[GuessRow]) {
    store.set_raw(
        &format!("wardle_{}_gamedata", locale.code()),
        serde_json::to_string(rows).unwrap(),
    );
}

pub fn stored_rows(store: &MemoryStore, locale: Locale) -> Vec<GuessRow> {
    store
        .get_raw(&format!("wardle_{}_gamedata", locale.code()))
        .map(|raw| serde_json::from_str(&raw).unwrap())
        .unwrap_or_default()
}

pub fn is_finished(submission: &RowSubmission) -> bool {
    matches!(submission, RowSubmission::Finished(_))
}
