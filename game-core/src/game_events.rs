use game_types::{GameError, GameOutcome, Locale, Verdict};
use serde::Serialize;

/// Everything the session tells the outside world. Rendering collaborators
/// subscribe through the bus and never read session state back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    /// A cell's letter changed. `None` clears it.
    CellContent {
        row: u8,
        column: u8,
        letter: Option<char>,
    },
    CellVerdict {
        row: u8,
        column: u8,
        verdict: Verdict,
    },
    KeyVerdict {
        letter: char,
        verdict: Verdict,
    },
    GuessRejected {
        row: u8,
        reason: GameError,
    },
    /// Word lists for the locale are wanted soon
    PrefetchRequested {
        locale: Locale,
    },
    /// Stats were recorded; the reveal follows after the delay
    GameFinalized {
        outcome: GameOutcome,
    },
    OutcomeRevealed {
        outcome: GameOutcome,
    },
    BoardCleared,
    LocaleChanged {
        locale: Locale,
    },
}

/// Event handler trait for processing game events
pub trait GameEventHandler {
    fn handle_event(&mut self, event: GameEvent);
}

/// Simple event bus for distributing game events
pub struct GameEventBus {
    handlers: Vec<Box<dyn GameEventHandler>>,
}

impl GameEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Box<dyn GameEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn publish(&mut self, event: GameEvent) {
        for handler in &mut self.handlers {
            handler.handle_event(event.clone());
        }
    }
}

impl Default for GameEventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Drawing surface for the board and keyboard
pub trait BoardRenderer {
    fn set_cell_content(&mut self, row: u8, column: u8, letter: Option<char>);
    fn set_cell_verdict(&mut self, row: u8, column: u8, verdict: Verdict);
    fn set_key_verdict(&mut self, letter: char, verdict: Verdict);
    fn reveal_outcome(&mut self, outcome: &GameOutcome);
    fn show_rejection(&mut self, row: u8, reason: &GameError);
    fn clear_board(&mut self);
}

/// Adapts a `BoardRenderer` to the event bus
pub struct RenderingHandler<R> {
    renderer: R,
}

impl<R: BoardRenderer> RenderingHandler<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

impl<R: BoardRenderer> GameEventHandler for RenderingHandler<R> {
    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::CellContent { row, column, letter } => {
                self.renderer.set_cell_content(row, column, letter)
            }
            GameEvent::CellVerdict {
                row,
                column,
                verdict,
            } => self.renderer.set_cell_verdict(row, column, verdict),
            GameEvent::KeyVerdict { letter, verdict } => {
                self.renderer.set_key_verdict(letter, verdict)
            }
            GameEvent::GuessRejected { row, reason } => self.renderer.show_rejection(row, &reason),
            GameEvent::OutcomeRevealed { outcome } => self.renderer.reveal_outcome(&outcome),
            GameEvent::BoardCleared => self.renderer.clear_board(),
            GameEvent::PrefetchRequested { .. }
            | GameEvent::GameFinalized { .. }
            | GameEvent::LocaleChanged { .. } => {}
        }
    }
}
