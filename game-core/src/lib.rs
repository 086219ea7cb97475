pub mod clock;
pub mod error;
pub mod evaluation;
pub mod game_events;
pub mod game_state;
pub mod rollover;
pub mod stats;
pub mod word_catalog;

// Re-export main components
pub use clock::*;
pub use error::*;
pub use evaluation::*;
pub use game_events::*;
pub use game_state::*;
pub use rollover::*;
pub use stats::*;
pub use word_catalog::*;
