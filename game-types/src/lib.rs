pub mod errors;
pub mod game;
pub mod locale;
pub mod stats;
pub mod time;

// Re-export all types
pub use errors::*;
pub use game::*;
pub use locale::*;
pub use stats::*;
pub use time::*;
