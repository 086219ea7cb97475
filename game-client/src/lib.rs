pub mod config;
pub mod input;
pub mod terminal;
pub mod word_source;
