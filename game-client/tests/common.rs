#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, bail};
use game_client::word_source::{WordFile, WordListFetcher};
use game_types::Locale;
use tempfile::TempDir;

pub const ANSWERS_JSON: &str = r#"{"house": "house", "arbol": "árbol", "tests": "tests"}"#;
pub const DICTIONARY_TEXT: &str = "# accepted guesses\nhouse\nmouse\ntests\narbol\ntoast\n";

/// Empty word directory, removed when dropped
pub fn scratch_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

pub fn write_word_files(root: &Path, locale: Locale, answers: &str, dictionary: &str) {
    let dir = root.join(locale.code());
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("words.json"), answers).unwrap();
    std::fs::write(dir.join("dicc.json"), dictionary).unwrap();
}

/// Serves fixed word lists and counts how often it was asked
#[derive(Clone, Default)]
pub struct CountingFetcher {
    calls: Arc<AtomicUsize>,
    failing: bool,
}

impl CountingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl WordListFetcher for CountingFetcher {
    async fn fetch(&self, locale: Locale, file: WordFile) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            bail!("{} for {} is unavailable", file.file_name(), locale);
        }
        Ok(match file {
            WordFile::Answers => ANSWERS_JSON.to_string(),
            WordFile::Dictionary => DICTIONARY_TEXT.to_string(),
        })
    }
}
