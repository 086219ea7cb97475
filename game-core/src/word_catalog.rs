use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use game_types::{Locale, WORD_LENGTH};
use serde_json::Value;
use tracing::{debug, info, warn};

/// 2025-07-18, the day puzzle #0 was published, counted from the common era
const START_DAY_FROM_CE: i32 = 739_450;

/// Whole days between the first puzzle and `date`. Negative before launch.
pub fn days_since_start(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce() - START_DAY_FROM_CE)
}

/// Puzzle number shown to players, never negative
pub fn puzzle_number(date: NaiveDate) -> u32 {
    u32::try_from(days_since_start(date).max(0)).unwrap_or(u32::MAX)
}

pub fn normalize_word(word: &str) -> String {
    word.trim().to_uppercase()
}

fn has_word_length(word: &str) -> bool {
    word.chars().count() == WORD_LENGTH
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("word list is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported word list shape, expected a JSON object or array")]
    UnsupportedShape,
}

/// A possible daily answer: the key players type and the form shown on reveal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerEntry {
    pub word: String,
    pub display: String,
}

impl AnswerEntry {
    pub fn new(word: &str, display: &str) -> Self {
        Self {
            word: normalize_word(word),
            display: normalize_word(display),
        }
    }
}

/// Parse the ordered answer list. Accepts `{"casa": "casa", "arbol": "árbol"}`
/// (key order is the puzzle order) or a plain array of words.
pub fn parse_answers(json: &str) -> Result<Vec<AnswerEntry>, CatalogError> {
    let entries: Vec<AnswerEntry> = match serde_json::from_str::<Value>(json)? {
        Value::Object(map) => map
            .iter()
            .map(|(word, display)| AnswerEntry::new(word, display.as_str().unwrap_or(word)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|word| AnswerEntry::new(word, word))
            .collect(),
        _ => return Err(CatalogError::UnsupportedShape),
    };

    let total = entries.len();
    let answers: Vec<AnswerEntry> = entries
        .into_iter()
        .filter(|entry| has_word_length(&entry.word))
        .collect();

    if answers.len() != total {
        warn!(
            "Skipped {} answers that are not {} letters long",
            total - answers.len(),
            WORD_LENGTH
        );
    }

    Ok(answers)
}

/// Parse the accepted-guess dictionary, either a JSON array or one word per
/// line with `#` comments
pub fn parse_dictionary(content: &str) -> Result<Vec<String>, CatalogError> {
    let words: Vec<String> = if content.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<String>>(content)?
            .iter()
            .map(|word| normalize_word(word))
            .collect()
    } else {
        content
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
            .map(normalize_word)
            .collect()
    };

    Ok(words.into_iter().filter(|word| has_word_length(word)).collect())
}

/// Answer list and guess dictionary for one locale
#[derive(Debug, Clone)]
pub struct WordCatalog {
    locale: Locale,
    dictionary: Option<HashSet<String>>,
    answers: Option<Vec<AnswerEntry>>,
    daily: Option<(NaiveDate, usize)>,
}

impl WordCatalog {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            dictionary: None,
            answers: None,
            daily: None,
        }
    }

    /// Build a fully loaded catalog, mostly useful for tests and fixtures
    pub fn with_words(locale: Locale, answers: &[&str], dictionary: &[&str]) -> Self {
        let mut catalog = Self::new(locale);
        catalog.install_answers(answers.iter().map(|word| AnswerEntry::new(word, word)).collect());
        catalog.install_dictionary(dictionary.iter().map(|word| word.to_string()).collect());
        catalog
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn install_dictionary(&mut self, words: Vec<String>) {
        let dictionary: HashSet<String> = words
            .iter()
            .map(|word| normalize_word(word))
            .filter(|word| has_word_length(word))
            .collect();

        info!("Installed {} dictionary words for {}", dictionary.len(), self.locale);
        self.dictionary = Some(dictionary);
    }

    pub fn install_answers(&mut self, answers: Vec<AnswerEntry>) {
        info!("Installed {} answers for {}", answers.len(), self.locale);
        self.answers = Some(answers);
        self.daily = None;
    }

    pub fn has_dictionary(&self) -> bool {
        self.dictionary.is_some()
    }

    pub fn has_answers(&self) -> bool {
        self.answers.is_some()
    }

    pub fn is_loaded(&self) -> bool {
        self.has_dictionary() && self.has_answers()
    }

    /// Membership test for guesses. Always false until the dictionary has
    /// been installed, so nothing is validated against a partial list.
    pub fn is_valid_guess(&self, word: &str) -> bool {
        match &self.dictionary {
            Some(dictionary) => dictionary.contains(&normalize_word(word)),
            None => {
                debug!("Dictionary not loaded for {}, rejecting '{}'", self.locale, word);
                false
            }
        }
    }

    pub fn answer_count(&self) -> usize {
        self.answers.as_ref().map_or(0, Vec::len)
    }

    /// Index of the answer for `date`. Dates before launch and unloaded lists
    /// both map to index 0.
    pub fn word_index(&self, date: NaiveDate) -> usize {
        let days = days_since_start(date);
        if days < 0 {
            return 0;
        }

        let len = self.answer_count().max(1) as i64;
        usize::try_from(days % len).unwrap_or(0)
    }

    /// Today's answer, cached per date until the answers change or the cache
    /// is reset
    pub fn target_for(&mut self, date: NaiveDate) -> Option<&AnswerEntry> {
        let index = match self.daily {
            Some((cached_date, index)) if cached_date == date => index,
            _ => {
                let index = self.word_index(date);
                self.daily = Some((date, index));
                index
            }
        };

        self.answers.as_ref()?.get(index)
    }

    pub fn reset_daily_cache(&mut self) {
        self.daily = None;
    }
}

/// One catalog per locale, created on first use
#[derive(Debug, Clone, Default)]
pub struct WordLibrary {
    catalogs: HashMap<Locale, WordCatalog>,
}

impl WordLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, catalog: WordCatalog) -> Self {
        self.catalogs.insert(catalog.locale(), catalog);
        self
    }

    pub fn catalog(&self, locale: Locale) -> Option<&WordCatalog> {
        self.catalogs.get(&locale)
    }

    pub fn catalog_mut(&mut self, locale: Locale) -> &mut WordCatalog {
        self.catalogs
            .entry(locale)
            .or_insert_with(|| WordCatalog::new(locale))
    }

    pub fn is_loaded(&self, locale: Locale) -> bool {
        self.catalog(locale).is_some_and(WordCatalog::is_loaded)
    }
}
