use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use game_types::{AggregateStats, ElapsedTime, GuessRow, Locale};
use tracing::{debug, warn};

use crate::{KeyValueStore, LANGUAGE_KEY, StorageError, StorageKeys};

/// What was found under a locale's game data key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowsRecord {
    Missing,
    Malformed(String),
    Present(Vec<GuessRow>),
}

/// Typed view over the device store: today's rows, session timers, stats and
/// the locale preference. Reads never fail; anything unreadable is reported
/// as absent and logged.
pub struct GameStorage {
    store: Box<dyn KeyValueStore>,
}

impl GameStorage {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read '{}' from store: {}", key, e);
                None
            }
        }
    }

    pub fn load_rows(&self, locale: Locale) -> RowsRecord {
        let keys = StorageKeys::for_locale(locale);
        let Some(raw) = self.read(&keys.game_data) else {
            return RowsRecord::Missing;
        };

        match serde_json::from_str::<Vec<GuessRow>>(&raw) {
            Ok(rows) => RowsRecord::Present(rows),
            Err(e) => RowsRecord::Malformed(e.to_string()),
        }
    }

    /// Append a row to today's sequence, creating it when absent. A malformed
    /// sequence is replaced rather than extended.
    pub fn append_row(&mut self, locale: Locale, row: GuessRow) -> Result<(), StorageError> {
        let keys = StorageKeys::for_locale(locale);

        let mut rows = match self.load_rows(locale) {
            RowsRecord::Present(rows) => rows,
            RowsRecord::Missing => Vec::new(),
            RowsRecord::Malformed(reason) => {
                warn!("Replacing malformed game data for {}: {}", locale, reason);
                Vec::new()
            }
        };

        debug!("Saving row {} ({}) for {}", row.row, row.word, locale);
        rows.push(row);
        self.store.set(&keys.game_data, serde_json::to_string(&rows)?)
    }

    /// Remove the day's rows and both timer markers. Stats are kept.
    pub fn clear_game(&mut self, locale: Locale) -> Result<(), StorageError> {
        let keys = StorageKeys::for_locale(locale);
        self.store.remove(&keys.game_data)?;
        self.store.remove(&keys.session_start)?;
        self.store.remove(&keys.today_time)?;
        Ok(())
    }

    /// The session start exactly as stored, readable or not
    pub fn session_start_marker(&self, locale: Locale) -> Option<String> {
        self.read(&StorageKeys::for_locale(locale).session_start)
    }

    pub fn session_start(&self, locale: Locale) -> Option<DateTime<FixedOffset>> {
        let raw = self.read(&StorageKeys::for_locale(locale).session_start)?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(start) => Some(start),
            Err(e) => {
                warn!("Ignoring malformed session start '{}': {}", raw, e);
                None
            }
        }
    }

    pub fn set_session_start(
        &mut self,
        locale: Locale,
        start: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let keys = StorageKeys::for_locale(locale);
        self.store.set(
            &keys.session_start,
            start.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }

    pub fn clear_session_start(&mut self, locale: Locale) -> Result<(), StorageError> {
        self.store
            .remove(&StorageKeys::for_locale(locale).session_start)
    }

    /// Elapsed time of today's finished game, if any
    pub fn today_time(&self, locale: Locale) -> Option<ElapsedTime> {
        let raw = self.read(&StorageKeys::for_locale(locale).today_time)?;
        raw.parse().ok()
    }

    pub fn set_today_time(
        &mut self,
        locale: Locale,
        elapsed: ElapsedTime,
    ) -> Result<(), StorageError> {
        let keys = StorageKeys::for_locale(locale);
        self.store.set(&keys.today_time, elapsed.to_string())
    }

    pub fn load_stats(&self, locale: Locale) -> AggregateStats {
        let Some(raw) = self.read(&StorageKeys::for_locale(locale).stats) else {
            return AggregateStats::default();
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Stored stats for {} are malformed, starting over: {}", locale, e);
            AggregateStats::default()
        })
    }

    pub fn save_stats(
        &mut self,
        locale: Locale,
        stats: &AggregateStats,
    ) -> Result<(), StorageError> {
        let keys = StorageKeys::for_locale(locale);
        self.store.set(&keys.stats, serde_json::to_string(stats)?)
    }

    pub fn locale_preference(&self) -> Option<Locale> {
        self.read(LANGUAGE_KEY)?.parse().ok()
    }

    pub fn set_locale_preference(&mut self, locale: Locale) -> Result<(), StorageError> {
        self.store.set(LANGUAGE_KEY, locale.code().to_string())
    }
}
