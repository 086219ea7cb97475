use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use game_core::DEFAULT_STALENESS_CHECK;
use game_types::Locale;

/// Where word lists come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordsSource {
    /// Directory holding `<lang>/words.json` and `<lang>/dicc.json`
    Directory(PathBuf),
    /// Site serving `/assets/<lang>/words.json` and `/assets/<lang>/dicc.json`
    Http(String),
}

impl WordsSource {
    fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            WordsSource::Http(value.trim_end_matches('/').to_string())
        } else {
            WordsSource::Directory(PathBuf::from(value))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub words_source: WordsSource,
    pub store_path: PathBuf,
    pub locale: Option<Locale>,
    pub staleness_check: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any variable lookup, defaults filling the gaps
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let words_source = WordsSource::parse(
            &lookup("WARDLE_WORDS_SOURCE").unwrap_or_else(|| "./assets".to_string()),
        );

        let store_path = PathBuf::from(
            lookup("WARDLE_STORE_PATH").unwrap_or_else(|| "./wardle-store.json".to_string()),
        );

        let locale = lookup("WARDLE_LOCALE")
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.trim().parse::<Locale>())
            .transpose()
            .context("Invalid WARDLE_LOCALE")?;

        let staleness_check = match lookup("WARDLE_STALENESS_CHECK_SECONDS") {
            Some(value) => {
                let seconds: u64 = value
                    .trim()
                    .parse()
                    .context("Invalid WARDLE_STALENESS_CHECK_SECONDS")?;
                if seconds == 0 {
                    bail!("WARDLE_STALENESS_CHECK_SECONDS must be at least 1");
                }
                Duration::from_secs(seconds)
            }
            None => DEFAULT_STALENESS_CHECK,
        };

        Ok(Self {
            words_source,
            store_path,
            locale,
            staleness_check,
        })
    }
}
