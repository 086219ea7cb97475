use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use game_core::{AnswerEntry, GameEvent, GameEventHandler, parse_answers, parse_dictionary};
use game_types::Locale;
use reqwest::Client;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::WordsSource;

/// The two files each locale ships
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordFile {
    /// Ordered daily answers
    Answers,
    /// Every accepted guess
    Dictionary,
}

impl WordFile {
    pub fn file_name(&self) -> &'static str {
        match self {
            WordFile::Answers => "words.json",
            WordFile::Dictionary => "dicc.json",
        }
    }
}

/// Raw access to a locale's word files
#[async_trait::async_trait]
pub trait WordListFetcher: Send + Sync {
    async fn fetch(&self, locale: Locale, file: WordFile) -> Result<String>;
}

pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, locale: Locale, file: WordFile) -> PathBuf {
        self.root.join(locale.code()).join(file.file_name())
    }
}

#[async_trait::async_trait]
impl WordListFetcher for DirectoryFetcher {
    async fn fetch(&self, locale: Locale, file: WordFile) -> Result<String> {
        let path = self.path_for(locale, file);
        debug!("Reading {}", path.display());
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, locale: Locale, file: WordFile) -> String {
        format!(
            "{}/assets/{}/{}",
            self.base_url.trim_end_matches('/'),
            locale.code(),
            file.file_name()
        )
    }
}

#[async_trait::async_trait]
impl WordListFetcher for HttpFetcher {
    async fn fetch(&self, locale: Locale, file: WordFile) -> Result<String> {
        let url = self.url_for(locale, file);
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Bad response for {}", url))?;

        response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))
    }
}

pub fn fetcher_for(source: &WordsSource) -> Arc<dyn WordListFetcher> {
    match source {
        WordsSource::Directory(root) => Arc::new(DirectoryFetcher::new(root.clone())),
        WordsSource::Http(base_url) => Arc::new(HttpFetcher::new(base_url.clone())),
    }
}

/// Parsed word lists for one locale, ready to install in the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordLists {
    pub locale: Locale,
    pub answers: Vec<AnswerEntry>,
    pub dictionary: Vec<String>,
}

pub async fn load_word_lists(fetcher: &dyn WordListFetcher, locale: Locale) -> Result<WordLists> {
    let (answers, dictionary) = tokio::try_join!(
        fetcher.fetch(locale, WordFile::Answers),
        fetcher.fetch(locale, WordFile::Dictionary),
    )?;

    let answers = parse_answers(&answers)
        .with_context(|| format!("Invalid answer list for {}", locale))?;
    let dictionary = parse_dictionary(&dictionary)
        .with_context(|| format!("Invalid dictionary for {}", locale))?;

    if answers.is_empty() {
        anyhow::bail!("Answer list for {} has no usable words", locale);
    }

    Ok(WordLists {
        locale,
        answers,
        dictionary,
    })
}

/// Result of a background load, delivered back to the event loop
#[derive(Debug)]
pub struct WordListsLoaded {
    pub locale: Locale,
    pub result: Result<WordLists>,
}

/// Runs word list loads in the background, at most one per locale at a time.
/// Finished loads come back over the channel given to `new`.
pub struct WordLoader {
    fetcher: Arc<dyn WordListFetcher>,
    sender: mpsc::UnboundedSender<WordListsLoaded>,
    in_flight: HashSet<Locale>,
    loaded: HashSet<Locale>,
}

impl WordLoader {
    pub fn new(
        fetcher: Arc<dyn WordListFetcher>,
        sender: mpsc::UnboundedSender<WordListsLoaded>,
    ) -> Self {
        Self {
            fetcher,
            sender,
            in_flight: HashSet::new(),
            loaded: HashSet::new(),
        }
    }

    /// Start loading `locale` unless it is loaded or already on its way.
    /// Returns true when a new load was started.
    pub fn request(&mut self, locale: Locale) -> bool {
        if self.loaded.contains(&locale) || !self.in_flight.insert(locale) {
            return false;
        }

        info!("Loading word lists for {}", locale);
        let fetcher = self.fetcher.clone();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = load_word_lists(fetcher.as_ref(), locale).await;
            if sender.send(WordListsLoaded { locale, result }).is_err() {
                debug!("Word lists for {} arrived after shutdown", locale);
            }
        });
        true
    }

    /// Record a finished load. A failed one can be requested again.
    pub fn complete(&mut self, loaded: &WordListsLoaded) {
        self.in_flight.remove(&loaded.locale);
        match &loaded.result {
            Ok(lists) => {
                info!(
                    "Loaded {} answers and {} dictionary words for {}",
                    lists.answers.len(),
                    lists.dictionary.len(),
                    lists.locale
                );
                self.loaded.insert(loaded.locale);
            }
            Err(e) => warn!("Failed to load word lists for {}: {:#}", loaded.locale, e),
        }
    }

    pub fn is_loaded(&self, locale: Locale) -> bool {
        self.loaded.contains(&locale)
    }
}

/// Forwards the session's prefetch requests to the event loop
pub struct PrefetchForwarder {
    sender: mpsc::UnboundedSender<Locale>,
}

impl PrefetchForwarder {
    pub fn new(sender: mpsc::UnboundedSender<Locale>) -> Self {
        Self { sender }
    }
}

impl GameEventHandler for PrefetchForwarder {
    fn handle_event(&mut self, event: GameEvent) {
        if let GameEvent::PrefetchRequested { locale } = event {
            if self.sender.send(locale).is_err() {
                debug!("Dropped prefetch for {}, loop has stopped", locale);
            }
        }
    }
}
