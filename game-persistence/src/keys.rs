use game_types::Locale;

/// Holds the player's preferred locale; shared by every locale
pub const LANGUAGE_KEY: &str = "wardle_language";

/// Key layout for one locale, so games in different languages never mix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub game_data: String,
    pub session_start: String,
    pub today_time: String,
    pub stats: String,
}

impl StorageKeys {
    pub fn for_locale(locale: Locale) -> Self {
        let prefix = format!("wardle_{}", locale.code());
        Self {
            game_data: format!("{prefix}_gamedata"),
            session_start: format!("{prefix}_timetrial_start"),
            today_time: format!("{prefix}_today_time"),
            stats: format!("{prefix}_stats"),
        }
    }
}
