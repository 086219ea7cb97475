use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whole-second duration stored and displayed as `hh:mm:ss`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElapsedTime(u64);

impl ElapsedTime {
    pub const ZERO: ElapsedTime = ElapsedTime(0);

    pub fn from_secs(seconds: u64) -> Self {
        Self(seconds)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;
        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid elapsed time '{0}', expected hh:mm:ss")]
pub struct ParseElapsedTimeError(String);

impl FromStr for ElapsedTime {
    type Err = ParseElapsedTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseElapsedTimeError(s.to_string());

        let parts: Vec<&str> = s.trim().split(':').collect();
        let [hours, minutes, seconds] = parts.as_slice() else {
            return Err(invalid());
        };

        let hours: u64 = hours.parse().map_err(|_| invalid())?;
        let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
        let seconds: u64 = seconds.parse().map_err(|_| invalid())?;
        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }

        hours
            .checked_mul(3600)
            .and_then(|total| total.checked_add(minutes * 60 + seconds))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for ElapsedTime {
    type Error = ParseElapsedTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElapsedTime> for String {
    fn from(value: ElapsedTime) -> Self {
        value.to_string()
    }
}
