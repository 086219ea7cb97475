use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ElapsedTime;

/// Running totals across every finished game on this device
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AggregateStats {
    #[serde(default, alias = "games")]
    pub games_played: u32,
    #[serde(default)]
    pub total_points: u32,
    #[serde(default)]
    pub average_points: f64,
    #[serde(default, alias = "streak")]
    pub current_streak: u32,
    #[serde(default)]
    pub max_streak: u32,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub average_time: Option<ElapsedTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_wire_format() {
        let stats = AggregateStats {
            games_played: 2,
            total_points: 9,
            average_points: 4.5,
            current_streak: 2,
            max_streak: 2,
            average_time: Some(ElapsedTime::from_secs(15)),
        };

        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["gamesPlayed"], 2);
        assert_eq!(value["totalPoints"], 9);
        assert_eq!(value["averagePoints"], 4.5);
        assert_eq!(value["currentStreak"], 2);
        assert_eq!(value["maxStreak"], 2);
        assert_eq!(value["averageTime"], "00:00:15");
    }

    #[test]
    fn test_legacy_field_names_are_accepted() {
        let legacy = r#"{
            "games": 1,
            "totalPoints": 6,
            "averagePoints": 6,
            "averageTime": "00:00:20",
            "streak": 1,
            "maxStreak": 1
        }"#;

        let stats: AggregateStats = serde_json::from_str(legacy).unwrap();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.average_time, Some(ElapsedTime::from_secs(20)));
    }

    #[test]
    fn test_out_of_range_average_time_is_an_error() {
        let result = serde_json::from_str::<AggregateStats>(
            r#"{"gamesPlayed":1,"averageTime":"9999999999999999:00:00"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_fields_default() {
        let stats: AggregateStats = serde_json::from_str("{}").unwrap();
        assert_eq!(stats, AggregateStats::default());
    }
}
