use game_types::{AggregateStats, ElapsedTime};
use tracing::debug;

/// Running totals across finished games for one locale
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsAggregator {
    stats: AggregateStats,
}

impl StatsAggregator {
    pub fn new(stats: AggregateStats) -> Self {
        Self { stats }
    }

    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    /// Fold one finished game into the totals. `points` is 0 for a loss.
    /// A missing `elapsed` leaves the average time untouched.
    pub fn record_outcome(&mut self, points: u8, elapsed: Option<ElapsedTime>) -> &AggregateStats {
        let stats = &mut self.stats;

        stats.games_played = stats.games_played.saturating_add(1);
        stats.total_points = stats.total_points.saturating_add(u32::from(points));
        stats.average_points = f64::from(stats.total_points) / f64::from(stats.games_played);

        if points != 0 {
            stats.current_streak = stats.current_streak.saturating_add(1);
        } else {
            stats.current_streak = 0;
        }
        stats.max_streak = stats.max_streak.max(stats.current_streak);

        if let Some(elapsed) = elapsed {
            stats.average_time = Some(match stats.average_time {
                Some(average) if stats.games_played > 1 => {
                    // The mean never exceeds its largest input, so it fits back in u64
                    let n = u128::from(stats.games_played);
                    let total =
                        u128::from(average.as_secs()) * (n - 1) + u128::from(elapsed.as_secs());
                    ElapsedTime::from_secs(u64::try_from(total / n).unwrap_or(u64::MAX))
                }
                _ => elapsed,
            });
        }

        debug!(
            "Recorded game {} with {} points, streak {}",
            stats.games_played, points, stats.current_streak
        );
        &self.stats
    }
}
