use std::collections::BTreeMap;
use std::io::Write;

use game_core::BoardRenderer;
use game_types::{
    AggregateStats, ElapsedTime, GameError, GameOutcome, GameResult, Locale, MAX_ATTEMPTS,
    SessionState, Verdict, WORD_LENGTH,
};
use tracing::warn;

const ROWS: usize = MAX_ATTEMPTS as usize;

pub fn format_cell(letter: char, verdict: Option<Verdict>) -> String {
    match verdict {
        Some(Verdict::Correct) => format!("[{}]", letter),
        Some(Verdict::Present) => format!("({})", letter),
        Some(Verdict::Absent) => format!(" {} ", letter.to_lowercase()),
        None => format!(" {} ", letter),
    }
}

fn format_time(time: Option<ElapsedTime>) -> String {
    time.map_or_else(|| "--:--:--".to_string(), |t| t.to_string())
}

pub fn format_stats(stats: &AggregateStats, today: ElapsedTime) -> String {
    format!(
        "Played {} | Points {} (avg {:.2}) | Streak {} (max {}) | Avg time {} | Today {}",
        stats.games_played,
        stats.total_points,
        stats.average_points,
        stats.current_streak,
        stats.max_streak,
        format_time(stats.average_time),
        today
    )
}

pub fn format_outcome(outcome: &GameOutcome) -> String {
    let tries = match outcome.result {
        GameResult::Won => outcome.tries.to_string(),
        GameResult::Lost => "X".to_string(),
    };

    format!(
        "Wardle #{} ({}) {}/{}\nAnswer: {}\nPoints: {} | Time: {}\n{}",
        outcome.puzzle_number,
        outcome.locale,
        tries,
        MAX_ATTEMPTS,
        outcome.answer,
        outcome.points,
        format_time(outcome.elapsed),
        format_stats(&outcome.stats, outcome.elapsed.unwrap_or(ElapsedTime::ZERO))
    )
}

pub fn prompt(locale: Locale, state: &SessionState) -> String {
    if state.phase.is_finalized() {
        return format!("[{}] done> ", locale);
    }
    format!(
        "[{}] {}/{} {}{}> ",
        locale,
        state.current_row,
        MAX_ATTEMPTS,
        state.current_word,
        "_".repeat(WORD_LENGTH.saturating_sub(state.current_word.chars().count()))
    )
}

/// Line-oriented board for a terminal. A row is printed once it has been
/// evaluated; messages and the final reveal are printed as they arrive.
pub struct TerminalBoard<W: Write> {
    cells: [[Option<char>; WORD_LENGTH]; ROWS],
    verdicts: [[Option<Verdict>; WORD_LENGTH]; ROWS],
    keys: BTreeMap<char, Verdict>,
    out: W,
}

impl<W: Write> TerminalBoard<W> {
    pub fn new(out: W) -> Self {
        Self {
            cells: [[None; WORD_LENGTH]; ROWS],
            verdicts: [[None; WORD_LENGTH]; ROWS],
            keys: BTreeMap::new(),
            out,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn slot(row: u8, column: u8) -> Option<(usize, usize)> {
        let row = usize::from(row).checked_sub(1)?;
        let column = usize::from(column).checked_sub(1)?;
        (row < ROWS && column < WORD_LENGTH).then_some((row, column))
    }

    pub fn render_row(&self, row: u8) -> String {
        let Some((row, _)) = Self::slot(row, 1) else {
            return String::new();
        };

        self.cells[row]
            .iter()
            .zip(&self.verdicts[row])
            .map(|(letter, verdict)| format_cell(letter.unwrap_or('.'), *verdict))
            .collect()
    }

    pub fn render_keyboard(&self) -> String {
        self.keys
            .iter()
            .map(|(letter, verdict)| format_cell(*letter, Some(*verdict)))
            .collect()
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            warn!("Failed to write to terminal: {}", e);
        }
    }
}

impl<W: Write> BoardRenderer for TerminalBoard<W> {
    fn set_cell_content(&mut self, row: u8, column: u8, letter: Option<char>) {
        if let Some((r, c)) = Self::slot(row, column) {
            self.cells[r][c] = letter;
            if letter.is_none() {
                self.verdicts[r][c] = None;
            }
        }
    }

    fn set_cell_verdict(&mut self, row: u8, column: u8, verdict: Verdict) {
        let Some((r, c)) = Self::slot(row, column) else {
            return;
        };
        self.verdicts[r][c] = Some(verdict);

        if c + 1 == WORD_LENGTH {
            let line = format!("{} {}", row, self.render_row(row));
            self.write_line(&line);
        }
    }

    fn set_key_verdict(&mut self, letter: char, verdict: Verdict) {
        self.keys.insert(letter, verdict);
    }

    fn reveal_outcome(&mut self, outcome: &GameOutcome) {
        let keyboard = self.render_keyboard();
        self.write_line(&keyboard);
        self.write_line(&format_outcome(outcome));
    }

    fn show_rejection(&mut self, _row: u8, reason: &GameError) {
        self.write_line(&format!("  {}", reason));
    }

    fn clear_board(&mut self) {
        self.cells = [[None; WORD_LENGTH]; ROWS];
        self.verdicts = [[None; WORD_LENGTH]; ROWS];
        self.keys.clear();
    }
}
