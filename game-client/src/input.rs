use game_types::Locale;

/// One thing the player asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Letter(char),
    Delete,
    Submit,
    SwitchLocale(Locale),
    ShowStats,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("unknown command ':{0}', try :help")]
    UnknownCommand(String),
    #[error("usage: :lang <es|en>")]
    MissingLocale,
    #[error(transparent)]
    Locale(#[from] game_types::ParseLocaleError),
}

pub const HELP: &str = "\
Type letters and press enter to submit a full row.
  !            delete the last letter (repeat for more)
  :lang <code> switch language (es, en)
  :stats       show statistics
  :quit        leave";

/// Turn one input line into commands.
///
/// Plain lines type their letters, with `!` deleting, and always end with a
/// submit, which does nothing on a partial row. Lines starting with `:` are
/// commands.
pub fn parse_line(line: &str) -> Result<Vec<Command>, InputError> {
    let line = line.trim();

    if let Some(command) = line.strip_prefix(':') {
        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let command = match name.as_str() {
            "lang" | "language" => {
                let code = parts.next().ok_or(InputError::MissingLocale)?;
                Command::SwitchLocale(code.parse()?)
            }
            "stats" => Command::ShowStats,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            _ => return Err(InputError::UnknownCommand(name)),
        };
        return Ok(vec![command]);
    }

    let mut commands: Vec<Command> = line
        .chars()
        .filter_map(|ch| match ch {
            '!' | '\u{8}' | '\u{7f}' => Some(Command::Delete),
            ch if ch.is_alphabetic() => Some(Command::Letter(ch)),
            _ => None,
        })
        .collect();
    commands.push(Command::Submit);
    Ok(commands)
}
