use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use game_client::{
    config::Config,
    input::{Command, HELP, parse_line},
    terminal::{TerminalBoard, format_stats, prompt},
    word_source::{PrefetchForwarder, WordLoader, fetcher_for},
};
use game_core::{Clock, GameSession, RenderingHandler, SystemClock, WordLibrary};
use game_persistence::{FileStore, GameStorage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Logs go to stderr so the board keeps stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        error!("{:#}", e);
        eprintln!("wardle: {:#}", e);
        std::process::exit(1);
    }
}

fn show_prompt(session: &GameSession) {
    print!("{}", prompt(session.locale(), session.state()));
    std::io::stdout().flush().ok();
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;
    info!("Starting Wardle with {:?}", config);

    let store = FileStore::open(&config.store_path)
        .with_context(|| format!("Failed to open store at {}", config.store_path.display()))?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (prefetch_tx, mut prefetch_rx) = mpsc::unbounded_channel();
    let (loaded_tx, mut loaded_rx) = mpsc::unbounded_channel();
    let mut loader = WordLoader::new(fetcher_for(&config.words_source), loaded_tx);

    let mut session = GameSession::new(
        config.locale,
        WordLibrary::new(),
        GameStorage::new(Box::new(store)),
        clock.clone(),
    );
    session.add_handler(Box::new(RenderingHandler::new(TerminalBoard::new(
        std::io::stdout(),
    ))));
    session.add_handler(Box::new(PrefetchForwarder::new(prefetch_tx)));
    session.start();

    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut staleness = tokio::time::interval(config.staleness_check);

    loop {
        let reveal_in = session
            .next_reveal_due()
            .map(|due| (due - clock.now()).to_std().unwrap_or_default());

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };

                match parse_line(&line) {
                    Ok(commands) => {
                        if !apply_commands(&mut session, commands) {
                            break;
                        }
                    }
                    Err(e) => println!("  {}", e),
                }
                show_prompt(&session);
            }
            Some(locale) = prefetch_rx.recv() => {
                loader.request(locale);
            }
            Some(loaded) = loaded_rx.recv() => {
                loader.complete(&loaded);
                if let Ok(lists) = loaded.result {
                    session.install_word_lists(lists.locale, lists.answers, lists.dictionary);
                    show_prompt(&session);
                }
            }
            _ = staleness.tick() => {
                if session.invalidate_if_stale() {
                    info!("New day, board reset");
                    show_prompt(&session);
                }
            }
            _ = tokio::time::sleep(reveal_in.unwrap_or_default()), if reveal_in.is_some() => {
                if session.fire_due_reveal().is_some() {
                    show_prompt(&session);
                }
            }
        }
    }

    info!("Bye");
    Ok(())
}

/// Returns false when the player asked to leave
fn apply_commands(session: &mut GameSession, commands: Vec<Command>) -> bool {
    for command in commands {
        match command {
            Command::Letter(letter) => session.submit_letter(letter),
            Command::Delete => session.delete_letter(),
            Command::Submit => {
                session.submit_row();
            }
            Command::SwitchLocale(locale) => session.switch_locale(locale),
            Command::ShowStats => {
                println!("{}", format_stats(session.stats(), session.today_time()))
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => return false,
        }
    }
    true
}
