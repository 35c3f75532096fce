use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::{
    error::Error,
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::mpsc::Sender,
    thread,
};
use tracing_subscriber::EnvFilter;

use typespeed::{
    bot::{Bot, BotConfig},
    clock::{Clock, ManualClock, SystemClock},
    config::{Config, ConfigStore, FileConfigStore},
    language::ContentProvider,
    runtime::{dispatch, ChannelEventSource, FixedTicker, Runner, SessionEvent},
    Language, TestMode, TypingSession, TypingStats, WordLength, WordMode,
};

/// Line typed on stdin to draw a fresh plan (the tab+enter shortcut).
const RESTART_COMMAND: &str = ":restart";

/// headless typing-speed test with wpm, accuracy and consistency scoring
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A headless typing-speed test. The plan is printed to stderr; type it on stdin one line at a time. Results are printed to stdout as JSON."
)]
pub struct Cli {
    /// test mode: 15, 30, 60, bot or multiplier
    #[clap(short = 'm', long)]
    mode: Option<String>,

    /// normal, or code-<language> (code-python, code-javascript, code-java)
    #[clap(short = 'c', long)]
    word_mode: Option<String>,

    /// short, medium, long or mixed
    #[clap(short = 'w', long)]
    word_length: Option<String>,

    /// language to pull words from
    #[clap(short = 'l', long)]
    language: Option<String>,

    /// seed for a reproducible plan
    #[clap(short = 's', long)]
    seed: Option<u64>,

    /// config file to read defaults from (and write with --save-defaults)
    #[clap(long)]
    config: Option<PathBuf>,

    /// print the generated plan, one token per line, and exit
    #[clap(long)]
    plan_only: bool,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_defaults: bool,

    /// bot target words per minute
    #[clap(long, default_value_t = 60.0)]
    bot_speed: f64,

    /// bot percentage of correct characters
    #[clap(long, default_value_t = 95.0)]
    bot_accuracy: f64,

    /// bot percentage of pace uniformity
    #[clap(long, default_value_t = 90.0)]
    bot_consistency: f64,
}

impl Cli {
    /// Stored defaults with every given flag layered on top.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(mode) = &self.mode {
            config.mode = TestMode::from(mode.as_str());
        }
        if let Some(word_mode) = &self.word_mode {
            config.word_mode = WordMode::from(word_mode.as_str());
        }
        if let Some(word_length) = &self.word_length {
            config.word_length = WordLength::from(word_length.as_str());
        }
        if let Some(language) = &self.language {
            config.language = Language::from(language.as_str());
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config
    }

    fn bot_config(&self) -> BotConfig {
        BotConfig {
            speed: self.bot_speed,
            accuracy: self.bot_accuracy,
            consistency: self.bot_consistency,
        }
    }

    fn store(&self) -> FileConfigStore {
        self.config
            .as_ref()
            .map_or_else(FileConfigStore::new, FileConfigStore::with_path)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing();

    let store = cli.store();
    let config = cli.apply(store.load());
    if cli.save_defaults {
        store.save(&config)?;
        tracing::info!(path = %store.path().display(), "defaults saved");
    }

    let mut rng = config
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let provider = ContentProvider::builtin()?;

    if cli.plan_only {
        let session = build_session(&config, provider, rng, SystemClock::new());
        let mut out = io::stdout().lock();
        for token in session.plan() {
            writeln!(out, "{token}")?;
        }
        return Ok(());
    }

    let stats = if config.mode == TestMode::Bot {
        let clock = ManualClock::new();
        let mut bot_rng = split_rng(&mut rng);
        let mut session = build_session(&config, provider, rng, clock.clone());
        Bot::new(cli.bot_config()).play(&mut session, &clock, &mut bot_rng)
    } else {
        let session = build_session(&config, provider, rng, SystemClock::new());
        run_headless(session)?
    };

    print_stats(&stats)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Independent stream for the bot, so its typos and pace do not track the plan.
fn split_rng(rng: &mut StdRng) -> StdRng {
    StdRng::seed_from_u64(rng.gen())
}

fn build_session(
    config: &Config,
    provider: ContentProvider,
    rng: StdRng,
    clock: impl Clock + 'static,
) -> TypingSession {
    TypingSession::from_parts(config.session_config(), provider, rng, Box::new(clock))
}

/// Feed stdin through the runtime until the session ends or input runs out.
fn run_headless(mut session: TypingSession) -> Result<TypingStats, Box<dyn Error>> {
    let (tx, events) = ChannelEventSource::channel();
    spawn_reader(tx, session.config().word_mode.is_code());
    let runner = Runner::new(events, FixedTicker::default());

    show_plan(&session)?;
    loop {
        let Some(event) = runner.step() else {
            session.expire();
            break;
        };
        let restarted = event == SessionEvent::Restart;
        dispatch(&mut session, event);
        if restarted {
            show_plan(&session)?;
        }
        if session.is_terminal() {
            break;
        }
    }
    Ok(session.stats())
}

fn spawn_reader(tx: Sender<SessionEvent>, code: bool) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            for event in line_events(&line, code) {
                if tx.send(event).is_err() {
                    return;
                }
            }
        }
    });
}

/// Translate one stdin line into the buffer changes a text input would emit.
fn line_events(line: &str, code: bool) -> Vec<SessionEvent> {
    if line.trim() == RESTART_COMMAND {
        return vec![SessionEvent::Restart];
    }
    if code {
        return vec![
            SessionEvent::InputChange(line.to_string()),
            SessionEvent::InputChange(format!("{line}\n")),
        ];
    }
    line.split_whitespace()
        .flat_map(|word| {
            [
                SessionEvent::InputChange(word.to_string()),
                SessionEvent::InputChange(format!("{word} ")),
            ]
        })
        .collect()
}

fn show_plan(session: &TypingSession) -> io::Result<()> {
    let mut err = io::stderr().lock();
    for token in session.plan() {
        writeln!(err, "{token}")?;
    }
    writeln!(
        err,
        "-- {} test, {}s --",
        session.config().mode,
        session.config().mode.duration_secs()
    )
}

fn print_stats(stats: &TypingStats) -> Result<(), Box<dyn Error>> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, stats)?;
    writeln!(out)?;
    Ok(())
}
