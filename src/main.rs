use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use pomo_clock::alert::{self, Alert, Bell, Silent, SoundCommand};
use pomo_clock::app::{App, Event, spawn_input};
use pomo_clock::clock::{DEFAULT_BREAK, DEFAULT_SESSION, TimerState};
use pomo_clock::command::UserCommand;
use pomo_clock::config::{self, Config};
use pomo_clock::display::{HELP, format_minutes};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Session length in minutes (clamped to 1-60)
    #[arg(short, long, default_value_t = DEFAULT_SESSION as i64, allow_negative_numbers = true)]
    session: i64,

    /// Break length in minutes (clamped to 1-60)
    #[arg(short = 'b', long = "break", default_value_t = DEFAULT_BREAK as i64, allow_negative_numbers = true)]
    break_length: i64,

    /// Start counting down immediately
    #[arg(long)]
    start: bool,

    /// Never play a sound
    #[arg(long)]
    no_sound: bool,

    /// Config file (default: ~/.config/pomo-clock/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the status line, so logs go to a file.
    let log_dir = config::config_dir();
    fs::create_dir_all(&log_dir).with_context(|| format!("creating {:?}", log_dir))?;
    let log_path = log_dir.join("pomo-clock.log");
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening log file {:?}", log_path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let config = Config::load(&config_path);
    info!(path = ?config_path, "config loaded");

    let alert = build_alert(&cli, &config);
    let state = TimerState::with_lengths(cli.session, cli.break_length);

    println!(
        "🍅 Pomodoro clock: {} session, {} break",
        format_minutes(state.session_length),
        format_minutes(state.break_length)
    );
    println!("{}", HELP);

    let mut app = App::new(state, alert, io::stdout());

    let interrupt = app.sender();
    ctrlc::set_handler(move || {
        let _ = interrupt.send(Event::Interrupt);
    })
    .context("Error setting Ctrl-C handler")?;

    // Detached: a blocked stdin read must not hold up exit.
    spawn_input(io::BufReader::new(io::stdin()), app.sender());

    if cli.start {
        app.handle(Event::Command(UserCommand::Start))?;
    }
    app.run()?;
    info!("bye");
    Ok(())
}

fn build_alert(cli: &Cli, config: &Config) -> Box<dyn Alert> {
    if cli.no_sound {
        return Box::new(Silent);
    }
    let configured = config.alert.command.as_deref().and_then(SoundCommand::shell);
    let players = match configured {
        Some(player) => vec![player],
        None => SoundCommand::detect(),
    };

    let mut alerts: Vec<Box<dyn Alert>> = players
        .into_iter()
        .map(|player| Box::new(player) as Box<dyn Alert>)
        .collect();
    if alerts.is_empty() || config.alert.bell_fallback {
        alerts.push(Box::new(Bell::stdout()));
    }
    alert::chain(alerts)
}
