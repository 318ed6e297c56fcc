//! Binary entry point: play the subtitle guessing game in a terminal.

mod app;
mod commands;
mod player;

use anyhow::Result;
use app::App;
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use subguess_core::{GameConfig, Session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command line options for the binary.
#[derive(Parser)]
struct Cli {
    /// Path to the SRT file to play.
    subtitles: PathBuf,

    /// JSON file with game settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Process playback ticks at most once per this many milliseconds.
    /// Overrides the config file.
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// How often the virtual player reports its time, in milliseconds.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Enable verbose debug and trace logs.
    #[arg(long)]
    debug: bool,
}

/// Parses CLI args, initializes logging and runs the game loop.
/// Ticks, typed lines and the pending pause are handled one at a time.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.debug {
        EnvFilter::default()
            .add_directive("subguess=trace".parse()?)
            .add_directive("subguess_core=trace".parse()?)
            .add_directive("info".parse()?)
    } else {
        EnvFilter::default()
            .add_directive("subguess=info".parse()?)
            .add_directive("subguess_core=info".parse()?)
            .add_directive("warn".parse()?)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if cli.debounce_ms.is_some() {
        config.debounce_ms = cli.debounce_ms;
    }
    info!("starting with {:?}", config);

    let mut app = App::new(Session::new(config), Instant::now());
    app.load(&cli.subtitles, Instant::now())?;
    println!("{}", commands::HELP);

    let mut ticks = tokio::time::interval(Duration::from_millis(cli.tick_ms.max(1)));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let deadline = app.pending.map(|p| tokio::time::Instant::from_std(p.deadline));
        tokio::select! {
            _ = ticks.tick() => app.on_tick(Instant::now()),
            _ = sleep_until(deadline), if deadline.is_some() => {
                app.on_pause_deadline(Instant::now());
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let mut keep_going = true;
                for command in commands::parse_line(&line) {
                    match app.on_command(command, Instant::now()) {
                        Ok(true) => {}
                        Ok(false) => {
                            keep_going = false;
                            break;
                        }
                        Err(err) => warn!("{err:#}"),
                    }
                }
                if !keep_going {
                    break;
                }
            }
        }
    }
    Ok(())
}

async fn sleep_until(deadline: Option<tokio::time::Instant>) {
    if let Some(deadline) = deadline {
        tokio::time::sleep_until(deadline).await;
    }
}
