mod app;
mod records;
mod render;

use app::{App, AppAction};
use clap::{Parser, ValueEnum};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use nonet_core::Difficulty;
use std::io::{self, Write};
use std::time::{Duration, Instant};

const TICK_RATE: Duration = Duration::from_millis(100);

/// Timed Sudoku in the terminal.
#[derive(Parser)]
#[command(name = "nonet", version, about)]
struct Args {
    /// Puzzle difficulty
    #[arg(short, long, value_enum, default_value = "medium")]
    difficulty: DifficultyArg,

    /// Player name used for best-time records
    #[arg(short, long, default_value = "Player")]
    player: String,

    /// Seed for reproducible puzzle generation
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

fn main() -> io::Result<()> {
    // Logging goes to stderr and is opt-in via RUST_LOG; initialize before
    // the terminal enters raw mode.
    env_logger::init();
    let args = Args::parse();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    // Run the app
    let result = run_app(&mut stdout, &args);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen, Show)?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn run_app(stdout: &mut io::Stdout, args: &Args) -> io::Result<()> {
    let mut app = App::new(args.difficulty.into(), &args.player, args.seed);
    let mut last_tick = Instant::now();

    loop {
        // Render
        render::render(stdout, &app)?;
        stdout.flush()?;

        // Handle input with a timeout so the timer keeps moving
        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Handle Ctrl+C
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }

                match app.handle_key(key) {
                    AppAction::Continue => {}
                    AppAction::Quit => break,
                }
            }
        }

        // Advance timers and pick up session terminal states
        if last_tick.elapsed() >= TICK_RATE {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
