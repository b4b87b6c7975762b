use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use grid_snake::config::{
    DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, Difficulty, EngineConfig, GridSize, Tuning,
};
use grid_snake::game::{Engine, GameEvent, RunState};
use grid_snake::input::{GameInput, InputHandler};
use grid_snake::logging;
use grid_snake::renderer::{self, FrameInfo};
use grid_snake::score::{HighScoreStore, JsonFileStore, MemoryStore};
use grid_snake::session::Session;
use grid_snake::terminal_runtime::TerminalSession;
use grid_snake::ui::hud::{HudInfo, HudValueFlash};

/// Upper bound on how long one frame waits for input.
const FRAME_DURATION: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Difficulty: easy, normal or hard. Unknown names fall back to normal.
    #[arg(short, long, default_value = "normal")]
    difficulty: String,

    /// Grid width in cells.
    #[arg(long, default_value_t = DEFAULT_GRID_WIDTH, value_parser = clap::value_parser!(u16).range(2..=200))]
    width: u16,

    /// Grid height in cells.
    #[arg(long, default_value_t = DEFAULT_GRID_HEIGHT, value_parser = clap::value_parser!(u16).range(2..=200))]
    height: u16,

    /// Seed for food placement, for reproducible games.
    #[arg(long)]
    seed: Option<u64>,

    /// Keep the high score in memory only.
    #[arg(long = "no-save")]
    no_save: bool,

    /// Append log records to this file.
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref())?;

    let config = EngineConfig {
        grid: GridSize::new(cli.width, cli.height),
        tuning: Tuning::default(),
        difficulty: Difficulty::from_name(&cli.difficulty),
    };
    config
        .validate()
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;

    let engine = match cli.seed {
        Some(seed) => Engine::with_seed(config, seed),
        None => Engine::new(config),
    };

    if cli.no_save {
        run(Session::new(engine, MemoryStore::default()))
    } else {
        let store = JsonFileStore::at_default_path();
        log::info!("high score file: {}", store.path().display());
        run(Session::new(engine, store))
    }
}

fn run<S: HighScoreStore>(mut session: Session<S>) -> io::Result<()> {
    let mut terminal = TerminalSession::enter()?;
    let mut input = InputHandler::new();
    let mut value_flash = HudValueFlash::default();
    let mut previous_high_score = session.high_score();
    let mut last_frame = Instant::now();

    loop {
        let info = FrameInfo {
            hud: HudInfo {
                high_score: session.high_score(),
                now: Instant::now(),
                value_flash,
            },
            previous_high_score,
        };
        terminal
            .terminal_mut()
            .draw(|frame| renderer::render(frame, session.engine(), &info))?;

        if let Some(game_input) = input.poll_input(FRAME_DURATION)? {
            if game_input == GameInput::Quit {
                break;
            }
            handle_input(&mut session, game_input);
        }

        if session.engine().state() != RunState::GameOver {
            previous_high_score = session.high_score();
        }

        let now = Instant::now();
        session.advance(now.saturating_duration_since(last_frame));
        last_frame = now;

        for event in session.drain_events() {
            if let GameEvent::GameOver { score, reason } = event {
                log::debug!("run ended with {score} ({reason:?})");
            }
            value_flash.observe(event, now);
        }
    }

    Ok(())
}

fn handle_input<S: HighScoreStore>(session: &mut Session<S>, input: GameInput) {
    let state = session.engine().state();
    match input {
        GameInput::Direction(direction) => {
            let _ = session.set_direction(direction);
        }
        GameInput::TogglePause => session.toggle_pause(),
        GameInput::Confirm => match state {
            RunState::Idle | RunState::GameOver => session.start(),
            RunState::Paused => session.resume(),
            RunState::Running => {}
        },
        GameInput::Restart => session.restart(),
        GameInput::CycleDifficulty => {
            let next = session.engine().difficulty().next();
            session.select_difficulty(next);
            // On the start screen the choice waits for Enter.
            if state != RunState::Idle {
                session.restart();
            }
        }
        GameInput::Quit => {}
    }
}
