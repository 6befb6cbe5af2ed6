use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use maze_survival::config::{
    GameConfig, GeneratorConfig, BRAIDING_FACTOR, CLOCK_TICK, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
use maze_survival::tui::{self, Command, Renderer, TerminalGuard};
use maze_survival::Session;

const DEFAULT_RENDER_FPS: u64 = 60;
const DEFAULT_MOVE_DELAY_MS: u64 = 500;
const DEFAULT_MIN_DELAY_MS: u64 = 100;
/// How long the game-over screen stays up before a key restarts.
const RESTART_DELAY: Duration = Duration::from_secs(4);
const LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(author, version, about = "Outlast four pursuers in a procedurally generated maze", long_about = None)]
struct Args {
    /// Maze rows
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,

    /// Maze columns
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Seed for a reproducible sequence of mazes
    #[arg(long)]
    seed: Option<u64>,

    /// Chance that a dead end gets opened up, between 0 and 1
    #[arg(long, default_value_t = BRAIDING_FACTOR)]
    braid: f64,

    /// Render frames per second
    #[arg(long, env = "MAZE_SURVIVAL_FPS", default_value_t = DEFAULT_RENDER_FPS)]
    fps: u64,

    /// Initial delay between pursuer moves, in milliseconds
    #[arg(long, env = "MAZE_SURVIVAL_MOVE_DELAY_MS", default_value_t = DEFAULT_MOVE_DELAY_MS)]
    move_delay_ms: u64,

    /// Fastest the pursuers will ever get, in milliseconds
    #[arg(long, default_value_t = DEFAULT_MIN_DELAY_MS)]
    min_delay_ms: u64,

    /// Write logs to this file (filtered by RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn game_config(&self) -> Result<GameConfig> {
        ensure!(
            (0.0..=1.0).contains(&self.braid),
            "--braid must be between 0 and 1, got {}",
            self.braid
        );
        ensure!(self.fps > 0, "--fps must be positive");
        Ok(GameConfig {
            height: self.height,
            width: self.width,
            generator: GeneratorConfig {
                braiding_factor: self.braid,
                ..GeneratorConfig::default()
            },
            initial_move_delay: Duration::from_millis(self.move_delay_ms),
            min_move_delay: Duration::from_millis(self.min_delay_ms.min(self.move_delay_ms)),
            ..GameConfig::default()
        })
    }
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    // stdout belongs to the game screen; without a file there is nowhere to log.
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LOG_FILTER)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    let config = args.game_config()?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = Session::start(config, &mut rng).context("failed to build the first maze")?;

    let mut screen =
        TerminalGuard::enter(io::stdout()).context("failed to set up the terminal")?;
    let enhanced = screen.enhanced();
    info!(?config, enhanced, "starting");

    run(screen.out(), &mut session, &mut rng, args.fps, enhanced)
}

/// The single coordination loop: it alone mutates the session, multiplexing
/// input, the stopwatch, AI moves and repaints on deadlines.
fn run(
    out: &mut impl Write,
    session: &mut Session,
    rng: &mut StdRng,
    fps: u64,
    enhanced: bool,
) -> Result<()> {
    let frame_time = Duration::from_micros(1_000_000 / fps.max(1));
    let mut renderer = Renderer::new();
    let mut next_clock = Instant::now() + CLOCK_TICK;
    let mut next_ai = Instant::now() + session.move_delay();
    let mut caught_at: Option<Instant> = None;

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            match tui::translate(key) {
                Command::Quit => return Ok(()),
                Command::Press(_) | Command::Other if session.is_game_over() => {
                    let ready = caught_at.is_some_and(|t| t.elapsed() >= RESTART_DELAY);
                    if ready {
                        let (height, width) = (session.config().height, session.config().width);
                        session.regenerate(height, width, rng)?;
                        renderer.invalidate();
                        caught_at = None;
                        next_clock = Instant::now() + CLOCK_TICK;
                        next_ai = Instant::now() + session.move_delay();
                    }
                }
                Command::Press(dir) => {
                    session.press(dir)?;
                    if !enhanced {
                        // No release events will come; every press stands alone.
                        session.release(dir);
                    }
                }
                Command::Release(dir) => session.release(dir),
                Command::Other | Command::Ignore => {}
            }
        }

        let now = Instant::now();
        if !session.is_game_over() {
            while now >= next_clock {
                session.tick_clock();
                next_clock += CLOCK_TICK;
            }
            if now >= next_ai {
                session.tick_ai()?;
                next_ai = now + session.move_delay();
            }
        }
        if session.is_game_over() && caught_at.is_none() {
            caught_at = Some(now);
        }

        let status = match caught_at {
            Some(t) if t.elapsed() >= RESTART_DELAY => {
                format!("CAUGHT! Your time: {}  Press any key to retry", session.elapsed())
            }
            Some(_) => format!("CAUGHT! Your time: {}", session.elapsed()),
            None => String::new(),
        };
        tui::render(out, session, &mut renderer, &status)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        } else {
            warn!(
                "frame took {:.2}ms (budget {:.2}ms)",
                elapsed.as_secs_f64() * 1000.0,
                frame_time.as_secs_f64() * 1000.0
            );
        }
    }
}
