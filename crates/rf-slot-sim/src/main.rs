//! rf-slot-sim: headless slot machine runner
//!
//! Steps a [`Game`] on a frame clock, pressing start whenever the machine is
//! idle, and prints session statistics as JSON.
//!
//! Usage:
//!   rf-slot-sim --spins 500 --seed 42      - Auto-play 500 spins
//!   rf-slot-sim --row seven,question,question,question,seven
//!                                          - Score one injected row
//!   rf-slot-sim --turbo --print-config     - Dump the turbo configuration
//!
//! Log verbosity comes from `RUST_LOG` (`RUST_LOG=rf_slot_machine=debug`).

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;

use rf_core::FrameClock;
use rf_slot_machine::{
    CombinationResult, Game, GameConfig, GameStats, InputEvent, Rect, StateKind, SymbolRow,
    TimingProfile, format_row, parse_row,
};

/// Hit boxes of a virtual 800×600 cabinet
const START_BUTTON: Rect = Rect::new(560.0, 520.0, 100.0, 50.0);
const STOP_BUTTON: Rect = Rect::new(680.0, 520.0, 100.0, 50.0);

#[derive(Parser, Debug)]
#[command(name = "rf-slot-sim", about = "Headless slot machine simulator")]
struct Cli {
    /// Number of spin results to collect
    #[arg(short, long, default_value_t = 100)]
    spins: u64,

    /// RNG seed (entropy-seeded when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated frames per second
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Stop the reels on this row and report its result
    #[arg(long, value_name = "SYMBOLS")]
    row: Option<String>,

    /// Use the turbo timing profile
    #[arg(long)]
    turbo: bool,

    /// Print the active configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

/// Auto-play summary
#[derive(Debug, Serialize)]
struct SessionReport<'a> {
    config: &'a str,
    seed: Option<u64>,
    frames: u64,
    simulated_seconds: f64,
    stats: &'a GameStats,
    hit_rate: f64,
    average_points: f64,
}

/// Injected row outcome
#[derive(Debug, Serialize)]
struct RowReport {
    row: String,
    landed: String,
    result: CombinationResult,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let profile = if cli.turbo {
        TimingProfile::Turbo
    } else {
        TimingProfile::Normal
    };
    let config = Arc::new(GameConfig::from_profile(profile));
    config.validate().context("invalid game configuration")?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(config.as_ref())?);
        return Ok(());
    }

    if !(cli.fps.is_finite() && cli.fps > 0.0) {
        bail!("--fps must be a positive number, got {}", cli.fps);
    }
    let dt = 1.0 / cli.fps;

    let mut game = build_game(Arc::clone(&config), cli.seed);
    log::info!(
        "Starting {} ({:?} timing) at {} fps",
        config.name,
        profile,
        cli.fps
    );

    if let Some(text) = cli.row.as_deref() {
        let row = parse_row(text).with_context(|| format!("invalid --row {text:?}"))?;
        let report = run_row(&mut game, row, dt)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let frames = run_spins(&mut game, cli.spins, dt)?;
    let stats = game.stats();
    let report = SessionReport {
        config: &config.name,
        seed: cli.seed,
        frames,
        simulated_seconds: game.now().as_secs_f64(),
        stats,
        hit_rate: stats.hit_rate(),
        average_points: stats.average_points(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn build_game(config: Arc<GameConfig>, seed: Option<u64>) -> Game<FrameClock> {
    let mut game = match seed {
        Some(seed) => Game::with_seed(config, FrameClock::new(), seed),
        None => Game::with_clock(config, FrameClock::new()),
    };
    let machine = game.machine_mut();
    machine.start_control_mut().set_hitbox(START_BUTTON);
    machine.stop_control_mut().set_hitbox(STOP_BUTTON);
    game
}

fn press(game: &mut Game<FrameClock>, button: Rect) {
    let (x, y) = button.center();
    game.process_input(&InputEvent::pressed(x, y));
}

/// Upper bound on one spin cycle, free spins included
fn cycle_seconds(config: &GameConfig) -> f64 {
    let timing = &config.timing;
    timing.max_spin.0 + timing.stop.max.0 + timing.result_show.0 + 1.0
}

/// Play until `spins` results were shown; returns the frame count
///
/// Start is pressed whenever the machine is idle; the stop button is left
/// alone so every spin ends on its time-out.
fn run_spins(game: &mut Game<FrameClock>, spins: u64, dt: f64) -> Result<u64> {
    let budget = (spins as f64 * cycle_seconds(game.config()) / dt).ceil() as u64 + 1;
    let mut frames = 0;

    while game.stats().spins < spins {
        if frames >= budget {
            bail!(
                "simulation stalled in {:?} after {} of {spins} spins",
                game.state_kind(),
                game.stats().spins
            );
        }
        if game.state_kind() == StateKind::Idle {
            press(game, START_BUTTON);
        }
        game.update(dt);
        frames += 1;

        if frames % 10_000 == 0 {
            log::debug!("{frames} frames, {} spins", game.stats().spins);
        }
    }

    Ok(frames)
}

/// Inject `row` and wait until the reels have landed on it
fn run_row(game: &mut Game<FrameClock>, row: SymbolRow, dt: f64) -> Result<RowReport> {
    game.set_symbol_row(row);

    let budget = ((game.config().timing.test_stop.0 + 1.0) / dt).ceil() as u64;
    let mut frames = 0;
    while !(game.state_kind() == StateKind::Result && game.machine().all_reels_at_rest()) {
        if frames >= budget {
            bail!("reels did not land within {budget} frames");
        }
        game.update(dt);
        frames += 1;
    }

    let result = *game
        .last_result()
        .context("row was injected but never scored")?;
    Ok(RowReport {
        row: format_row(&row),
        landed: format_row(&game.get_symbol_row()),
        result,
    })
}
