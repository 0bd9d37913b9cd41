//! NoGo engine command line.
//!
//! ## Usage
//!
//! - `nogo` - Start the GTP server
//! - `nogo gtp` - Start the GTP server for GUI integration
//! - `nogo demo` - Play a self-play game and print it
//! - `nogo solve` - Prove the empty board for the side to move

use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use nogo::board::Board;
use nogo::constants::{
    DEFAULT_BOARD_SIZE, DEFAULT_EXPLORATION, DEFAULT_SIMULATIONS, DEFAULT_WEIGHTS_FILE,
    MAX_BOARD_SIZE, MIN_BOARD_SIZE,
};
use nogo::gtp::GtpEngine;
use nogo::patterns::PatternWeights;
use nogo::player::{Player, PlayerConfig, SelectionMode};
use nogo::playout::SimulationPolicy;
use nogo::solver;

/// NoGo engine: Monte Carlo player and exact solver
#[derive(Parser)]
#[command(name = "nogo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Board size
    #[arg(long, global = true, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,

    /// Simulations per candidate move
    #[arg(long, global = true, default_value_t = DEFAULT_SIMULATIONS)]
    sim: usize,

    /// How simulations are spread over candidate moves
    #[arg(long, global = true, value_enum, default_value_t = MoveSelect::Simple)]
    move_select: MoveSelect,

    /// Playout policy
    #[arg(long, global = true, value_enum, default_value_t = SimRule::Random)]
    sim_rule: SimRule,

    /// Skip moves that fill the mover's own eyes in playouts
    #[arg(long, global = true)]
    move_filter: bool,

    /// Pattern weight file
    #[arg(long, global = true, default_value = DEFAULT_WEIGHTS_FILE)]
    weights: PathBuf,

    /// Solver time limit in seconds
    #[arg(long, global = true)]
    time_limit: Option<u64>,

    /// Seed for the playout RNG
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp,
    /// Play one self-play game and print every move
    Demo,
    /// Prove the empty board for Black
    Solve,
}

#[derive(Clone, Copy, ValueEnum)]
enum MoveSelect {
    Simple,
    Ucb,
}

#[derive(Clone, Copy, ValueEnum)]
enum SimRule {
    Random,
    Pattern,
}

impl Cli {
    fn player_config(&self) -> PlayerConfig {
        let mut config = PlayerConfig {
            sims_per_move: self.sim,
            selection: match self.move_select {
                MoveSelect::Simple => SelectionMode::RoundRobin,
                MoveSelect::Ucb => SelectionMode::Ucb,
            },
            policy: match self.sim_rule {
                SimRule::Random => SimulationPolicy::Random,
                SimRule::Pattern => SimulationPolicy::Pattern,
            },
            move_filter: self.move_filter,
            exploration: DEFAULT_EXPLORATION,
            seed: self.seed,
            ..PlayerConfig::default()
        };
        if let Some(secs) = self.time_limit {
            config.time_limit = Duration::from_secs(secs);
        }
        config
    }
}

fn init_logger(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    );
    builder
        .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.debug);

    if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&cli.size) {
        bail!("board size must be {MIN_BOARD_SIZE}..={MAX_BOARD_SIZE}, got {}", cli.size);
    }

    let config = cli.player_config();
    match cli.command {
        Some(Commands::Gtp) | None => {
            let weights = PatternWeights::load_or_empty(&cli.weights);
            let mut engine = GtpEngine::new(Board::new(cli.size), Player::new(config, weights));
            engine.run_stdio().context("GTP session failed")
        }
        Some(Commands::Demo) => {
            let weights = PatternWeights::load_or_empty(&cli.weights);
            run_demo(cli.size, Player::new(config, weights))
        }
        Some(Commands::Solve) => run_solve(cli.size, config.time_limit),
    }
}

fn run_demo(size: usize, mut player: Player) -> Result<()> {
    println!(
        "NoGo self-play on {size}x{size} ({} sims/move, {}, {})\n",
        player.config.sims_per_move,
        player.config.selection.name(),
        player.config.policy.name(),
    );

    let mut board = Board::new(size);
    let mut ply = 1;
    loop {
        let color = board.current_player();
        let Some(mv) = player.get_move(&board, color) else {
            break;
        };
        board
            .play_move(mv, color)
            .with_context(|| format!("player chose illegal move {}", board.format_point(mv)))?;
        println!("{ply:3}. {} {}", color.letter(), board.format_point(mv));
        ply += 1;
    }

    println!("\n{board}");
    match board.winner() {
        Some(winner) => println!("{} wins", winner.name()),
        None => println!("no result"),
    }
    Ok(())
}

fn run_solve(size: usize, time_limit: Duration) -> Result<()> {
    let mut board = Board::new(size);
    let color = board.current_player();
    info!("solving {size}x{size} for {} with a {}s limit", color.name(), time_limit.as_secs());

    let start = Instant::now();
    let outcome = solver::solve(&mut board, color, time_limit);
    let elapsed = start.elapsed().as_secs_f64();

    if outcome.truncated {
        println!("unknown (time limit reached after {elapsed:.2}s)");
        return Ok(());
    }
    let winner = if outcome.color_wins { color } else { color.opponent() };
    match outcome.winning_move {
        Some(mv) if outcome.color_wins => {
            println!("{} wins with {} ({elapsed:.2}s)", winner.name(), board.format_point(mv))
        }
        _ => println!("{} wins ({elapsed:.2}s)", winner.name()),
    }
    Ok(())
}
