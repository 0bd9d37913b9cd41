//! Go Text Protocol (GTP) adapter.
//!
//! GTP is a text-based protocol for communicating with Go-playing programs.
//! This module implements the GTP version 2 subset needed to play NoGo from a
//! controller such as GoGui, plus the GoGui rules extensions and a few engine
//! specific commands.
//!
//! Commands are dispatched through the static [`COMMANDS`] table, which also
//! records how many arguments each command takes.
//!
//! ## Engine Specific Commands
//!
//! - `solve` - Prove the current position: `b [move]`, `w [move]` or `unknown`
//! - `timelimit <secs>` - Time budget for `solve`
//! - `policy {random|pattern}` - Playout policy
//! - `selection {rr|ucb}` - Simulation allocation over candidates
//! - `policy_moves` - Moves and probabilities of the playout policy
//! - `move_filter {on|off}` - Skip own-eye filling moves in playouts
//!
//! ## Example
//!
//! ```ignore
//! use nogo::gtp::GtpEngine;
//! let mut engine = GtpEngine::new(Board::new(7), player);
//! engine.run_stdio()?;
//! ```

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use log::debug;

use crate::board::{Board, Color};
use crate::constants::{ENGINE_NAME, GAME_ID, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::player::{Player, SelectionMode};
use crate::playout::{self, SimulationPolicy};
use crate::solver;

type Handler = fn(&mut GtpEngine, &[&str]) -> Result<String>;

/// One entry of the command table.
pub struct Command {
    pub name: &'static str,
    /// Exact number of arguments, if checked
    pub arity: Option<usize>,
    pub usage: &'static str,
    handler: Handler,
}

const fn command(name: &'static str, arity: Option<usize>, usage: &'static str, handler: Handler) -> Command {
    Command {
        name,
        arity,
        usage,
        handler,
    }
}

/// All supported commands.
pub const COMMANDS: &[Command] = &[
    command("protocol_version", None, "", GtpEngine::protocol_version),
    command("quit", None, "", GtpEngine::quit),
    command("name", None, "", GtpEngine::name),
    command("version", None, "", GtpEngine::version),
    command("known_command", Some(1), "Usage: known_command CMD_NAME", GtpEngine::known_command),
    command("list_commands", None, "", GtpEngine::list_commands),
    command("boardsize", Some(1), "Usage: boardsize INT", GtpEngine::boardsize),
    command("clear_board", None, "", GtpEngine::clear_board),
    command("showboard", None, "", GtpEngine::showboard),
    command("komi", Some(1), "Usage: komi FLOAT", GtpEngine::set_komi),
    command("play", Some(2), "Usage: play {b,w} MOVE", GtpEngine::play),
    command("genmove", Some(1), "Usage: genmove {w,b}", GtpEngine::genmove),
    command("solve", None, "", GtpEngine::solve),
    command("timelimit", Some(1), "Usage: timelimit INT", GtpEngine::timelimit),
    command("legal_moves", Some(1), "Usage: legal_moves {w,b}", GtpEngine::legal_moves),
    command("gogui-analyze_commands", None, "", GtpEngine::gogui_analyze_commands),
    command("gogui-rules_game_id", None, "", GtpEngine::gogui_rules_game_id),
    command("gogui-rules_board_size", None, "", GtpEngine::gogui_rules_board_size),
    command("gogui-rules_side_to_move", None, "", GtpEngine::gogui_rules_side_to_move),
    command("gogui-rules_board", None, "", GtpEngine::gogui_rules_board),
    command("gogui-rules_legal_moves", None, "", GtpEngine::gogui_rules_legal_moves),
    command("gogui-rules_final_result", None, "", GtpEngine::gogui_rules_final_result),
    command("policy", Some(1), "Usage: policy POLICYTYPE", GtpEngine::policy),
    command("selection", Some(1), "Usage: selection SELECTIONTYPE", GtpEngine::selection),
    command("policy_moves", None, "", GtpEngine::policy_moves),
    command("move_filter", Some(1), "Usage: move_filter {on,off}", GtpEngine::move_filter),
];

fn find_command(name: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|c| c.name == name)
}

/// GTP engine state.
pub struct GtpEngine {
    /// Current game position
    board: Board,
    player: Player,
    /// Accepted for protocol compatibility, NoGo has no scoring
    komi: f32,
}

impl GtpEngine {
    pub fn new(board: Board, player: Player) -> Self {
        Self {
            board,
            player,
            komi: 0.0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn komi(&self) -> f32 {
        self.komi
    }

    /// Run the GTP command loop on stdin/stdout.
    pub fn run_stdio(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run(stdin.lock(), stdout.lock())
    }

    /// Run the GTP command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("reading command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            write!(output, "{prefix}{id_str} {message}\n\n").context("writing response")?;
            output.flush().context("flushing response")?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a GTP command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        let Some(cmd) = find_command(command) else {
            debug!("unknown command: {command}");
            return (false, "unknown command".to_string());
        };
        if cmd.arity.is_some_and(|n| n != args.len()) {
            return (false, cmd.usage.to_string());
        }
        match (cmd.handler)(self, args) {
            Ok(response) => (true, response),
            Err(e) => (false, format!("{e:#}")),
        }
    }

    fn protocol_version(&mut self, _args: &[&str]) -> Result<String> {
        Ok("2".to_string())
    }

    fn quit(&mut self, _args: &[&str]) -> Result<String> {
        Ok(String::new())
    }

    fn name(&mut self, _args: &[&str]) -> Result<String> {
        Ok(ENGINE_NAME.to_string())
    }

    fn version(&mut self, _args: &[&str]) -> Result<String> {
        Ok(env!("CARGO_PKG_VERSION").to_string())
    }

    fn known_command(&mut self, args: &[&str]) -> Result<String> {
        let known = find_command(&args[0].to_lowercase()).is_some();
        Ok(known.to_string())
    }

    fn list_commands(&mut self, _args: &[&str]) -> Result<String> {
        Ok(COMMANDS.iter().map(|c| c.name).collect::<Vec<_>>().join("\n"))
    }

    fn boardsize(&mut self, args: &[&str]) -> Result<String> {
        let size: usize = args[0]
            .parse()
            .map_err(|_| anyhow!("invalid size '{}'", args[0]))?;
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            bail!("unacceptable size, must be {MIN_BOARD_SIZE}..={MAX_BOARD_SIZE} (got {size})");
        }
        self.board.reset(size);
        Ok(String::new())
    }

    fn clear_board(&mut self, _args: &[&str]) -> Result<String> {
        self.board.reset(self.board.size());
        Ok(String::new())
    }

    fn showboard(&mut self, _args: &[&str]) -> Result<String> {
        Ok(format!("\n{}", self.board.to_string().trim_end()))
    }

    fn set_komi(&mut self, args: &[&str]) -> Result<String> {
        self.komi = args[0]
            .parse()
            .map_err(|_| anyhow!("invalid komi '{}'", args[0]))?;
        Ok(String::new())
    }

    fn play(&mut self, args: &[&str]) -> Result<String> {
        let (color_arg, move_arg) = (args[0].to_lowercase(), args[1].to_lowercase());
        let Some(color) = Color::from_gtp(&color_arg) else {
            bail!("illegal move: \"{color_arg} {move_arg}\" wrong color");
        };
        if move_arg == "pass" {
            bail!("illegal move: \"{color_arg} {move_arg}\" wrong coordinate");
        }
        let point = self
            .board
            .parse_point(&move_arg)
            .map_err(|e| anyhow!("illegal move: \"{color_arg} {move_arg}\" {e}"))?;
        self.board
            .play_move(point, color)
            .map_err(|e| anyhow!("illegal move: \"{color_arg} {move_arg}\" {e}"))?;
        debug!("move: {move_arg}\nboard:\n{}", self.board);
        Ok(String::new())
    }

    fn genmove(&mut self, args: &[&str]) -> Result<String> {
        let color = Color::from_gtp(args[0]).ok_or_else(|| anyhow!("invalid color '{}'", args[0]))?;
        let Some(point) = self.player.get_move(&self.board, color) else {
            return Ok("resign".to_string());
        };
        self.board
            .play_move(point, color)
            .with_context(|| format!("engine chose illegal move {}", self.board.format_point(point)))?;
        Ok(self.board.format_point(point).to_lowercase())
    }

    fn solve(&mut self, _args: &[&str]) -> Result<String> {
        let to_play = self.board.current_player();
        let outcome = solver::solve(&mut self.board, to_play, self.player.config.time_limit);
        if outcome.truncated {
            return Ok("unknown".to_string());
        }
        let response = match (outcome.color_wins, outcome.winning_move) {
            (true, Some(mv)) => format!("{} {}", to_play.letter(), self.board.format_point(mv).to_lowercase()),
            (true, None) => to_play.letter().to_string(),
            (false, _) => to_play.opponent().letter().to_string(),
        };
        Ok(response)
    }

    fn timelimit(&mut self, args: &[&str]) -> Result<String> {
        let secs: u64 = args[0]
            .parse()
            .map_err(|_| anyhow!("invalid time limit '{}'", args[0]))?;
        self.player.config.time_limit = Duration::from_secs(secs);
        Ok(String::new())
    }

    fn sorted_legal_moves(&self, color: Color) -> String {
        let mut moves: Vec<String> = self
            .board
            .legal_moves(color)
            .into_iter()
            .map(|p| self.board.format_point(p))
            .collect();
        moves.sort();
        moves.join(" ")
    }

    fn legal_moves(&mut self, args: &[&str]) -> Result<String> {
        let color = Color::from_gtp(args[0]).ok_or_else(|| anyhow!("invalid color '{}'", args[0]))?;
        Ok(self.sorted_legal_moves(color))
    }

    fn gogui_analyze_commands(&mut self, _args: &[&str]) -> Result<String> {
        Ok([
            "pstring/Legal Moves For ToPlay/gogui-rules_legal_moves",
            "pstring/Side to Play/gogui-rules_side_to_move",
            "pstring/Final Result/gogui-rules_final_result",
            "pstring/Board Size/gogui-rules_board_size",
            "pstring/Rules GameID/gogui-rules_game_id",
            "pstring/Show Board/gogui-rules_board",
        ]
        .join("\n"))
    }

    fn gogui_rules_game_id(&mut self, _args: &[&str]) -> Result<String> {
        Ok(GAME_ID.to_string())
    }

    fn gogui_rules_board_size(&mut self, _args: &[&str]) -> Result<String> {
        Ok(self.board.size().to_string())
    }

    fn gogui_rules_side_to_move(&mut self, _args: &[&str]) -> Result<String> {
        Ok(self.board.current_player().name().to_string())
    }

    fn gogui_rules_board(&mut self, _args: &[&str]) -> Result<String> {
        Ok(self.board.to_string().trim_end().to_string())
    }

    fn gogui_rules_legal_moves(&mut self, _args: &[&str]) -> Result<String> {
        Ok(self.sorted_legal_moves(self.board.current_player()))
    }

    fn gogui_rules_final_result(&mut self, _args: &[&str]) -> Result<String> {
        Ok(match self.board.winner() {
            Some(color) => color.name().to_string(),
            None => "unknown".to_string(),
        })
    }

    fn policy(&mut self, args: &[&str]) -> Result<String> {
        self.player.config.policy = match args[0].to_lowercase().as_str() {
            "random" => SimulationPolicy::Random,
            "pattern" => SimulationPolicy::Pattern,
            other => bail!("unknown policy '{other}'"),
        };
        Ok(String::new())
    }

    fn selection(&mut self, args: &[&str]) -> Result<String> {
        self.player.config.selection = match args[0].to_lowercase().as_str() {
            "rr" => SelectionMode::RoundRobin,
            "ucb" => SelectionMode::Ucb,
            other => bail!("unknown selection '{other}'"),
        };
        Ok(String::new())
    }

    fn move_filter(&mut self, args: &[&str]) -> Result<String> {
        self.player.config.move_filter = match args[0].to_lowercase().as_str() {
            "on" | "true" | "1" => true,
            "off" | "false" | "0" => false,
            other => bail!("unknown move filter setting '{other}'"),
        };
        Ok(String::new())
    }

    fn policy_moves(&mut self, _args: &[&str]) -> Result<String> {
        let mut moves: Vec<(String, f64)> = playout::policy_moves(
            &self.board,
            self.player.config.policy,
            self.player.weights(),
            self.player.config.move_filter,
        )
        .into_iter()
        .map(|(p, prob)| (self.board.format_point(p).to_lowercase(), prob))
        .collect();
        moves.sort_by(|a, b| a.0.cmp(&b.0));

        let names = moves.iter().map(|(m, _)| m.clone());
        let probs = moves.iter().map(|(_, p)| format!("{}", (p * 1000.0).round() / 1000.0));
        Ok(names.chain(probs).collect::<Vec<_>>().join(" "))
    }
}
