//! Integration tests for the NoGo engine
//!
//! Rules, playouts, move generation and the GTP adapter, exercised through the
//! public API only.

use std::collections::HashMap;
use std::io::Cursor;

use fastrand::Rng;

use nogo::board::{Board, Cell, Color, MoveError, Point};
use nogo::gtp::GtpEngine;
use nogo::patterns::PatternWeights;
use nogo::player::{Player, PlayerConfig, SelectionMode};
use nogo::playout::{SimulationPolicy, generate_pattern_move, generate_random_move, simulate_playout};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

/// Place stones given as GTP coordinates, ignoring turn order.
fn setpos(size: usize, black: &[&str], white: &[&str]) -> Board {
    let mut board = Board::new(size);
    for mv in black {
        let p = board.parse_point(mv).unwrap();
        board.play_move(p, Color::Black).unwrap();
    }
    for mv in white {
        let p = board.parse_point(mv).unwrap();
        board.play_move(p, Color::White).unwrap();
    }
    board
}

/// Play `plies` random legal moves from the empty board.
fn random_position(size: usize, plies: usize, rng: &mut Rng) -> Board {
    let mut board = Board::new(size);
    for _ in 0..plies {
        let color = board.current_player();
        match generate_random_move(&board, false, rng) {
            Some(mv) => board.play_move(mv, color).unwrap(),
            None => break,
        }
    }
    board
}

fn occupied(board: &Board) -> Vec<Point> {
    board.points().filter(|&p| board.get_color(p) != Cell::Empty).collect()
}

/// Run a GTP session over `input` and return everything written.
fn gtp_session(input: &str) -> String {
    let config = PlayerConfig {
        sims_per_move: 2,
        seed: Some(9),
        ..PlayerConfig::default()
    };
    let player = Player::new(config, PatternWeights::empty());
    let mut engine = GtpEngine::new(Board::new(7), player);
    let mut output = Vec::new();
    engine.run(Cursor::new(input), &mut output).unwrap();
    String::from_utf8(output).unwrap()
}

// =============================================================================
// Rules scenarios
// =============================================================================

#[test]
fn test_first_move_on_2x2_leaves_every_point_legal() {
    let mut board = Board::new(2);
    board.play_move(board.pt(1, 1), Color::Black).unwrap();

    for p in board.get_empty_points() {
        assert!(board.is_legal(p, Color::White), "{} should be legal", board.format_point(p));
    }
    assert_eq!(board.legal_moves(Color::White).len(), 3);
}

#[test]
fn test_completing_encirclement_is_capture() {
    // Black at B2 with White on three sides; B3 is its last liberty.
    let mut board = setpos(3, &["B2"], &["B1", "A2", "C2"]);
    let before = board.clone();
    let b3 = board.parse_point("B3").unwrap();

    assert_eq!(board.check_move(b3, Color::White), Err(MoveError::Capture));
    assert_eq!(board.play_move(b3, Color::White), Err(MoveError::Capture));
    assert_eq!(board, before);
    assert_eq!(board.get_color(board.parse_point("B2").unwrap()), Cell::Black);
}

#[test]
fn test_suicide_rejected_and_board_unchanged() {
    let mut board = setpos(5, &[], &["B1", "A2"]);
    let before = board.clone();
    let a1 = board.parse_point("A1").unwrap();

    assert_eq!(board.play_move(a1, Color::Black), Err(MoveError::Suicide));
    assert_eq!(board, before);
    // White may fill its own eye: the block B1-A1-A2 keeps outside liberties.
    assert!(board.is_legal(a1, Color::White));
}

#[test]
fn test_occupied_rejected() {
    let mut board = setpos(4, &["C3"], &[]);
    let c3 = board.parse_point("C3").unwrap();
    assert_eq!(board.play_move(c3, Color::White), Err(MoveError::Occupied));
    assert_eq!(board.play_move(c3, Color::Black), Err(MoveError::Occupied));
}

// =============================================================================
// Invariants over random positions
// =============================================================================

#[test]
fn test_is_legal_matches_play_on_clone() {
    let mut rng = Rng::with_seed(2024);
    for size in [3, 4, 5] {
        for plies in 0..size * size {
            let board = random_position(size, plies, &mut rng);
            for p in board.points() {
                for color in [Color::Black, Color::White] {
                    let mut clone = board.clone();
                    let played = clone.play_move(p, color);
                    assert_eq!(board.is_legal(p, color), played.is_ok());
                    if played.is_err() {
                        assert_eq!(clone, board);
                    }
                }
            }
        }
    }
}

#[test]
fn test_occupancy_is_monotonic() {
    let mut rng = Rng::with_seed(77);
    for _ in 0..10 {
        let mut board = Board::new(6);
        let mut previous = occupied(&board);
        loop {
            let color = board.current_player();
            let Some(mv) = generate_random_move(&board, false, &mut rng) else {
                break;
            };
            board.play_move(mv, color).unwrap();
            let now = occupied(&board);
            assert!(previous.iter().all(|p| now.contains(p)));
            assert_eq!(now.len(), previous.len() + 1);
            previous = now;
        }
    }
}

#[test]
fn test_make_unmake_restores_random_positions() {
    let mut rng = Rng::with_seed(5);
    for plies in 0..16 {
        let mut board = random_position(4, plies, &mut rng);
        let before = board.clone();
        for mv in before.legal_moves(before.current_player()) {
            let undo = board.make_move(mv, before.current_player()).unwrap();
            board.unmake(undo);
            assert_eq!(board, before);
        }
    }
}

// =============================================================================
// Playouts
// =============================================================================

#[test]
fn test_playout_terminates_within_area() {
    let weights = PatternWeights::uniform(1.0);
    let mut rng = Rng::with_seed(31);
    for size in [2, 5, 9] {
        for policy in [SimulationPolicy::Random, SimulationPolicy::Pattern] {
            let mut board = Board::new(size);
            let winner = simulate_playout(&mut board, policy, &weights, false, &mut rng);
            assert!(board.stone_count() <= size * size);
            assert!(!board.has_legal_move(board.current_player()));
            assert_eq!(winner, board.current_player().opponent());
        }
    }
}

#[test]
fn test_uniform_pattern_weights_match_random_policy() {
    let board = setpos(4, &["B2", "C3"], &["C2"]);
    let legal = board.legal_moves(board.current_player());
    let expected = 1.0 / legal.len() as f64;
    let weights = PatternWeights::uniform(1.0);
    let trials = 8000;

    let mut rng = Rng::with_seed(123);
    let mut random_counts: HashMap<Point, usize> = HashMap::new();
    let mut pattern_counts: HashMap<Point, usize> = HashMap::new();
    for _ in 0..trials {
        let r = generate_random_move(&board, false, &mut rng).unwrap();
        *random_counts.entry(r).or_default() += 1;
        let p = generate_pattern_move(&board, &weights, false, &mut rng).unwrap();
        *pattern_counts.entry(p).or_default() += 1;
    }

    for mv in &legal {
        let random = random_counts.get(mv).copied().unwrap_or(0) as f64 / trials as f64;
        let pattern = pattern_counts.get(mv).copied().unwrap_or(0) as f64 / trials as f64;
        assert!((random - expected).abs() < 0.03, "random {random} vs {expected}");
        assert!((pattern - expected).abs() < 0.03, "pattern {pattern} vs {expected}");
        assert!((random - pattern).abs() < 0.04);
    }
    assert_eq!(random_counts.len(), legal.len());
    assert_eq!(pattern_counts.len(), legal.len());
}

// =============================================================================
// Move generation
// =============================================================================

#[test]
fn test_player_is_reproducible_with_seed() {
    let board = setpos(5, &["C3"], &["D4"]);
    let config = PlayerConfig {
        sims_per_move: 4,
        selection: SelectionMode::Ucb,
        seed: Some(17),
        ..PlayerConfig::default()
    };
    let mut a = Player::new(config.clone(), PatternWeights::empty());
    let mut b = Player::new(config, PatternWeights::empty());
    assert_eq!(a.get_move(&board, Color::Black), b.get_move(&board, Color::Black));
}

#[test]
fn test_self_play_ends_with_winner() {
    let config = PlayerConfig {
        sims_per_move: 2,
        seed: Some(3),
        ..PlayerConfig::default()
    };
    let mut player = Player::new(config, PatternWeights::empty());
    let mut board = Board::new(4);
    while let Some(mv) = player.get_move(&board, board.current_player()) {
        let color = board.current_player();
        board.play_move(mv, color).unwrap();
    }
    assert!(board.stone_count() <= 16);
    assert_eq!(board.winner(), Some(board.current_player().opponent()));
}

// =============================================================================
// GTP end to end
// =============================================================================

#[test]
fn test_gtp_basic_session() {
    let output = gtp_session("1 name\n2 boardsize 2\nplay b a1\n3 legal_moves w\nquit\n");
    assert_eq!(output, "=1 NoGo\n\n=2 \n\n= \n\n=3 A2 B1 B2\n\n= \n\n");
}

#[test]
fn test_gtp_errors_and_comments() {
    let output = gtp_session("# comment\n\n5 undo\nplay b a1\nplay w a1\n");
    assert_eq!(
        output,
        "?5 unknown command\n\n= \n\n? illegal move: \"w a1\" occupied\n\n"
    );
}

#[test]
fn test_gtp_stops_at_quit() {
    let output = gtp_session("quit\nname\n");
    assert_eq!(output, "= \n\n");
}

#[test]
fn test_gtp_game_to_the_end() {
    let output = gtp_session(
        "boardsize 2\nplay b a1\nplay w b2\ngenmove b\ngogui-rules_final_result\n\
         gogui-rules_legal_moves\ngenmove w\n",
    );
    let responses: Vec<&str> = output.split("\n\n").filter(|r| !r.is_empty()).collect();
    assert_eq!(responses.len(), 7);
    assert!(responses[3] == "= a2" || responses[3] == "= b1");
    assert_eq!(responses[4], "= black");
    assert_eq!(responses[5], "= ");
    assert_eq!(responses[6], "= resign");
}

#[test]
fn test_gtp_rules_queries() {
    let output = gtp_session(
        "boardsize 3\nplay b b2\ngogui-rules_board_size\ngogui-rules_side_to_move\n\
         gogui-rules_board\ngogui-rules_game_id\n",
    );
    let responses: Vec<&str> = output.split("\n\n").filter(|r| !r.is_empty()).collect();
    assert_eq!(responses[2], "= 3");
    assert_eq!(responses[3], "= white");
    assert_eq!(responses[4], "= ...\n.X.\n...");
    assert_eq!(responses[5], "= NoGo");
}
