use heuristic_chess::board::{Board, EnPassant};
use heuristic_chess::engine::{Engine, EngineConfig};
use heuristic_chess::error::CastleError;
use heuristic_chess::game::{CastleOutcome, Controller, GameState, MoveOutcome, PlayerMode};
use heuristic_chess::piece::{Color, PieceType};
use heuristic_chess::save;
use heuristic_chess::square::Square;
use heuristic_chess::status::GameStatus;

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn dual(board: Board) -> GameState {
    GameState::from_board(board, PlayerMode::Dual, Controller::Man)
}

fn play(game: &mut GameState, moves: &[(&str, &str)]) {
    for &(from, to) in moves {
        let outcome = game.attempt_move(sq(from), sq(to));
        assert!(matches!(outcome, MoveOutcome::Applied { .. }), "{from}{to}: {outcome:?}");
    }
}

/// Positions from a seeded engine game, one per ply.
fn engine_positions(plies: usize) -> Vec<Board> {
    let mut engine = Engine::new(EngineConfig { seed: Some(2024), ..EngineConfig::default() });
    let mut game = GameState::new(PlayerMode::Demo, Color::White);
    let mut boards = vec![game.board.clone()];
    for _ in 0..plies {
        let Some(decision) = engine.compute_automated_move(&game) else {
            break;
        };
        game.play(&decision.mv).unwrap();
        boards.push(game.board.clone());
    }
    boards
}

#[test]
fn check_agrees_with_direct_simulation() {
    for board in engine_positions(80) {
        for color in [Color::White, Color::Black] {
            let Some(king) = board.find_king(color) else {
                continue;
            };
            let reached = board
                .pieces(color.opposite())
                .any(|(from, _)| board.pseudo_legal(from, king));
            assert_eq!(board.is_in_check(color), reached);
            assert_eq!(board.attacker_of(king, color).is_some(), reached);
        }
    }
}

#[test]
fn initial_setup_round_trips_byte_for_byte() {
    let state = save::parse(save::INITIAL_SETUP).unwrap();
    assert_eq!(save::serialize(&state), save::INITIAL_SETUP);
}

#[test]
fn initial_setup_matches_a_new_game() {
    let loaded = save::parse(save::INITIAL_SETUP).unwrap();
    let fresh = GameState::new(PlayerMode::Dual, Color::White);
    assert_eq!(loaded.board.snapshot(), fresh.board.snapshot());
    assert_eq!(loaded.side_to_move(), fresh.side_to_move());
    assert_eq!(loaded.controller, fresh.controller);
    assert_eq!(loaded.player_mode, fresh.player_mode);
}

#[test]
fn mid_game_file_round_trips_through_disk() {
    let mut game = GameState::new(PlayerMode::Single, Color::White);
    play(
        &mut game,
        &[("e2", "e4"), ("d7", "d5"), ("e4", "d5"), ("g8", "f6"), ("e1", "e2"), ("c7", "c5")],
    );
    assert!(game.board.en_passant.is_some());

    let path = std::env::temp_dir().join(format!("heuristic_chess_scenario_{}.txt", std::process::id()));
    save::save(&game, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let reloaded = save::load(&path).unwrap();
    save::save(&reloaded, &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    assert_eq!(text.lines().count(), 103);
    assert!(text.contains("these_rook_king_moved=e1\n"));
    assert!(text.contains("en_pass_pos=c6,c5\n"));
    assert!(text.contains("black_1=bi\n"));
    let _ = std::fs::remove_file(path);
}

#[test]
fn illegal_moves_leave_everything_untouched() {
    let mut game = GameState::new(PlayerMode::Dual, Color::White);
    play(&mut game, &[("e2", "e4"), ("d7", "d5")]);
    let before = game.board.clone();

    for (from, to) in [("e4", "e6"), ("e1", "e3"), ("d1", "d3"), ("a1", "a3"), ("d5", "d4"), ("c1", "c1")] {
        assert!(matches!(game.attempt_move(sq(from), sq(to)), MoveOutcome::Rejected(_)));
    }
    assert_eq!(game.board.snapshot(), before.snapshot());
    assert_eq!(game.board.captured_white, before.captured_white);
    assert_eq!(game.board.captured_black, before.captured_black);
    assert_eq!(game.board.castling, before.castling);
    assert_eq!(game.board.en_passant, before.en_passant);
}

#[test]
fn double_advance_sets_then_clears_en_passant_target() {
    let mut game = GameState::new(PlayerMode::Dual, Color::White);
    play(&mut game, &[("e2", "e4")]);
    assert_eq!(game.board.en_passant, Some(EnPassant { landing: sq("e3"), vacate: sq("e4") }));
    play(&mut game, &[("a7", "a6")]);
    assert_eq!(game.board.en_passant, None);
}

fn castling_board() -> Board {
    let mut board = Board::empty();
    board.put("e1", PieceType::King, Color::White).unwrap();
    board.put("h1", PieceType::Rook, Color::White).unwrap();
    board.put("e8", PieceType::King, Color::Black).unwrap();
    board
}

#[test]
fn kingside_castle_succeeds() {
    let mut game = dual(castling_board());
    let outcome = game.request_castle(sq("h1"));
    assert!(matches!(outcome, CastleOutcome::Castled(_)));
    assert_eq!(game.board.get(sq("g1")).map(|p| p.piece_type), Some(PieceType::King));
    assert_eq!(game.board.get(sq("f1")).map(|p| p.piece_type), Some(PieceType::Rook));
    assert!(game.board.get(sq("e1")).is_none());
    assert!(game.board.get(sq("h1")).is_none());
    assert!(game.board.castling.has_moved(sq("e1")));
    assert!(game.board.castling.has_moved(sq("h1")));
}

#[test]
fn castling_through_attacked_square_is_refused() {
    let mut board = castling_board();
    board.put("c5", PieceType::Bishop, Color::Black).unwrap();
    let mut game = dual(board);
    let before = game.board.clone();

    let outcome = game.request_castle(sq("h1"));
    assert_eq!(outcome, CastleOutcome::Rejected(CastleError::KingInCheck));
    assert_eq!(CastleError::KingInCheck.to_string(), "king in check during castling");
    assert_eq!(game.board.snapshot(), before.snapshot());
    assert_eq!(game.board.castling, before.castling);
    assert_eq!(game.side_to_move(), Color::White);
}

#[test]
fn bare_kings_are_drawn() {
    let mut board = Board::empty();
    board.put("e1", PieceType::King, Color::White).unwrap();
    board.put("e8", PieceType::King, Color::Black).unwrap();
    assert_eq!(dual(board).status(), GameStatus::DrawInsufficientMaterial);
}

#[test]
fn shuffling_knights_draws_by_repetition_at_ply_twelve() {
    let mut game = GameState::new(PlayerMode::Dual, Color::White);
    let cycle = [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")];

    play(&mut game, &cycle);
    play(&mut game, &cycle);
    assert_eq!(game.status(), GameStatus::InProgress);

    play(&mut game, &cycle);
    assert_eq!(game.status(), GameStatus::DrawRepetition);
    assert!(matches!(game.attempt_move(sq("e2"), sq("e4")), MoveOutcome::Rejected(_)));
}

#[test]
fn cornered_king_is_mated_by_queen_on_the_file() {
    let mut board = Board::empty();
    board.put("a8", PieceType::King, Color::Black).unwrap();
    board.put("a1", PieceType::Queen, Color::White).unwrap();
    board.put("b1", PieceType::Rook, Color::White).unwrap();
    board.put("h1", PieceType::King, Color::White).unwrap();
    board.current_turn = Color::Black;

    let game = dual(board);
    assert!(game.in_check());
    assert!(game.legal_destinations(sq("a8")).is_empty());
    assert_eq!(game.status(), GameStatus::Checkmate { winner: Color::White });
}

#[test]
fn engine_game_runs_to_a_legal_end() {
    let mut engine = Engine::new(EngineConfig { seed: Some(99), ..EngineConfig::default() });
    let mut game = GameState::new(PlayerMode::Demo, Color::White);
    for _ in 0..400 {
        let Some(decision) = engine.compute_automated_move(&game) else {
            break;
        };
        assert!(game.board.is_legal(decision.mv.from, decision.mv.to, game.side_to_move()));
        game.play(&decision.mv).unwrap();
        assert!(game.pending_promotion.is_none());
    }
    for color in [Color::White, Color::Black] {
        assert!(game.board.find_king(color).is_some());
    }
}
