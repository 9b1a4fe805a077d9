use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::piece::{Color, PieceType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Checkmate { winner: Color },
    Stalemate,
    DrawInsufficientMaterial,
    DrawRepetition,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        self != GameStatus::InProgress
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "in progress"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            GameStatus::Stalemate => write!(f, "draw by stalemate"),
            GameStatus::DrawInsufficientMaterial => write!(f, "draw by insufficient material"),
            GameStatus::DrawRepetition => write!(f, "draw by repetition"),
        }
    }
}

/// Classifies the position for the side to move, in order: checkmate,
/// stalemate, insufficient material, repetition. The repetition window is
/// expected to hold the positions before the current one.
pub fn evaluate(board: &Board) -> GameStatus {
    let side = board.current_turn;
    if !board.has_legal_move(side) {
        return if board.is_in_check(side) {
            GameStatus::Checkmate { winner: side.opposite() }
        } else {
            GameStatus::Stalemate
        };
    }
    if has_insufficient_material(board) {
        return GameStatus::DrawInsufficientMaterial;
    }
    if board.history.recurs(&board.snapshot()) {
        return GameStatus::DrawRepetition;
    }
    GameStatus::InProgress
}

/// King vs king, king vs king and one minor piece, or king and bishop
/// against king and bishop with both bishops on the same square colour.
pub fn has_insufficient_material(board: &Board) -> bool {
    let white: Vec<_> = board
        .pieces(Color::White)
        .filter(|(_, p)| p.piece_type != PieceType::King)
        .collect();
    let black: Vec<_> = board
        .pieces(Color::Black)
        .filter(|(_, p)| p.piece_type != PieceType::King)
        .collect();

    match (white.as_slice(), black.as_slice()) {
        ([], []) => true,
        ([(_, p)], []) | ([], [(_, p)]) => p.piece_type.is_minor(),
        ([(ws, wp)], [(bs, bp)]) => {
            wp.piece_type == PieceType::Bishop
                && bp.piece_type == PieceType::Bishop
                && ws.is_light() == bs.is_light()
        }
        _ => false,
    }
}
