// Error types for loading, moving, castling and promoting.
//
// Move and castle rejections are ordinary outcomes reported back to the
// player; load errors are the only ones that can end a session.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::piece::PieceType;
use crate::square::Square;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid square `{0}`")]
pub struct ParseSquareError(pub String);

#[derive(Error, Debug)]
pub enum LoadError {
    /// The save file does not exist.
    #[error("save file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// A required line is missing or cannot be parsed. Lines are 1-based.
    #[error("malformed save file, line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// Every line parsed but the position itself is unplayable.
    #[error("corrupt position: {0}")]
    CorruptPosition(String),

    #[error("failed to read save file: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// True for the failures a session can recover from by keeping its
    /// last known-good state.
    pub fn is_malformed(&self) -> bool {
        matches!(self, LoadError::Malformed { .. } | LoadError::CorruptPosition(_))
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoveRejection {
    #[error("the game is over")]
    GameOver,

    #[error("choose a promotion piece first")]
    PromotionPending,

    #[error("there is no piece on that square")]
    EmptySource,

    #[error("that piece belongs to the other player")]
    NotYourPiece,

    #[error("illegal move")]
    IllegalMove,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CastleError {
    #[error("the game is over")]
    GameOver,

    #[error("choose a promotion piece first")]
    PromotionPending,

    #[error("only a rook can castle")]
    NotARook,

    #[error("the rook or its king has already moved")]
    AlreadyMoved,

    #[error("no empty path between king and rook")]
    PathBlocked,

    #[error("king in check during castling")]
    KingInCheck,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionError {
    #[error("no promotion is pending on {0}")]
    NotPending(Square),

    #[error("a pawn cannot promote to {0:?}")]
    InvalidKind(PieceType),
}
