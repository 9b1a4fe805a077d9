use std::fmt;

use serde::{Deserialize, Serialize};

use crate::piece::PieceType;
use crate::square::Square;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move { from, to, promotion: None }
    }

    /// Coordinate notation, e.g. "e2e4", "a7a8q"
    pub fn to_coordinate(&self) -> String {
        let promo = match self.promotion {
            Some(PieceType::Queen) => "q",
            Some(PieceType::Rook) => "r",
            Some(PieceType::Bishop) => "b",
            Some(PieceType::Knight) => "n",
            _ => "",
        };
        format!("{}{}{promo}", self.from, self.to)
    }

    /// Parse from coordinate notation
    pub fn from_coordinate(s: &str) -> Option<Move> {
        let from = s.get(0..2)?.parse().ok()?;
        let to = s.get(2..4)?.parse().ok()?;
        let promotion = match s.get(4..) {
            None | Some("") => None,
            Some("q") => Some(PieceType::Queen),
            Some("r") => Some(PieceType::Rook),
            Some("b") => Some(PieceType::Bishop),
            Some("n") => Some(PieceType::Knight),
            Some(_) => return None,
        };
        Some(Move { from, to, promotion })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_coordinate())
    }
}
