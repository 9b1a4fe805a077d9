use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank step a pawn of this color advances by.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank index (0 = rank 1) the king and rooks start on.
    pub fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Rank index pawns start on; only from here may they advance two squares.
    pub fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    pub fn promotion_rank(self) -> u8 {
        self.opposite().back_rank()
    }

    /// Single-letter code used by the save format.
    pub fn letter(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub fn from_letter(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// Kinds a pawn may be replaced with on the back rank.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    /// Heuristic value used to rank threats and trades. The king counts too:
    /// a threatened king outranks everything else.
    pub fn value(self) -> u32 {
        match self {
            PieceType::King => 10,
            PieceType::Queen => 9,
            PieceType::Rook => 5,
            PieceType::Bishop => 3,
            PieceType::Knight => 3,
            PieceType::Pawn => 1,
        }
    }

    pub fn is_minor(self) -> bool {
        matches!(self, PieceType::Bishop | PieceType::Knight)
    }

    pub fn letter(self) -> char {
        match self {
            PieceType::Rook => 'T',
            PieceType::Knight => 'f',
            PieceType::Bishop => 'A',
            PieceType::King => '+',
            PieceType::Queen => '*',
            PieceType::Pawn => 'i',
        }
    }

    pub fn from_letter(c: char) -> Option<PieceType> {
        match c {
            'T' => Some(PieceType::Rook),
            'f' => Some(PieceType::Knight),
            'A' => Some(PieceType::Bishop),
            '+' => Some(PieceType::King),
            '*' => Some(PieceType::Queen),
            'i' => Some(PieceType::Pawn),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}

impl Piece {
    pub const fn new(piece_type: PieceType, color: Color) -> Self {
        Piece { piece_type, color }
    }

    pub fn value(self) -> u32 {
        self.piece_type.value()
    }

    /// Two-character code: color letter followed by kind letter, e.g. `w+`.
    pub fn code(self) -> String {
        let mut code = String::with_capacity(2);
        code.push(self.color.letter());
        code.push(self.piece_type.letter());
        code
    }

    pub fn from_code(code: &str) -> Option<Piece> {
        let mut chars = code.chars();
        let color = Color::from_letter(chars.next()?)?;
        let piece_type = PieceType::from_letter(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Piece::new(piece_type, color))
    }
}
