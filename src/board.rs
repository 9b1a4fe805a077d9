use std::collections::VecDeque;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::error::ParseSquareError;
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

/// Board occupancy indexed `[rank][file]`, row 0 = rank 1, col 0 = file a.
pub type Snapshot = [[Option<Piece>; 8]; 8];

pub const POOL_SLOTS: usize = 16;
pub const REPETITION_WINDOW: usize = 12;

/// Plies back at which the current position is compared for the repetition draw.
const REPETITION_OFFSETS: [usize; 3] = [4, 8, 12];

/// The one-ply capture opportunity left by a pawn's double advance.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct EnPassant {
    /// The skipped square, where a capturing pawn lands.
    pub landing: Square,
    /// The square of the pawn that gets removed.
    pub vacate: Square,
}

/// Origin squares of every king and rook that has moved at least once.
/// Kept in insertion order so a loaded game saves back unchanged.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct CastlingRights {
    moved: Vec<Square>,
}

impl CastlingRights {
    pub fn from_squares(squares: impl IntoIterator<Item = Square>) -> Self {
        let mut rights = CastlingRights::default();
        for sq in squares {
            rights.mark_moved(sq);
        }
        rights
    }

    pub fn has_moved(&self, square: Square) -> bool {
        self.moved.contains(&square)
    }

    pub fn mark_moved(&mut self, square: Square) {
        if !self.has_moved(square) {
            self.moved.push(square);
        }
    }

    pub fn squares(&self) -> &[Square] {
        &self.moved
    }
}

/// Sixteen slots filled left to right as pieces of one color are captured.
/// Slots are never reordered or compacted.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct CapturedPool {
    slots: [Option<Piece>; POOL_SLOTS],
}

impl CapturedPool {
    pub fn from_slots(slots: [Option<Piece>; POOL_SLOTS]) -> Self {
        CapturedPool { slots }
    }

    pub fn slots(&self) -> &[Option<Piece>; POOL_SLOTS] {
        &self.slots
    }

    /// Stores `piece` in the first free slot. Returns false when full.
    pub fn push(&mut self, piece: Piece) -> bool {
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(piece);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The last twelve positions, oldest first, one per completed ply.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct RepetitionWindow {
    snapshots: VecDeque<Snapshot>,
}

impl RepetitionWindow {
    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > REPETITION_WINDOW {
            self.snapshots.pop_front();
        }
    }

    /// True when `current` equals the positions exactly 4, 8 and 12 plies ago.
    ///
    /// This only catches repetitions with that spacing; a position recurring
    /// at other intervals is not a draw here.
    pub fn recurs(&self, current: &Snapshot) -> bool {
        let len = self.snapshots.len();
        REPETITION_OFFSETS
            .iter()
            .all(|&back| back <= len && self.snapshots[len - back] == *current)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

/// What a single board move did, reported back to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveEffect {
    pub piece: Piece,
    pub captured: Option<Piece>,
    /// Differs from the destination for en-passant captures.
    pub captured_on: Option<Square>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Board {
    pub squares: Snapshot,
    pub current_turn: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<EnPassant>,
    pub captured_white: CapturedPool,
    pub captured_black: CapturedPool,
    pub history: RepetitionWindow,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Square> for Board {
    type Output = Option<Piece>;

    fn index(&self, sq: Square) -> &Self::Output {
        &self.squares[sq.rank() as usize][sq.file() as usize]
    }
}

impl IndexMut<Square> for Board {
    fn index_mut(&mut self, sq: Square) -> &mut Self::Output {
        &mut self.squares[sq.rank() as usize][sq.file() as usize]
    }
}

const BACK_ROW: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
            current_turn: Color::White,
            castling: CastlingRights::default(),
            en_passant: None,
            captured_white: CapturedPool::default(),
            captured_black: CapturedPool::default(),
            history: RepetitionWindow::default(),
        }
    }

    /// The standard starting position, white to move.
    pub fn new() -> Self {
        let mut board = Board::empty();
        for (file, &kind) in BACK_ROW.iter().enumerate() {
            board.squares[0][file] = Some(Piece::new(kind, Color::White));
            board.squares[1][file] = Some(Piece::new(PieceType::Pawn, Color::White));
            board.squares[6][file] = Some(Piece::new(PieceType::Pawn, Color::Black));
            board.squares[7][file] = Some(Piece::new(kind, Color::Black));
        }
        board
    }

    pub fn get(&self, sq: Square) -> Option<Piece> {
        self[sq]
    }

    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self[sq] = piece;
    }

    /// Setup helper: places a piece by algebraic name.
    pub fn put(&mut self, square: &str, piece_type: PieceType, color: Color) -> Result<(), ParseSquareError> {
        let sq: Square = square.parse()?;
        self[sq] = Some(Piece::new(piece_type, color));
        Ok(())
    }

    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self[sq] {
            Some(p) if p.color == color => Some((sq, p)),
            _ => None,
        })
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|(_, p)| p.piece_type == PieceType::King)
            .map(|(sq, _)| sq)
    }

    /// Sum of piece values still on the board for `color`, king included.
    pub fn material(&self, color: Color) -> u32 {
        self.pieces(color).map(|(_, p)| p.value()).sum()
    }

    pub fn captured(&self, color: Color) -> &CapturedPool {
        match color {
            Color::White => &self.captured_white,
            Color::Black => &self.captured_black,
        }
    }

    fn captured_mut(&mut self, color: Color) -> &mut CapturedPool {
        match color {
            Color::White => &mut self.captured_white,
            Color::Black => &mut self.captured_black,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.squares
    }

    /// Move whatever stands on `from` to `to`, removing an en-passant victim,
    /// recording the capture, marking king/rook origins as moved and
    /// setting or clearing the en-passant target. Does not check legality
    /// and does not pass the turn.
    pub fn make_move(&mut self, from: Square, to: Square) -> Option<MoveEffect> {
        let piece = self[from]?;
        let is_pawn = piece.piece_type == PieceType::Pawn;

        let mut captured = self[to];
        let mut captured_on = captured.map(|_| to);

        if is_pawn && captured.is_none() && from.file() != to.file() {
            if let Some(ep) = self.en_passant.filter(|ep| ep.landing == to) {
                captured = self[ep.vacate].take();
                captured_on = captured.map(|_| ep.vacate);
            }
        }

        if let Some(victim) = captured {
            if !self.captured_mut(victim.color).push(victim) {
                tracing::warn!(piece = %victim.code(), "captured pool is full");
            }
            // A rook taken on its corner loses that corner's castling right.
            let corner = to.rank() == victim.color.back_rank() && matches!(to.file(), 0 | 7);
            if victim.piece_type == PieceType::Rook && corner {
                self.castling.mark_moved(to);
            }
        }

        self[to] = Some(piece);
        self[from] = None;

        if matches!(piece.piece_type, PieceType::King | PieceType::Rook) {
            self.castling.mark_moved(from);
        }

        let rank_step = to.rank() as i8 - from.rank() as i8;
        self.en_passant = if is_pawn && rank_step.abs() == 2 {
            from.offset(0, rank_step / 2)
                .map(|landing| EnPassant { landing, vacate: to })
        } else {
            None
        };

        Some(MoveEffect { piece, captured, captured_on })
    }

    /// A pawn of `color` standing on its promotion rank, if any.
    pub fn promotable_pawn(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|(sq, p)| p.piece_type == PieceType::Pawn && sq.rank() == color.promotion_rank())
            .map(|(sq, _)| sq)
    }
}
