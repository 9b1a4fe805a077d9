// The single answer to "which enemy piece hits this square?". Check
// detection, the legality filter, castling safety and the automated
// player's threat assessment all go through `attacker_of`; nothing else in
// the crate walks attack rays.

use crate::board::Board;
use crate::piece::{Color, PieceType};
use crate::square::Square;

const STRAIGHTS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub(crate) const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

pub(crate) const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

impl Board {
    /// Square of one piece of `defender`'s opponent that attacks `square`,
    /// or `None`. Cheap ray casts go first: ranks and files, diagonals,
    /// then king, knight and pawn contacts.
    pub fn attacker_of(&self, square: Square, defender: Color) -> Option<Square> {
        let enemy = defender.opposite();
        self.ray_attacker(square, enemy, &STRAIGHTS, PieceType::Rook)
            .or_else(|| self.ray_attacker(square, enemy, &DIAGONALS, PieceType::Bishop))
            .or_else(|| self.step_attacker(square, enemy, &KING_STEPS, PieceType::King))
            .or_else(|| self.step_attacker(square, enemy, &KNIGHT_JUMPS, PieceType::Knight))
            .or_else(|| self.pawn_attacker(square, enemy))
    }

    pub fn is_attacked(&self, square: Square, defender: Color) -> bool {
        self.attacker_of(square, defender).is_some()
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        match self.find_king(color) {
            Some(king) => self.is_attacked(king, color),
            None => false,
        }
    }

    /// Total value of `color`'s pieces that are currently attacked.
    pub fn exposure(&self, color: Color) -> u32 {
        self.pieces(color)
            .filter(|&(sq, _)| self.is_attacked(sq, color))
            .map(|(_, p)| p.value())
            .sum()
    }

    /// Walks each direction until the first occupied square. `slider` is the
    /// kind that moves along these lines; a queen always counts.
    fn ray_attacker(
        &self,
        square: Square,
        enemy: Color,
        directions: &[(i8, i8)],
        slider: PieceType,
    ) -> Option<Square> {
        for &(df, dr) in directions {
            let mut cursor = square.offset(df, dr);
            while let Some(sq) = cursor {
                if let Some(p) = self[sq] {
                    if p.color == enemy && (p.piece_type == slider || p.piece_type == PieceType::Queen) {
                        return Some(sq);
                    }
                    break;
                }
                cursor = sq.offset(df, dr);
            }
        }
        None
    }

    fn step_attacker(
        &self,
        square: Square,
        enemy: Color,
        steps: &[(i8, i8)],
        kind: PieceType,
    ) -> Option<Square> {
        steps
            .iter()
            .filter_map(|&(df, dr)| square.offset(df, dr))
            .find(|&sq| matches!(self[sq], Some(p) if p.color == enemy && p.piece_type == kind))
    }

    /// An enemy pawn hits `square` from one rank behind it (relative to the
    /// pawn's direction of travel) on either adjacent file.
    fn pawn_attacker(&self, square: Square, enemy: Color) -> Option<Square> {
        let behind = -enemy.forward();
        [-1, 1]
            .iter()
            .filter_map(|&df| square.offset(df, behind))
            .find(|&sq| matches!(self[sq], Some(p) if p.color == enemy && p.piece_type == PieceType::Pawn))
    }
}
