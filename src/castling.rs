// Castling is requested by naming one rook, never through normal move
// entry. Four gates are checked in order and the first failure is
// reported: the subject is a rook; neither it nor its king has moved; the
// squares between them are empty; the king's square and every square it
// crosses or lands on are unattacked.

use serde::Serialize;

use crate::board::Board;
use crate::error::CastleError;
use crate::piece::{Color, PieceType};
use crate::square::Square;

const KING_FILE: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CastlePlan {
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
}

impl Board {
    /// Gates 1 and 2: a rook of `mover`'s that, together with its king, has
    /// never moved. Returns the king's square.
    pub fn castling_rights_for(&self, rook_square: Square, mover: Color) -> Result<Square, CastleError> {
        match self[rook_square] {
            Some(p) if p.color == mover && p.piece_type == PieceType::Rook => {}
            _ => return Err(CastleError::NotARook),
        }

        let back = mover.back_rank();
        let Some(king_square) = Square::new(KING_FILE, back) else {
            return Err(CastleError::AlreadyMoved);
        };
        let at_home = rook_square.rank() == back && matches!(rook_square.file(), 0 | 7);
        let king_home = matches!(
            self[king_square],
            Some(p) if p.color == mover && p.piece_type == PieceType::King
        );
        if !at_home
            || !king_home
            || self.castling.has_moved(rook_square)
            || self.castling.has_moved(king_square)
        {
            return Err(CastleError::AlreadyMoved);
        }
        Ok(king_square)
    }

    /// Runs all four gates and, if they pass, describes where king and rook
    /// end up. The board is never modified.
    pub fn plan_castle(&self, rook_square: Square, mover: Color) -> Result<CastlePlan, CastleError> {
        let king_from = self.castling_rights_for(rook_square, mover)?;
        let back = mover.back_rank();
        let dir: i8 = if rook_square.file() > king_from.file() { 1 } else { -1 };

        let (lo, hi) = if dir > 0 {
            (king_from.file() + 1, rook_square.file())
        } else {
            (rook_square.file() + 1, king_from.file())
        };
        let blocked = (lo..hi)
            .filter_map(|file| Square::new(file, back))
            .any(|sq| self[sq].is_some());
        if blocked {
            return Err(CastleError::PathBlocked);
        }

        let king_path = [0, dir, 2 * dir].map(|step| king_from.offset(step, 0));
        let mut crossed = Vec::with_capacity(3);
        for sq in king_path {
            crossed.push(sq.ok_or(CastleError::PathBlocked)?);
        }
        if crossed.iter().any(|&sq| self.is_attacked(sq, mover)) {
            return Err(CastleError::KingInCheck);
        }

        let king_to = crossed[2];
        let rook_to = crossed[1];
        Ok(CastlePlan { king_from, king_to, rook_from: rook_square, rook_to })
    }

    /// Relocates king and rook per `plan`, marks both origins as moved and
    /// clears the en-passant target. Does not pass the turn.
    pub(crate) fn castle(&mut self, plan: &CastlePlan) {
        let king = self[plan.king_from].take();
        let rook = self[plan.rook_from].take();
        self[plan.king_to] = king;
        self[plan.rook_to] = rook;
        self.castling.mark_moved(plan.king_from);
        self.castling.mark_moved(plan.rook_from);
        self.en_passant = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn kingside_setup() -> Board {
        let mut board = Board::empty();
        board.put("e1", PieceType::King, Color::White).unwrap();
        board.put("h1", PieceType::Rook, Color::White).unwrap();
        board.put("a1", PieceType::Rook, Color::White).unwrap();
        board.put("e8", PieceType::King, Color::Black).unwrap();
        board
    }

    #[test]
    fn kingside_plan() {
        let board = kingside_setup();
        let plan = board.plan_castle(sq("h1"), Color::White).unwrap();
        assert_eq!(plan.king_to, sq("g1"));
        assert_eq!(plan.rook_to, sq("f1"));
    }

    #[test]
    fn queenside_plan_needs_b_file_empty() {
        let mut board = kingside_setup();
        let plan = board.plan_castle(sq("a1"), Color::White).unwrap();
        assert_eq!(plan.king_to, sq("c1"));
        assert_eq!(plan.rook_to, sq("d1"));

        board.put("b1", PieceType::Knight, Color::White).unwrap();
        assert_eq!(board.plan_castle(sq("a1"), Color::White), Err(CastleError::PathBlocked));
    }

    #[test]
    fn only_rooks_castle() {
        let board = kingside_setup();
        assert_eq!(board.plan_castle(sq("e1"), Color::White), Err(CastleError::NotARook));
        assert_eq!(board.plan_castle(sq("e8"), Color::White), Err(CastleError::NotARook));
        assert_eq!(board.plan_castle(sq("c3"), Color::White), Err(CastleError::NotARook));
    }

    #[test]
    fn moved_king_blocks_both_sides() {
        let mut board = kingside_setup();
        board.castling.mark_moved(sq("e1"));
        assert_eq!(board.plan_castle(sq("h1"), Color::White), Err(CastleError::AlreadyMoved));
        assert_eq!(board.plan_castle(sq("a1"), Color::White), Err(CastleError::AlreadyMoved));
    }

    #[test]
    fn attacked_crossing_square_fails() {
        let mut board = kingside_setup();
        board.put("c4", PieceType::Bishop, Color::Black).unwrap();
        // c4 bishop hits f1.
        assert_eq!(board.plan_castle(sq("h1"), Color::White), Err(CastleError::KingInCheck));
        assert!(board.plan_castle(sq("a1"), Color::White).is_ok());
    }

    #[test]
    fn castling_out_of_check_fails() {
        let mut board = kingside_setup();
        board.put("e5", PieceType::Rook, Color::Black).unwrap();
        assert_eq!(board.plan_castle(sq("h1"), Color::White), Err(CastleError::KingInCheck));
    }

    #[test]
    fn attacked_b1_does_not_stop_queenside() {
        let mut board = kingside_setup();
        board.put("b8", PieceType::Rook, Color::Black).unwrap();
        assert!(board.plan_castle(sq("a1"), Color::White).is_ok());
    }

    #[test]
    fn recaptured_corner_rook_cannot_castle() {
        let mut board = kingside_setup();
        board.put("g1", PieceType::Rook, Color::White).unwrap();
        board.put("h8", PieceType::Rook, Color::Black).unwrap();

        board.make_move(sq("h8"), sq("h1")).unwrap();
        assert!(board.castling.has_moved(sq("h1")));
        board.make_move(sq("g1"), sq("h1")).unwrap();

        assert_eq!(board.get(sq("h1")).map(|p| p.color), Some(Color::White));
        assert_eq!(board.plan_castle(sq("h1"), Color::White), Err(CastleError::AlreadyMoved));
        assert!(board.plan_castle(sq("a1"), Color::White).is_ok());
    }

    #[test]
    fn castle_marks_both_origins() {
        let mut board = Board::new();
        for s in ["b8", "c8", "d8"] {
            board.set(sq(s), None);
        }
        let plan = board.plan_castle(sq("a8"), Color::Black).unwrap();
        board.castle(&plan);
        assert_eq!(board.get(sq("c8")).map(|p| p.piece_type), Some(PieceType::King));
        assert_eq!(board.get(sq("d8")).map(|p| p.piece_type), Some(PieceType::Rook));
        assert!(board.castling.has_moved(sq("e8")));
        assert!(board.castling.has_moved(sq("a8")));
        assert_eq!(board.get(sq("a8")), None);
    }
}
