// `pseudo_legal` knows the movement pattern of each piece kind and the
// obstruction rules. `is_legal` adds the friendly-destination check and the
// clone-and-test step: the move is played on a virtual copy of the board and
// rejected if the mover's king is attacked there. Every legality question in
// the crate, including move listing for mate/stalemate detection, goes
// through `is_legal`; castling has its own path in `castling.rs`.

use crate::board::Board;
use crate::piece::{Color, PieceType};
use crate::square::Square;

impl Board {
    /// Movement pattern and obstruction check for the piece on `from`.
    /// Does not reject friendly destinations and ignores check.
    pub fn pseudo_legal(&self, from: Square, to: Square) -> bool {
        let Some(piece) = self[from] else {
            return false;
        };
        if from == to {
            return false;
        }

        let df = to.file() as i8 - from.file() as i8;
        let dr = to.rank() as i8 - from.rank() as i8;

        match piece.piece_type {
            PieceType::Rook => (df == 0 || dr == 0) && self.path_clear(from, to),
            PieceType::Bishop => df.abs() == dr.abs() && self.path_clear(from, to),
            PieceType::Queen => {
                (df == 0 || dr == 0 || df.abs() == dr.abs()) && self.path_clear(from, to)
            }
            PieceType::King => df.abs() <= 1 && dr.abs() <= 1,
            PieceType::Knight => matches!((df.abs(), dr.abs()), (1, 2) | (2, 1)),
            PieceType::Pawn => self.pawn_pattern(from, to, piece.color, df, dr),
        }
    }

    fn pawn_pattern(&self, from: Square, to: Square, color: Color, df: i8, dr: i8) -> bool {
        let dir = color.forward();

        if df == 0 {
            if dr == dir {
                return self[to].is_none();
            }
            if dr == 2 * dir && from.rank() == color.pawn_rank() {
                return self[to].is_none()
                    && from.offset(0, dir).is_some_and(|mid| self[mid].is_none());
            }
            return false;
        }

        if df.abs() != 1 || dr != dir {
            return false;
        }

        match self[to] {
            Some(target) => target.color != color,
            None => self.en_passant.is_some_and(|ep| {
                ep.landing == to
                    && matches!(self[ep.vacate], Some(p) if p.color != color && p.piece_type == PieceType::Pawn)
            }),
        }
    }

    /// True when every square strictly between `from` and `to` is empty.
    /// Callers guarantee the two squares share a rank, file or diagonal.
    fn path_clear(&self, from: Square, to: Square) -> bool {
        let step_f = (to.file() as i8 - from.file() as i8).signum();
        let step_r = (to.rank() as i8 - from.rank() as i8).signum();
        let mut cursor = from.offset(step_f, step_r);
        while let Some(sq) = cursor {
            if sq == to {
                return true;
            }
            if self[sq].is_some() {
                return false;
            }
            cursor = sq.offset(step_f, step_r);
        }
        false
    }

    /// Full legality for `mover`: own piece on `from`, no friendly piece on
    /// `to`, a valid pattern, and the mover's king safe on a virtual board
    /// after the move.
    pub fn is_legal(&self, from: Square, to: Square, mover: Color) -> bool {
        match self[from] {
            Some(p) if p.color == mover => {}
            _ => return false,
        }
        if matches!(self[to], Some(p) if p.color == mover) {
            return false;
        }
        if !self.pseudo_legal(from, to) {
            return false;
        }

        let mut virtual_board = self.clone();
        virtual_board.make_move(from, to);
        !virtual_board.is_in_check(mover)
    }

    /// Every square the piece on `from` may legally move to.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let Some(piece) = self[from] else {
            return Vec::new();
        };
        Square::all()
            .filter(|&to| self.is_legal(from, to, piece.color))
            .collect()
    }

    /// All legal (from, to) pairs for `color`, castling excluded.
    pub fn legal_moves(&self, color: Color) -> Vec<(Square, Square)> {
        self.pieces(color)
            .flat_map(|(from, _)| {
                Square::all()
                    .filter(move |&to| self.is_legal(from, to, color))
                    .map(move |to| (from, to))
            })
            .collect()
    }

    pub fn has_legal_move(&self, color: Color) -> bool {
        self.pieces(color)
            .any(|(from, _)| Square::all().any(|to| self.is_legal(from, to, color)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn dests(board: &Board, from: &str) -> Vec<String> {
        let mut v: Vec<String> = board
            .legal_destinations(sq(from))
            .iter()
            .map(|s| s.to_string())
            .collect();
        v.sort();
        v
    }

    #[test]
    fn twenty_moves_from_the_start() {
        let board = Board::new();
        assert_eq!(board.legal_moves(Color::White).len(), 20);
        assert_eq!(board.legal_moves(Color::Black).len(), 20);
    }

    #[test]
    fn knight_from_start() {
        assert_eq!(dests(&Board::new(), "g1"), vec!["f3", "h3"]);
    }

    #[test]
    fn pawn_double_advance_needs_both_squares_empty() {
        let mut board = Board::new();
        assert_eq!(dests(&board, "e2"), vec!["e3", "e4"]);
        board.put("e3", PieceType::Knight, Color::Black).unwrap();
        assert!(dests(&board, "e2").is_empty());
        board.set(sq("e3"), None);
        board.put("e4", PieceType::Knight, Color::Black).unwrap();
        assert_eq!(dests(&board, "e2"), vec!["e3"]);
    }

    #[test]
    fn pawn_cannot_double_advance_off_home_rank() {
        let mut board = Board::empty();
        board.put("e1", PieceType::King, Color::White).unwrap();
        board.put("e8", PieceType::King, Color::Black).unwrap();
        board.put("a3", PieceType::Pawn, Color::White).unwrap();
        assert_eq!(dests(&board, "a3"), vec!["a4"]);
    }

    #[test]
    fn pawn_captures_only_enemies_diagonally() {
        let mut board = Board::empty();
        board.put("e1", PieceType::King, Color::White).unwrap();
        board.put("e8", PieceType::King, Color::Black).unwrap();
        board.put("d4", PieceType::Pawn, Color::White).unwrap();
        board.put("c5", PieceType::Rook, Color::Black).unwrap();
        board.put("e5", PieceType::Knight, Color::White).unwrap();
        board.put("d5", PieceType::Pawn, Color::Black).unwrap();
        assert_eq!(dests(&board, "d4"), vec!["c5"]);
    }

    #[test]
    fn sliders_stop_at_blockers() {
        let mut board = Board::empty();
        board.put("a1", PieceType::King, Color::White).unwrap();
        board.put("h8", PieceType::King, Color::Black).unwrap();
        board.put("d4", PieceType::Rook, Color::White).unwrap();
        board.put("d6", PieceType::Pawn, Color::Black).unwrap();
        board.put("f4", PieceType::Pawn, Color::White).unwrap();
        assert!(board.pseudo_legal(sq("d4"), sq("d6")));
        assert!(!board.pseudo_legal(sq("d4"), sq("d7")));
        assert!(!board.pseudo_legal(sq("d4"), sq("g4")));
        assert!(!board.is_legal(sq("d4"), sq("f4"), Color::White));
        assert!(!board.pseudo_legal(sq("d4"), sq("e5")));
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        let mut board = Board::empty();
        board.put("e1", PieceType::King, Color::White).unwrap();
        board.put("e2", PieceType::Bishop, Color::White).unwrap();
        board.put("e8", PieceType::Rook, Color::Black).unwrap();
        board.put("a8", PieceType::King, Color::Black).unwrap();
        assert!(board.pseudo_legal(sq("e2"), sq("d3")));
        assert!(!board.is_legal(sq("e2"), sq("d3"), Color::White));
        assert!(dests(&board, "e2").is_empty());
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let mut board = Board::empty();
        board.put("e1", PieceType::King, Color::White).unwrap();
        board.put("d8", PieceType::Rook, Color::Black).unwrap();
        board.put("h8", PieceType::King, Color::Black).unwrap();
        assert_eq!(dests(&board, "e1"), vec!["e2", "f1", "f2"]);
    }

    #[test]
    fn en_passant_is_legal_for_one_ply() {
        let mut board = Board::empty();
        board.put("e1", PieceType::King, Color::White).unwrap();
        board.put("e8", PieceType::King, Color::Black).unwrap();
        board.put("e5", PieceType::Pawn, Color::White).unwrap();
        board.put("d7", PieceType::Pawn, Color::Black).unwrap();
        board.make_move(sq("d7"), sq("d5"));
        assert!(board.is_legal(sq("e5"), sq("d6"), Color::White));

        board.make_move(sq("e1"), sq("e2"));
        assert!(!board.is_legal(sq("e5"), sq("d6"), Color::White));
    }

    #[test]
    fn en_passant_exposing_the_king_is_illegal() {
        // Both pawns leave the fifth rank, opening it for the rook.
        let mut board = Board::empty();
        board.put("a5", PieceType::King, Color::White).unwrap();
        board.put("e5", PieceType::Pawn, Color::White).unwrap();
        board.put("d7", PieceType::Pawn, Color::Black).unwrap();
        board.put("h5", PieceType::Rook, Color::Black).unwrap();
        board.put("h8", PieceType::King, Color::Black).unwrap();
        board.make_move(sq("d7"), sq("d5"));
        assert!(board.pseudo_legal(sq("e5"), sq("d6")));
        assert!(!board.is_legal(sq("e5"), sq("d6"), Color::White));
    }

    #[test]
    fn rejection_never_touches_the_board() {
        let board = Board::new();
        let before = board.snapshot();
        assert!(!board.is_legal(sq("e2"), sq("e5"), Color::White));
        assert!(!board.is_legal(sq("e7"), sq("e5"), Color::White));
        assert_eq!(board.snapshot(), before);
    }
}
