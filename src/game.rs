// `GameState` is the value threaded through every call a collaborator makes:
// the board model plus status, pending promotion and who controls each
// turn. All mutation goes through `attempt_move`, `request_castle` and
// `apply_promotion`; a rejected request leaves the state untouched.
//
// A ply is complete once any promotion has been chosen. Completing a ply
// passes the turn, re-evaluates the status and records the position in the
// repetition window.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::castling::CastlePlan;
use crate::error::{CastleError, MoveRejection, PromotionError};
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;
use crate::status::{self, GameStatus};

/// Who makes the decision for the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Controller {
    Man,
    Computer,
}

impl Controller {
    pub fn flipped(self) -> Controller {
        match self {
            Controller::Man => Controller::Computer,
            Controller::Computer => Controller::Man,
        }
    }
}

/// Number of human players: 0 = both sides automated, 1 = human against the
/// computer, 2 = two humans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerMode {
    Demo,
    Single,
    Dual,
}

impl PlayerMode {
    pub fn count(self) -> u8 {
        match self {
            PlayerMode::Demo => 0,
            PlayerMode::Single => 1,
            PlayerMode::Dual => 2,
        }
    }

    pub fn from_count(n: u8) -> Option<PlayerMode> {
        match n {
            0 => Some(PlayerMode::Demo),
            1 => Some(PlayerMode::Single),
            2 => Some(PlayerMode::Dual),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MoveOutcome {
    Applied {
        captured: Option<Piece>,
        /// The mover must call `apply_promotion` on the destination before
        /// the turn passes.
        promotion_pending: bool,
    },
    Rejected(MoveRejection),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CastleOutcome {
    Castled(CastlePlan),
    Rejected(CastleError),
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GameState {
    pub board: Board,
    pub status: GameStatus,
    pub controller: Controller,
    pub player_mode: PlayerMode,
    pub pending_promotion: Option<Square>,
    pub last_move: Option<(Square, Square)>,
}

impl GameState {
    /// A fresh game from the standard starting position. In single-player
    /// mode the human moves first when they chose white.
    pub fn new(player_mode: PlayerMode, human_color: Color) -> Self {
        let controller = match player_mode {
            PlayerMode::Demo => Controller::Computer,
            PlayerMode::Dual => Controller::Man,
            PlayerMode::Single if human_color == Color::White => Controller::Man,
            PlayerMode::Single => Controller::Computer,
        };
        Self::from_board(Board::new(), player_mode, controller)
    }

    /// Wraps an arbitrary position. The status is computed immediately and
    /// the repetition window is restarted from this position.
    pub fn from_board(mut board: Board, player_mode: PlayerMode, controller: Controller) -> Self {
        board.history.clear();
        let pending_promotion = board.promotable_pawn(board.current_turn);
        let status = if pending_promotion.is_some() {
            GameStatus::InProgress
        } else {
            status::evaluate(&board)
        };
        board.history.push(board.snapshot());
        GameState {
            board,
            status,
            controller,
            player_mode,
            pending_promotion,
            last_move: None,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn side_to_move(&self) -> Color {
        self.board.current_turn
    }

    pub fn in_check(&self) -> bool {
        self.board.is_in_check(self.board.current_turn)
    }

    /// Legal destinations for the piece on `from`. Empty when it is not that
    /// piece's turn, the game is over, or a promotion is outstanding.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        if self.status.is_terminal() || self.pending_promotion.is_some() {
            return Vec::new();
        }
        match self.board.get(from) {
            Some(p) if p.color == self.board.current_turn => self.board.legal_destinations(from),
            _ => Vec::new(),
        }
    }

    fn precheck(&self) -> Result<(), MoveRejection> {
        if self.status.is_terminal() {
            return Err(MoveRejection::GameOver);
        }
        if self.pending_promotion.is_some() {
            return Err(MoveRejection::PromotionPending);
        }
        Ok(())
    }

    pub fn attempt_move(&mut self, from: Square, to: Square) -> MoveOutcome {
        let mover = self.board.current_turn;
        let verdict = self.precheck().and_then(|()| match self.board.get(from) {
            None => Err(MoveRejection::EmptySource),
            Some(p) if p.color != mover => Err(MoveRejection::NotYourPiece),
            Some(_) if !self.board.is_legal(from, to, mover) => Err(MoveRejection::IllegalMove),
            Some(_) => Ok(()),
        });
        if let Err(reason) = verdict {
            tracing::warn!(%from, %to, %reason, "move rejected");
            return MoveOutcome::Rejected(reason);
        }

        let Some(effect) = self.board.make_move(from, to) else {
            return MoveOutcome::Rejected(MoveRejection::EmptySource);
        };
        self.last_move = Some((from, to));
        tracing::debug!(%from, %to, piece = %effect.piece.code(), "move applied");

        let promotion_pending =
            effect.piece.piece_type == PieceType::Pawn && to.rank() == mover.promotion_rank();
        if promotion_pending {
            self.pending_promotion = Some(to);
        } else {
            self.complete_ply();
        }

        MoveOutcome::Applied { captured: effect.captured, promotion_pending }
    }

    /// Replaces the pawn awaiting promotion on `square` and completes the ply.
    pub fn apply_promotion(&mut self, square: Square, kind: PieceType) -> Result<(), PromotionError> {
        if self.pending_promotion != Some(square) {
            return Err(PromotionError::NotPending(square));
        }
        if !PieceType::PROMOTIONS.contains(&kind) {
            return Err(PromotionError::InvalidKind(kind));
        }
        self.finish_promotion(square, kind);
        Ok(())
    }

    /// Whether castling should be offered for the rook on `rook_square`:
    /// neither the rook nor its king has moved.
    pub fn castling_offered(&self, rook_square: Square) -> bool {
        self.precheck().is_ok()
            && self
                .board
                .castling_rights_for(rook_square, self.board.current_turn)
                .is_ok()
    }

    pub fn request_castle(&mut self, rook_square: Square) -> CastleOutcome {
        let plan = if self.status.is_terminal() {
            Err(CastleError::GameOver)
        } else if self.pending_promotion.is_some() {
            Err(CastleError::PromotionPending)
        } else {
            self.board.plan_castle(rook_square, self.board.current_turn)
        };
        match plan {
            Ok(plan) => {
                self.board.castle(&plan);
                self.last_move = Some((plan.king_from, plan.king_to));
                tracing::debug!(rook = %rook_square, king_to = %plan.king_to, "castled");
                self.complete_ply();
                CastleOutcome::Castled(plan)
            }
            Err(reason) => {
                tracing::warn!(rook = %rook_square, %reason, "castling rejected");
                CastleOutcome::Rejected(reason)
            }
        }
    }

    /// Plays an engine move: the move itself plus its promotion choice.
    pub fn play(&mut self, mv: &Move) -> Result<Option<Piece>, MoveRejection> {
        match self.attempt_move(mv.from, mv.to) {
            MoveOutcome::Applied { captured, promotion_pending } => {
                if promotion_pending {
                    let kind = mv
                        .promotion
                        .filter(|k| PieceType::PROMOTIONS.contains(k))
                        .unwrap_or(PieceType::Queen);
                    self.finish_promotion(mv.to, kind);
                }
                Ok(captured)
            }
            MoveOutcome::Rejected(reason) => Err(reason),
        }
    }

    /// Changes the number of human players. The controller of the side to
    /// move is re-derived so the change applies from this turn on.
    pub fn set_player_mode(&mut self, player_mode: PlayerMode, human_color: Color) {
        self.player_mode = player_mode;
        self.controller = match player_mode {
            PlayerMode::Demo => Controller::Computer,
            PlayerMode::Dual => Controller::Man,
            PlayerMode::Single if self.board.current_turn == human_color => Controller::Man,
            PlayerMode::Single => Controller::Computer,
        };
    }

    /// `kind` must already be one of `PieceType::PROMOTIONS`.
    fn finish_promotion(&mut self, square: Square, kind: PieceType) {
        let color = self.board.current_turn;
        self.board.set(square, Some(Piece::new(kind, color)));
        self.pending_promotion = None;
        self.complete_ply();
    }

    fn complete_ply(&mut self) {
        self.board.current_turn = self.board.current_turn.opposite();
        self.controller = match self.player_mode {
            PlayerMode::Demo => Controller::Computer,
            PlayerMode::Dual => Controller::Man,
            PlayerMode::Single => self.controller.flipped(),
        };
        self.status = status::evaluate(&self.board);
        self.board.history.push(self.board.snapshot());
        if self.status.is_terminal() {
            tracing::info!(status = %self.status, "game over");
        }
    }
}
