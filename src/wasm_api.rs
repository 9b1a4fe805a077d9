use crate::engine::EngineConfig;
use crate::game::{CastleOutcome, Controller, GameState, MoveOutcome, PlayerMode};
use crate::piece::{Color, PieceType};
use crate::save;
use crate::session::{LoadOutcome, Session};
use crate::square::Square;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct SquarePiece {
    piece_type: String,
    color: String,
}

#[derive(Serialize)]
struct BoardState {
    /// Indexed `[rank][file]`, rank 0 = white's back rank.
    squares: Vec<Vec<Option<SquarePiece>>>,
    current_turn: String,
    controller: String,
    player_count: u8,
    status: String,
    game_over: bool,
    is_in_check: bool,
    pending_promotion: Option<String>,
    captured_white: Vec<String>,
    captured_black: Vec<String>,
    last_move: Option<[String; 2]>,
}

#[derive(Serialize)]
struct ActionResult {
    #[serde(flatten)]
    board_state: Option<BoardState>,
    error: Option<String>,
}

fn piece_type_to_string(pt: PieceType) -> String {
    format!("{pt:?}")
}

fn color_to_string(c: Color) -> String {
    format!("{c:?}")
}

fn string_to_piece_type(s: &str) -> Option<PieceType> {
    match s {
        "Queen" => Some(PieceType::Queen),
        "Rook" => Some(PieceType::Rook),
        "Bishop" => Some(PieceType::Bishop),
        "Knight" => Some(PieceType::Knight),
        _ => None,
    }
}

fn build_board_state(state: &GameState) -> BoardState {
    let board = &state.board;
    let squares = board
        .squares
        .iter()
        .map(|rank| {
            rank.iter()
                .map(|cell| {
                    cell.map(|p| SquarePiece {
                        piece_type: piece_type_to_string(p.piece_type),
                        color: color_to_string(p.color),
                    })
                })
                .collect()
        })
        .collect();
    let pool = |color: Color| -> Vec<String> {
        board
            .captured(color)
            .slots()
            .iter()
            .flatten()
            .map(|p| piece_type_to_string(p.piece_type))
            .collect()
    };

    BoardState {
        squares,
        current_turn: color_to_string(board.current_turn),
        controller: match state.controller {
            Controller::Man => "man".to_string(),
            Controller::Computer => "computer".to_string(),
        },
        player_count: state.player_mode.count(),
        status: state.status().to_string(),
        game_over: state.status().is_terminal(),
        is_in_check: state.in_check(),
        pending_promotion: state.pending_promotion.map(|sq| sq.to_string()),
        captured_white: pool(Color::White),
        captured_black: pool(Color::Black),
        last_move: state.last_move.map(|(from, to)| [from.to_string(), to.to_string()]),
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn parse_square(s: &str) -> Result<Square, String> {
    s.parse().map_err(|e| format!("{e}"))
}

#[wasm_bindgen]
pub struct Game {
    session: Session,
}

impl Game {
    /// The new board state on success, only the error otherwise.
    fn result(&self, error: Option<String>) -> JsValue {
        let board_state = error.is_none().then(|| build_board_state(self.session.state()));
        to_js(&ActionResult { board_state, error })
    }
}

#[wasm_bindgen]
impl Game {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Game {
        Game {
            session: Session::new(EngineConfig::default()),
        }
    }

    /// Starts over. `player_count` is 0, 1 or 2.
    pub fn new_game(&mut self, player_count: u8, human_plays_white: bool) -> JsValue {
        let Some(mode) = PlayerMode::from_count(player_count) else {
            return self.result(Some(format!("invalid player count {player_count}")));
        };
        let human = if human_plays_white { Color::White } else { Color::Black };
        self.session.reset(mode, human);
        self.result(None)
    }

    pub fn set_player_mode(&mut self, player_count: u8, human_plays_white: bool) -> JsValue {
        let Some(mode) = PlayerMode::from_count(player_count) else {
            return self.result(Some(format!("invalid player count {player_count}")));
        };
        let human = if human_plays_white { Color::White } else { Color::Black };
        self.session.state_mut().set_player_mode(mode, human);
        self.result(None)
    }

    pub fn load_save(&mut self, text: &str) -> JsValue {
        match self.session.load_text(text) {
            Ok(LoadOutcome::Loaded) => self.result(None),
            Ok(LoadOutcome::KeptPrevious(e)) | Err(e) => self.result(Some(e.to_string())),
        }
    }

    pub fn save_text(&self) -> String {
        save::serialize(self.session.state())
    }

    pub fn get_board_state(&self) -> JsValue {
        to_js(&build_board_state(self.session.state()))
    }

    pub fn make_move(&mut self, from: &str, to: &str) -> JsValue {
        let (from, to) = match (parse_square(from), parse_square(to)) {
            (Ok(from), Ok(to)) => (from, to),
            (Err(e), _) | (_, Err(e)) => return self.result(Some(e)),
        };
        match self.session.state_mut().attempt_move(from, to) {
            MoveOutcome::Applied { .. } => self.result(None),
            MoveOutcome::Rejected(reason) => self.result(Some(reason.to_string())),
        }
    }

    pub fn promote(&mut self, square: &str, piece_type: &str) -> JsValue {
        let square = match parse_square(square) {
            Ok(sq) => sq,
            Err(e) => return self.result(Some(e)),
        };
        let Some(kind) = string_to_piece_type(piece_type) else {
            return self.result(Some(format!("cannot promote to {piece_type}")));
        };
        match self.session.state_mut().apply_promotion(square, kind) {
            Ok(()) => self.result(None),
            Err(e) => self.result(Some(e.to_string())),
        }
    }

    pub fn castling_offered(&self, rook_square: &str) -> bool {
        parse_square(rook_square).is_ok_and(|sq| self.session.state().castling_offered(sq))
    }

    pub fn castle(&mut self, rook_square: &str) -> JsValue {
        let rook = match parse_square(rook_square) {
            Ok(sq) => sq,
            Err(e) => return self.result(Some(e)),
        };
        match self.session.state_mut().request_castle(rook) {
            CastleOutcome::Castled(_) => self.result(None),
            CastleOutcome::Rejected(reason) => self.result(Some(reason.to_string())),
        }
    }

    /// Plays the computer's move if it is the computer's turn.
    pub fn make_ai_move(&mut self) -> JsValue {
        if self.session.awaiting_computer() {
            self.session.automated_turn();
        }
        self.get_board_state()
    }

    pub fn get_legal_moves_for_square(&self, square: &str) -> JsValue {
        let destinations: Vec<String> = parse_square(square)
            .map(|sq| self.session.state().legal_destinations(sq))
            .unwrap_or_default()
            .iter()
            .map(Square::to_string)
            .collect();
        to_js(&destinations)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
