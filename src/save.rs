// A save is 103 `key=value` lines in fixed positions:
//
//   1-64    one square each, value = piece code or two spaces
//   65      the literal `captured pieces`
//   66-81   white's captured pool, 16 slots
//   82-97   black's captured pool, 16 slots
//   98      current_player=<w|b>
//   99      current_player2=<man|computer>
//   100     other_player=<w|b>
//   101     these_rook_king_moved=<square,square,...>
//   102     en_pass_pos=<landing>,<vacate>   (blank pair when none)
//   103     number_of_player=<0|1|2>
//
// Square lines are written a8..h1; on read any order is accepted as long as
// every square appears exactly once.

use std::fs;
use std::io;
use std::path::Path;

use crate::board::{Board, CapturedPool, CastlingRights, EnPassant, POOL_SLOTS};
use crate::error::LoadError;
use crate::game::{Controller, GameState, PlayerMode};
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

/// The standard starting position in save format.
pub const INITIAL_SETUP: &str = include_str!("../data/initial_setup.txt");

const CAPTURED_HEADER: &str = "captured pieces";
const WHITE_POOL_START: usize = 66;
const BLACK_POOL_START: usize = WHITE_POOL_START + POOL_SLOTS;
const PLAYER_LINE: usize = BLACK_POOL_START + POOL_SLOTS;
const EMPTY_SLOT: &str = "  ";

struct Lines<'a> {
    lines: Vec<&'a str>,
}

fn malformed(line: usize, reason: impl Into<String>) -> LoadError {
    LoadError::Malformed { line, reason: reason.into() }
}

impl<'a> Lines<'a> {
    /// Line `n`, 1-based.
    fn raw(&self, n: usize) -> Result<&'a str, LoadError> {
        self.lines
            .get(n - 1)
            .copied()
            .ok_or_else(|| malformed(n, "missing line"))
    }

    fn pair(&self, n: usize) -> Result<(&'a str, &'a str), LoadError> {
        self.raw(n)?
            .split_once('=')
            .ok_or_else(|| malformed(n, "expected key=value"))
    }

    fn value(&self, n: usize, key: &str) -> Result<&'a str, LoadError> {
        let (k, v) = self.pair(n)?;
        if k.trim() != key {
            return Err(malformed(n, format!("expected `{key}`, found `{k}`")));
        }
        Ok(v)
    }
}

fn parse_slot(value: &str, line: usize) -> Result<Option<Piece>, LoadError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    Piece::from_code(value)
        .map(Some)
        .ok_or_else(|| malformed(line, format!("unknown piece code `{value}`")))
}

fn parse_color(value: &str, line: usize) -> Result<Color, LoadError> {
    let mut chars = value.trim().chars();
    match (chars.next().and_then(Color::from_letter), chars.next()) {
        (Some(color), None) => Ok(color),
        _ => Err(malformed(line, format!("expected `w` or `b`, found `{value}`"))),
    }
}

fn parse_square(value: &str, line: usize) -> Result<Square, LoadError> {
    value
        .trim()
        .parse()
        .map_err(|e| malformed(line, format!("{e}")))
}

fn parse_pool(lines: &Lines<'_>, start: usize) -> Result<CapturedPool, LoadError> {
    let mut slots = [None; POOL_SLOTS];
    for (i, slot) in slots.iter_mut().enumerate() {
        let (_, value) = lines.pair(start + i)?;
        *slot = parse_slot(value, start + i)?;
    }
    Ok(CapturedPool::from_slots(slots))
}

/// Parses a save from text. The returned state has its status evaluated and
/// its repetition window seeded with the loaded position.
pub fn parse(text: &str) -> Result<GameState, LoadError> {
    let lines = Lines { lines: text.lines().collect() };
    let mut board = Board::empty();

    let mut seen = [[false; 8]; 8];
    for n in 1..=64 {
        let (key, value) = lines.pair(n)?;
        let sq = parse_square(key, n)?;
        let mark = &mut seen[sq.rank() as usize][sq.file() as usize];
        if *mark {
            return Err(malformed(n, format!("square {sq} listed twice")));
        }
        *mark = true;
        board.set(sq, parse_slot(value, n)?);
    }

    if lines.raw(65)?.trim_end() != CAPTURED_HEADER {
        return Err(malformed(65, format!("expected `{CAPTURED_HEADER}`")));
    }
    board.captured_white = parse_pool(&lines, WHITE_POOL_START)?;
    board.captured_black = parse_pool(&lines, BLACK_POOL_START)?;

    let n = PLAYER_LINE;
    board.current_turn = parse_color(lines.value(n, "current_player")?, n)?;

    let controller = match lines.value(n + 1, "current_player2")?.trim() {
        "man" => Controller::Man,
        "computer" => Controller::Computer,
        other => return Err(malformed(n + 1, format!("expected `man` or `computer`, found `{other}`"))),
    };

    let other = parse_color(lines.value(n + 2, "other_player")?, n + 2)?;
    if other != board.current_turn.opposite() {
        return Err(malformed(n + 2, "other_player must differ from current_player"));
    }

    let moved = lines.value(n + 3, "these_rook_king_moved")?;
    let mut castling = CastlingRights::default();
    for item in moved.split(',').filter(|s| !s.trim().is_empty()) {
        castling.mark_moved(parse_square(item, n + 3)?);
    }
    board.castling = castling;

    let ep = lines.value(n + 4, "en_pass_pos")?;
    let (landing, vacate) = ep
        .split_once(',')
        .ok_or_else(|| malformed(n + 4, "expected `landing,vacate`"))?;
    board.en_passant = match (landing.trim(), vacate.trim()) {
        ("", "") => None,
        (l, v) => Some(EnPassant {
            landing: parse_square(l, n + 4)?,
            vacate: parse_square(v, n + 4)?,
        }),
    };

    let count = lines.value(n + 5, "number_of_player")?.trim();
    let player_mode = count
        .parse::<u8>()
        .ok()
        .and_then(PlayerMode::from_count)
        .ok_or_else(|| malformed(n + 5, format!("expected 0, 1 or 2, found `{count}`")))?;

    validate(&board)?;
    Ok(GameState::from_board(board, player_mode, controller))
}

fn validate(board: &Board) -> Result<(), LoadError> {
    for color in [Color::White, Color::Black] {
        let kings = board
            .pieces(color)
            .filter(|(_, p)| p.piece_type == PieceType::King)
            .count();
        if kings != 1 {
            return Err(LoadError::CorruptPosition(format!("{color} has {kings} kings")));
        }
    }
    let waiting = board.current_turn.opposite();
    if board.promotable_pawn(board.current_turn).is_none() && board.is_in_check(waiting) {
        return Err(LoadError::CorruptPosition(format!(
            "{waiting} is in check but it is {}'s turn",
            board.current_turn
        )));
    }
    Ok(())
}

fn slot_code(slot: Option<Piece>) -> String {
    slot.map(Piece::code).unwrap_or_else(|| EMPTY_SLOT.to_string())
}

/// Renders `state` as save-file text, one line per field.
pub fn serialize(state: &GameState) -> String {
    let board = &state.board;
    let mut out = Vec::with_capacity(103);

    for sq in Square::display_order() {
        out.push(format!("{sq}={}", slot_code(board.get(sq))));
    }
    out.push(CAPTURED_HEADER.to_string());
    for (name, pool) in [("white", &board.captured_white), ("black", &board.captured_black)] {
        for (i, slot) in pool.slots().iter().enumerate() {
            out.push(format!("{name}_{}={}", i + 1, slot_code(*slot)));
        }
    }

    out.push(format!("current_player={}", board.current_turn.letter()));
    out.push(format!(
        "current_player2={}",
        match state.controller {
            Controller::Man => "man",
            Controller::Computer => "computer",
        }
    ));
    out.push(format!("other_player={}", board.current_turn.opposite().letter()));

    let moved: Vec<String> = board.castling.squares().iter().map(|s| s.to_string()).collect();
    out.push(format!("these_rook_king_moved={}", moved.join(",")));

    out.push(match board.en_passant {
        Some(ep) => format!("en_pass_pos={},{}", ep.landing, ep.vacate),
        None => format!("en_pass_pos=,{EMPTY_SLOT}"),
    });
    out.push(format!("number_of_player={}", state.player_mode.count()));

    let mut text = out.join("\n");
    text.push('\n');
    text
}

pub fn load(path: impl AsRef<Path>) -> Result<GameState, LoadError> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(LoadError::FileNotFound { path: path.to_path_buf() });
        }
        Err(e) => return Err(e.into()),
    };
    let state = parse(&text)?;
    tracing::info!(path = %path.display(), status = %state.status, "game loaded");
    Ok(state)
}

pub fn save(state: &GameState, path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    fs::write(path, serialize(state))?;
    tracing::info!(path = %path.display(), "game saved");
    Ok(())
}
