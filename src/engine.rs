// =============================================================================
// Automated player
//
// No tree search. The engine walks a fixed, ordered list of strategies and
// plays the first move any of them produces:
//
//    1. capture the attacker of our most valuable threatened piece, landing
//       on an unattacked square
//    2. capture that attacker anyway if the capturing piece is worth less
//       than the attacker or the threatened piece
//    3. retreat the threatened piece without raising our exposure
//    4. capture that attacker in an even trade
//    5. capture the opponent's most valuable attacked piece, landing safely
//    6. capture it anyway if the trade is favourable
//    7. take a live en-passant capture if it lands safely
//    8. while the opponent keeps material above the threshold, make the safe
//       move that exposes the most enemy value, nearest their king
//    9. any move that does not raise our exposure, nearest their king
//   10. any legal move
//
// "Exposure" is the summed value of a side's attacked pieces. Each strategy
// is a plain function over a `Context` built once per decision; ties are
// broken by the order of the shuffled candidate list, so a seeded engine
// plays reproducibly.
// =============================================================================

use std::cmp::Reverse;
use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::game::GameState;
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

/// Platform-appropriate random seed.
/// Uses js_sys::Math::random() in WASM builds, the rand crate natively.
fn random_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Math::random() * u64::MAX as f64) as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        rand::random::<u64>()
    }
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Strategy 8 only runs while the opponent's material (king included)
    /// is above this.
    pub material_threshold: u32,
    /// Piece the engine promotes to.
    pub promotion: PieceType,
    /// Seed for tie-breaking. `None` picks a fresh one per engine.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            material_threshold: 13,
            promotion: PieceType::Queen,
            seed: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strategy {
    CaptureAttackerSafely,
    TradeDownOnAttacker,
    Retreat,
    EvenTradeOnAttacker,
    CaptureTargetSafely,
    CaptureTargetFavourably,
    EnPassant,
    Pressure,
    Approach,
    AnyMove,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::CaptureAttackerSafely => "capture attacker safely",
            Strategy::TradeDownOnAttacker => "trade down on attacker",
            Strategy::Retreat => "retreat",
            Strategy::EvenTradeOnAttacker => "even trade on attacker",
            Strategy::CaptureTargetSafely => "capture target safely",
            Strategy::CaptureTargetFavourably => "capture target favourably",
            Strategy::EnPassant => "en passant",
            Strategy::Pressure => "pressure",
            Strategy::Approach => "approach",
            Strategy::AnyMove => "any move",
        };
        f.write_str(name)
    }
}

type StrategyFn = fn(&Context<'_>) -> Option<(Square, Square)>;

/// Tried strictly in this order.
const STRATEGIES: [(Strategy, StrategyFn); 10] = [
    (Strategy::CaptureAttackerSafely, capture_attacker_safely),
    (Strategy::TradeDownOnAttacker, trade_down_on_attacker),
    (Strategy::Retreat, retreat),
    (Strategy::EvenTradeOnAttacker, even_trade_on_attacker),
    (Strategy::CaptureTargetSafely, capture_target_safely),
    (Strategy::CaptureTargetFavourably, capture_target_favourably),
    (Strategy::EnPassant, en_passant),
    (Strategy::Pressure, pressure),
    (Strategy::Approach, approach),
    (Strategy::AnyMove, any_move),
];

/// The chosen move and the strategy that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub mv: Move,
    pub strategy: Strategy,
}

pub struct Engine {
    config: EngineConfig,
    rng: StdRng,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let seed = config.seed.unwrap_or_else(random_seed);
        Engine {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Picks a move for the side to move. `None` only when the game is over
    /// or a promotion is still pending.
    pub fn compute_automated_move(&mut self, state: &GameState) -> Option<Decision> {
        if state.status().is_terminal() || state.pending_promotion.is_some() {
            return None;
        }
        let cx = Context::new(&state.board, &self.config, &mut self.rng);

        let (strategy, (from, to)) = STRATEGIES
            .iter()
            .find_map(|&(strategy, pick)| pick(&cx).map(|mv| (strategy, mv)))?;

        let mv = Move {
            from,
            to,
            promotion: cx.promotes(from, to).then_some(self.config.promotion),
        };
        tracing::debug!(side = %cx.mover, %mv, %strategy, "automated move chosen");
        Some(Decision { mv, strategy })
    }
}

/// One-off decision with a freshly seeded default engine.
pub fn compute_automated_move(state: &GameState) -> Option<Move> {
    Engine::default().compute_automated_move(state).map(|d| d.mv)
}

// =============================================================================
// Decision context
// =============================================================================

struct Context<'a> {
    board: &'a Board,
    config: &'a EngineConfig,
    mover: Color,
    /// All legal moves for the mover, shuffled.
    moves: Vec<(Square, Square)>,
    /// Mover's attacked pieces, most valuable first.
    threatened: Vec<Square>,
    /// Opponent's attacked pieces (king excluded), most valuable first.
    targets: Vec<Square>,
    exposure: u32,
    enemy_king: Option<Square>,
}

/// Attacked pieces of `color`, highest value first, equal values in random order.
fn ranked_under_attack(board: &Board, color: Color, rng: &mut impl Rng) -> Vec<(Square, PieceType)> {
    let mut list: Vec<(Square, PieceType)> = board
        .pieces(color)
        .filter(|&(sq, _)| board.is_attacked(sq, color))
        .map(|(sq, p)| (sq, p.piece_type))
        .collect();
    list.shuffle(rng);
    list.sort_by_key(|&(_, kind)| Reverse(kind.value()));
    list
}

impl<'a> Context<'a> {
    fn new(board: &'a Board, config: &'a EngineConfig, rng: &mut StdRng) -> Self {
        let mover = board.current_turn;
        let enemy = mover.opposite();

        let mut moves = board.legal_moves(mover);
        moves.shuffle(rng);

        let threatened = ranked_under_attack(board, mover, rng)
            .into_iter()
            .map(|(sq, _)| sq)
            .collect();
        let targets = ranked_under_attack(board, enemy, rng)
            .into_iter()
            .filter(|&(_, kind)| kind != PieceType::King)
            .map(|(sq, _)| sq)
            .collect();

        Context {
            board,
            config,
            mover,
            moves,
            threatened,
            targets,
            exposure: board.exposure(mover),
            enemy_king: board.find_king(enemy),
        }
    }

    fn enemy(&self) -> Color {
        self.mover.opposite()
    }

    fn value_on(&self, sq: Square) -> u32 {
        self.board.get(sq).map_or(0, |p| p.value())
    }

    fn promotes(&self, from: Square, to: Square) -> bool {
        matches!(self.board.get(from), Some(p) if p.piece_type == PieceType::Pawn)
            && to.rank() == self.mover.promotion_rank()
    }

    /// Virtual board after the move, promotion included.
    fn after(&self, from: Square, to: Square) -> Board {
        let mut board = self.board.clone();
        let promotes = self.promotes(from, to);
        board.make_move(from, to);
        if promotes {
            board.set(to, Some(Piece::new(self.config.promotion, self.mover)));
        }
        board
    }

    fn lands_safely(&self, from: Square, to: Square) -> bool {
        !self.after(from, to).is_attacked(to, self.mover)
    }

    fn onto(&self, target: Square) -> impl Iterator<Item = (Square, Square)> + '_ {
        self.moves.iter().copied().filter(move |&(_, to)| to == target)
    }

    /// Our most valuable threatened piece and the square attacking it.
    fn threat(&self) -> Option<(Square, Square)> {
        let threatened = *self.threatened.first()?;
        let attacker = self.board.attacker_of(threatened, self.mover)?;
        Some((threatened, attacker))
    }

    fn distance_to_enemy_king(&self, sq: Square) -> f64 {
        self.enemy_king.map_or(0.0, |k| sq.distance(k))
    }

    /// The move left a double-advanced pawn that an enemy pawn can take en passant.
    fn opens_en_passant(&self, after: &Board) -> bool {
        let Some(ep) = after.en_passant else {
            return false;
        };
        [-1, 1]
            .iter()
            .filter_map(|&df| ep.vacate.offset(df, 0))
            .any(|sq| after.is_legal(sq, ep.landing, self.enemy()))
    }
}

// =============================================================================
// Strategies
// =============================================================================

fn capture_attacker_safely(cx: &Context<'_>) -> Option<(Square, Square)> {
    let (_, attacker) = cx.threat()?;
    cx.onto(attacker).find(|&(from, to)| cx.lands_safely(from, to))
}

fn trade_down_on_attacker(cx: &Context<'_>) -> Option<(Square, Square)> {
    let (threatened, attacker) = cx.threat()?;
    let attacker_value = cx.value_on(attacker);
    let threatened_value = cx.value_on(threatened);
    cx.onto(attacker).find(|&(from, _)| {
        let v = cx.value_on(from);
        v < attacker_value || v < threatened_value
    })
}

fn retreat(cx: &Context<'_>) -> Option<(Square, Square)> {
    let (threatened, _) = cx.threat()?;
    let mut best: Option<((Square, Square), u32)> = None;
    for &(from, to) in cx.moves.iter().filter(|&&(from, _)| from == threatened) {
        let after = cx.after(from, to);
        let exposure = after.exposure(cx.mover);
        if exposure > cx.exposure || cx.opens_en_passant(&after) {
            continue;
        }
        if best.map_or(true, |(_, e)| exposure < e) {
            best = Some(((from, to), exposure));
        }
    }
    best.map(|(mv, _)| mv)
}

fn even_trade_on_attacker(cx: &Context<'_>) -> Option<(Square, Square)> {
    let (_, attacker) = cx.threat()?;
    let attacker_value = cx.value_on(attacker);
    cx.onto(attacker).find(|&(from, _)| cx.value_on(from) <= attacker_value)
}

fn capture_target_safely(cx: &Context<'_>) -> Option<(Square, Square)> {
    let target = *cx.targets.first()?;
    cx.onto(target).find(|&(from, to)| cx.lands_safely(from, to))
}

fn capture_target_favourably(cx: &Context<'_>) -> Option<(Square, Square)> {
    let target = *cx.targets.first()?;
    let target_value = cx.value_on(target);
    cx.onto(target).find(|&(from, _)| cx.value_on(from) < target_value)
}

fn en_passant(cx: &Context<'_>) -> Option<(Square, Square)> {
    let ep = cx.board.en_passant?;
    cx.onto(ep.landing).find(|&(from, to)| {
        matches!(cx.board.get(from), Some(p) if p.piece_type == PieceType::Pawn)
            && cx.lands_safely(from, to)
    })
}

fn pressure(cx: &Context<'_>) -> Option<(Square, Square)> {
    if cx.board.material(cx.enemy()) <= cx.config.material_threshold {
        return None;
    }
    let mut best: Option<((Square, Square), u32, f64)> = None;
    for &(from, to) in &cx.moves {
        let after = cx.after(from, to);
        if after.is_attacked(to, cx.mover) || after.exposure(cx.mover) > cx.exposure {
            continue;
        }
        let pressure = after.exposure(cx.enemy());
        let distance = cx.distance_to_enemy_king(to);
        let better = match best {
            None => true,
            Some((_, p, d)) => pressure > p || (pressure == p && distance < d),
        };
        if better {
            best = Some(((from, to), pressure, distance));
        }
    }
    best.map(|(mv, _, _)| mv)
}

fn approach(cx: &Context<'_>) -> Option<(Square, Square)> {
    let mut best: Option<((Square, Square), f64)> = None;
    for &(from, to) in &cx.moves {
        if cx.after(from, to).exposure(cx.mover) > cx.exposure {
            continue;
        }
        let distance = cx.distance_to_enemy_king(to);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some(((from, to), distance));
        }
    }
    best.map(|(mv, _)| mv)
}

fn any_move(cx: &Context<'_>) -> Option<(Square, Square)> {
    cx.moves.first().copied()
}
