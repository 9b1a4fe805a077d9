// The single active game, with its engine.
//
// A session always holds a playable position. Opening one from disk is
// all-or-nothing; once running, a malformed save is reported and the
// current position is kept instead.

use std::io;
use std::path::Path;

use crate::engine::{Decision, Engine, EngineConfig};
use crate::error::LoadError;
use crate::game::{Controller, GameState, PlayerMode};
use crate::piece::Color;
use crate::save;

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded,
    /// The file was malformed; the previous position is still active.
    KeptPrevious(LoadError),
}

pub struct Session {
    state: GameState,
    engine: Engine,
}

impl Session {
    /// Standard starting position, two human players.
    pub fn new(config: EngineConfig) -> Self {
        Session {
            state: GameState::new(PlayerMode::Dual, Color::White),
            engine: Engine::new(config),
        }
    }

    /// Starts from a save file. Any failure here is fatal to the caller.
    pub fn open(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self, LoadError> {
        Ok(Session {
            state: save::load(path)?,
            engine: Engine::new(config),
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Replaces the active game with a saved one. Malformed content keeps
    /// the current game; a missing or unreadable file is returned as an error.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<LoadOutcome, LoadError> {
        self.adopt(save::load(path))
    }

    /// Like `load`, from text already in memory.
    pub fn load_text(&mut self, text: &str) -> Result<LoadOutcome, LoadError> {
        self.adopt(save::parse(text))
    }

    fn adopt(&mut self, loaded: Result<GameState, LoadError>) -> Result<LoadOutcome, LoadError> {
        match loaded {
            Ok(state) => {
                self.state = state;
                Ok(LoadOutcome::Loaded)
            }
            Err(e) if e.is_malformed() => {
                tracing::warn!(error = %e, "malformed save, keeping current game");
                Ok(LoadOutcome::KeptPrevious(e))
            }
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        save::save(&self.state, path)
    }

    /// Abandons the current game for a fresh one.
    pub fn reset(&mut self, player_mode: PlayerMode, human_color: Color) {
        tracing::info!(mode = ?player_mode, human = %human_color, "new game");
        self.state = GameState::new(player_mode, human_color);
    }

    /// The computer is due to move.
    pub fn awaiting_computer(&self) -> bool {
        self.state.controller == Controller::Computer
            && !self.state.status().is_terminal()
            && self.state.pending_promotion.is_none()
    }

    /// Computes and plays the engine's move for the side to move.
    pub fn automated_turn(&mut self) -> Option<Decision> {
        let decision = self.engine.compute_automated_move(&self.state)?;
        match self.state.play(&decision.mv) {
            Ok(_) => Some(decision),
            Err(reason) => {
                tracing::warn!(mv = %decision.mv, %reason, "engine move refused");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::GameStatus;

    fn temp_file(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("heuristic_chess_session_{}_{name}", std::process::id()))
    }

    fn seeded() -> EngineConfig {
        EngineConfig { seed: Some(11), ..EngineConfig::default() }
    }

    #[test]
    fn open_missing_file_is_fatal() {
        let err = Session::open(temp_file("missing.txt"), seeded()).err().unwrap();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }

    #[test]
    fn malformed_load_keeps_the_current_game() {
        let mut session = Session::new(seeded());
        session.state_mut().attempt_move("e2".parse().unwrap(), "e4".parse().unwrap());
        let before = session.state().board.snapshot();

        let outcome = session.load_text("a8=bT\nnot a save file\n").unwrap();
        assert!(matches!(outcome, LoadOutcome::KeptPrevious(_)));
        assert_eq!(session.state().board.snapshot(), before);
        assert_eq!(session.state().side_to_move(), Color::Black);
    }

    #[test]
    fn save_then_load_restores_position() {
        let path = temp_file("roundtrip.txt");
        let mut session = Session::new(seeded());
        session.state_mut().attempt_move("g1".parse().unwrap(), "f3".parse().unwrap());
        session.save(&path).unwrap();

        let mut other = Session::new(seeded());
        assert!(matches!(other.load(&path).unwrap(), LoadOutcome::Loaded));
        assert_eq!(other.state().board.snapshot(), session.state().board.snapshot());
        assert_eq!(other.state().side_to_move(), Color::Black);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn demo_game_plays_itself() {
        let mut session = Session::new(seeded());
        session.reset(PlayerMode::Demo, Color::White);
        let mut plies = 0;
        while session.awaiting_computer() && plies < 10 {
            session.automated_turn().unwrap();
            plies += 1;
        }
        assert!(plies >= 4);
        assert_eq!(session.state().controller, Controller::Computer);
        if plies == 10 {
            assert_eq!(session.state().status(), GameStatus::InProgress);
        }
    }

    #[test]
    fn single_player_waits_for_the_human() {
        let mut session = Session::new(seeded());
        session.reset(PlayerMode::Single, Color::White);
        assert!(!session.awaiting_computer());
        session.state_mut().attempt_move("d2".parse().unwrap(), "d4".parse().unwrap());
        assert!(session.awaiting_computer());
        session.automated_turn().unwrap();
        assert!(!session.awaiting_computer());
    }
}
