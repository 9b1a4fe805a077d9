pub mod attacks;
pub mod board;
pub mod castling;
pub mod engine;
pub mod error;
pub mod game;
pub mod movegen;
pub mod moves;
pub mod piece;
pub mod save;
pub mod session;
pub mod square;
pub mod status;

#[cfg(target_arch = "wasm32")]
mod wasm_api;
