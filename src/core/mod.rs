//! Core types: players, permission roles, and live game state.
//!
//! ## Design Philosophy
//!
//! The engine never hardcodes what a game's state contains. A configuration
//! declares arbitrary keys and the engine stores them as typed JSON values,
//! so "any key the configuration declares is valid" while every mutation
//! still goes through a type-checked operation boundary.

mod player;
mod state;

pub use player::{Player, Role, Roster, SERVER_ACTOR};
pub use state::GameState;
