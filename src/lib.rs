//! # parlor
//!
//! A declarative multiplayer mini-game engine. A host defines a game
//! entirely as data (named states, permissioned events, conditional
//! transitions, side-effecting operations, per-role UI descriptions) and
//! the engine interprets that configuration at run time for a roster of
//! connected players, with no game-specific code anywhere.
//!
//! ## Design Principles
//!
//! 1. **Configuration Over Code**: states, events, transitions, effects,
//!    and UI all live in one JSON document, validated once at
//!    construction and trusted afterwards.
//!
//! 2. **Sandboxed Expressions**: conditions and templates are evaluated by
//!    a small whitelisted grammar with no reflective surface; a hostile or
//!    malformed expression degrades to null, never to a crash or escape.
//!
//! 3. **One Event at a Time**: each instance serializes actor actions and
//!    timer expiries through a single lock, so effects apply in order and
//!    at most one transition happens per event.
//!
//! ## Modules
//!
//! - `core`: players, permission roles, live game state
//! - `config`: the configuration document and its validation
//! - `expr`: sandboxed expression parsing, evaluation, interpolation
//! - `effects`: named mutation operations and the executor
//! - `engine`: state timer, UI projection, and the game orchestrator

pub mod config;
pub mod core;
pub mod effects;
pub mod engine;
pub mod expr;

// Re-export commonly used types
pub use crate::config::{
    ConfigError, EffectConfig, EventConfig, GameConfig, PlayerUiConfig, PlayerView, StateConfig,
    TransitionConfig, UiConfig, TIMEOUT_EVENT,
};
pub use crate::core::{GameState, Player, Role, Roster, SERVER_ACTOR};
pub use crate::effects::{EffectError, EffectExecutor, OpRegistry};
pub use crate::engine::{
    ConfigurableGame, StateTimer, UiState, UiStateBuilder, STATE_CHANNEL, UI_CHANNEL,
};
pub use crate::expr::{interpolate, EvalContext, EvalError, Resolver};
