//! Game configuration: the declarative document that defines a mini-game.
//!
//! A configuration is a JSON-compatible document naming states, permissioned
//! events, conditional transitions, effect lists, and per-role UI views. The
//! engine interprets it directly; there is no game-specific code path.
//!
//! ## Lifecycle
//!
//! A document is deserialized and validated exactly once, at game-instance
//! construction. Validation is the only point where a malformed
//! configuration can abort game creation; after it passes, state and
//! transition references are trusted and never re-checked at run time.

mod document;
mod validate;

pub use document::{
    EffectConfig, EventConfig, GameConfig, PlayerUiConfig, PlayerView, StateConfig,
    TransitionConfig, UiConfig, TIMEOUT_EVENT,
};
pub use validate::{initialize, ConfigError};
