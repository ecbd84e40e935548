//! Construction-time validation and initial-state seeding.
//!
//! Validation enforces referential integrity once; the rest of the engine
//! trusts the document afterwards. `initialize` is the only place a
//! `GameState` is ever created from a configuration.

use serde_json::Value;
use thiserror::Error;

use crate::core::{GameState, Roster};

use super::document::{GameConfig, TIMEOUT_EVENT};

/// Fatal configuration errors. An instance is never created from a
/// document that fails validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration declares no states")]
    NoStates,

    #[error("initial state `{0}` is not a declared state")]
    UnknownInitialState(String),

    #[error("transition {index} references unknown state `{state}`")]
    UnknownStateRef { index: usize, state: String },

    #[error("transition {index} references undeclared event `{event}`")]
    UnknownTransitionEvent { index: usize, event: String },

    #[error("player bounds are invalid: min {min}, max {max}")]
    BadPlayerBounds { min: usize, max: usize },

    #[error("roster has {actual} players, configuration allows {min}..={max}")]
    RosterOutOfBounds {
        actual: usize,
        min: usize,
        max: usize,
    },

    #[error("configuration document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl GameConfig {
    /// Deserialize and validate a JSON configuration document.
    pub fn from_json(document: Value) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_value(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural constraints beyond what deserialization already
    /// enforced (permission tokens are checked by the `Role` enum).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.states.is_empty() {
            return Err(ConfigError::NoStates);
        }
        if self.min_players < 1 || self.max_players < self.min_players {
            return Err(ConfigError::BadPlayerBounds {
                min: self.min_players,
                max: self.max_players,
            });
        }
        if !self.states.contains_key(&self.initial_state) {
            return Err(ConfigError::UnknownInitialState(self.initial_state.clone()));
        }
        for (index, transition) in self.transitions.iter().enumerate() {
            for state in [&transition.from, &transition.to] {
                if !self.states.contains_key(state) {
                    return Err(ConfigError::UnknownStateRef {
                        index,
                        state: state.clone(),
                    });
                }
            }
            // `timeout` is implicitly declared by the engine.
            if transition.event != TIMEOUT_EVENT && !self.events.contains_key(&transition.event)
            {
                return Err(ConfigError::UnknownTransitionEvent {
                    index,
                    event: transition.event.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Build the initial `GameState` for a validated configuration and roster.
///
/// Each roster player receives an independent copy of the attribute
/// template, never a shared reference, so mutating one player's
/// attributes can never leak into another's.
pub fn initialize(config: &GameConfig, roster: &Roster) -> Result<GameState, ConfigError> {
    let count = roster.len();
    if count < config.min_players || count > config.max_players {
        return Err(ConfigError::RosterOutOfBounds {
            actual: count,
            min: config.min_players,
            max: config.max_players,
        });
    }

    let mut state = GameState::new(config.initial_state.clone());
    state.data = config.initial_game_state.clone();
    for player in roster.players() {
        state
            .player_attributes
            .insert(player.id.clone(), config.player_attributes.clone());
    }
    Ok(state)
}
