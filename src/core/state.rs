//! Live game state for one running instance.
//!
//! ## GameState
//!
//! The single mutable object of a game instance:
//! - `status`: the current state-machine state (always a key of the
//!   configuration's `states`)
//! - `data`: arbitrary keyed values seeded from `initial_game_state` and
//!   mutated by effects
//! - `player_attributes`: per-player keyed values, one independently
//!   mutable map per roster member
//!
//! Values are typed JSON variants ([`serde_json::Value`]), never
//! reflection over host types. The state is owned exclusively by the game
//! orchestrator; effects are the only mutation path.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Complete mutable state of a running game.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GameState {
    /// Current state name.
    pub status: String,

    /// Game-wide keyed data. Keys are declared by the configuration, not
    /// the engine.
    pub data: Map<String, Value>,

    /// Per-player attribute maps, keyed by player id.
    #[serde(rename = "playerAttributes")]
    pub player_attributes: FxHashMap<String, Map<String, Value>>,
}

impl GameState {
    /// Create an empty state in the given status.
    #[must_use]
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            data: Map::new(),
            player_attributes: FxHashMap::default(),
        }
    }

    /// Get a game-wide data value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Set a game-wide data value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Get one player's attribute map.
    #[must_use]
    pub fn attributes_of(&self, player_id: &str) -> Option<&Map<String, Value>> {
        self.player_attributes.get(player_id)
    }

    /// Get one player's attribute map for mutation, creating it if absent.
    pub fn attributes_of_mut(&mut self, player_id: &str) -> &mut Map<String, Value> {
        self.player_attributes
            .entry(player_id.to_string())
            .or_default()
    }

    /// Full raw snapshot as a JSON value (debug broadcast shape).
    ///
    /// Data keys sit at the top level next to `status` and
    /// `playerAttributes`, matching the shape expressions evaluate over.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        let mut root = self.data.clone();
        root.insert("status".into(), Value::String(self.status.clone()));
        root.insert(
            "playerAttributes".into(),
            Value::Object(
                self.player_attributes
                    .iter()
                    .map(|(id, attrs)| (id.clone(), Value::Object(attrs.clone())))
                    .collect(),
            ),
        );
        Value::Object(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_shape() {
        let mut state = GameState::new("LOBBY");
        state.set("round", json!(2));
        state
            .attributes_of_mut("p1")
            .insert("score".into(), json!(7));

        let snap = state.snapshot();
        assert_eq!(snap["status"], json!("LOBBY"));
        assert_eq!(snap["round"], json!(2));
        assert_eq!(snap["playerAttributes"]["p1"]["score"], json!(7));
    }

    #[test]
    fn test_attribute_maps_created_on_demand() {
        let mut state = GameState::new("LOBBY");
        assert!(state.attributes_of("p1").is_none());
        state.attributes_of_mut("p1").insert("ready".into(), json!(true));
        assert_eq!(state.attributes_of("p1").unwrap()["ready"], json!(true));
    }
}
