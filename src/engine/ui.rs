//! UI projection: from game state to per-audience view descriptions.
//!
//! The engine never renders anything. For the current state it looks up
//! the configured UI declaration and produces abstract, data-only
//! component trees: one for the host, one per player. Player views are an
//! ordered conditional list: for each player the first view whose
//! condition is absent or truthy under that player's context is selected,
//! which supports both a single shared view and fully personalized views
//! from the same configuration shape.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::config::GameConfig;
use crate::core::{GameState, Roster};
use crate::expr::{interpolate, EvalContext, Resolver};

/// The projected UI for one instant of a game.
#[derive(Clone, Debug, PartialEq)]
pub struct UiState {
    /// Current state name.
    pub status: String,
    /// Host component tree (null when the state declares none).
    pub host: Value,
    /// Selected, interpolated view per player id (null when none matched).
    pub players: FxHashMap<String, Value>,
    /// The sanitized remainder of the game state (data keys only; raw
    /// per-player attributes stay server-side).
    pub data: Map<String, Value>,
}

impl UiState {
    /// Broadcastable JSON shape: data keys at the top level next to
    /// `status`, `host`, and `players`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut root = self.data.clone();
        root.insert("status".into(), Value::String(self.status.clone()));
        root.insert("host".into(), self.host.clone());
        root.insert(
            "players".into(),
            Value::Object(
                self.players
                    .iter()
                    .map(|(id, view)| (id.clone(), view.clone()))
                    .collect(),
            ),
        );
        Value::Object(root)
    }
}

/// Builds [`UiState`] projections.
pub struct UiStateBuilder;

impl UiStateBuilder {
    /// Project the current state for every audience.
    #[must_use]
    pub fn build(config: &GameConfig, state: &GameState, roster: &Roster) -> UiState {
        let declaration = config.ui.get(&state.status);
        let base = EvalContext::from_state(state).with_players(roster, state);

        // Host UI: one tree, base context, no per-player fields.
        let host = declaration
            .and_then(|ui| ui.host.as_ref())
            .map(|tree| interpolate(tree, &base))
            .unwrap_or(Value::Null);

        let views = declaration
            .and_then(|ui| ui.player.as_ref())
            .map(|player_ui| player_ui.views())
            .unwrap_or_default();

        let mut players = FxHashMap::default();
        for player in roster.players() {
            let ctx = base.clone().with_player(player, state);
            let selected = views
                .iter()
                .find(|view| match &view.condition {
                    None => true,
                    Some(condition) => Resolver::condition(condition, &ctx),
                })
                .map(|view| interpolate(&view.view, &ctx))
                .unwrap_or(Value::Null);
            players.insert(player.id.clone(), selected);
        }

        UiState {
            status: state.status.clone(),
            host,
            players,
            data: state.data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Player;
    use serde_json::json;

    fn setup() -> (GameConfig, GameState, Roster) {
        let config = GameConfig::from_json(json!({
            "id": "quiz", "title": "Quiz",
            "states": { "QUESTION": {} },
            "initialState": "QUESTION",
            "ui": {
                "QUESTION": {
                    "host": { "type": "text", "value": "{{gameTitle}} - round {{round}}" },
                    "player": [
                        {
                            "condition": "player.answered",
                            "view": { "type": "text", "value": "waiting" },
                        },
                        { "view": { "type": "prompt", "value": "answer now, {{player.nickname}}" } },
                    ],
                },
            },
        }))
        .unwrap();

        let roster = Roster::new(
            vec![Player::new("p1", "Alice"), Player::new("p2", "Bob")],
            "p1",
        );
        let mut state = GameState::new("QUESTION");
        state.set("gameTitle", json!("Quiz"));
        state.set("round", json!(1));
        state
            .attributes_of_mut("p1")
            .insert("answered".into(), json!(true));
        state
            .attributes_of_mut("p2")
            .insert("answered".into(), json!(false));
        (config, state, roster)
    }

    #[test]
    fn test_host_and_personalized_player_views() {
        let (config, state, roster) = setup();
        let ui = UiStateBuilder::build(&config, &state, &roster);

        assert_eq!(ui.host["value"], json!("Quiz - round 1"));
        assert_eq!(ui.players["p1"]["value"], json!("waiting"));
        assert_eq!(ui.players["p2"]["value"], json!("answer now, Bob"));
    }

    #[test]
    fn test_missing_declaration_degrades_to_null() {
        let (config, mut state, roster) = setup();
        state.status = "QUESTION".into();
        let mut bare = config.clone();
        bare.ui.clear();
        let ui = UiStateBuilder::build(&bare, &state, &roster);
        assert_eq!(ui.host, Value::Null);
        assert_eq!(ui.players["p1"], Value::Null);
    }

    #[test]
    fn test_broadcast_shape_keeps_data_and_status() {
        let (config, state, roster) = setup();
        let value = UiStateBuilder::build(&config, &state, &roster).to_value();
        assert_eq!(value["status"], json!("QUESTION"));
        assert_eq!(value["round"], json!(1));
        assert!(value.get("playerAttributes").is_none());
    }
}
