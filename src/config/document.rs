//! Configuration document types.
//!
//! These deserialize straight from the host-authored JSON document. Field
//! names follow the document's camelCase convention. Everything here is
//! immutable after construction; the engine holds one `GameConfig` per
//! instance and only ever reads it.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::Role;

/// Reserved event name synthesized by the state timer.
///
/// When a timed state's duration elapses, the engine handles a `timeout`
/// event as the server actor. A configuration may declare `timeout` under
/// `events` to attach effects or restrict it further; if it does not, an
/// implicit server-only, effect-free event is assumed so that a bare
/// `duration` plus a `timeout` transition is enough for auto-advance.
pub const TIMEOUT_EVENT: &str = "timeout";

/// A complete game configuration document.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Document identifier (opaque to the engine).
    pub id: String,

    /// Display title.
    pub title: String,

    /// Minimum roster size.
    #[serde(default = "default_min_players")]
    pub min_players: usize,

    /// Maximum roster size.
    #[serde(default = "default_max_players")]
    pub max_players: usize,

    /// Named states. Every transition endpoint and `initial_state` must
    /// name a key of this map.
    pub states: FxHashMap<String, StateConfig>,

    /// The state a new instance starts in.
    pub initial_state: String,

    /// Seed key/value data copied into `GameState.data` at start.
    #[serde(default)]
    pub initial_game_state: Map<String, Value>,

    /// Attribute template copied (per player, independently) into
    /// `GameState.player_attributes` at start.
    #[serde(default)]
    pub player_attributes: Map<String, Value>,

    /// Named, permissioned event definitions.
    #[serde(default)]
    pub events: FxHashMap<String, EventConfig>,

    /// Transition table. Order is significant: for a given (from, event)
    /// pair the first entry whose condition holds wins.
    #[serde(default)]
    pub transitions: Vec<TransitionConfig>,

    /// Per-state UI declarations.
    #[serde(default)]
    pub ui: FxHashMap<String, UiConfig>,
}

fn default_min_players() -> usize {
    1
}

fn default_max_players() -> usize {
    16
}

impl GameConfig {
    /// Look up a state definition.
    #[must_use]
    pub fn state(&self, name: &str) -> Option<&StateConfig> {
        self.states.get(name)
    }

    /// Look up an event definition.
    #[must_use]
    pub fn event(&self, name: &str) -> Option<&EventConfig> {
        self.events.get(name)
    }

    /// Transitions out of `from` for `event`, in declaration order.
    pub fn transitions_for<'a>(
        &'a self,
        from: &'a str,
        event: &'a str,
    ) -> impl Iterator<Item = &'a TransitionConfig> {
        self.transitions
            .iter()
            .filter(move |t| t.from == from && t.event == event)
    }
}

/// One named state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateConfig {
    /// Seconds until the engine synthesizes a [`TIMEOUT_EVENT`] for this
    /// state. `None` means the state has no timer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    /// Effects run when the state is entered via a transition.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_enter: Vec<EffectConfig>,

    /// Effects run when the state is left via a transition.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_exit: Vec<EffectConfig>,
}

/// One named event: who may fire it and what it does.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventConfig {
    /// Roles allowed to fire this event. Empty means nobody can.
    #[serde(default)]
    pub permissions: Vec<Role>,

    /// Effects applied, in order, when the event is accepted.
    #[serde(default)]
    pub effects: Vec<EffectConfig>,
}

impl EventConfig {
    /// Whether `role` may fire this event.
    #[must_use]
    pub fn allows(&self, role: Role) -> bool {
        self.permissions.contains(&role)
    }
}

/// A single named mutation with its raw (unresolved) arguments.
///
/// Arguments are plain JSON values; strings may carry `{{expression}}`
/// placeholders which are resolved against the event context before the
/// operation runs. A full-placeholder string substitutes the typed value,
/// which is how literal, interpolated, and expression arguments share one
/// shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Operation name, looked up in the op registry.
    pub op: String,

    /// Raw arguments.
    #[serde(default)]
    pub args: Vec<Value>,
}

impl EffectConfig {
    /// Convenience constructor for programmatic configs and tests.
    pub fn new(op: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            op: op.into(),
            args,
        }
    }
}

/// A directed transition edge.
///
/// Multiple transitions may share a (from, event) pair. They are tried in
/// declaration order and the first whose `condition` is absent or resolves
/// truthy is taken; ties break by order, never by condition specificity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Source state name.
    pub from: String,

    /// Target state name.
    pub to: String,

    /// Event that triggers this edge.
    pub event: String,

    /// Optional boolean expression gating the edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// UI declarations for one state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Host view: a single component tree, interpolated against the base
    /// game context (no per-player fields).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Value>,

    /// Player view(s): a single shared tree, or an ordered conditional
    /// list selected per player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerUiConfig>,
}

/// Player-facing UI: one shared view or an ordered list of conditional
/// views.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerUiConfig {
    /// Ordered conditional views; first match per player wins.
    Views(Vec<PlayerView>),
    /// A single view shown to every player.
    Single(Value),
}

impl PlayerUiConfig {
    /// Normalize to the ordered-list form.
    #[must_use]
    pub fn views(&self) -> Vec<PlayerView> {
        match self {
            PlayerUiConfig::Views(views) => views.clone(),
            PlayerUiConfig::Single(view) => vec![PlayerView {
                condition: None,
                view: view.clone(),
            }],
        }
    }
}

/// One conditional player view.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerView {
    /// Boolean expression over the player-extended context. Absent means
    /// the view always matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    /// The component tree to interpolate and deliver.
    pub view: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_player_ui_normalizes_single_view() {
        let ui: PlayerUiConfig =
            serde_json::from_value(json!({ "type": "text", "value": "hi" })).unwrap();
        let views = ui.views();
        assert_eq!(views.len(), 1);
        assert!(views[0].condition.is_none());
    }

    #[test]
    fn test_player_ui_keeps_view_order() {
        let ui: PlayerUiConfig = serde_json::from_value(json!([
            { "condition": "player.answered", "view": { "type": "waiting" } },
            { "view": { "type": "question" } },
        ]))
        .unwrap();
        let views = ui.views();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].condition.as_deref(), Some("player.answered"));
        assert!(views[1].condition.is_none());
    }

    #[test]
    fn test_unknown_permission_token_rejected() {
        let err = serde_json::from_value::<EventConfig>(json!({
            "permissions": ["admin"],
        }));
        assert!(err.is_err());
    }
}
