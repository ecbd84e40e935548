//! Effect execution: resolve arguments, dispatch operations in order.

use serde_json::Value;
use smallvec::SmallVec;

use crate::config::EffectConfig;
use crate::core::{GameState, Roster};
use crate::expr::{interpolate, EvalContext};

/// Build the evaluation context for one effect or condition: game state at
/// the top level, the roster as `players`, the acting player as `player`
/// (when the actor is a roster member), plus `actorId` and `payload`.
#[must_use]
pub fn event_context(
    state: &GameState,
    roster: &Roster,
    actor_id: &str,
    payload: Option<&Value>,
) -> EvalContext {
    let mut ctx = EvalContext::from_state(state)
        .with_players(roster, state)
        .with_actor(actor_id)
        .with_payload(payload.cloned());
    if let Some(player) = roster.get(actor_id) {
        ctx = ctx.with_player(player, state);
    }
    ctx
}

/// Applies effect lists to the shared game state.
///
/// The executor owns the operation registry; it is the only component that
/// mutates a `GameState` after initialization.
pub struct EffectExecutor {
    registry: super::OpRegistry,
}

impl EffectExecutor {
    /// Executor with the built-in operations.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: super::OpRegistry::builtin(),
        }
    }

    /// Executor with a host-extended registry.
    #[must_use]
    pub fn with_registry(registry: super::OpRegistry) -> Self {
        Self { registry }
    }

    /// Apply `effects` in declaration order. Returns how many applied.
    ///
    /// The context is rebuilt before each effect, so an effect observes
    /// every mutation made by the effects before it. A failing or unknown
    /// effect is logged and skipped; the rest of the list still runs.
    pub fn execute(
        &self,
        state: &mut GameState,
        roster: &Roster,
        effects: &[EffectConfig],
        actor_id: &str,
        payload: Option<&Value>,
    ) -> usize {
        let mut applied = 0;
        for effect in effects {
            let Some(op) = self.registry.get(&effect.op) else {
                tracing::warn!(op = %effect.op, "unknown effect operation, skipping");
                continue;
            };

            let ctx = event_context(state, roster, actor_id, payload);
            let args: SmallVec<[Value; 4]> =
                effect.args.iter().map(|arg| interpolate(arg, &ctx)).collect();

            match op(state, &args) {
                Ok(()) => applied += 1,
                Err(err) => {
                    tracing::warn!(op = %effect.op, %err, "effect failed, skipping");
                }
            }
        }
        applied
    }
}

impl Default for EffectExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Player;
    use serde_json::json;

    fn roster() -> Roster {
        Roster::new(vec![Player::new("p1", "Alice")], "p1")
    }

    fn effect(op: &str, args: Vec<Value>) -> EffectConfig {
        EffectConfig::new(op, args)
    }

    #[test]
    fn test_effects_observe_prior_mutations() {
        let executor = EffectExecutor::new();
        let mut state = GameState::new("GAME");
        let applied = executor.execute(
            &mut state,
            &roster(),
            &[
                effect("set", vec![json!("round"), json!(1)]),
                // Reads the value the previous effect just wrote.
                effect("set", vec![json!("label"), json!("round {{round}}")]),
            ],
            "p1",
            None,
        );
        assert_eq!(applied, 2);
        assert_eq!(state.get("label"), Some(&json!("round 1")));
    }

    #[test]
    fn test_actor_and_payload_in_scope() {
        let executor = EffectExecutor::new();
        let mut state = GameState::new("GAME");
        executor.execute(
            &mut state,
            &roster(),
            &[effect(
                "set",
                vec![json!("playerAttributes.{{actorId}}.answer"), json!("{{payload.choice}}")],
            )],
            "p1",
            Some(&json!({ "choice": 2 })),
        );
        assert_eq!(state.attributes_of("p1").unwrap()["answer"], json!(2));
    }

    #[test]
    fn test_unknown_op_skipped_rest_runs() {
        let executor = EffectExecutor::new();
        let mut state = GameState::new("GAME");
        let applied = executor.execute(
            &mut state,
            &roster(),
            &[
                effect("teleport", vec![json!("x")]),
                effect("increment", vec![json!("round")]),
            ],
            "p1",
            None,
        );
        assert_eq!(applied, 1);
        assert_eq!(state.get("round"), Some(&json!(1)));
    }

    #[test]
    fn test_host_registered_op() {
        let mut registry = crate::effects::OpRegistry::builtin();
        registry.register("clear", |state, _args| {
            state.data.clear();
            Ok(())
        });
        let executor = EffectExecutor::with_registry(registry);
        let mut state = GameState::new("GAME");
        state.set("junk", json!(1));
        executor.execute(&mut state, &roster(), &[effect("clear", vec![])], "p1", None);
        assert!(state.get("junk").is_none());
    }
}
