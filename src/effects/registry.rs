//! Operation registry: named mutations over game state.
//!
//! The registry maps operation names to implementations. The built-in set
//! covers the common mutations; hosts extend it with `register` before a
//! game starts. Implementations receive already-resolved arguments and may
//! touch nothing but the passed state.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::GameState;

/// A contained per-effect failure. One failing effect is logged and
/// skipped; the rest of the event's effects still run.
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("op `{op}` expects {expected}")]
    Args { op: &'static str, expected: &'static str },

    #[error("path `{0}` is not addressable")]
    InvalidPath(String),

    #[error("path `{0}` passes through a non-object value")]
    NonObjectPath(String),

    #[error("op `{op}` at `{path}`: {detail}")]
    Type {
        op: &'static str,
        path: String,
        detail: &'static str,
    },
}

/// An operation implementation.
pub type OpFn = Box<dyn Fn(&mut GameState, &[Value]) -> Result<(), EffectError> + Send + Sync>;

/// Registry of named operations.
pub struct OpRegistry {
    ops: FxHashMap<String, OpFn>,
}

impl OpRegistry {
    /// Registry with the built-in operation set.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self {
            ops: FxHashMap::default(),
        };
        registry.register("set", |state, args| {
            let (path, value) = path_and_value("set", args)?;
            let (slot, key) = locate(state, path)?;
            slot.insert(key, value.clone());
            Ok(())
        });
        registry.register("increment", |state, args| {
            let path = path_arg("increment", args)?;
            let delta = match args.get(1) {
                None => 1.0,
                Some(v) => v.as_f64().ok_or(EffectError::Args {
                    op: "increment",
                    expected: "a numeric delta",
                })?,
            };
            let delta_int = args.get(1).map_or(Some(1), Value::as_i64);
            let (slot, key) = locate(state, path)?;
            let current = slot.get(&key).cloned().unwrap_or(Value::Null);
            // A missing value counts as integer zero.
            let current_int = match &current {
                Value::Null => Some(0),
                v => v.as_i64(),
            };
            let next = match (current_int, delta_int) {
                // Stay integral while both sides are.
                (Some(base), Some(delta)) => Value::from(base.saturating_add(delta)),
                _ => {
                    let base = match &current {
                        Value::Null => 0.0,
                        v => v.as_f64().ok_or(EffectError::Type {
                            op: "increment",
                            path: path.to_string(),
                            detail: "existing value is not a number",
                        })?,
                    };
                    Value::from(base + delta)
                }
            };
            slot.insert(key, next);
            Ok(())
        });
        registry.register("append", |state, args| {
            let (path, value) = path_and_value("append", args)?;
            let (slot, key) = locate(state, path)?;
            let entry = slot
                .entry(key)
                .or_insert_with(|| Value::Array(Vec::new()));
            match entry {
                Value::Array(items) => {
                    items.push(value.clone());
                    Ok(())
                }
                Value::Null => {
                    *entry = Value::Array(vec![value.clone()]);
                    Ok(())
                }
                _ => Err(EffectError::Type {
                    op: "append",
                    path: path.to_string(),
                    detail: "existing value is not a list",
                }),
            }
        });
        registry.register("remove", |state, args| {
            let (path, value) = path_and_value("remove", args)?;
            let (slot, key) = locate(state, path)?;
            match slot.get_mut(&key) {
                None | Some(Value::Null) => Ok(()),
                Some(Value::Array(items)) => {
                    items.retain(|item| item != value);
                    Ok(())
                }
                Some(_) => Err(EffectError::Type {
                    op: "remove",
                    path: path.to_string(),
                    detail: "existing value is not a list",
                }),
            }
        });
        registry.register("merge", |state, args| {
            let (path, value) = path_and_value("merge", args)?;
            let Value::Object(incoming) = value else {
                return Err(EffectError::Args {
                    op: "merge",
                    expected: "an object to merge",
                });
            };
            let (slot, key) = locate(state, path)?;
            let entry = slot
                .entry(key)
                .or_insert_with(|| Value::Object(Map::new()));
            match entry {
                Value::Object(existing) => {
                    for (k, v) in incoming {
                        existing.insert(k.clone(), v.clone());
                    }
                    Ok(())
                }
                Value::Null => {
                    *entry = Value::Object(incoming.clone());
                    Ok(())
                }
                _ => Err(EffectError::Type {
                    op: "merge",
                    path: path.to_string(),
                    detail: "existing value is not an object",
                }),
            }
        });
        registry
    }

    /// Register (or replace) an operation.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        op: impl Fn(&mut GameState, &[Value]) -> Result<(), EffectError> + Send + Sync + 'static,
    ) {
        self.ops.insert(name.into(), Box::new(op));
    }

    /// Look up an operation by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OpFn> {
        self.ops.get(name)
    }
}

impl Default for OpRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn path_arg<'a>(op: &'static str, args: &'a [Value]) -> Result<&'a str, EffectError> {
    args.first().and_then(Value::as_str).ok_or(EffectError::Args {
        op,
        expected: "a string path as its first argument",
    })
}

fn path_and_value<'a>(
    op: &'static str,
    args: &'a [Value],
) -> Result<(&'a str, &'a Value), EffectError> {
    let path = path_arg(op, args)?;
    let value = args.get(1).ok_or(EffectError::Args {
        op,
        expected: "a value as its second argument",
    })?;
    Ok((path, value))
}

/// Walk a dot-separated path to its parent object, creating intermediate
/// objects as needed. Returns the parent map and the final key.
///
/// `playerAttributes.<id>` roots into that player's attribute map; all
/// other paths root into the game data.
fn locate<'a>(
    state: &'a mut GameState,
    path: &str,
) -> Result<(&'a mut Map<String, Value>, String), EffectError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(EffectError::InvalidPath(path.to_string()));
    }

    let (root, rest): (&mut Map<String, Value>, &[&str]) =
        if segments[0] == "playerAttributes" {
            // Needs at least a player id and one key inside their map.
            if segments.len() < 3 {
                return Err(EffectError::InvalidPath(path.to_string()));
            }
            (state.attributes_of_mut(segments[1]), &segments[2..])
        } else {
            (&mut state.data, &segments[..])
        };

    let (last, intermediates) = rest.split_last().expect("path has at least one segment");
    let mut current = root;
    for segment in intermediates {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match entry {
            Value::Object(obj) => current = obj,
            _ => return Err(EffectError::NonObjectPath(path.to_string())),
        }
    }
    Ok((current, last.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(state: &mut GameState, op: &str, args: Vec<Value>) -> Result<(), EffectError> {
        OpRegistry::builtin().get(op).unwrap()(state, &args)
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut state = GameState::new("LOBBY");
        run(&mut state, "set", vec![json!("quiz.current.index"), json!(3)]).unwrap();
        assert_eq!(state.get("quiz"), Some(&json!({ "current": { "index": 3 } })));
    }

    #[test]
    fn test_increment_defaults_and_creates() {
        let mut state = GameState::new("LOBBY");
        run(&mut state, "increment", vec![json!("round")]).unwrap();
        run(&mut state, "increment", vec![json!("round"), json!(4)]).unwrap();
        assert_eq!(state.get("round"), Some(&json!(5)));
    }

    #[test]
    fn test_player_attribute_paths() {
        let mut state = GameState::new("LOBBY");
        run(
            &mut state,
            "set",
            vec![json!("playerAttributes.p1.score"), json!(10)],
        )
        .unwrap();
        run(
            &mut state,
            "increment",
            vec![json!("playerAttributes.p1.score"), json!(2)],
        )
        .unwrap();
        assert_eq!(state.attributes_of("p1").unwrap()["score"], json!(12));

        // A bare player path is not addressable.
        let err = run(&mut state, "set", vec![json!("playerAttributes.p1"), json!(1)]);
        assert!(matches!(err, Err(EffectError::InvalidPath(_))));
    }

    #[test]
    fn test_append_and_remove() {
        let mut state = GameState::new("LOBBY");
        run(&mut state, "append", vec![json!("answers"), json!("a")]).unwrap();
        run(&mut state, "append", vec![json!("answers"), json!("b")]).unwrap();
        run(&mut state, "remove", vec![json!("answers"), json!("a")]).unwrap();
        assert_eq!(state.get("answers"), Some(&json!(["b"])));
    }

    #[test]
    fn test_merge() {
        let mut state = GameState::new("LOBBY");
        state.set("settings", json!({ "rounds": 3 }));
        run(
            &mut state,
            "merge",
            vec![json!("settings"), json!({ "timer": 30 })],
        )
        .unwrap();
        assert_eq!(
            state.get("settings"),
            Some(&json!({ "rounds": 3, "timer": 30 }))
        );
    }

    #[test]
    fn test_type_errors_are_contained() {
        let mut state = GameState::new("LOBBY");
        state.set("name", json!("Quiz"));
        let err = run(&mut state, "append", vec![json!("name"), json!(1)]);
        assert!(matches!(err, Err(EffectError::Type { op: "append", .. })));
        // State is untouched by the failed op.
        assert_eq!(state.get("name"), Some(&json!("Quiz")));
    }
}
