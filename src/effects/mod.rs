//! Side-effecting operations on game state.
//!
//! An effect in a configuration is a named operation plus raw arguments.
//! The executor resolves each argument through the expression layer, then
//! dispatches to the operation registry. Operations are the only mutation
//! path into a `GameState`.
//!
//! ## Built-in Operations
//!
//! - `set(path, value)`: write a value, creating intermediate objects
//! - `increment(path, delta = 1)`: numeric add, missing counts as 0
//! - `append(path, value)`: push onto a list, missing becomes a list
//! - `remove(path, value)`: drop equal elements from a list
//! - `merge(path, object)`: shallow-merge keys into an object
//!
//! Paths are dot-separated and rooted at the game data;
//! `playerAttributes.<id>.<key>` reaches per-player attributes. Hosts can
//! register additional operations at construction time.

mod executor;
mod registry;

pub use executor::{event_context, EffectExecutor};
pub use registry::{EffectError, OpFn, OpRegistry};
