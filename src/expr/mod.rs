//! Sandboxed expression resolution.
//!
//! Configuration authors write small expressions (transition conditions,
//! effect arguments, UI placeholders) that the engine evaluates against a
//! read-only context (game state, acting player, payload). The authors are
//! not fully trusted, so the language is a closed whitelist:
//!
//! - literals, property paths, and indexing
//! - arithmetic, comparison, and boolean operators
//! - a fixed set of builtin functions (`len`, `contains`, `find`,
//!   `filter`, `map`, `sum`, `min`, `max`, `keys`)
//!
//! There is no reflective surface at all: expressions can only ever reach
//! JSON values placed into the context, so the sandbox-escape class of bug
//! is ruled out structurally rather than by blacklisting. The property
//! names `constructor`, `prototype`, and `__proto__` are rejected outright
//! as a second fence against configs probing for one.
//!
//! ## Failure Policy
//!
//! A malformed or erroring expression must never take the instance down.
//! [`Resolver::resolve`] catches everything at this boundary, logs it, and
//! degrades to `Value::Null`: falsy for conditions, empty for
//! interpolation. [`Resolver::resolve_checked`] exposes the underlying
//! [`EvalError`] for callers that want it.

mod eval;
mod interpolate;
mod parser;

pub use eval::{EvalContext, EvalError, Resolver};
pub use interpolate::interpolate;
pub use parser::{parse, BinaryOp, Expr, UnaryOp};
