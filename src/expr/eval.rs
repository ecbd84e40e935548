//! Expression evaluation against a read-only context.
//!
//! The context is a plain JSON object assembled from the live game state,
//! the acting player, and the triggering event's payload. Evaluation can
//! only ever read values out of that object; there are no callable values
//! and no reflective access to anything outside it.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::{GameState, Player, Roster};

use super::parser::{parse, BinaryOp, Expr, UnaryOp};

/// Property names that are never resolvable, whatever the context holds.
///
/// The evaluator has no reflective surface, but hostile configurations
/// probing for one still get a hard null instead of a lookup of a state
/// key that happens to carry the name.
const FORBIDDEN_NAMES: &[&str] = &["constructor", "prototype", "__proto__"];

/// A contained expression failure.
///
/// These never propagate past the resolver boundary; callers of
/// [`Resolver::resolve`] see `Value::Null` and a log line instead.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character `{0}` at byte {1}")]
    UnexpectedChar(char, usize),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("malformed number `{0}`")]
    BadNumber(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected {0}")]
    UnexpectedToken(String),

    #[error("only builtin functions are callable")]
    NotCallable,

    #[error("expression nesting too deep")]
    TooDeep,

    #[error("access to `{0}` is forbidden")]
    ForbiddenPath(String),

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("`{name}` expects {expected}, got {got} argument(s)")]
    Arity {
        name: String,
        expected: &'static str,
        got: usize,
    },

    #[error("type error: {0}")]
    Type(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,
}

/// Read-only evaluation context.
///
/// Built once per event (or per player, for UI projection) by merging the
/// game state at the top level with the transient actor fields.
#[derive(Clone, Debug, Default)]
pub struct EvalContext {
    root: Map<String, Value>,
}

impl EvalContext {
    /// Start from a live game state: data keys at the top level plus
    /// `status` and `playerAttributes`.
    #[must_use]
    pub fn from_state(state: &GameState) -> Self {
        let Value::Object(root) = state.snapshot() else {
            unreachable!("snapshot is always an object");
        };
        Self { root }
    }

    /// Add the triggering actor's id as `actorId`.
    #[must_use]
    pub fn with_actor(mut self, actor_id: &str) -> Self {
        self.root
            .insert("actorId".into(), Value::String(actor_id.to_string()));
        self
    }

    /// Add the event payload as `payload` (null when absent).
    #[must_use]
    pub fn with_payload(mut self, payload: Option<Value>) -> Self {
        self.root
            .insert("payload".into(), payload.unwrap_or(Value::Null));
        self
    }

    /// Add a `player` sub-object: public identity fields merged with that
    /// player's attributes from the game state.
    #[must_use]
    pub fn with_player(mut self, player: &Player, state: &GameState) -> Self {
        let mut obj = Map::new();
        obj.insert("id".into(), Value::String(player.id.clone()));
        obj.insert("nickname".into(), Value::String(player.nickname.clone()));
        if let Some(avatar) = &player.avatar {
            obj.insert("avatar".into(), Value::String(avatar.clone()));
        }
        if let Some(attrs) = state.attributes_of(&player.id) {
            for (key, value) in attrs {
                obj.insert(key.clone(), value.clone());
            }
        }
        self.root.insert("player".into(), Value::Object(obj));
        self
    }

    /// Add a `players` list with every roster member's public fields and
    /// attributes.
    #[must_use]
    pub fn with_players(mut self, roster: &Roster, state: &GameState) -> Self {
        let players: Vec<Value> = roster
            .players()
            .iter()
            .map(|p| {
                let mut obj = Map::new();
                obj.insert("id".into(), Value::String(p.id.clone()));
                obj.insert("nickname".into(), Value::String(p.nickname.clone()));
                if let Some(attrs) = state.attributes_of(&p.id) {
                    for (key, value) in attrs {
                        obj.insert(key.clone(), value.clone());
                    }
                }
                Value::Object(obj)
            })
            .collect();
        self.root.insert("players".into(), Value::Array(players));
        self
    }

    /// Insert an arbitrary top-level value (test and host convenience).
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.root.insert(key.into(), value);
        self
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.root.get(name)
    }
}

/// The expression resolver: parse, evaluate, contain failures.
pub struct Resolver;

impl Resolver {
    /// Evaluate an expression, degrading any failure to `Value::Null`.
    #[must_use]
    pub fn resolve(expression: &str, ctx: &EvalContext) -> Value {
        match Self::resolve_checked(expression, ctx) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(expression, %err, "expression failed, degrading to null");
                Value::Null
            }
        }
    }

    /// Evaluate an expression, surfacing the failure.
    pub fn resolve_checked(expression: &str, ctx: &EvalContext) -> Result<Value, EvalError> {
        let ast = parse(expression)?;
        let mut scopes = Vec::new();
        eval(&ast, ctx, &mut scopes)
    }

    /// Evaluate an expression as a condition: null/failed is false.
    #[must_use]
    pub fn condition(expression: &str, ctx: &EvalContext) -> bool {
        truthy(&Self::resolve(expression, ctx))
    }
}

/// JSON truthiness: null and absent are false, numbers by non-zero,
/// strings by non-empty, arrays and objects are always true.
#[must_use]
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a value the way interpolation and `+`-concatenation do.
#[must_use]
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

type Scopes = Vec<(String, Value)>;

fn lookup<'a>(name: &str, ctx: &'a EvalContext, scopes: &'a Scopes) -> Option<&'a Value> {
    scopes
        .iter()
        .rev()
        .find(|(bound, _)| bound == name)
        .map(|(_, value)| value)
        .or_else(|| ctx.get(name))
}

fn check_name(name: &str) -> Result<(), EvalError> {
    if FORBIDDEN_NAMES.contains(&name) {
        Err(EvalError::ForbiddenPath(name.to_string()))
    } else {
        Ok(())
    }
}

fn eval(expr: &Expr, ctx: &EvalContext, scopes: &mut Scopes) -> Result<Value, EvalError> {
    match expr {
        Expr::Null => Ok(Value::Null),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Int(n) => Ok(Value::from(*n)),
        Expr::Float(n) => Ok(Value::from(*n)),
        Expr::Str(s) => Ok(Value::String(s.clone())),

        Expr::Ident(name) => {
            check_name(name)?;
            Ok(lookup(name, ctx, scopes).cloned().unwrap_or(Value::Null))
        }

        Expr::Member(base, name) => {
            check_name(name)?;
            let base = eval(base, ctx, scopes)?;
            // Missing keys and non-objects resolve to null, not errors:
            // conditions routinely probe keys that are not set yet.
            match base {
                Value::Object(obj) => Ok(obj.get(name).cloned().unwrap_or(Value::Null)),
                _ => Ok(Value::Null),
            }
        }

        Expr::Index(base, index) => {
            let base = eval(base, ctx, scopes)?;
            let index = eval(index, ctx, scopes)?;
            match (&base, &index) {
                (Value::Array(items), Value::Number(n)) => {
                    let idx = n.as_i64().and_then(|i| usize::try_from(i).ok());
                    Ok(idx
                        .and_then(|i| items.get(i))
                        .cloned()
                        .unwrap_or(Value::Null))
                }
                (Value::Object(obj), Value::String(key)) => {
                    check_name(key)?;
                    Ok(obj.get(key).cloned().unwrap_or(Value::Null))
                }
                _ => Ok(Value::Null),
            }
        }

        Expr::Unary(op, inner) => {
            let value = eval(inner, ctx, scopes)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!truthy(&value))),
                UnaryOp::Neg => match Num::of(&value) {
                    Some(Num::Int(n)) => {
                        n.checked_neg().map(Value::from).ok_or(EvalError::Overflow)
                    }
                    Some(Num::Float(n)) => Ok(Value::from(-n)),
                    None => Err(EvalError::Type("cannot negate a non-number".into())),
                },
            }
        }

        Expr::Binary(op, lhs, rhs) => eval_binary(*op, lhs, rhs, ctx, scopes),

        Expr::Call(name, args) => eval_call(name, args, ctx, scopes),
    }
}

/// Numeric view of a JSON value.
#[derive(Clone, Copy, Debug)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Num> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Num::Int(i))
                } else {
                    n.as_f64().map(Num::Float)
                }
            }
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

fn eval_binary(
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    ctx: &EvalContext,
    scopes: &mut Scopes,
) -> Result<Value, EvalError> {
    // Short-circuit logic first; operands may be expensive or erroring.
    if matches!(op, BinaryOp::And | BinaryOp::Or) {
        let left = truthy(&eval(lhs, ctx, scopes)?);
        return match (op, left) {
            (BinaryOp::And, false) => Ok(Value::Bool(false)),
            (BinaryOp::Or, true) => Ok(Value::Bool(true)),
            _ => Ok(Value::Bool(truthy(&eval(rhs, ctx, scopes)?))),
        };
    }

    let left = eval(lhs, ctx, scopes)?;
    let right = eval(rhs, ctx, scopes)?;

    match op {
        BinaryOp::Eq => Ok(Value::Bool(values_equal(&left, &right))),
        BinaryOp::Ne => Ok(Value::Bool(!values_equal(&left, &right))),

        BinaryOp::Add => {
            // String on either side means concatenation.
            if left.is_string() || right.is_string() {
                return Ok(Value::String(format!(
                    "{}{}",
                    stringify(&left),
                    stringify(&right)
                )));
            }
            numeric(op, &left, &right, |a, b| match (a, b) {
                (Num::Int(a), Num::Int(b)) => {
                    a.checked_add(b).map(Value::from).ok_or(EvalError::Overflow)
                }
                (a, b) => Ok(Value::from(a.as_f64() + b.as_f64())),
            })
        }
        BinaryOp::Sub => numeric(op, &left, &right, |a, b| match (a, b) {
            (Num::Int(a), Num::Int(b)) => {
                a.checked_sub(b).map(Value::from).ok_or(EvalError::Overflow)
            }
            (a, b) => Ok(Value::from(a.as_f64() - b.as_f64())),
        }),
        BinaryOp::Mul => numeric(op, &left, &right, |a, b| match (a, b) {
            (Num::Int(a), Num::Int(b)) => {
                a.checked_mul(b).map(Value::from).ok_or(EvalError::Overflow)
            }
            (a, b) => Ok(Value::from(a.as_f64() * b.as_f64())),
        }),
        BinaryOp::Div => numeric(op, &left, &right, |a, b| {
            if b.as_f64() == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            match (a, b) {
                // Integer division stays integral when it is exact.
                // checked_rem: i64::MIN / -1 overflows i64.
                (Num::Int(a), Num::Int(b)) => match a.checked_rem(b) {
                    Some(0) => a.checked_div(b).map(Value::from).ok_or(EvalError::Overflow),
                    Some(_) => Ok(Value::from(a as f64 / b as f64)),
                    None => Err(EvalError::Overflow),
                },
                (a, b) => Ok(Value::from(a.as_f64() / b.as_f64())),
            }
        }),
        BinaryOp::Rem => numeric(op, &left, &right, |a, b| {
            if b.as_f64() == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            match (a, b) {
                (Num::Int(a), Num::Int(b)) => {
                    a.checked_rem(b).map(Value::from).ok_or(EvalError::Overflow)
                }
                (a, b) => Ok(Value::from(a.as_f64() % b.as_f64())),
            }
        }),

        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (&left, &right) {
                (Value::String(a), Value::String(b)) => a.cmp(b),
                _ => match (Num::of(&left), Num::of(&right)) {
                    (Some(a), Some(b)) => a
                        .as_f64()
                        .partial_cmp(&b.as_f64())
                        .ok_or_else(|| EvalError::Type("NaN is not comparable".into()))?,
                    _ => {
                        return Err(EvalError::Type(
                            "comparison needs two numbers or two strings".into(),
                        ))
                    }
                },
            };
            let holds = match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Le => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                BinaryOp::Ge => ordering.is_ge(),
                _ => unreachable!(),
            };
            Ok(Value::Bool(holds))
        }

        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

fn numeric(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    apply: impl FnOnce(Num, Num) -> Result<Value, EvalError>,
) -> Result<Value, EvalError> {
    match (Num::of(left), Num::of(right)) {
        (Some(a), Some(b)) => apply(a, b),
        _ => Err(EvalError::Type(format!(
            "{op:?} needs numeric operands"
        ))),
    }
}

/// Equality with numeric coercion (`1 == 1.0` holds); everything else is
/// structural JSON equality.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (Num::of(left), Num::of(right)) {
        (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn eval_call(
    name: &str,
    args: &[Expr],
    ctx: &EvalContext,
    scopes: &mut Scopes,
) -> Result<Value, EvalError> {
    let arity = |expected: &'static str| EvalError::Arity {
        name: name.to_string(),
        expected,
        got: args.len(),
    };

    match name {
        "len" => {
            let [arg] = args else { return Err(arity("1")) };
            let value = eval(arg, ctx, scopes)?;
            let len = match &value {
                Value::String(s) => s.chars().count(),
                Value::Array(items) => items.len(),
                Value::Object(obj) => obj.len(),
                _ => return Err(EvalError::Type("len needs a string, list, or object".into())),
            };
            Ok(Value::from(len as i64))
        }

        "contains" => {
            let [haystack, needle] = args else {
                return Err(arity("2"));
            };
            let haystack = eval(haystack, ctx, scopes)?;
            let needle = eval(needle, ctx, scopes)?;
            let found = match &haystack {
                Value::Array(items) => items.iter().any(|item| values_equal(item, &needle)),
                Value::String(s) => s.contains(&stringify(&needle)),
                Value::Object(obj) => match &needle {
                    Value::String(key) => obj.contains_key(key),
                    _ => false,
                },
                _ => false,
            };
            Ok(Value::Bool(found))
        }

        // Collection helpers evaluate their second argument once per
        // element with `it` (and `index`) bound.
        "find" | "filter" | "map" => {
            let [list, body] = args else { return Err(arity("2")) };
            let Value::Array(items) = eval(list, ctx, scopes)? else {
                return Err(EvalError::Type(format!("{name} needs a list")));
            };
            let mut out = Vec::new();
            for (index, item) in items.into_iter().enumerate() {
                scopes.push(("it".into(), item.clone()));
                scopes.push(("index".into(), Value::from(index as i64)));
                let result = eval(body, ctx, scopes);
                scopes.pop();
                scopes.pop();
                let result = result?;
                match name {
                    "find" => {
                        if truthy(&result) {
                            return Ok(item);
                        }
                    }
                    "filter" => {
                        if truthy(&result) {
                            out.push(item);
                        }
                    }
                    "map" => out.push(result),
                    _ => unreachable!(),
                }
            }
            if name == "find" {
                Ok(Value::Null)
            } else {
                Ok(Value::Array(out))
            }
        }

        "sum" => {
            let [arg] = args else { return Err(arity("1")) };
            let Value::Array(items) = eval(arg, ctx, scopes)? else {
                return Err(EvalError::Type("sum needs a list".into()));
            };
            let mut int_total: i64 = 0;
            let mut float_total = 0.0;
            let mut any_float = false;
            for item in &items {
                match Num::of(item) {
                    Some(Num::Int(n)) => {
                        int_total = int_total.checked_add(n).ok_or(EvalError::Overflow)?;
                    }
                    Some(Num::Float(f)) => {
                        any_float = true;
                        float_total += f;
                    }
                    None => return Err(EvalError::Type("sum over non-numbers".into())),
                }
            }
            if any_float {
                Ok(Value::from(float_total + int_total as f64))
            } else {
                Ok(Value::from(int_total))
            }
        }

        "min" | "max" => {
            let values: Vec<Value> = match args {
                [list] => match eval(list, ctx, scopes)? {
                    Value::Array(items) => items,
                    _ => return Err(EvalError::Type(format!("{name} needs a list"))),
                },
                _ if args.len() >= 2 => args
                    .iter()
                    .map(|a| eval(a, ctx, scopes))
                    .collect::<Result<_, _>>()?,
                _ => return Err(arity("a list or 2+ numbers")),
            };
            let mut best: Option<Num> = None;
            for value in &values {
                let num = Num::of(value)
                    .ok_or_else(|| EvalError::Type(format!("{name} over non-numbers")))?;
                best = Some(match best {
                    None => num,
                    Some(current) => {
                        let take = if name == "min" {
                            num.as_f64() < current.as_f64()
                        } else {
                            num.as_f64() > current.as_f64()
                        };
                        if take {
                            num
                        } else {
                            current
                        }
                    }
                });
            }
            Ok(match best {
                Some(Num::Int(i)) => Value::from(i),
                Some(Num::Float(f)) => Value::from(f),
                None => Value::Null,
            })
        }

        "keys" => {
            let [arg] = args else { return Err(arity("1")) };
            match eval(arg, ctx, scopes)? {
                Value::Object(obj) => Ok(Value::Array(
                    obj.keys().map(|k| Value::String(k.clone())).collect(),
                )),
                _ => Err(EvalError::Type("keys needs an object".into())),
            }
        }

        _ => Err(EvalError::UnknownFunction(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> EvalContext {
        EvalContext::default()
            .with_value("round", json!(3))
            .with_value("gameTitle", json!("Quiz"))
            .with_value(
                "players",
                json!([
                    { "id": "p1", "score": 5, "ready": true },
                    { "id": "p2", "score": 2, "ready": false },
                ]),
            )
    }

    #[test]
    fn test_arithmetic_and_comparison() {
        let ctx = ctx();
        assert_eq!(Resolver::resolve("round + 1", &ctx), json!(4));
        assert_eq!(Resolver::resolve("round * 2 >= 6", &ctx), json!(true));
        assert_eq!(Resolver::resolve("10 / 4", &ctx), json!(2.5));
        assert_eq!(Resolver::resolve("10 / 5", &ctx), json!(2));
    }

    #[test]
    fn test_string_concat() {
        let ctx = ctx();
        assert_eq!(
            Resolver::resolve("gameTitle + ' #' + round", &ctx),
            json!("Quiz #3")
        );
    }

    #[test]
    fn test_collection_helpers() {
        let ctx = ctx();
        assert_eq!(
            Resolver::resolve("find(players, it.id == 'p2').score", &ctx),
            json!(2)
        );
        assert_eq!(Resolver::resolve("len(filter(players, it.ready))", &ctx), json!(1));
        assert_eq!(
            Resolver::resolve("map(players, it.score)", &ctx),
            json!([5, 2])
        );
        assert_eq!(Resolver::resolve("sum(map(players, it.score))", &ctx), json!(7));
    }

    #[test]
    fn test_extreme_integer_division_is_contained() {
        // i64::MIN cannot be written as a literal (it lexes as a negation
        // of an out-of-range number), but it reaches the evaluator through
        // any state or payload value.
        let ctx = EvalContext::default().with_value("x", json!(i64::MIN));
        assert_eq!(Resolver::resolve("x / -1", &ctx), json!(null));
        assert_eq!(Resolver::resolve("x % -1", &ctx), json!(null));
        assert!(matches!(
            Resolver::resolve_checked("x / -1", &ctx),
            Err(EvalError::Overflow)
        ));
        assert!(matches!(
            Resolver::resolve_checked("x % -1", &ctx),
            Err(EvalError::Overflow)
        ));
        // Ordinary negative divisors still work.
        assert_eq!(Resolver::resolve("x / -2", &ctx), json!(4_611_686_018_427_387_904_i64));
        assert_eq!(Resolver::resolve("-6 % -4", &ctx), json!(-2));
    }

    #[test]
    fn test_contains() {
        let ctx = ctx();
        assert_eq!(
            Resolver::resolve("contains(map(players, it.id), 'p2')", &ctx),
            json!(true)
        );
        assert_eq!(Resolver::resolve("contains(gameTitle, 'ui')", &ctx), json!(true));
        assert_eq!(
            Resolver::resolve("contains(players[0], 'score')", &ctx),
            json!(true)
        );
        assert_eq!(Resolver::resolve("contains(players, 'p9')", &ctx), json!(false));
        // Scalars contain nothing.
        assert_eq!(Resolver::resolve("contains(round, 3)", &ctx), json!(false));
        assert!(matches!(
            Resolver::resolve_checked("contains(players)", &ctx),
            Err(EvalError::Arity { .. })
        ));
    }

    #[test]
    fn test_min_max() {
        let ctx = ctx();
        assert_eq!(Resolver::resolve("min(map(players, it.score))", &ctx), json!(2));
        assert_eq!(Resolver::resolve("max(map(players, it.score))", &ctx), json!(5));
        assert_eq!(Resolver::resolve("max(round, 10, 2)", &ctx), json!(10));
        assert_eq!(Resolver::resolve("min(1.5, 2)", &ctx), json!(1.5));
        // An empty list has no extreme.
        assert_eq!(Resolver::resolve("min(filter(players, false))", &ctx), json!(null));
        assert!(matches!(
            Resolver::resolve_checked("min()", &ctx),
            Err(EvalError::Arity { .. })
        ));
        assert!(matches!(
            Resolver::resolve_checked("max(players, 1)", &ctx),
            Err(EvalError::Type(_))
        ));
    }

    #[test]
    fn test_keys() {
        let ctx = ctx();
        assert_eq!(Resolver::resolve("len(keys(players[0]))", &ctx), json!(3));
        assert_eq!(
            Resolver::resolve("contains(keys(players[0]), 'score')", &ctx),
            json!(true)
        );
        assert!(matches!(
            Resolver::resolve_checked("keys(5)", &ctx),
            Err(EvalError::Type(_))
        ));
        assert!(matches!(
            Resolver::resolve_checked("keys()", &ctx),
            Err(EvalError::Arity { .. })
        ));
    }

    #[test]
    fn test_missing_keys_are_null_and_falsy() {
        let ctx = ctx();
        assert_eq!(Resolver::resolve("nope.deeper.still", &ctx), json!(null));
        assert!(!Resolver::condition("nope.deeper.still", &ctx));
    }

    #[test]
    fn test_forbidden_paths_fail_closed() {
        // Even when the context literally contains the key.
        let ctx = EvalContext::default().with_value(
            "a",
            json!({ "constructor": "gotcha", "safe": 1 }),
        );
        assert_eq!(Resolver::resolve("a.constructor", &ctx), json!(null));
        assert_eq!(Resolver::resolve("a['constructor']", &ctx), json!(null));
        assert_eq!(Resolver::resolve("a.__proto__", &ctx), json!(null));
        assert_eq!(Resolver::resolve("a.safe", &ctx), json!(1));
        assert!(matches!(
            Resolver::resolve_checked("a.prototype", &ctx),
            Err(EvalError::ForbiddenPath(_))
        ));
    }

    #[test]
    fn test_errors_degrade_to_null() {
        let ctx = ctx();
        assert_eq!(Resolver::resolve("1 / 0", &ctx), json!(null));
        assert_eq!(Resolver::resolve("round +", &ctx), json!(null));
        assert_eq!(Resolver::resolve("shout(round)", &ctx), json!(null));
    }

    #[test]
    fn test_short_circuit() {
        let ctx = ctx();
        // Right side would error, but the left side decides.
        assert_eq!(Resolver::resolve("false && (1 / 0)", &ctx), json!(false));
        assert_eq!(Resolver::resolve("true || (1 / 0)", &ctx), json!(true));
    }
}
