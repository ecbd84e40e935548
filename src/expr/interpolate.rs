//! `{{expression}}` template interpolation over JSON values.
//!
//! Strings are the only values that carry placeholders. A string that is
//! exactly one placeholder substitutes the resolved value with its type
//! preserved (a boolean stays a boolean, an object stays an object);
//! anything else stringifies each placeholder in place. Arrays and objects
//! are walked recursively; non-string scalars pass through untouched.

use serde_json::Value;

use super::eval::{stringify, EvalContext, Resolver};

/// Interpolate every placeholder in `value` against `ctx`.
#[must_use]
pub fn interpolate(value: &Value, ctx: &EvalContext) -> Value {
    match value {
        Value::String(s) => interpolate_string(s, ctx),
        Value::Array(items) => Value::Array(items.iter().map(|v| interpolate(v, ctx)).collect()),
        Value::Object(obj) => Value::Object(
            obj.iter()
                .map(|(key, v)| (key.clone(), interpolate(v, ctx)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn interpolate_string(input: &str, ctx: &EvalContext) -> Value {
    // Whole-string placeholder: substitute the typed value.
    let trimmed = input.trim();
    if let Some(inner) = trimmed
        .strip_prefix("{{")
        .and_then(|rest| rest.strip_suffix("}}"))
    {
        if !inner.contains("{{") && !inner.contains("}}") {
            return Resolver::resolve(inner, ctx);
        }
    }

    if !input.contains("{{") {
        return Value::String(input.to_string());
    }

    // Mixed content: stringify each placeholder in place. An unclosed
    // `{{` is left as literal text.
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                out.push_str(&stringify(&Resolver::resolve(&after[..end], ctx)));
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    Value::String(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> EvalContext {
        EvalContext::default()
            .with_value("gameTitle", json!("Quiz"))
            .with_value("started", json!(true))
            .with_value("round", json!(2))
    }

    #[test]
    fn test_embedded_placeholder_stringifies() {
        let value = interpolate(&json!("Welcome to {{gameTitle}}!"), &ctx());
        assert_eq!(value, json!("Welcome to Quiz!"));
    }

    #[test]
    fn test_full_placeholder_preserves_type() {
        assert_eq!(interpolate(&json!("{{started}}"), &ctx()), json!(true));
        assert_eq!(interpolate(&json!("{{round}}"), &ctx()), json!(2));
        assert_eq!(interpolate(&json!("{{gameTitle}}"), &ctx()), json!("Quiz"));
    }

    #[test]
    fn test_two_placeholders_are_not_full() {
        let value = interpolate(&json!("{{round}}/{{round}}"), &ctx());
        assert_eq!(value, json!("2/2"));
    }

    #[test]
    fn test_recursive_walk_leaves_scalars() {
        let tree = json!({
            "type": "header",
            "depth": 1,
            "children": [
                { "type": "text", "value": "Round {{round}}" },
                { "type": "flag", "value": "{{started}}" },
            ],
        });
        let out = interpolate(&tree, &ctx());
        assert_eq!(out["depth"], json!(1));
        assert_eq!(out["children"][0]["value"], json!("Round 2"));
        assert_eq!(out["children"][1]["value"], json!(true));
    }

    #[test]
    fn test_failed_placeholder_is_empty() {
        let value = interpolate(&json!("score: {{1 / 0}}"), &ctx());
        assert_eq!(value, json!("score: "));
    }

    #[test]
    fn test_unclosed_placeholder_left_verbatim() {
        let value = interpolate(&json!("broken {{round"), &ctx());
        assert_eq!(value, json!("broken {{round"));
    }
}
