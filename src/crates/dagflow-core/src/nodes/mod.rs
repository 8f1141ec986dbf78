//! Built-in node implementations.
//!
//! The catalogue the default [`NodeRegistry`](crate::node::NodeRegistry)
//! ships with: timing and demo primitives in [`simple`], the external LLM
//! call with its mock fallback in [`llm`].

pub mod llm;
pub mod simple;

pub use llm::LlmNode;
pub use simple::{
    FormatNode, IntentClassifierNode, MathNode, MockSearchNode, PrintNode, RouterNode, SleepNode,
};

use serde_json::{Map, Value};

/// Convert a `json!({..})` literal into the output map nodes return.
pub(crate) fn output(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(fields) => fields,
        _ => Map::new(),
    }
}

/// Numeric input: accepts JSON numbers and numeric strings (template
/// expansion always yields strings, so nodes parse explicitly).
pub(crate) fn number(inputs: &Map<String, Value>, key: &str, default: f64) -> f64 {
    match inputs.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

/// String input with a default for missing or non-string values.
pub(crate) fn text<'a>(inputs: &'a Map<String, Value>, key: &str, default: &'a str) -> &'a str {
    inputs.get(key).and_then(Value::as_str).unwrap_or(default)
}
