//! Demo and utility nodes: sleep, print, math, rule-based intent
//! classification, pass-through routing, mocked search, and formatting.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::time::Duration;

use super::{number, output, text};
use crate::error::Result;
use crate::node::Node;

/// Sleeps for `duration` seconds.
#[derive(Debug)]
pub struct SleepNode {
    id: String,
}

impl SleepNode {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait]
impl Node for SleepNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, inputs: Map<String, Value>) -> Result<Map<String, Value>> {
        let duration = number(&inputs, "duration", 1.0).max(0.0);
        tracing::info!(node = %self.id, duration, "sleeping");
        tokio::time::sleep(Duration::from_secs_f64(duration)).await;
        tracing::info!(node = %self.id, "woke up");
        Ok(output(json!({"status": "slept", "duration": duration})))
    }
}

/// Emits `message` and records it as `printed`.
#[derive(Debug)]
pub struct PrintNode {
    id: String,
}

impl PrintNode {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait]
impl Node for PrintNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, inputs: Map<String, Value>) -> Result<Map<String, Value>> {
        let message = text(&inputs, "message", "");
        tracing::info!(node = %self.id, message, "print");
        Ok(output(json!({"printed": message})))
    }
}

/// Binary arithmetic over `a` and `b`. Unknown operators yield 0.
#[derive(Debug)]
pub struct MathNode {
    id: String,
}

impl MathNode {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait]
impl Node for MathNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, inputs: Map<String, Value>) -> Result<Map<String, Value>> {
        let a = number(&inputs, "a", 0.0);
        let b = number(&inputs, "b", 0.0);
        let op = text(&inputs, "op", "add");

        let result = match op {
            "add" => a + b,
            "sub" => a - b,
            "mul" => a * b,
            _ => 0.0,
        };

        tracing::info!(node = %self.id, a, op, b, result, "math");
        Ok(output(json!({"result": result})))
    }
}

/// Rule-based intent classification over the query text.
#[derive(Debug)]
pub struct IntentClassifierNode {
    id: String,
}

impl IntentClassifierNode {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait]
impl Node for IntentClassifierNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, inputs: Map<String, Value>) -> Result<Map<String, Value>> {
        let query = text(&inputs, "query", "").to_lowercase();

        let category = if ["ec2", "server", "down"].iter().any(|kw| query.contains(kw)) {
            "technical_issue"
        } else if ["bill", "cost"].iter().any(|kw| query.contains(kw)) {
            "billing"
        } else {
            "general_inquiry"
        };

        tracing::info!(node = %self.id, query, category, "classified");
        Ok(output(json!({"category": category})))
    }
}

/// Pass-through router; branching happens via downstream conditions.
#[derive(Debug)]
pub struct RouterNode {
    id: String,
}

impl RouterNode {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait]
impl Node for RouterNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, inputs: Map<String, Value>) -> Result<Map<String, Value>> {
        let intent = inputs.get("intent").cloned().unwrap_or(Value::Null);
        tracing::info!(node = %self.id, intent = %intent, "routing");
        Ok(output(json!({"intent": intent})))
    }
}

/// Search simulation returning canned text per `source`, after a delay.
#[derive(Debug)]
pub struct MockSearchNode {
    id: String,
}

impl MockSearchNode {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait]
impl Node for MockSearchNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, inputs: Map<String, Value>) -> Result<Map<String, Value>> {
        // `keywords` is an accepted alias for `query`.
        let query = match text(&inputs, "query", "") {
            "" => text(&inputs, "keywords", ""),
            query => query,
        };
        let source = text(&inputs, "source", "unknown");
        let duration = number(&inputs, "duration", 0.5).max(0.0);

        tracing::info!(node = %self.id, source, query, duration, "searching");
        tokio::time::sleep(Duration::from_secs_f64(duration)).await;

        let results = match source {
            "official_docs" => {
                "Official Docs: EC2 instance troubleshooting guide. Check security groups."
            }
            "community_forum" => {
                "Community Forum: User 'cloud_guru' suggests restarting the instance."
            }
            _ => "No results found.",
        };

        Ok(output(json!({"results": results})))
    }
}

/// Records the already-expanded `template` and its length.
#[derive(Debug)]
pub struct FormatNode {
    id: String,
}

impl FormatNode {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait]
impl Node for FormatNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, inputs: Map<String, Value>) -> Result<Map<String, Value>> {
        let template = text(&inputs, "template", "");
        tracing::info!(node = %self.id, length = template.len(), "formatting output");
        Ok(output(json!({"formatted": template, "length": template.len()})))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inputs(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn math_operations() {
        let node = MathNode::new("m");
        let out = node
            .run(inputs(json!({"a": 10, "b": 20, "op": "add"})))
            .await
            .unwrap();
        assert_eq!(out["result"], json!(30.0));

        let out = node
            .run(inputs(json!({"a": 7, "b": 2, "op": "sub"})))
            .await
            .unwrap();
        assert_eq!(out["result"], json!(5.0));

        let out = node
            .run(inputs(json!({"a": 3, "b": 4, "op": "mul"})))
            .await
            .unwrap();
        assert_eq!(out["result"], json!(12.0));
    }

    #[tokio::test]
    async fn math_unknown_op_yields_zero() {
        let node = MathNode::new("m");
        let out = node
            .run(inputs(json!({"a": 3, "b": 4, "op": "div"})))
            .await
            .unwrap();
        assert_eq!(out["result"], json!(0.0));
    }

    #[tokio::test]
    async fn math_parses_expanded_string_inputs() {
        let node = MathNode::new("m");
        let out = node
            .run(inputs(json!({"a": "30.0", "b": "2", "op": "mul"})))
            .await
            .unwrap();
        assert_eq!(out["result"], json!(60.0));
    }

    #[tokio::test]
    async fn print_records_message() {
        let node = PrintNode::new("p");
        let out = node.run(inputs(json!({"message": "hi"}))).await.unwrap();
        assert_eq!(out["printed"], json!("hi"));
    }

    #[tokio::test]
    async fn classifier_keyword_rules() {
        let node = IntentClassifierNode::new("cls");
        let cases = [
            ("my EC2 is down", "technical_issue"),
            ("the server crashed", "technical_issue"),
            ("question about my bill", "billing"),
            ("what does this cost", "billing"),
            ("hello there", "general_inquiry"),
        ];
        for (query, expected) in cases {
            let out = node.run(inputs(json!({"query": query}))).await.unwrap();
            assert_eq!(out["category"], json!(expected), "query: {query}");
        }
    }

    #[tokio::test]
    async fn router_passes_intent_through() {
        let node = RouterNode::new("r");
        let out = node
            .run(inputs(json!({"intent": "billing"})))
            .await
            .unwrap();
        assert_eq!(out["intent"], json!("billing"));
    }

    #[tokio::test]
    async fn mock_search_canned_results() {
        let node = MockSearchNode::new("s");
        let out = node
            .run(inputs(json!({"query": "ec2", "source": "official_docs", "duration": 0})))
            .await
            .unwrap();
        assert!(out["results"].as_str().unwrap().starts_with("Official Docs:"));

        let out = node
            .run(inputs(
                json!({"query": "ec2", "source": "community_forum", "duration": 0}),
            ))
            .await
            .unwrap();
        assert!(out["results"]
            .as_str()
            .unwrap()
            .starts_with("Community Forum:"));

        let out = node
            .run(inputs(json!({"query": "ec2", "duration": 0})))
            .await
            .unwrap();
        assert_eq!(out["results"], json!("No results found."));
    }

    #[tokio::test]
    async fn mock_search_accepts_keywords_alias() {
        let node = MockSearchNode::new("s");
        let out = node
            .run(inputs(
                json!({"keywords": "ec2, security groups", "source": "official_docs", "duration": 0}),
            ))
            .await
            .unwrap();
        assert!(out["results"].as_str().unwrap().starts_with("Official Docs:"));
    }

    #[tokio::test]
    async fn format_reports_length() {
        let node = FormatNode::new("f");
        let out = node
            .run(inputs(json!({"template": "hello"})))
            .await
            .unwrap();
        assert_eq!(out["formatted"], json!("hello"));
        assert_eq!(out["length"], json!(5));
    }

    #[tokio::test]
    async fn sleep_reports_duration() {
        let node = SleepNode::new("z");
        let out = node.run(inputs(json!({"duration": 0}))).await.unwrap();
        assert_eq!(out["status"], json!("slept"));
        assert_eq!(out["duration"], json!(0.0));
    }
}
