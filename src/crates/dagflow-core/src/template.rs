//! Template expansion and guard evaluation.
//!
//! Workflow inputs may embed `{{ expr }}` markers that are resolved against
//! a memory snapshot just before a node runs, and node conditions are
//! boolean expressions over the same namespace. The expression language is
//! a small, closed subset evaluated by a hand-written parser: dotted
//! identifier paths, string/number/bool literals, `==`, `!=`, `and`, `or`,
//! `not`, and parentheses. Evaluation is closed over the snapshot — there
//! are no ambient identifiers and no host escape.
//!
//! Failure policy:
//! - expansion fails **open**: a diagnostic is logged and the original text
//!   is kept, so a stray `{{` does not abort a run;
//! - guards fail **closed**: an unparseable condition suppresses the branch
//!   instead of firing it.

use serde_json::{Map, Value};

/// Expand every string leaf of `value` against the namespace.
///
/// Non-strings are returned unchanged; strings without `{{` are returned
/// unchanged; objects and arrays are walked recursively.
pub fn expand(value: &Value, namespace: &Map<String, Value>) -> Value {
    match value {
        Value::String(text) => Value::String(expand_text(text, namespace)),
        Value::Array(items) => Value::Array(items.iter().map(|v| expand(v, namespace)).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), expand(v, namespace)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Expand `{{ expr }}` segments in a single string.
///
/// Each segment is replaced by the string form of the evaluated expression.
/// Any failure (bad syntax, unterminated marker) logs a warning and yields
/// the original text unchanged.
pub fn expand_text(text: &str, namespace: &Map<String, Value>) -> String {
    if !text.contains("{{") {
        return text.to_string();
    }
    match try_expand(text, namespace) {
        Ok(expanded) => expanded,
        Err(err) => {
            tracing::warn!(template = text, error = %err, "template expansion failed, keeping original text");
            text.to_string()
        }
    }
}

/// Evaluate a node condition against the namespace.
///
/// An empty or blank condition is true. Otherwise the text is expanded
/// first, then the rendered string is interpreted as a boolean expression.
/// Any failure yields `false`.
pub fn evaluate_guard(condition: &str, namespace: &Map<String, Value>) -> bool {
    if condition.trim().is_empty() {
        return true;
    }
    let rendered = match try_expand(condition, namespace) {
        Ok(rendered) => rendered,
        Err(err) => {
            tracing::warn!(condition, error = %err, "guard expansion failed, treating as false");
            return false;
        }
    };
    match eval_expression(&rendered, namespace) {
        Ok(value) => truthy(&value),
        Err(err) => {
            tracing::warn!(condition, rendered, error = %err, "guard evaluation failed, treating as false");
            false
        }
    }
}

fn try_expand(text: &str, namespace: &Map<String, Value>) -> Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| "unterminated '{{' marker".to_string())?;
        let value = eval_expression(&after[..end], namespace)?;
        out.push_str(&render(&value));
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// String form of an evaluated expression: strings render bare, null as
/// the empty string, everything else as its JSON form.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && s != "false" && s != "False",
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

// ---------------------------------------------------------------------------
// Expression parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    Str(String),
    EqEq,
    NotEq,
    LParen,
    RParen,
    Dot,
}

#[derive(Debug, Clone)]
enum Expr {
    Literal(Value),
    Path(Vec<String>),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
}

fn eval_expression(input: &str, namespace: &Map<String, Value>) -> Result<Value, String> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!("trailing input at token {}", parser.pos));
    }
    eval(&expr, namespace)
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::EqEq);
                    i += 2;
                } else {
                    return Err("expected '==' after '='".to_string());
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::NotEq);
                    i += 2;
                } else {
                    return Err("expected '!=' after '!'".to_string());
                }
            }
            '\'' | '"' => {
                let quote = c;
                let mut literal = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(&ch) => {
                            literal.push(ch);
                            i += 1;
                        }
                        None => return Err("unterminated string literal".to_string()),
                    }
                }
                tokens.push(Token::Str(literal));
            }
            c if c.is_ascii_digit()
                || (c == '-' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())) =>
            {
                let start = i;
                i += 1;
                while chars
                    .get(i)
                    .is_some_and(|n| n.is_ascii_digit() || *n == '.')
                {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let number = text
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{text}'"))?;
                tokens.push(Token::Number(number));
            }
            c if c.is_ascii_alphanumeric() || c == '_' => {
                let start = i;
                while chars
                    .get(i)
                    .is_some_and(|n| n.is_ascii_alphanumeric() || *n == '_')
                {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(word)) if word == keyword)
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_and()?;
        while self.peek_keyword("or") {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_not()?;
        while self.peek_keyword("and") {
            self.advance();
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, String> {
        if self.peek_keyword("not") {
            self.advance();
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, String> {
        let left = self.parse_primary()?;
        match self.peek() {
            Some(Token::EqEq) => {
                self.advance();
                let right = self.parse_primary()?;
                Ok(Expr::Eq(Box::new(left), Box::new(right)))
            }
            Some(Token::NotEq) => {
                self.advance();
                let right = self.parse_primary()?;
                Ok(Expr::Ne(Box::new(left), Box::new(right)))
            }
            _ => Ok(left),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("expected ')'".to_string()),
                }
            }
            Some(Token::Str(literal)) => Ok(Expr::Literal(Value::String(literal))),
            Some(Token::Number(number)) => Ok(Expr::Literal(
                serde_json::Number::from_f64(number)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
            )),
            Some(Token::Ident(word)) => match word.as_str() {
                "true" | "True" => Ok(Expr::Literal(Value::Bool(true))),
                "false" | "False" => Ok(Expr::Literal(Value::Bool(false))),
                _ => {
                    let mut segments = vec![word];
                    while self.peek() == Some(&Token::Dot) {
                        self.advance();
                        match self.advance() {
                            Some(Token::Ident(segment)) => segments.push(segment),
                            _ => return Err("expected identifier after '.'".to_string()),
                        }
                    }
                    Ok(Expr::Path(segments))
                }
            },
            other => Err(format!("unexpected token {other:?}")),
        }
    }
}

fn eval(expr: &Expr, namespace: &Map<String, Value>) -> Result<Value, String> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Path(segments) => Ok(lookup(segments, namespace)),
        Expr::Not(inner) => Ok(Value::Bool(!truthy(&eval(inner, namespace)?))),
        Expr::And(left, right) => {
            if !truthy(&eval(left, namespace)?) {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(truthy(&eval(right, namespace)?)))
        }
        Expr::Or(left, right) => {
            if truthy(&eval(left, namespace)?) {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(truthy(&eval(right, namespace)?)))
        }
        Expr::Eq(left, right) => Ok(Value::Bool(values_equal(
            &eval(left, namespace)?,
            &eval(right, namespace)?,
        ))),
        Expr::Ne(left, right) => Ok(Value::Bool(!values_equal(
            &eval(left, namespace)?,
            &eval(right, namespace)?,
        ))),
    }
}

/// Resolve a dotted path against the namespace. Missing segments resolve to
/// null, mirroring how an undefined template variable renders as nothing.
fn lookup(segments: &[String], namespace: &Map<String, Value>) -> Value {
    let mut current: Option<&Value> = namespace.get(&segments[0]);
    for segment in &segments[1..] {
        current = current
            .and_then(|value| value.as_object())
            .and_then(|fields| fields.get(segment));
    }
    current.cloned().unwrap_or(Value::Null)
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => left == right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn namespace() -> Map<String, Value> {
        let mut ns = Map::new();
        ns.insert("cls".to_string(), json!({"category": "technical_issue"}));
        ns.insert("root".to_string(), json!({"result": 30.0}));
        ns.insert("a".to_string(), json!({"printed": "hi"}));
        ns
    }

    #[test]
    fn strings_without_markers_pass_through() {
        let ns = namespace();
        assert_eq!(expand_text("plain text", &ns), "plain text");
        assert_eq!(expand_text("", &ns), "");
    }

    #[test]
    fn expansion_substitutes_paths() {
        let ns = namespace();
        assert_eq!(expand_text("{{ a.printed }}!", &ns), "hi!");
        assert_eq!(expand_text("got {{ root.result }}", &ns), "got 30.0");
    }

    #[test]
    fn expansion_walks_nested_inputs() {
        let ns = namespace();
        let inputs = json!({
            "message": "{{ a.printed }}",
            "list": ["{{ cls.category }}", 7],
            "keep": 3,
        });
        let expanded = expand(&inputs, &ns);
        assert_eq!(expanded["message"], json!("hi"));
        assert_eq!(expanded["list"], json!(["technical_issue", 7]));
        assert_eq!(expanded["keep"], json!(3));
    }

    #[test]
    fn missing_paths_render_empty() {
        let ns = namespace();
        assert_eq!(expand_text("<{{ nothing.here }}>", &ns), "<>");
    }

    #[test]
    fn bad_templates_fail_open() {
        let ns = namespace();
        assert_eq!(expand_text("{{ broken", &ns), "{{ broken");
        assert_eq!(expand_text("{{ a ?? b }}", &ns), "{{ a ?? b }}");
    }

    #[test]
    fn empty_guard_is_true() {
        let ns = namespace();
        assert!(evaluate_guard("", &ns));
        assert!(evaluate_guard("   ", &ns));
    }

    #[test]
    fn equality_guards() {
        let ns = namespace();
        assert!(evaluate_guard("{{ cls.category == 'technical_issue' }}", &ns));
        assert!(!evaluate_guard("{{ cls.category == 'billing' }}", &ns));
        assert!(evaluate_guard("{{ cls.category != 'billing' }}", &ns));
        assert!(evaluate_guard("{{ root.result == 30 }}", &ns));
    }

    #[test]
    fn boolean_connectives_and_parens() {
        let ns = namespace();
        assert!(evaluate_guard(
            "{{ cls.category == 'technical_issue' and root.result == 30 }}",
            &ns
        ));
        assert!(evaluate_guard(
            "{{ cls.category == 'billing' or root.result == 30 }}",
            &ns
        ));
        assert!(evaluate_guard("{{ not cls.category == 'billing' }}", &ns));
        assert!(evaluate_guard(
            "{{ (cls.category == 'billing' or root.result == 30) and true }}",
            &ns
        ));
    }

    #[test]
    fn unparseable_guard_is_false() {
        let ns = namespace();
        assert!(!evaluate_guard("{{ cls.category === 'x' }}", &ns));
        assert!(!evaluate_guard("complete gibberish!!", &ns));
    }

    #[test]
    fn guard_without_markers_is_evaluated_directly() {
        let ns = namespace();
        assert!(evaluate_guard("cls.category == 'technical_issue'", &ns));
        assert!(!evaluate_guard("missing.path", &ns));
    }

    #[test]
    fn truthiness_rules() {
        assert!(!truthy(&Value::Null));
        assert!(truthy(&json!(1)));
        assert!(!truthy(&json!(0)));
        assert!(truthy(&json!("yes")));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!("false")));
        assert!(truthy(&json!([1])));
        assert!(!truthy(&json!({})));
    }
}
