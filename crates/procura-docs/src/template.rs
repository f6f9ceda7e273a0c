//! # Template Engine
//!
//! The `{tag}` language used inside the Word templates.
//!
//! ## Syntax
//! ```text
//! {contractID}                 value lookup
//! {contractor.name}            dotted path
//! {#bidders}...{/bidders}      repeat for each array item, or once for a
//!                              truthy value; the item becomes the innermost
//!                              scope
//! {^bidders}...{/bidders}      render only when the value is missing,
//!                              false, "", 0 or []
//! {.}                          the current item itself
//! ```
//!
//! ## Scope Resolution
//! ```text
//! data = { "contractID": "24ID0001",
//!          "bidders": [ { "id": 1, "name": "ACME" } ] }
//!
//! {#bidders}{id}. {name} for {contractID}{/bidders}
//!             │     │          │
//!             │     │          └─ not on the item → found on the root
//!             └─────┴──────────── found on the item
//!
//! → "1. ACME for 24ID0001"
//! ```
//!
//! Lookups never fail: a missing value renders as the empty string. Only
//! malformed templates are errors.

use serde_json::Value;

use crate::error::{DocError, DocResult};

/// How rendered values are escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// Escape `& < > " '` for XML text (used for .docx parts).
    Xml,
    /// Insert values verbatim.
    None,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Value(String),
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
    },
}

/// A parsed template, reusable for many renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

/// An open section while parsing.
struct Frame {
    name: String,
    inverted: bool,
    position: usize,
    outer: Vec<Node>,
}

impl Template {
    /// Parses template source.
    ///
    /// ## Errors
    /// [`DocError::TemplateSyntax`] for an unclosed `{`, an empty tag, a
    /// `{/x}` with no matching opener, a mismatched closer or a section left
    /// open at the end.
    pub fn parse(source: &str) -> DocResult<Template> {
        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut offset = 0usize;
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            if open > 0 {
                nodes.push(Node::Text(rest[..open].to_string()));
            }

            let position = offset + open;
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| DocError::syntax(position, "unclosed tag"))?;
            let tag = after[..close].trim();
            if tag.contains('{') {
                return Err(DocError::syntax(position, "'{' inside a tag"));
            }

            match tag.chars().next() {
                None => return Err(DocError::syntax(position, "empty tag")),
                Some(marker @ ('#' | '^')) => {
                    let name = tag[1..].trim();
                    if name.is_empty() {
                        return Err(DocError::syntax(position, "section without a name"));
                    }
                    stack.push(Frame {
                        name: name.to_string(),
                        inverted: marker == '^',
                        position,
                        outer: std::mem::take(&mut nodes),
                    });
                }
                Some('/') => {
                    let name = tag[1..].trim();
                    let frame = stack.pop().ok_or_else(|| {
                        DocError::syntax(position, format!("'{{/{}}}' closes nothing", name))
                    })?;
                    // `{/}` closes whatever is open
                    if !name.is_empty() && name != frame.name {
                        return Err(DocError::syntax(
                            position,
                            format!("'{{/{}}}' closes '{}'", name, frame.name),
                        ));
                    }
                    let children = std::mem::replace(&mut nodes, frame.outer);
                    nodes.push(Node::Section {
                        name: frame.name,
                        inverted: frame.inverted,
                        children,
                    });
                }
                Some(_) => nodes.push(Node::Value(tag.to_string())),
            }

            let consumed = open + 1 + close + 1;
            offset += consumed;
            rest = &rest[consumed..];
        }

        if !rest.is_empty() {
            nodes.push(Node::Text(rest.to_string()));
        }

        if let Some(frame) = stack.pop() {
            return Err(DocError::syntax(
                frame.position,
                format!("section '{}' is never closed", frame.name),
            ));
        }

        Ok(Template { nodes })
    }

    /// Renders against `data`.
    pub fn render(&self, data: &Value, escape: Escape) -> String {
        let mut out = String::new();
        let mut scopes = vec![data];
        render_nodes(&self.nodes, &mut scopes, escape, &mut out);
        out
    }
}

/// Parses and renders in one step.
pub fn render_str(source: &str, data: &Value, escape: Escape) -> DocResult<String> {
    Ok(Template::parse(source)?.render(data, escape))
}

fn render_nodes<'d>(nodes: &[Node], scopes: &mut Vec<&'d Value>, escape: Escape, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Value(path) => {
                let text = lookup(scopes, path).map(scalar_text).unwrap_or_default();
                match escape {
                    Escape::Xml => push_xml_escaped(out, &text),
                    Escape::None => out.push_str(&text),
                }
            }
            Node::Section {
                name,
                inverted,
                children,
            } => {
                let value = lookup(scopes, name);
                if *inverted {
                    if !is_truthy(value) {
                        render_nodes(children, scopes, escape, out);
                    }
                    continue;
                }
                match value {
                    Some(Value::Array(items)) => {
                        for item in items {
                            scopes.push(item);
                            render_nodes(children, scopes, escape, out);
                            scopes.pop();
                        }
                    }
                    Some(v) if is_truthy(Some(v)) => {
                        scopes.push(v);
                        render_nodes(children, scopes, escape, out);
                        scopes.pop();
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Finds `path` starting at the innermost scope that has its first key.
fn lookup<'d>(scopes: &[&'d Value], path: &str) -> Option<&'d Value> {
    if path == "." {
        return scopes.last().copied();
    }
    let mut keys = path.split('.');
    let first = keys.next()?;
    let mut value = scopes
        .iter()
        .rev()
        .copied()
        .find_map(|scope| scope.get(first))?;
    for key in keys {
        value = value.get(key)?;
    }
    Some(value)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::Object(_)) => true,
    }
}

fn push_xml_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(source: &str, data: Value) -> String {
        render_str(source, &data, Escape::None).unwrap()
    }

    #[test]
    fn test_values_and_paths() {
        let data = json!({
            "contractID": "24ID0001",
            "amount": 1500,
            "contractor": { "name": "ACME", "tin": null }
        });
        assert_eq!(
            render("{contractID}: {contractor.name} ₱{amount}", data.clone()),
            "24ID0001: ACME ₱1500"
        );
        assert_eq!(render("[{missing}][{contractor.tin}][{contractor.x.y}]", data), "[][][]");
    }

    #[test]
    fn test_tag_whitespace_is_trimmed() {
        assert_eq!(render("{ name }", json!({ "name": "x" })), "x");
    }

    #[test]
    fn test_loop_with_outer_scope() {
        let data = json!({
            "contractID": "24ID0001",
            "bidders": [
                { "id": 1, "name": "ACME" },
                { "id": 2, "name": "Beta" }
            ]
        });
        assert_eq!(
            render("{#bidders}{id}. {name} ({contractID})\n{/bidders}", data),
            "1. ACME (24ID0001)\n2. Beta (24ID0001)\n"
        );
    }

    #[test]
    fn test_dot_is_current_item() {
        assert_eq!(render("{#ids}<{.}>{/}", json!({ "ids": ["a", "b"] })), "<a><b>");
    }

    #[test]
    fn test_conditional_and_inverted_sections() {
        let tpl = "{#goods}G{/goods}{^goods}I{/goods}";
        assert_eq!(render(tpl, json!({ "goods": true })), "G");
        assert_eq!(render(tpl, json!({ "goods": false })), "I");
        assert_eq!(render(tpl, json!({})), "I");
        assert_eq!(render("{^list}none{/list}", json!({ "list": [] })), "none");
        assert_eq!(render("{^n}zero{/n}", json!({ "n": 0 })), "zero");
    }

    #[test]
    fn test_object_section_pushes_scope() {
        let data = json!({ "endUser": { "name": "KATHERINE V. LADAGA", "id": "12 G 0106" } });
        assert_eq!(render("{#endUser}{name} / {id}{/endUser}", data), "KATHERINE V. LADAGA / 12 G 0106");
    }

    #[test]
    fn test_xml_escape() {
        let data = json!({ "name": "Smith & Sons <Builders>" });
        assert_eq!(
            render_str("<w:t>{name}</w:t>", &data, Escape::Xml).unwrap(),
            "<w:t>Smith &amp; Sons &lt;Builders&gt;</w:t>"
        );
    }

    #[test]
    fn test_syntax_errors() {
        for bad in ["{name", "{}", "{#a}x", "x{/a}", "{#a}{/b}", "{#}{/}", "{a{b}"] {
            let err = Template::parse(bad).unwrap_err();
            assert!(matches!(err, DocError::TemplateSyntax { .. }), "{bad}: {err:?}");
        }
    }

    #[test]
    fn test_error_position_points_at_tag() {
        match Template::parse("abc {#open} def").unwrap_err() {
            DocError::TemplateSyntax { position, .. } => assert_eq!(position, 4),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_template_is_reusable() {
        let tpl = Template::parse("Hi {name}").unwrap();
        assert_eq!(tpl.render(&json!({ "name": "A" }), Escape::None), "Hi A");
        assert_eq!(tpl.render(&json!({ "name": "B" }), Escape::None), "Hi B");
    }
}
