//! Micro-templates for label, data-label and tooltip text.
//!
//! A template is literal text with `<%= expr %>` tags. An expression is a
//! `+`-joined list of identifiers, quoted strings and numbers. `+` adds when
//! both sides are numbers and concatenates otherwise:
//!
//! ```text
//! <%= label + ': ' + value %>   ->   "Jan: 42"
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

const OPEN_TAG: &str = "<%";
const CLOSE_TAG: &str = "%>";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for TemplateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateValue::Number(value) => write!(f, "{value}"),
            TemplateValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for TemplateValue {
    fn from(value: f64) -> Self {
        TemplateValue::Number(value)
    }
}

impl From<String> for TemplateValue {
    fn from(value: String) -> Self {
        TemplateValue::Text(value)
    }
}

impl From<&str> for TemplateValue {
    fn from(value: &str) -> Self {
        TemplateValue::Text(value.to_owned())
    }
}

/// Named values visible to a template, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    values: IndexMap<String, TemplateValue>,
}

impl TemplateContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<TemplateValue>) {
        self.values.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<TemplateValue>) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TemplateValue> {
        self.values.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Term {
    Variable { name: String, offset: usize },
    Literal(TemplateValue),
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Text(String),
    Expression(Vec<Term>),
}

/// Parsed template, reusable across renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    pub fn parse(source: &str) -> ChartResult<Self> {
        let mut pieces = Vec::new();
        let mut cursor = 0;

        while let Some(relative_open) = source[cursor..].find(OPEN_TAG) {
            let open = cursor + relative_open;
            if open > cursor {
                pieces.push(Piece::Text(source[cursor..open].to_owned()));
            }
            let body_start = open + OPEN_TAG.len();
            let Some(relative_close) = source[body_start..].find(CLOSE_TAG) else {
                return Err(template_error(open, "unterminated `<%` tag"));
            };
            let close = body_start + relative_close;
            let Some(expression) = source[body_start..close].strip_prefix('=') else {
                return Err(template_error(
                    open,
                    "only `<%= expr %>` output tags are supported",
                ));
            };
            pieces.push(Piece::Expression(parse_expression(
                expression,
                body_start + 1,
            )?));
            cursor = close + CLOSE_TAG.len();
        }
        if cursor < source.len() {
            pieces.push(Piece::Text(source[cursor..].to_owned()));
        }

        Ok(Self { pieces })
    }

    pub fn render(&self, context: &TemplateContext) -> ChartResult<String> {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Expression(terms) => {
                    let value = evaluate(terms, context)?;
                    out.push_str(&value.to_string());
                }
            }
        }
        Ok(out)
    }

    /// Returns `true` when the template contains no tags.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.pieces
            .iter()
            .all(|piece| matches!(piece, Piece::Text(_)))
    }

    /// Fails on the first variable not listed in `known`.
    pub fn check_variables(&self, known: &[&str]) -> ChartResult<()> {
        for piece in &self.pieces {
            let Piece::Expression(terms) = piece else {
                continue;
            };
            for term in terms {
                if let Term::Variable { name, offset } = term {
                    if !known.contains(&name.as_str()) {
                        return Err(template_error(
                            *offset,
                            &format!("unknown variable `{name}`"),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Parses and renders in one step.
pub fn render_template(source: &str, context: &TemplateContext) -> ChartResult<String> {
    Template::parse(source)?.render(context)
}

fn template_error(offset: usize, message: &str) -> ChartError {
    ChartError::Template {
        offset,
        message: message.to_owned(),
    }
}

fn parse_expression(expression: &str, base_offset: usize) -> ChartResult<Vec<Term>> {
    let bytes = expression.as_bytes();
    let mut terms = Vec::new();
    let mut index = 0;
    let mut expect_term = true;

    while index < bytes.len() {
        let byte = bytes[index];
        if byte.is_ascii_whitespace() {
            index += 1;
            continue;
        }
        let offset = base_offset + index;

        if !expect_term {
            if byte != b'+' {
                return Err(template_error(offset, "expected `+` between terms"));
            }
            expect_term = true;
            index += 1;
            continue;
        }

        match byte {
            b'\'' | b'"' => {
                let Some(relative_end) = expression[index + 1..].find(byte as char) else {
                    return Err(template_error(offset, "unterminated string literal"));
                };
                let end = index + 1 + relative_end;
                terms.push(Term::Literal(TemplateValue::Text(
                    expression[index + 1..end].to_owned(),
                )));
                index = end + 1;
            }
            b'0'..=b'9' | b'-' | b'.' => {
                let end = scan_while(bytes, index + 1, |b| b.is_ascii_digit() || b == b'.');
                let number = expression[index..end]
                    .parse::<f64>()
                    .map_err(|_| template_error(offset, "invalid number literal"))?;
                terms.push(Term::Literal(TemplateValue::Number(number)));
                index = end;
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                let end = scan_while(bytes, index, |b| b.is_ascii_alphanumeric() || b == b'_');
                terms.push(Term::Variable {
                    name: expression[index..end].to_owned(),
                    offset,
                });
                index = end;
            }
            _ => return Err(template_error(offset, "unexpected character in expression")),
        }
        expect_term = false;
    }

    if terms.is_empty() || expect_term {
        return Err(template_error(
            base_offset + expression.len(),
            "expression is empty or ends with `+`",
        ));
    }
    Ok(terms)
}

fn scan_while(bytes: &[u8], start: usize, accept: impl Fn(u8) -> bool) -> usize {
    let mut end = start;
    while end < bytes.len() && accept(bytes[end]) {
        end += 1;
    }
    end
}

fn evaluate(terms: &[Term], context: &TemplateContext) -> ChartResult<TemplateValue> {
    let mut accumulator: Option<TemplateValue> = None;
    for term in terms {
        let value = match term {
            Term::Literal(value) => value.clone(),
            Term::Variable { name, offset } => context
                .get(name)
                .cloned()
                .ok_or_else(|| template_error(*offset, &format!("unknown variable `{name}`")))?,
        };
        accumulator = Some(match (accumulator, value) {
            (None, value) => value,
            (Some(TemplateValue::Number(a)), TemplateValue::Number(b)) => {
                TemplateValue::Number(a + b)
            }
            (Some(left), right) => TemplateValue::Text(format!("{left}{right}")),
        });
    }
    accumulator.ok_or_else(|| template_error(0, "empty expression"))
}

#[cfg(test)]
mod tests {
    use super::{Template, TemplateContext, render_template};
    use crate::error::ChartError;

    #[test]
    fn substitutes_and_concatenates() {
        let context = TemplateContext::new()
            .with("label", "Jan")
            .with("value", 42.0);
        let text = render_template("<%= label + ': ' + value %> units", &context)
            .expect("render");
        assert_eq!(text, "Jan: 42 units");
    }

    #[test]
    fn numbers_add_before_concatenation() {
        let context = TemplateContext::new().with("a", 1.5).with("b", 2.0);
        assert_eq!(
            render_template("<%=a+b%>", &context).expect("render"),
            "3.5"
        );
        assert_eq!(
            render_template("<%='x'+a+b%>", &context).expect("render"),
            "x1.52"
        );
    }

    #[test]
    fn plain_text_is_static() {
        let template = Template::parse("no tags here").expect("parse");
        assert!(template.is_static());
        assert_eq!(
            template.render(&TemplateContext::new()).expect("render"),
            "no tags here"
        );
    }

    #[test]
    fn reports_unknown_variables_and_bad_tags() {
        let err = render_template("<%=missing%>", &TemplateContext::new())
            .expect_err("unknown variable");
        assert!(matches!(err, ChartError::Template { offset: 3, .. }));

        assert!(Template::parse("<% for %>").is_err());
        assert!(Template::parse("<%= a + %>").is_err());
        assert!(Template::parse("<%= a").is_err());
    }

    #[test]
    fn variable_check_runs_without_a_context() {
        let template = Template::parse("x <%= label + ' ' + nope %>").expect("parse");
        template
            .check_variables(&["label", "nope"])
            .expect("all known");
        let err = template
            .check_variables(&["label", "value"])
            .expect_err("nope is unknown");
        assert!(matches!(err, ChartError::Template { offset: 20, .. }));
        Template::parse("static")
            .expect("parse")
            .check_variables(&[])
            .expect("no variables");
    }
}
