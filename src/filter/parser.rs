//! Token mini-language for building filters
//!
//! Tokens are read left to right against a stack of open composites:
//!
//! - `AND`, `OR` and `NOT` open a new composite (ALL, ANY, NONE).
//! - `END` closes the innermost composite and adds it to its parent. When
//!   no parent is left, the closed composite is the whole expression.
//! - Anything else is a leaf added to the innermost composite. A `c:`
//!   prefix tests file content, `p:` the relative path, `e:` the extension,
//!   `v:` keeps only the latest version of a file family (the regex finds
//!   the family prefix), and no prefix the file name. The rest of the token is a regex that may
//!   match anywhere in the subject. Surrounding double quotes are dropped.
//!
//! A `NOT` closes itself as soon as it receives its first child, so
//! `AND Foo NOT Bar END` reads as "Foo and not Bar". An `END` that arrives
//! while a `NOT` is still empty does not close it; it switches that `NOT`
//! to multi-child mode, where it stays open until a later `END`:
//! `NOT END A B END` rejects files matching A or B.
//!
//! If the input ends with exactly one composite still open, it becomes the
//! expression without a final `END`.

use super::{compile, CompositeOp, Filter, Predicate, Subject};
use crate::error::{AcError, Result};

struct Frame {
    op: CompositeOp,
    children: Vec<Filter>,
    /// Close after the first child (single-operand NOT)
    auto_close: bool,
}

impl Frame {
    fn new(op: CompositeOp) -> Self {
        Self {
            op,
            children: Vec::new(),
            auto_close: op == CompositeOp::None,
        }
    }

    fn into_filter(self) -> Filter {
        Filter::Composite {
            op: self.op,
            children: self.children,
        }
    }
}

#[derive(Default)]
struct FilterParser {
    stack: Vec<Frame>,
    root: Option<Filter>,
}

impl FilterParser {
    fn feed(&mut self, position: usize, token: &str) -> Result<()> {
        if self.root.is_some() {
            return Err(syntax(format!(
                "unexpected '{}' at token {}: the expression is already closed",
                token, position
            )));
        }

        match token {
            "AND" => self.stack.push(Frame::new(CompositeOp::All)),
            "OR" => self.stack.push(Frame::new(CompositeOp::Any)),
            "NOT" => self.stack.push(Frame::new(CompositeOp::None)),
            "END" => {
                let top = self.stack.last_mut().ok_or_else(|| {
                    syntax(format!(
                        "END at token {} with no open composite (empty stack)",
                        position
                    ))
                })?;
                if top.auto_close && top.children.is_empty() {
                    top.auto_close = false;
                    return Ok(());
                }
                if let Some(frame) = self.stack.pop() {
                    self.attach(frame.into_filter());
                }
            }
            leaf => {
                if self.stack.is_empty() {
                    return Err(syntax(format!(
                        "predicate '{}' at token {} must be inside AND, OR or NOT (empty stack)",
                        leaf, position
                    )));
                }
                let predicate = parse_leaf(leaf)?;
                self.attach(predicate.into());
            }
        }
        Ok(())
    }

    /// Add a finished filter to the innermost open composite, closing any
    /// single-operand NOT frames it completes
    fn attach(&mut self, mut filter: Filter) {
        loop {
            match self.stack.last_mut() {
                None => {
                    self.root = Some(filter);
                    return;
                }
                Some(top) => {
                    top.children.push(filter);
                    if !top.auto_close {
                        return;
                    }
                }
            }
            match self.stack.pop() {
                Some(frame) => filter = frame.into_filter(),
                None => return,
            }
        }
    }

    fn finish(mut self) -> Result<Filter> {
        if let Some(root) = self.root {
            return Ok(root);
        }
        match self.stack.len() {
            0 => Err(syntax("empty filter expression".to_string())),
            1 => match self.stack.pop() {
                Some(frame) => Ok(frame.into_filter()),
                None => Err(syntax("empty filter expression".to_string())),
            },
            open => Err(syntax(format!(
                "{} composites left unclosed; add END tokens",
                open
            ))),
        }
    }
}

fn syntax(message: String) -> AcError {
    AcError::FilterSyntax { message }
}

fn unquote(token: &str) -> &str {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        &token[1..token.len() - 1]
    } else {
        token
    }
}

fn parse_leaf(token: &str) -> Result<Predicate> {
    let token = unquote(token);
    let (subject, pattern) = match token.split_once(':') {
        Some(("c", rest)) => (Subject::Content, rest),
        Some(("p", rest)) => (Subject::Path, rest),
        Some(("e", rest)) => (Subject::Extension, rest),
        Some(("v", rest)) => (Subject::LatestVersion, rest),
        Some((prefix, _)) if prefix.len() == 1 && prefix.as_bytes()[0].is_ascii_lowercase() => {
            return Err(syntax(format!(
                "undefined predicate prefix '{}:' in '{}'; use c:, p:, e: or v:",
                prefix, token
            )));
        }
        _ => (Subject::Name, token),
    };
    Ok(Predicate::new(
        subject,
        super::Matcher::Regex(compile(unquote(pattern))?),
    ))
}

/// Build a filter from mini-language tokens
pub fn parse_filter<S: AsRef<str>>(tokens: &[S]) -> Result<Filter> {
    let mut parser = FilterParser::default();
    for (position, token) in tokens.iter().enumerate() {
        parser.feed(position + 1, token.as_ref())?;
    }
    parser.finish()
}

/// Split on whitespace, keeping double-quoted runs together, then parse
pub fn parse_filter_str(input: &str) -> Result<Filter> {
    parse_filter(&split_tokens(input))
}

fn split_tokens(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in input.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
