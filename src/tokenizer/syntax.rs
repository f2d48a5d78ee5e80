//! Grammar-backed tokenizer built on tree-sitter
//!
//! Every leaf of the parse tree becomes one symbol. Comments are dropped,
//! identifiers collapse to [`IDENT_SYMBOL`] and literals to [`LITERAL_SYMBOL`]
//! without descending into them, so string contents and escape sequences
//! never reach the stream. The dropped comments are available separately
//! through [`Tokenizer::comments`].

use tree_sitter::{Node, Parser, Tree};

use super::{CanonicalStream, Tokenizer, IDENT_SYMBOL, LITERAL_SYMBOL, SYMBOL_BASE};
use crate::error::{AcError, Result};
use crate::lang::Lang;

/// Kinds that represent literal values across the bundled grammars
const LITERAL_KINDS: &[&str] = &[
    "number",
    "integer",
    "float",
    "char",
    "character",
    "number_literal",
    "raw_string",
    "heredoc_body",
];

/// Tokenizer for one tree-sitter grammar
#[derive(Debug, Clone, Copy)]
pub struct TreeSitterTokenizer {
    lang: Lang,
}

impl TreeSitterTokenizer {
    pub fn new(lang: Lang) -> Self {
        Self { lang }
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }
}

impl Tokenizer for TreeSitterTokenizer {
    fn name(&self) -> &str {
        self.lang.name()
    }

    fn tokenize(&self, source: &str) -> Result<CanonicalStream> {
        let tree = self.parse(source)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(AcError::Tokenization {
                file: String::new(),
                message: describe_error(root),
            });
        }

        Ok(CanonicalStream::from_codes(collect_symbols(root)))
    }

    /// Comments are collected even from trees with syntax errors
    fn comments(&self, source: &str) -> Result<String> {
        let tree = self.parse(source)?;
        Ok(collect_comments(tree.root_node(), source).join("\n"))
    }
}

impl TreeSitterTokenizer {
    fn parse(&self, source: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.lang.tree_sitter_language())
            .map_err(|e| AcError::Config {
                message: format!("Failed to set language for {}: {:?}", self.lang.name(), e),
            })?;

        parser
            .parse(source, None)
            .ok_or_else(|| AcError::Tokenization {
                file: String::new(),
                message: format!("{} parser produced no tree", self.lang.name()),
            })
    }
}

fn is_comment(node: &Node) -> bool {
    node.kind().contains("comment")
}

fn is_identifier(node: &Node) -> bool {
    node.is_named() && node.kind().ends_with("identifier")
}

fn is_literal(node: &Node) -> bool {
    if !node.is_named() {
        return false;
    }
    let kind = node.kind();
    kind.contains("literal") || kind.contains("string") || LITERAL_KINDS.contains(&kind)
}

/// Pre-order walk emitting one symbol per leaf
fn collect_symbols(root: Node) -> Vec<u32> {
    let mut symbols = Vec::new();
    let mut cursor = root.walk();

    loop {
        let node = cursor.node();
        let mut descend = false;

        if is_comment(&node) {
            // skipped entirely
        } else if is_identifier(&node) {
            symbols.push(IDENT_SYMBOL);
        } else if is_literal(&node) {
            symbols.push(LITERAL_SYMBOL);
        } else if node.child_count() == 0 {
            if node.end_byte() > node.start_byte() {
                symbols.push(u32::from(node.kind_id()) + SYMBOL_BASE);
            }
        } else {
            descend = true;
        }

        if descend && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return symbols;
            }
        }
    }
}

/// Text of every comment node, in source order
fn collect_comments<'s>(root: Node, source: &'s str) -> Vec<&'s str> {
    let mut comments = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if is_comment(&node) {
            if let Ok(text) = node.utf8_text(source.as_bytes()) {
                let text = text.trim();
                if !text.is_empty() {
                    comments.push(text);
                }
            }
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    comments
}

/// Position of the first ERROR or MISSING node, 1-based
fn describe_error(root: Node) -> String {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            let what = if node.is_missing() {
                format!("missing '{}'", node.kind())
            } else {
                "syntax error".to_string()
            };
            return format!("{} at {}:{}", what, pos.row + 1, pos.column + 1);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    "syntax error".to_string()
}
