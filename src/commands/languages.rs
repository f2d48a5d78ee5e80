//! Languages command: list the tokenizer registry

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::tokenizer::TokenizerRegistry;

use super::{to_json, CommandContext};

#[derive(Debug, Serialize)]
struct LanguageEntry<'a> {
    tokenizer: &'a str,
    pattern: &'a str,
}

/// Run the languages command
pub fn run_languages(ctx: &CommandContext) -> Result<String> {
    let registry = TokenizerRegistry::builtin();
    let entries: Vec<LanguageEntry<'_>> = registry
        .entries()
        .map(|(pattern, tokenizer)| LanguageEntry { tokenizer, pattern })
        .collect();

    match ctx.format {
        OutputFormat::Json => to_json(&entries),
        OutputFormat::Text => {
            let mut text = String::new();
            for e in &entries {
                text.push_str(&format!("{:<12} {}\n", e.tokenizer, e.pattern));
            }
            text.push_str(&format!("{:<12} (fallback for anything else)\n", "null"));
            Ok(text)
        }
    }
}
