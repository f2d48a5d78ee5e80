//! Tokenize command: show one file's canonical stream

use std::fs;

use serde::Serialize;

use crate::cli::{OutputFormat, TokenizeArgs};
use crate::error::{AcError, Result};
use crate::tokenizer::TokenizerRegistry;

use super::{to_json, CommandContext};

#[derive(Debug, Serialize)]
struct TokenizeOutput<'a> {
    file: String,
    tokenizer: &'a str,
    symbols: usize,
    stream: &'a str,
}

/// Run the tokenize command
pub fn run_tokenize(ctx: &CommandContext, args: &TokenizeArgs) -> Result<String> {
    if !args.file.is_file() {
        return Err(AcError::FileNotFound {
            path: args.file.display().to_string(),
        });
    }

    let registry = TokenizerRegistry::builtin();
    let tokenizer = match &args.language {
        Some(name) => registry.for_language(name)?,
        None => registry
            .lookup(&args.file)
            .unwrap_or_else(|| registry.null()),
    };

    let file = args.file.display().to_string();
    let source = fs::read_to_string(&args.file)?;
    let stream = tokenizer
        .tokenize(&source)
        .map_err(|e| e.in_file(&file))?;

    if ctx.verbose {
        eprintln!(
            "{}: {} symbols with the {} tokenizer",
            file,
            stream.len(),
            tokenizer.name()
        );
    }

    match ctx.format {
        OutputFormat::Json => to_json(&TokenizeOutput {
            file,
            tokenizer: tokenizer.name(),
            symbols: stream.len(),
            stream: stream.as_str(),
        }),
        OutputFormat::Text => Ok(format!("{}\n", stream.as_str().trim_end())),
    }
}
