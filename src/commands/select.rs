//! Select command: preview what a filter keeps

use serde::Serialize;

use crate::cli::{OutputFormat, SelectArgs};
use crate::corpus::CorpusLoader;
use crate::error::{AcError, Result};

use super::{filter_from_tokens, to_json, CommandContext};

#[derive(Debug, Serialize)]
struct SelectedSubmission {
    submission: String,
    files: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SelectOutput {
    filter: String,
    submissions: Vec<SelectedSubmission>,
}

/// Run the select command
pub fn run_select(ctx: &CommandContext, args: &SelectArgs) -> Result<String> {
    if !args.dir.is_dir() {
        return Err(AcError::FileNotFound {
            path: args.dir.display().to_string(),
        });
    }

    let filter = filter_from_tokens(&args.filter)?;
    let description = filter.to_string();
    let loader = CorpusLoader::new().with_filter(filter);

    let submissions: Vec<SelectedSubmission> = CorpusLoader::submission_entries(&args.dir)?
        .into_iter()
        .map(|(submission, entry)| SelectedSubmission {
            files: loader.preview(&entry),
            submission,
        })
        .collect();

    let output = SelectOutput {
        filter: description,
        submissions,
    };

    match ctx.format {
        OutputFormat::Json => to_json(&output),
        OutputFormat::Text => {
            let mut text = format!("filter: {}\n", output.filter);
            for s in &output.submissions {
                text.push_str(&format!("\n{} ({} files)\n", s.submission, s.files.len()));
                for f in &s.files {
                    text.push_str(&format!("  {}\n", f));
                }
            }
            Ok(text)
        }
    }
}
