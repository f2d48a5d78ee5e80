//! Analyze command implementation

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::analysis::Analyzer;
use crate::cli::{AnalyzeArgs, OutputFormat};
use crate::config::AnalysisConfig;
use crate::corpus::CorpusLoader;
use crate::error::Result;
use crate::report::format_report;

use super::{filter_from_tokens, to_json, CommandContext};

/// Run the analyze command
pub fn run_analyze(ctx: &CommandContext, args: &AnalyzeArgs) -> Result<String> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load_from(path)?,
        None => AnalysisConfig::load()?,
    };
    args.apply_to(&mut config);
    config.validate()?;

    let filter = filter_from_tokens(&args.filter)?;
    info!("File filter: {}", filter);
    let corpus = CorpusLoader::new().with_filter(filter).load(&args.dir)?;

    let mut analyzer = Analyzer::new(config);
    let bar = if ctx.progress {
        let n = corpus.len();
        let bar = ProgressBar::new((n * n.saturating_sub(1) / 2) as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos}/{len} pairs ({eta})")
        {
            bar.set_style(style);
        }
        let handle = bar.clone();
        analyzer = analyzer.with_progress(Arc::new(move |done, _| {
            handle.set_position(done as u64);
        }));
        Some(bar)
    } else {
        None
    };

    let report = analyzer.run(&corpus)?;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    match ctx.format {
        OutputFormat::Json => to_json(&report.truncated(args.top)),
        OutputFormat::Text => Ok(format_report(&report, args.top)),
    }
}
