//! ac-engine CLI entry point

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use ac_engine::cli::{Cli, Commands};
use ac_engine::commands::{
    run_analyze, run_config, run_languages, run_select, run_tokenize, CommandContext,
};
use ac_engine::AnalysisConfig;

fn main() -> ExitCode {
    match run() {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run() -> ac_engine::Result<String> {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    let ctx = CommandContext::from_cli(cli.format, cli.verbose, cli.progress);
    match &cli.command {
        Commands::Analyze(args) => run_analyze(&ctx, args),
        Commands::Select(args) => run_select(&ctx, args),
        Commands::Tokenize(args) => run_tokenize(&ctx, args),
        Commands::Languages => run_languages(&ctx),
        Commands::Config(args) => run_config(&ctx, args),
    }
}

/// Log to stderr so stdout stays machine-readable; RUST_LOG overrides
fn init_logging(verbose: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        AnalysisConfig::load()
            .map(|c| c.logging.level)
            .unwrap_or_else(|_| "info".to_string())
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("ac_engine={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
