//! Config command implementation

use std::path::PathBuf;

use crate::cli::{ConfigArgs, ConfigOperation, OutputFormat};
use crate::config::AnalysisConfig;
use crate::error::{AcError, Result};

use super::{to_json, CommandContext};

/// Run the config command
pub fn run_config(ctx: &CommandContext, args: &ConfigArgs) -> Result<String> {
    let path = config_path(args)?;
    let mut config = AnalysisConfig::load_from(&path)?;

    match &args.operation {
        ConfigOperation::Show => match ctx.format {
            OutputFormat::Json => to_json(&config),
            OutputFormat::Text => Ok(format!("# {}\n{}", path.display(), config.display())),
        },
        ConfigOperation::Get { key } => match config.get(key) {
            Some(value) => Ok(format!("{}\n", value)),
            None if is_known_key(key) => Ok("\n".to_string()),
            None => Err(AcError::Config {
                message: format!("Unknown configuration key: {}", key),
            }),
        },
        ConfigOperation::Set { key, value } => {
            config.set(key, value)?;
            config.save_to(&path)?;
            Ok(format!("Set {} = {}\n", key, value))
        }
        ConfigOperation::Reset => {
            AnalysisConfig::default().save_to(&path)?;
            Ok("Configuration reset to defaults\n".to_string())
        }
    }
}

fn config_path(args: &ConfigArgs) -> Result<PathBuf> {
    match &args.file {
        Some(path) => Ok(path.clone()),
        None => AnalysisConfig::default_path().ok_or_else(|| AcError::Config {
            message: "no platform config directory; pass --file".to_string(),
        }),
    }
}

/// Keys whose value may legitimately be unset
fn is_known_key(key: &str) -> bool {
    matches!(key, "tokenizer.language" | "ncd.level")
}
