//! Tests for the `config` CLI command

use crate::common::{assert_contains, assert_valid_json, TestCorpus};

#[test]
fn test_config_set_get_roundtrip() {
    let corpus = TestCorpus::new();
    let file = corpus.path().join("settings.toml");
    let file = file.to_string_lossy().to_string();

    let output =
        corpus.run_cli_success(&["config", "--file", &file, "set", "ncd.compressor", "zstd"]);
    assert_contains(&output, "Set ncd.compressor = zstd");

    let output = corpus.run_cli_success(&["config", "--file", &file, "get", "ncd.compressor"]);
    assert_eq!(output.trim(), "zstd");

    let output = corpus.run_cli_success(&["config", "--file", &file, "show", "-f", "json"]);
    let json = assert_valid_json(&output, "config show");
    assert_eq!(json["ncd"]["compressor"], "zstd");

    corpus.run_cli_success(&["config", "--file", &file, "reset"]);
    let output = corpus.run_cli_success(&["config", "--file", &file, "get", "ncd.compressor"]);
    assert_eq!(output.trim(), "deflate");
}

#[test]
fn test_config_rejects_invalid_values() {
    let corpus = TestCorpus::new();
    let file = corpus.path().join("settings.toml");
    let file = file.to_string_lossy().to_string();

    let (code, stderr) =
        corpus.run_cli_failure(&["config", "--file", &file, "set", "logging.level", "loud"]);
    assert_eq!(code, Some(2));
    assert_contains(&stderr, "Invalid log level");

    let (code, _) = corpus.run_cli_failure(&["config", "--file", &file, "get", "no.such.key"]);
    assert_eq!(code, Some(2));
}
