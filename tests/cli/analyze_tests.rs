//! Tests for the `analyze` CLI command

use crate::common::{
    assert_contains, assert_not_contains, assert_valid_json, json_pairs, samples, TestCorpus,
};

// ============================================================================
// OUTPUT FORMATS
// ============================================================================

#[test]
fn test_analyze_text_report() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();

    let output = corpus.run_cli_success(&["analyze", "."]);
    assert_contains(&output, "SUBMISSION SIMILARITY REPORT");
    assert_contains(&output, "alice ↔ bob");
    assert_contains(&output, "Tokenizer:         java");
}

#[test]
fn test_analyze_json_report() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();

    let output = corpus.run_cli_success(&["analyze", ".", "-f", "json"]);
    let json = assert_valid_json(&output, "analyze json");

    let pairs = json_pairs(&json);
    assert_eq!(pairs.len(), 3);
    assert_eq!(pairs[0], ("alice".to_string(), "bob".to_string(), 0.0));
    assert_eq!(json["complete"], true);
    assert_eq!(json["submissions"], 3);
    assert_eq!(json["tokenizer"]["tokenizer"], "java");
}

#[test]
fn test_analyze_top_limits_pairs() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();

    let output = corpus.run_cli_success(&["analyze", ".", "--top", "1", "-f", "json"]);
    let json = assert_valid_json(&output, "analyze top");
    assert_eq!(json_pairs(&json).len(), 1);

    let text = corpus.run_cli_success(&["analyze", ".", "-n", "1"]);
    assert_contains(&text, "2 more pairs");
}

// ============================================================================
// OPTIONS
// ============================================================================

#[test]
fn test_analyze_with_filter() {
    let corpus = TestCorpus::new();
    corpus
        .with_sorting_assignment()
        .add_submission("bob", "OrderingTest.java", samples::WORD_COUNT);

    // Without the filter bob's test file makes him look less like alice
    let output = corpus.run_cli_success(&["analyze", ".", "--filter", "NOT", "Test", "-f", "json"]);
    let json = assert_valid_json(&output, "analyze filter");
    assert_eq!(json_pairs(&json)[0].2, 0.0);
}

#[test]
fn test_analyze_compressor_and_input() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();

    let output = corpus.run_cli_success(&[
        "analyze",
        ".",
        "--compressor",
        "zstd",
        "--input",
        "raw-collapsed",
        "-f",
        "json",
    ]);
    let json = assert_valid_json(&output, "analyze zstd");
    assert_eq!(json["compressor"], "zstd");
    assert_eq!(json["input"], "raw_collapsed");
}

#[test]
fn test_analyze_fragments() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();

    let output = corpus.run_cli_success(&[
        "analyze",
        ".",
        "--fragments",
        "--fragment-source",
        "canonical",
        "-f",
        "json",
    ]);
    let json = assert_valid_json(&output, "analyze fragments");
    let fragments = json["fragments"].as_array().unwrap();
    assert!(!fragments.is_empty());
    assert_eq!(fragments[0]["submissions"][0], "alice");
    assert_eq!(fragments[0]["submissions"][1], "bob");
}

#[test]
fn test_analyze_reports_duplicates_and_warnings() {
    let corpus = TestCorpus::new();
    corpus
        .with_sorting_assignment()
        .add_file("dave.java", samples::SORTER)
        .add_submission("carol", "Broken.java", samples::BROKEN);

    let output = corpus.run_cli_success(&["analyze", "."]);
    assert_contains(&output, "EXACT DUPLICATES");
    assert_contains(&output, "dave = alice");
    assert_contains(&output, "carol/Broken.java");
}

#[test]
fn test_analyze_config_file() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();
    // Hidden, so the loader does not treat it as a submission
    corpus.add_file(".ac.toml", "[ncd]\ncompressor = \"lz4\"\n");

    let output = corpus.run_cli_success(&["analyze", ".", "--config", ".ac.toml", "-f", "json"]);
    let json = assert_valid_json(&output, "analyze config");
    assert_eq!(json["compressor"], "lz4");
}

#[test]
fn test_analyze_score_options() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();

    let output = corpus.run_cli_success(&["analyze", ".", "-f", "json"]);
    let json = assert_valid_json(&output, "analyze scores");
    for pair in json["distances"].as_array().unwrap() {
        let distance = pair["distance"].as_f64().unwrap();
        let adjusted = pair["adjusted_distance"].as_f64().unwrap();
        assert!(adjusted <= distance + 1e-12);
    }

    let output = corpus.run_cli_success(&[
        "analyze",
        ".",
        "--outlier-importance",
        "0",
        "--no-comments",
        "-f",
        "json",
    ]);
    let json = assert_valid_json(&output, "analyze plain scores");
    for pair in json["distances"].as_array().unwrap() {
        assert_eq!(pair["adjusted_distance"], pair["distance"]);
        assert!(pair.get("comment_distance").is_none());
    }

    let text = corpus.run_cli_success(&["analyze", "."]);
    assert_contains(&text, "Distance  Adjusted  Tokens  Comments");
}

#[test]
fn test_analyze_keeps_latest_version() {
    let corpus = TestCorpus::new();
    corpus
        .add_submission("alice", "Sort_v1.java", samples::WORD_COUNT)
        .add_submission("alice", "Sort_v2.java", samples::SORTER)
        .add_submission("bob", "Ordering.java", samples::SORTER_RENAMED)
        .add_submission("carol", "WordCount.java", samples::WORD_COUNT);

    let output = corpus.run_cli_success(&[
        "analyze",
        ".",
        "--filter",
        "AND",
        "v:^Sort_v",
        "-f",
        "json",
    ]);
    let json = assert_valid_json(&output, "analyze latest version");
    assert_eq!(
        json_pairs(&json)[0],
        ("alice".to_string(), "bob".to_string(), 0.0)
    );

    let listed = corpus.run_cli_success(&["select", ".", "--filter", "AND", "v:^Sort_v"]);
    assert_contains(&listed, "Sort_v2.java");
    assert_not_contains(&listed, "Sort_v1.java");
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn test_analyze_missing_dir() {
    let corpus = TestCorpus::new();
    let (code, stderr) = corpus.run_cli_failure(&["analyze", "no-such-dir"]);
    assert_eq!(code, Some(1));
    assert_contains(&stderr, "Error: File not found");
}

#[test]
fn test_analyze_bad_filter() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();

    let (code, stderr) = corpus.run_cli_failure(&["analyze", ".", "--filter", "END"]);
    assert_eq!(code, Some(4));
    assert_contains(&stderr, "Filter syntax error");

    let (code, stderr) = corpus.run_cli_failure(&["analyze", ".", "--filter", "AND", "x:foo"]);
    assert_eq!(code, Some(4));
    assert_contains(&stderr, "x:");
}

#[test]
fn test_analyze_unknown_language() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();

    let (code, stderr) = corpus.run_cli_failure(&["analyze", ".", "--language", "cobol"]);
    assert_eq!(code, Some(2));
    assert_contains(&stderr, "Unsupported language: cobol");
}

#[test]
fn test_analyze_rejects_out_of_range_importance() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();

    let (code, stderr) = corpus.run_cli_failure(&["analyze", ".", "--outlier-importance", "1.5"]);
    assert_eq!(code, Some(2));
    assert_contains(&stderr, "outlier_importance");
}

#[test]
fn test_analyze_no_fallback() {
    let corpus = TestCorpus::new();
    corpus
        .add_submission("a", "essay.txt", "one two three")
        .add_submission("b", "essay.txt", "four five six");

    let output = corpus.run_cli_success(&["analyze", "."]);
    assert_contains(&output, "null (fallback)");

    let (code, _) = corpus.run_cli_failure(&["analyze", ".", "--no-fallback"]);
    assert_eq!(code, Some(2));
}

#[test]
fn test_progress_bar_does_not_touch_stdout() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();

    let output = corpus.run_cli_success(&["analyze", ".", "--progress", "-f", "json"]);
    assert_valid_json(&output, "analyze progress");
    assert_not_contains(&output, "pairs (");
}
