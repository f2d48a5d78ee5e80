//! Tests for the `tokenize` CLI command

use crate::common::{assert_contains, assert_valid_json, samples, TestCorpus};

#[test]
fn test_renamed_sources_tokenize_identically() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();

    let alice = corpus.run_cli_success(&["tokenize", "alice/src/Sorter.java"]);
    let bob = corpus.run_cli_success(&["tokenize", "bob/Ordering.java"]);
    let carol = corpus.run_cli_success(&["tokenize", "carol/WordCount.java"]);

    assert!(!alice.trim().is_empty());
    assert_eq!(alice, bob);
    assert_ne!(alice, carol);
}

#[test]
fn test_tokenize_json_and_forced_language() {
    let corpus = TestCorpus::new();
    corpus.add_file("notes.txt", "a   b\n\tc");

    let output = corpus.run_cli_success(&["tokenize", "notes.txt", "-f", "json"]);
    let json = assert_valid_json(&output, "tokenize json");
    assert_eq!(json["tokenizer"], "null");
    assert_eq!(json["stream"], "a b c");

    corpus.add_file("script.txt", "def f():\n    return 1\n");
    let output = corpus.run_cli_success(&[
        "tokenize",
        "script.txt",
        "--language",
        "python",
        "-f",
        "json",
    ]);
    let json = assert_valid_json(&output, "tokenize python");
    assert_eq!(json["tokenizer"], "python");
}

#[test]
fn test_tokenize_errors() {
    let corpus = TestCorpus::new();
    corpus.add_file("Broken.java", samples::BROKEN);

    let (code, stderr) = corpus.run_cli_failure(&["tokenize", "Broken.java"]);
    assert_eq!(code, Some(3));
    assert_contains(&stderr, "Failed to tokenize Broken.java");

    let (code, _) = corpus.run_cli_failure(&["tokenize", "missing.java"]);
    assert_eq!(code, Some(1));

    let (code, _) = corpus.run_cli_failure(&["tokenize", "Broken.java", "-l", "cobol"]);
    assert_eq!(code, Some(2));
}
