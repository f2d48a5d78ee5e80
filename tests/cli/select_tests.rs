//! Tests for the `select` and `languages` CLI commands

use crate::common::{assert_contains, assert_not_contains, assert_valid_json, TestCorpus};

#[test]
fn test_select_previews_filter() {
    let corpus = TestCorpus::new();
    corpus
        .with_sorting_assignment()
        .add_submission("alice", "test/SorterTest.java", "class SorterTest {}")
        .add_submission("bob", "notes.txt", "remember to rename things");

    let output = corpus.run_cli_success(&[
        "select", ".", "--filter", "AND", "e:java", "NOT", "Test",
    ]);
    assert_contains(&output, "filter: AND [");
    assert_contains(&output, "src/Sorter.java");
    assert_contains(&output, "Ordering.java");
    assert_not_contains(&output, "SorterTest.java");
    assert_not_contains(&output, "notes.txt");
}

#[test]
fn test_select_json() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();

    let output = corpus.run_cli_success(&["select", ".", "-f", "json"]);
    let json = assert_valid_json(&output, "select json");
    let submissions = json["submissions"].as_array().unwrap();
    assert_eq!(submissions.len(), 3);
    assert_eq!(submissions[0]["submission"], "alice");
    assert_eq!(submissions[0]["files"][0], "src/Sorter.java");
}

#[test]
fn test_select_names_submissions_like_analyze() {
    let corpus = TestCorpus::new();
    corpus
        .with_sorting_assignment()
        .add_file("dave.java", "class Dave {}")
        .add_file("carol.java", "class CarolToo {}");

    let output = corpus.run_cli_success(&["select", ".", "-f", "json"]);
    let json = assert_valid_json(&output, "select names");
    let ids: Vec<&str> = json["submissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["submission"].as_str().unwrap())
        .collect();
    // carol.java collides with the carol directory and keeps its full name
    assert_eq!(ids, vec!["alice", "bob", "carol", "carol.java", "dave"]);

    let report = corpus.run_cli_success(&["analyze", ".", "-f", "json"]);
    let report = assert_valid_json(&report, "analyze names");
    assert_eq!(report["submissions"], 5);
}

#[test]
fn test_languages_lists_registry() {
    let corpus = TestCorpus::new();
    let output = corpus.run_cli_success(&["languages"]);
    assert_contains(&output, "java");
    assert_contains(&output, "(c|h)");
    assert_contains(&output, "null");

    let json = assert_valid_json(
        &corpus.run_cli_success(&["languages", "-f", "json"]),
        "languages json",
    );
    assert_eq!(json[0]["tokenizer"], "java");
    assert_eq!(json[0]["pattern"], "(java)");
}
