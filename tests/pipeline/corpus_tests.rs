//! Corpus loading and tokenizer selection against real directories

use ac_engine::tokenizer::TokenizerSelector;
use ac_engine::{parse_filter, AcError, CorpusLoader, TokenizerRegistry};

use crate::common::{samples, TestCorpus};

#[test]
fn test_submissions_are_first_level_entries() {
    let corpus = TestCorpus::new();
    corpus
        .with_sorting_assignment()
        .add_file("dave.java", samples::SORTER)
        .add_file(".hidden/Secret.java", samples::WORD_COUNT);

    let loaded = CorpusLoader::new().load(corpus.path()).unwrap();
    let ids: Vec<&str> = loaded.submissions.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["alice", "bob", "carol"]);

    // dave.java has the same bytes as alice's only file
    assert_eq!(loaded.duplicates.len(), 1);
    assert_eq!(loaded.duplicates[0].kept, "alice");
    assert_eq!(loaded.duplicates[0].dropped, "dave");
}

#[test]
fn test_filter_applies_to_every_submission() {
    let corpus = TestCorpus::new();
    corpus
        .with_sorting_assignment()
        .add_submission("alice", "test/SorterTest.java", "class SorterTest {}")
        .add_submission("bob", "README.md", "# bob's sorter")
        .add_submission("carol", "lib/helper.java", "class Helper {}");

    let filter = parse_filter(&["AND", "e:^java$", "NOT", "Test", "NOT", "p:^lib/"]).unwrap();
    let loaded = CorpusLoader::new().with_filter(filter).load(corpus.path()).unwrap();

    assert_eq!(loaded.file_count(), 3);
    for submission in &loaded.submissions {
        assert_eq!(submission.files.len(), 1, "{}", submission.id);
    }
}

#[test]
fn test_content_filter() {
    let corpus = TestCorpus::new();
    corpus
        .with_sorting_assignment()
        .add_submission("alice", "Notes.java", "// scratch, no main here");

    let filter = parse_filter(&["AND", "c:static\\s+void\\s+main"]).unwrap();
    let loaded = CorpusLoader::new().with_filter(filter).load(corpus.path()).unwrap();

    // only carol has a main method; the others end up empty and are skipped
    let ids: Vec<&str> = loaded.submissions.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["carol"]);
}

#[test]
fn test_binary_files_are_reported_as_skipped() {
    let corpus = TestCorpus::new();
    corpus
        .with_sorting_assignment()
        .add_bytes("bob/classes/Ordering.class", &[0xca, 0xfe, 0xba, 0xbe, 0x00, 0xff]);

    let loaded = CorpusLoader::new().load(corpus.path()).unwrap();
    assert_eq!(loaded.skipped.len(), 1);
    assert_eq!(loaded.skipped[0].submission, "bob");
    assert_eq!(loaded.skipped[0].path, "classes/Ordering.class");
}

#[test]
fn test_majority_vote_picks_python() {
    let corpus = TestCorpus::new();
    corpus
        .add_submission("a", "main.py", "print('a')\n")
        .add_submission("a", "util.py", "def f():\n    return 1\n")
        .add_submission("b", "main.py", "print('b')\n")
        .add_submission("b", "Helper.java", "class Helper {}");

    let loaded = CorpusLoader::new().load(corpus.path()).unwrap();
    let registry = TokenizerRegistry::builtin();
    let selection = TokenizerSelector::new(&registry)
        .choose(&loaded.submissions)
        .unwrap();

    assert_eq!(selection.tokenizer.name(), "python");
    assert!(!selection.is_fallback);
    assert_eq!(
        selection.votes,
        vec![("java".to_string(), 1), ("python".to_string(), 3)]
    );
}

#[test]
fn test_unknown_extensions_fall_back_or_fail() {
    let corpus = TestCorpus::new();
    corpus
        .add_submission("a", "essay.txt", "it was a dark and stormy night")
        .add_submission("b", "essay.txt", "it was a bright and sunny day");

    let loaded = CorpusLoader::new().load(corpus.path()).unwrap();
    let registry = TokenizerRegistry::builtin();

    let selection = TokenizerSelector::new(&registry)
        .choose(&loaded.submissions)
        .unwrap();
    assert!(selection.is_fallback);
    assert_eq!(selection.tokenizer.name(), "null");

    let err = TokenizerSelector::new(&registry)
        .with_fallback(false)
        .choose(&loaded.submissions)
        .unwrap_err();
    assert!(matches!(err, AcError::Config { .. }));
}
