//! Rare fragment search through the full pipeline

use ac_engine::config::FragmentSource;
use ac_engine::{AnalysisConfig, Analyzer, CorpusLoader};

use crate::common::{samples, TestCorpus};

/// `max` from SORTER, pasted with different indentation
const PASTED_MAX: &str = "
  public static int max(int[] values) {
      int best = values[0];
      for (int v : values) {
          if (v > best) {
              best = v;
          }
      }
      return best;
  }
";

fn corpus_with_pasted_method() -> (TestCorpus, String) {
    let bob = samples::WORD_COUNT.replace(
        "\n    public static void main",
        &format!("{}\n    public static void main", PASTED_MAX),
    );
    let corpus = TestCorpus::new();
    corpus
        .add_submission("alice", "Sorter.java", samples::SORTER)
        .add_submission("bob", "WordCount.java", &bob)
        .add_submission(
            "carol",
            "Adder.java",
            "class Adder { int add(int a, int b) { return a + b; } }\n",
        );
    (corpus, bob)
}

fn fragment_config() -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.fragments.enabled = true;
    config.fragments.min_len = 40;
    config.fragments.max_len = 200;
    config
}

#[test]
fn test_pasted_method_is_found_and_mapped_back() {
    let (corpus, bob) = corpus_with_pasted_method();
    let loaded = CorpusLoader::new().load(corpus.path()).unwrap();
    let report = Analyzer::new(fragment_config()).run(&loaded).unwrap();

    let fragment = &report.fragments[0];
    assert!(
        fragment
            .text
            .contains("public static int max(int[] values) { int best = values[0];"),
        "longest fragment was {:?}",
        fragment.text
    );
    assert!(fragment.text.contains("return best; }"));
    assert_eq!(fragment.submissions, vec!["alice", "bob"]);
    assert_eq!(fragment.occurrences.len(), 2);

    for occ in &fragment.occurrences {
        let source = if occ.submission == "alice" {
            samples::SORTER
        } else {
            bob.as_str()
        };
        let slice = &source[occ.start..occ.end];
        assert!(slice.contains("public static int max(int[] values) {"));
        assert!(slice.contains("return best;"));
        assert!(!slice.starts_with(char::is_whitespace));
        assert!(!slice.ends_with(char::is_whitespace));

        let line = occ.line.expect("normalized fragments carry a line");
        assert_eq!(line, source[..occ.start].matches('\n').count() + 1);
    }

    // suffixes of the longest fragment are not reported separately
    assert!(report.fragments[1..]
        .iter()
        .all(|f| !fragment.text.contains(&f.text)));
}

#[test]
fn test_fragment_limits() {
    let (corpus, _) = corpus_with_pasted_method();
    let loaded = CorpusLoader::new().load(corpus.path()).unwrap();

    let mut config = fragment_config();
    config.fragments.max_reported = 1;
    let report = Analyzer::new(config).run(&loaded).unwrap();
    assert_eq!(report.fragments.len(), 1);

    let mut config = fragment_config();
    config.fragments.min_len = 500;
    config.fragments.max_len = 500;
    let report = Analyzer::new(config).run(&loaded).unwrap();
    assert!(report.fragments.is_empty());
}

#[test]
fn test_canonical_fragments_ignore_renaming() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();
    let loaded = CorpusLoader::new().load(corpus.path()).unwrap();

    let mut config = fragment_config();
    config.fragments.source = FragmentSource::Canonical;
    config.fragments.min_len = 20;
    config.fragments.max_len = 60;
    config.fragments.max_reported = 5;
    let report = Analyzer::new(config).run(&loaded).unwrap();

    assert!(!report.fragments.is_empty());
    assert!(report.fragments.len() <= 5);
    for fragment in &report.fragments {
        assert_eq!(fragment.submissions, vec!["alice", "bob"]);
        assert!(fragment.occurrences.iter().all(|o| o.line.is_none()));
    }
}

#[test]
fn test_fragments_disabled_by_default() {
    let (corpus, _) = corpus_with_pasted_method();
    let loaded = CorpusLoader::new().load(corpus.path()).unwrap();
    let report = Analyzer::new(AnalysisConfig::default()).run(&loaded).unwrap();
    assert!(report.fragments.is_empty());
}
