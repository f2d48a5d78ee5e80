//! End-to-end analysis over corpora loaded from disk

use ac_engine::config::NcdInput;
use ac_engine::{AnalysisConfig, Analyzer, CompressorKind, CorpusLoader};

use crate::common::{samples, TestCorpus};

fn analyze(corpus: &TestCorpus, config: AnalysisConfig) -> ac_engine::AnalysisReport {
    let loaded = CorpusLoader::new().load(corpus.path()).unwrap();
    Analyzer::new(config).run(&loaded).unwrap()
}

#[test]
fn test_renamed_copy_ranks_first() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();

    let report = analyze(&corpus, AnalysisConfig::default());
    assert!(report.complete);
    assert_eq!(report.submissions, 3);
    assert_eq!(report.tokenizer.tokenizer, "java");
    assert_eq!(report.distances.len(), 3);

    let first = &report.distances[0];
    assert_eq!((first.a.as_str(), first.b.as_str()), ("alice", "bob"));
    assert_eq!(first.distance, 0.0);
    assert!(report.distances[1].distance > 0.1);
}

#[test]
fn test_distances_are_bounded_and_sorted_for_every_compressor() {
    let corpus = TestCorpus::new();
    corpus
        .with_sorting_assignment()
        .add_submission("dave", "Tally.java", &samples::WORD_COUNT.replace("count", "tally"));

    for compressor in [CompressorKind::Deflate, CompressorKind::Zstd, CompressorKind::Lz4] {
        let mut config = AnalysisConfig::default();
        config.ncd.compressor = compressor;
        let report = analyze(&corpus, config);

        assert_eq!(report.compressor, compressor.name());
        assert_eq!(report.distances.len(), 6);
        for pair in &report.distances {
            assert!(
                (0.0..=1.0).contains(&pair.distance),
                "{:?} out of range with {}",
                pair,
                compressor.name()
            );
            assert!((0.0..=1.0).contains(&pair.token_distance));
            assert!(pair.a < pair.b, "pairs keep input order");
        }
        assert!(report
            .distances
            .windows(2)
            .all(|w| w[0].distance <= w[1].distance));
    }
}

#[test]
fn test_raw_input_sees_renaming() {
    let corpus = TestCorpus::new();
    corpus.with_sorting_assignment();

    let mut config = AnalysisConfig::default();
    config.ncd.input = NcdInput::Raw;
    let report = analyze(&corpus, config);

    assert_eq!(report.input, "raw");
    // Without tokenization the renamed copy is no longer identical
    let pair = report
        .distances
        .iter()
        .find(|p| p.a == "alice" && p.b == "bob")
        .unwrap();
    assert!(pair.distance > 0.0);
}

#[test]
fn test_unparseable_file_is_a_warning_not_a_failure() {
    let corpus = TestCorpus::new();
    corpus
        .with_sorting_assignment()
        .add_submission("bob", "Broken.java", samples::BROKEN);

    let report = analyze(&corpus, AnalysisConfig::default());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].submission, "bob");
    assert_eq!(report.warnings[0].path, "Broken.java");
    assert!(report.warnings[0].message.contains("Broken.java"));

    // bob's remaining file still matches alice exactly
    assert_eq!(report.distances[0].distance, 0.0);
}

#[test]
fn test_submission_without_tokenizable_files_is_left_out() {
    let corpus = TestCorpus::new();
    corpus
        .with_sorting_assignment()
        .add_submission("erin", "Broken.java", samples::BROKEN);

    let report = analyze(&corpus, AnalysisConfig::default());
    assert_eq!(report.submissions, 3);
    assert_eq!(report.distances.len(), 3);
    assert!(report.distances.iter().all(|p| p.a != "erin" && p.b != "erin"));
}

#[test]
fn test_single_submission_has_no_pairs() {
    let corpus = TestCorpus::new();
    corpus.add_submission("alice", "Sorter.java", samples::SORTER);

    let report = analyze(&corpus, AnalysisConfig::default());
    assert!(report.complete);
    assert!(report.distances.is_empty());
}
