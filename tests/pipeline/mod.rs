//! Pipeline tests: corpus on disk through the analysis report

pub mod analysis_tests;
pub mod corpus_tests;
pub mod fragment_tests;
