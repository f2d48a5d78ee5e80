//! CLI command integration tests
//!
//! Each module runs the built `ac-engine` binary against a temporary corpus
//! and checks stdout, stderr and the exit code.

pub mod analyze_tests;
pub mod config_tests;
pub mod select_tests;
pub mod tokenize_tests;
