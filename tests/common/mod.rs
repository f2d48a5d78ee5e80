//! Common test utilities and fixtures for ac-engine integration tests
//!
//! This module provides:
//! - `TestCorpus` builder for creating assignment corpora on disk
//! - Sample submissions (original, renamed copy, unrelated program)
//! - Custom assertions for validating CLI output

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod assertions;
pub mod test_corpus;

pub use assertions::*;
pub use test_corpus::{samples, TestCorpus};
