//! Language detection and tree-sitter grammar loading
//!
//! The order of [`Lang::ALL`] is the tokenizer registration order: when two
//! languages tie in the per-corpus vote, the one listed first wins.

use std::path::Path;
use tree_sitter::Language;

use crate::error::{AcError, Result};

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    Java,
    C,
    Cpp,
    JavaScript,
    Python,
    TypeScript,
    Tsx,
    Rust,
    Go,
    CSharp,
    Kotlin,
    Bash,
    Html,
}

impl Lang {
    /// Every language with a registered grammar, in registration order
    pub const ALL: [Lang; 13] = [
        Lang::Java,
        Lang::C,
        Lang::Cpp,
        Lang::JavaScript,
        Lang::Python,
        Lang::TypeScript,
        Lang::Tsx,
        Lang::Rust,
        Lang::Go,
        Lang::CSharp,
        Lang::Kotlin,
        Lang::Bash,
        Lang::Html,
    ];

    /// Detect language from file path extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| AcError::UnsupportedLanguage {
                name: "none".to_string(),
            })?;

        Self::from_extension(ext)
    }

    /// Detect language from file extension string
    pub fn from_extension(ext: &str) -> Result<Self> {
        let ext = ext.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
            .ok_or(AcError::UnsupportedLanguage { name: ext })
    }

    /// Look up a language by its canonical name (as accepted by `--language`)
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.to_lowercase();
        let alias = match lower.as_str() {
            "c++" => "cpp",
            "c#" | "cs" => "csharp",
            "js" => "javascript",
            "ts" => "typescript",
            "py" => "python",
            "sh" => "bash",
            other => other,
        };
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.name() == alias)
            .ok_or_else(|| AcError::UnsupportedLanguage {
                name: name.to_string(),
            })
    }

    /// Get the canonical name of the language
    pub fn name(&self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::CSharp => "csharp",
            Self::Kotlin => "kotlin",
            Self::Bash => "bash",
            Self::Html => "html",
        }
    }

    /// Get the tree-sitter Language for parsing
    pub fn tree_sitter_language(&self) -> Language {
        match self {
            Self::Java => tree_sitter_java::LANGUAGE.into(),
            Self::C => tree_sitter_c::LANGUAGE.into(),
            Self::Cpp => tree_sitter_cpp::LANGUAGE.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::Go => tree_sitter_go::LANGUAGE.into(),
            Self::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
            Self::Kotlin => tree_sitter_kotlin_ng::LANGUAGE.into(),
            Self::Bash => tree_sitter_bash::LANGUAGE.into(),
            Self::Html => tree_sitter_html::LANGUAGE.into(),
        }
    }

    /// Get common file extensions for this language
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Java => &["java"],
            Self::C => &["c", "h"],
            Self::Cpp => &["cpp", "cxx", "cc", "hpp", "hxx", "hh"],
            Self::JavaScript => &["js", "mjs", "cjs", "jsx"],
            Self::Python => &["py"],
            Self::TypeScript => &["ts", "mts", "cts"],
            Self::Tsx => &["tsx"],
            Self::Rust => &["rs"],
            Self::Go => &["go"],
            Self::CSharp => &["cs"],
            Self::Kotlin => &["kt", "kts"],
            Self::Bash => &["sh", "bash"],
            Self::Html => &["html", "htm"],
        }
    }

    /// Regex alternation over [`Self::extensions`], used as the registry pattern
    pub fn extension_pattern(&self) -> String {
        format!("({})", self.extensions().join("|"))
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
