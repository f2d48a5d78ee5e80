//! TestCorpus builder for integration testing
//!
//! A corpus is a temporary directory whose first-level entries are
//! submissions, exactly as `ac-engine analyze` expects.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Sample programs used across tests
pub mod samples {
    /// Bubble sort, the "original" submission
    pub const SORTER: &str = r#"
public class Sorter {
    // Sorts in place
    public static void sort(int[] values) {
        for (int i = 0; i < values.length; i++) {
            for (int j = i + 1; j < values.length; j++) {
                if (values[j] < values[i]) {
                    int tmp = values[i];
                    values[i] = values[j];
                    values[j] = tmp;
                }
            }
        }
    }

    public static int max(int[] values) {
        int best = values[0];
        for (int v : values) {
            if (v > best) {
                best = v;
            }
        }
        return best;
    }
}
"#;

    /// SORTER with every identifier renamed, comments dropped and the
    /// layout changed
    pub const SORTER_RENAMED: &str = r#"
public class Ordering {
  public static void arrange(int[] xs) {
    for (int a = 0; a < xs.length; a++) { for (int b = a + 1; b < xs.length; b++) {
        if (xs[b] < xs[a]) { int t = xs[a]; xs[a] = xs[b]; xs[b] = t; }
    } }
  }
  /** largest element */
  public static int largest(int[] xs) { int top = xs[0];
    for (int x : xs) { if (x > top) { top = x; } }
    return top; }
}
"#;

    /// An unrelated program
    pub const WORD_COUNT: &str = r#"
import java.util.HashMap;
import java.util.Map;

public class WordCount {
    public Map<String, Integer> count(String text) {
        Map<String, Integer> counts = new HashMap<>();
        for (String word : text.split(" ")) {
            if (!word.isEmpty()) {
                counts.merge(word.toLowerCase(), 1, Integer::sum);
            }
        }
        return counts;
    }

    public static void main(String[] args) {
        System.out.println(new WordCount().count("a b a"));
    }
}
"#;

    /// A Java file that does not parse
    pub const BROKEN: &str = "public class Broken { void f( { return; }";
}

/// Builder for creating corpus directory structures
pub struct TestCorpus {
    dir: TempDir,
}

impl TestCorpus {
    /// Create a new empty corpus
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Get the path to the corpus root
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get path as string
    pub fn path_str(&self) -> String {
        self.dir.path().to_string_lossy().to_string()
    }

    /// Add a file with the given content
    pub fn add_file(&self, relative_path: &str, content: &str) -> &Self {
        self.add_bytes(relative_path, content.as_bytes())
    }

    /// Add a file with arbitrary bytes
    pub fn add_bytes(&self, relative_path: &str, content: &[u8]) -> &Self {
        let full_path = self.dir.path().join(relative_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        self
    }

    /// Add a directory submission with one file
    pub fn add_submission(&self, id: &str, file: &str, content: &str) -> &Self {
        self.add_file(&format!("{}/{}", id, file), content)
    }

    // ========================================================================
    // PRE-BUILT CORPORA
    // ========================================================================

    /// alice wrote SORTER, bob renamed it, carol wrote something else
    pub fn with_sorting_assignment(&self) -> &Self {
        self.add_submission("alice", "src/Sorter.java", samples::SORTER)
            .add_submission("bob", "Ordering.java", samples::SORTER_RENAMED)
            .add_submission("carol", "WordCount.java", samples::WORD_COUNT)
    }

    // ========================================================================
    // CLI
    // ========================================================================

    /// Run the ac-engine binary inside the corpus and return output
    pub fn run_cli(&self, args: &[&str]) -> std::io::Result<Output> {
        let binary = PathBuf::from(env!("CARGO_BIN_EXE_ac-engine"));

        Command::new(&binary)
            .current_dir(self.path())
            .env("RUST_LOG", "ac_engine=warn")
            // Keep a developer's own config file out of the run
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .args(args)
            .output()
    }

    /// Run CLI and expect success, return stdout
    pub fn run_cli_success(&self, args: &[&str]) -> String {
        let output = self.run_cli(args).expect("Failed to run CLI");
        assert!(
            output.status.success(),
            "CLI command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run CLI and expect failure, return (exit code, stderr)
    pub fn run_cli_failure(&self, args: &[&str]) -> (Option<i32>, String) {
        let output = self.run_cli(args).expect("Failed to run CLI");
        assert!(
            !output.status.success(),
            "CLI command {:?} should have failed",
            args
        );
        (
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).to_string(),
        )
    }
}

impl Default for TestCorpus {
    fn default() -> Self {
        Self::new()
    }
}
