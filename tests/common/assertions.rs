//! Custom assertions for integration tests

use serde_json::Value;

/// Assert that output is valid JSON and return parsed value
pub fn assert_valid_json(output: &str, context: &str) -> Value {
    serde_json::from_str(output).unwrap_or_else(|e| {
        panic!(
            "Expected valid JSON ({}): {}\nOutput:\n{}",
            context, e, output
        )
    })
}

/// Assert that output contains a substring
pub fn assert_contains(output: &str, needle: &str) {
    assert!(
        output.contains(needle),
        "Expected output to contain '{}'\nOutput:\n{}",
        needle,
        output
    );
}

/// Assert that output does not contain a substring
pub fn assert_not_contains(output: &str, needle: &str) {
    assert!(
        !output.contains(needle),
        "Expected output NOT to contain '{}'\nOutput:\n{}",
        needle,
        output
    );
}

/// The (a, b, distance) triples of a JSON report, in report order
pub fn json_pairs(report: &Value) -> Vec<(String, String, f64)> {
    report["distances"]
        .as_array()
        .unwrap_or_else(|| panic!("report has no distances array: {}", report))
        .iter()
        .map(|p| {
            (
                p["a"].as_str().unwrap_or_default().to_string(),
                p["b"].as_str().unwrap_or_default().to_string(),
                p["distance"].as_f64().unwrap_or(f64::NAN),
            )
        })
        .collect()
}
