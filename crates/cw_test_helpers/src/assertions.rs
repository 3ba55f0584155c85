//! Domain-specific predicates for Codeword output

use predicates::prelude::*;
use predicates::str::contains;

/// Output does NOT contain any of the given strings
///
/// ```rust
/// use cw_test_helpers::assertions::stderr_not_contains;
/// use predicates::prelude::*;
///
/// assert!(stderr_not_contains(&["ERROR", "panicked"]).eval("all good"));
/// ```
pub fn stderr_not_contains(values: &[&str]) -> impl Predicate<str> {
    let owned_values: Vec<String> = values.iter().map(|&s| s.to_string()).collect();
    predicate::function(move |s: &str| !owned_values.iter().any(|v| s.contains(v.as_str())))
}

/// A full sync message as JSON text
///
/// ```rust
/// use cw_test_helpers::assertions::full_sync_json;
/// use predicates::prelude::*;
///
/// let msg = r#"{"type":"new","cards":[],"teams":{},"first":"red","turn":"red"}"#;
/// assert!(full_sync_json().eval(msg));
/// ```
pub fn full_sync_json() -> impl Predicate<str> {
    contains("\"type\":\"new\"")
        .and(contains("\"cards\""))
        .and(contains("\"teams\""))
        .and(contains("\"turn\""))
}

/// A team label such as `Red - 3/9` or `Blue WINS`
pub fn team_label() -> impl Predicate<str> {
    predicate::function(|s: &str| {
        s.lines().any(|line| {
            let line = line.trim();
            (line.starts_with("Red") || line.starts_with("Blue"))
                && (line.ends_with("WINS") || line.contains(" - ") && line.contains('/'))
        })
    })
}
