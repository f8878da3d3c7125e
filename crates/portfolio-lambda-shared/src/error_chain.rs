//! Rendering of error source chains for client-visible failure text.

use std::error::Error;

/// Join an error and its sources with `": "`.
///
/// Transport crates often keep the useful detail (e.g. "Connection refused")
/// in a nested source while the top-level message only names the operation.
/// Sources whose text already appears in the output are skipped.
pub fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !cause_text.is_empty() && !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
