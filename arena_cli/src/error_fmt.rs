//! Error rendering for human and JSON output modes.

use serde_json::json;

/// Flatten an error chain into one line, outermost context first.
pub fn humanize(err: &eyre::Report) -> String {
    err.chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

/// Structured error line for `--json` mode.
pub fn to_json_line(err: &eyre::Report) -> String {
    json!({ "error": humanize(err) }).to_string()
}
