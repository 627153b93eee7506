use chrono::{DateTime, Utc};

pub const DOCUMENT_EXTENSION: &str = "pdf";

/// Replaces every run of characters outside `[A-Za-z0-9_-]` with a single `_`.
pub fn sanitize_stem(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_run = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    if out.is_empty() {
        out.push_str("orbit");
    }
    out
}

/// `{sanitized suggestion}_{YYYYMMDD-HHMMSS}.pdf`
pub fn document_filename(suggested: &str, created_at: DateTime<Utc>) -> String {
    format!(
        "{}_{}.{}",
        sanitize_stem(suggested),
        created_at.format("%Y%m%d-%H%M%S"),
        DOCUMENT_EXTENSION
    )
}
