//! Filename sanitization
//!
//! Remote names may contain characters that are illegal or awkward on
//! common filesystems. Each path component is passed through a fixed
//! substitution table, then trimmed of surrounding whitespace.
//!
//! | Input | Output      |
//! |-------|-------------|
//! | `%`   | `％`        |
//! | `<`   | `＞`        |
//! | `>`   | `＜`        |
//! | `"`   | `-`         |
//! | `/`   | `_`         |
//! | `\`   | *(removed)* |
//! | `:`   | `：`        |
//! | `*`   | *(removed)* |
//! | `?`   | `？`        |
//!
//! The mapping is not injective: `a/b` and `a_b` both become `a_b`, and
//! `a*b`, `a\b` and `ab` all become `ab`. The `<`/`>` pair maps to the
//! opposite full-width bracket; existing local trees and cache keys depend
//! on it, so it is kept as is.
//!
//! A component that ends up empty, `.` or `..` becomes `_`, so no remote
//! name can address a directory or climb out of the sync root.

/// Substitution for a single character, `None` meaning "drop it"
fn substitute(c: char) -> Option<char> {
    match c {
        '%' => Some('％'),
        '<' => Some('＞'),
        '>' => Some('＜'),
        '"' => Some('-'),
        '/' => Some('_'),
        '\\' => None,
        ':' => Some('：'),
        '*' => None,
        '?' => Some('？'),
        other => Some(other),
    }
}

/// Sanitize one path component (a folder name or a filename)
pub fn sanitize_component(name: &str) -> String {
    let replaced: String = name.chars().filter_map(substitute).collect();
    match replaced.trim() {
        "" | "." | ".." => "_".to_string(),
        trimmed => trimmed.to_string(),
    }
}
