//! SQL utility functions

/// Escape SQL LIKE metacharacters (%, _, \) for use with `ESCAPE '\'`
///
/// # Example
///
/// ```
/// use classroll_server::utils::sql::escape_like_pattern;
///
/// assert_eq!(escape_like_pattern("10_A 100%"), "10\\_A 100\\%");
/// ```
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// LIKE pattern matching any value that contains `needle` literally
pub fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like_pattern(needle))
}
