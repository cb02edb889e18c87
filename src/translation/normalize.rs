//! Value normalization applied once, when a value enters the store.

use std::sync::LazyLock;

use regex::Regex;

/// Two or more consecutive whitespace characters.
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\s{2,}").unwrap()
});

/// Normalizes a translation value.
///
/// Leading and trailing whitespace is removed and every internal run of two or
/// more whitespace characters is replaced by a single space. A lone whitespace
/// character (e.g. a single line break) is kept as is.
///
/// # Examples
/// ```
/// use ngx_xlf_xlsx::translation::normalize_value;
///
/// assert_eq!(normalize_value("  a   b  "), "a b");
/// assert_eq!(normalize_value("a\nb"), "a\nb");
/// ```
#[must_use]
pub fn normalize_value(value: &str) -> String {
    WHITESPACE_RUN.replace_all(value.trim(), " ").into_owned()
}
