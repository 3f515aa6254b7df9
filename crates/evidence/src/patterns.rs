//! Lazily compiled regex helpers shared by the rule tables.
//!
//! A pattern that fails to compile becomes `None` and simply never matches.

use regex::Regex;
use std::sync::LazyLock;

pub type LazyRegex = LazyLock<Option<Regex>>;

macro_rules! lazy_regex {
    ($(#[$meta:meta])* $vis:vis $name:ident, $pattern:expr) => {
        $(#[$meta])*
        $vis static $name: $crate::patterns::LazyRegex =
            std::sync::LazyLock::new(|| regex::Regex::new($pattern).ok());
    };
}

pub(crate) use lazy_regex;

pub fn is_match(regex: &LazyRegex, text: &str) -> bool {
    regex.as_ref().is_some_and(|re| re.is_match(text))
}

/// Compile a list of patterns, skipping (and logging) invalid ones.
pub fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!("Skipping invalid pattern {:?}: {}", p, e);
                None
            }
        })
        .collect()
}
