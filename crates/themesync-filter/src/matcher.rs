//! Single-path predicates and their OR aggregate.

use std::fmt;

use regex::Regex;

use crate::error::{MatchError, PatternError};
use crate::glob::GlobPattern;

/// A stateless predicate over a `/`-separated path string.
///
/// The set of matchers is closed; every variant is dispatched through
/// [`Matcher::matches`].
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Wildcard pattern, see [`GlobPattern`].
    Glob(GlobPattern),
    /// Regular expression that must match the whole path.
    Regex(RegexMatcher),
    /// Matches every path.
    Always,
    /// Matches no path.
    Never,
}

impl Matcher {
    /// Compile a glob pattern. Never fails.
    pub fn glob(pattern: &str) -> Self {
        Matcher::Glob(GlobPattern::new(pattern))
    }

    /// Compile a regular expression from untrusted input.
    ///
    /// The expression is anchored so it has to match the whole path.
    pub fn regex(pattern: &str) -> Result<Self, PatternError> {
        RegexMatcher::new(pattern).map(Matcher::Regex)
    }

    /// Unwrap a matcher built from a pattern known at compile time.
    ///
    /// # Panics
    ///
    /// Panics if `result` is an error. Use only with literal patterns;
    /// anything user-supplied goes through the `Result` directly.
    pub fn must(result: Result<Self, PatternError>) -> Self {
        match result {
            Ok(matcher) => matcher,
            Err(err) => panic!("invalid built-in matcher: {err}"),
        }
    }

    /// Test a single path.
    pub fn matches(&self, path: &str) -> Result<bool, MatchError> {
        Ok(match self {
            Matcher::Glob(glob) => glob.matches(path),
            Matcher::Regex(regex) => regex.is_match(path),
            Matcher::Always => true,
            Matcher::Never => false,
        })
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Glob(glob) => write!(f, "{glob}"),
            Matcher::Regex(regex) => write!(f, "/{}/", regex.as_str()),
            Matcher::Always => f.write_str("<always>"),
            Matcher::Never => f.write_str("<never>"),
        }
    }
}

/// A compiled, fully anchored regular expression.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    source: String,
    regex: Regex,
}

impl RegexMatcher {
    fn new(pattern: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| PatternError::Regex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The expression as written, without the added anchors.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// An ordered list of matchers combined with logical OR.
#[derive(Debug, Clone, Default)]
pub struct Matchers(Vec<Matcher>);

impl Matchers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, matcher: Matcher) {
        self.0.push(matcher);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Matcher> {
        self.0.iter()
    }

    /// True if any matcher accepts `path`. Stops at the first hit.
    ///
    /// A matcher error counts as a non-match; the aggregate has no error
    /// channel of its own.
    pub fn matches(&self, path: &str) -> bool {
        self.0.iter().any(|matcher| match matcher.matches(path) {
            Ok(matched) => matched,
            Err(err) => {
                tracing::trace!(
                    %matcher,
                    path,
                    error = %err,
                    "matcher failed, treating as non-match"
                );
                false
            }
        })
    }
}

impl FromIterator<Matcher> for Matchers {
    fn from_iter<I: IntoIterator<Item = Matcher>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Matchers {
    type Item = &'a Matcher;
    type IntoIter = std::slice::Iter<'a, Matcher>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Matchers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, matcher) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{matcher}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_and_never() {
        assert!(Matcher::Always.matches("anything").unwrap());
        assert!(Matcher::Always.matches("").unwrap());
        assert!(!Matcher::Never.matches("anything").unwrap());
    }

    #[test]
    fn glob_variant_delegates() {
        let m = Matcher::glob("assets/*.css");
        assert!(m.matches("assets/theme.css").unwrap());
        assert!(!m.matches("assets/sub/theme.css").unwrap());
    }

    #[test]
    fn regex_is_anchored() {
        let m = Matcher::regex(r"config/.*\.json").unwrap();
        assert!(m.matches("config/settings_data.json").unwrap());
        assert!(!m.matches("backup/config/settings_data.json").unwrap());
        assert!(!m.matches("config/settings_data.json.bak").unwrap());
    }

    #[test]
    fn empty_regex_matches_only_empty_path() {
        let m = Matcher::must(Matcher::regex(""));
        assert!(m.matches("").unwrap());
        assert!(!m.matches("layout").unwrap());
    }

    #[test]
    fn invalid_regex_is_recoverable() {
        let err = Matcher::regex("(unclosed").unwrap_err();
        assert!(matches!(err, PatternError::Regex { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    #[should_panic(expected = "invalid built-in matcher")]
    fn must_panics_on_invalid_regex() {
        let _ = Matcher::must(Matcher::regex("[z-a]"));
    }

    #[test]
    fn empty_matchers_match_nothing() {
        let matchers = Matchers::new();
        assert!(!matchers.matches("anything"));
        assert!(!matchers.matches(""));
    }

    #[test]
    fn matchers_are_or_combined() {
        let matchers: Matchers = [Matcher::glob("*.css"), Matcher::glob("*.js")]
            .into_iter()
            .collect();
        assert!(matchers.matches("theme.css"));
        assert!(matchers.matches("theme.js"));
        assert!(!matchers.matches("theme.liquid"));
        assert_eq!(matchers.len(), 2);
    }

    #[test]
    fn display_lists_patterns() {
        let matchers: Matchers = [
            Matcher::glob("*.swp"),
            Matcher::must(Matcher::regex("a+")),
            Matcher::Never,
        ]
        .into_iter()
        .collect();
        assert_eq!(matchers.to_string(), "*.swp,/a+/,<never>");
    }
}
