//! Include/exclude composition.
//!
//! A path is selected when at least one include accepts it and no exclude
//! does. Excludes always win; with no includes nothing is selected.

use std::fmt;

use crate::matcher::{Matcher, Matchers};

/// Include matchers AND-NOT exclude matchers.
///
/// `Clone` yields an independent copy, so a set handed to a `FileSet`
/// cannot be changed through the original.
#[derive(Debug, Clone, Default)]
pub struct MatcherSet {
    includes: Matchers,
    excludes: Matchers,
}

impl MatcherSet {
    /// An empty set. Matches nothing until an include is added.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_include(&mut self, matcher: Matcher) {
        self.includes.push(matcher);
    }

    pub fn add_exclude(&mut self, matcher: Matcher) {
        self.excludes.push(matcher);
    }

    pub fn includes(&self) -> &Matchers {
        &self.includes
    }

    pub fn excludes(&self) -> &Matchers {
        &self.excludes
    }

    /// True if no exclude and at least one include match `path`.
    pub fn matches(&self, path: &str) -> bool {
        if self.excludes.matches(path) {
            return false;
        }
        self.includes.matches(path)
    }

    /// Match a walked entry, given as a `/`-separated path relative to a
    /// directory named `dir_name`.
    ///
    /// Includes are tested against the path and its file name, so
    /// separator-free patterns (`*`, `*.js`) select at any depth while
    /// patterns with a `/` stay anchored to the directory.
    ///
    /// Excludes are tested against every trailing run of segments of
    /// `dir_name/path`. `*.swp` and `*/.DS_Store` therefore reject entries
    /// at any depth, including directly inside the directory.
    pub fn matches_entry(&self, dir_name: &str, path: &str) -> bool {
        if self.excludes.is_empty() {
            return self.included(path);
        }
        let scoped = format!("{dir_name}/{path}");
        if segment_suffixes(&scoped).any(|candidate| self.excludes.matches(candidate)) {
            return false;
        }
        self.included(path)
    }

    fn included(&self, path: &str) -> bool {
        let name = file_name(path);
        self.includes.matches(path) || (name != path && self.includes.matches(name))
    }
}

impl fmt::Display for MatcherSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "includes={}; excludes={}", self.includes, self.excludes)
    }
}

/// `a/b/c`, `b/c`, `c`.
fn segment_suffixes(path: &str) -> impl Iterator<Item = &str> {
    std::iter::once(path).chain(path.match_indices('/').map(|(idx, _)| &path[idx + 1..]))
}

fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_matches_nothing() {
        let set = MatcherSet::new();
        assert!(!set.matches("something"));
        assert!(!set.matches_entry("theme", "dir/something"));
    }

    #[test]
    fn exclude_beats_include() {
        let mut set = MatcherSet::new();
        set.add_include(Matcher::Always);
        set.add_exclude(Matcher::Always);
        assert!(!set.matches("something"));
    }

    #[test]
    fn include_without_matching_exclude() {
        let mut set = MatcherSet::new();
        set.add_include(Matcher::Always);
        set.add_exclude(Matcher::Never);
        assert!(set.matches("something"));
    }

    #[test]
    fn excludes_alone_select_nothing() {
        let mut set = MatcherSet::new();
        set.add_exclude(Matcher::Never);
        assert!(!set.matches("something"));
    }

    #[test]
    fn entry_matching_uses_file_name_for_bare_patterns() {
        let mut set = MatcherSet::new();
        set.add_include(Matcher::glob("*"));
        set.add_exclude(Matcher::glob("*.swp"));

        assert!(!set.matches("src/js/foo.js"));
        assert!(set.matches_entry("theme", "src/js/foo.js"));
        assert!(!set.matches_entry("theme", "src/js/.foo.js.swp"));
    }

    #[test]
    fn entry_matching_keeps_separator_patterns_anchored() {
        let mut set = MatcherSet::new();
        set.add_include(Matcher::glob("assets/*"));

        assert!(set.matches_entry("theme", "assets/theme.css"));
        assert!(!set.matches_entry("theme", "theme/assets/theme.css"));
        assert!(!set.matches_entry("theme", "assets/fonts/a.woff"));
    }

    #[test]
    fn parent_wildcard_excludes_apply_at_every_depth() {
        let mut set = MatcherSet::new();
        set.add_include(Matcher::glob("*"));
        set.add_exclude(Matcher::glob("*/.DS_Store"));

        assert!(!set.matches_entry("theme", ".DS_Store"));
        assert!(!set.matches_entry("theme", "src/.DS_Store"));
        assert!(!set.matches_entry("theme", "src/images/.DS_Store"));
        assert!(!set.matches_entry(".", "a/b/c/.DS_Store"));
        assert!(set.matches_entry("theme", "src/images/foo.png"));
    }

    #[test]
    fn anchored_excludes_match_nested_suffixes() {
        let mut set = MatcherSet::new();
        set.add_include(Matcher::glob("*"));
        set.add_exclude(Matcher::glob("config/settings_data.json"));

        assert!(!set.matches_entry("theme", "config/settings_data.json"));
        assert!(set.matches_entry("theme", "config/settings_schema.json"));
    }

    #[test]
    fn segment_suffixes_walk_from_the_left() {
        let all: Vec<&str> = segment_suffixes("theme/a/b.css").collect();
        assert_eq!(all, vec!["theme/a/b.css", "a/b.css", "b.css"]);
        assert_eq!(segment_suffixes("b.css").collect::<Vec<_>>(), vec!["b.css"]);
    }

    #[test]
    fn copies_are_independent() {
        let mut original = MatcherSet::new();
        original.add_include(Matcher::Always);
        let copy = original.clone();
        original.add_exclude(Matcher::Always);

        assert!(!original.matches("x"));
        assert!(copy.matches("x"));
    }

    #[test]
    fn file_name_splits_on_last_separator() {
        assert_eq!(file_name("a/b/c.txt"), "c.txt");
        assert_eq!(file_name("c.txt"), "c.txt");
        assert_eq!(file_name("a/"), "");
    }
}
