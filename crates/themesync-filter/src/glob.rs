//! Path glob patterns.
//!
//! Patterns are matched against `/`-separated path strings:
//! - `*` matches zero or more characters within one path segment
//! - `**` matches zero or more characters across segments (including `/`)
//! - `?` matches exactly one character other than `/`
//! - `[abc]`, `[a-z]`, `[!abc]`/`[^abc]` match one character other than `/`
//! - `\x` matches `x` literally
//! - `{a,b,c}` brace expansion (matches any of the alternatives)
//!
//! Literal separators around a globstar still have to be present, so
//! `foo/**/bar` needs at least one segment between `foo` and `bar`, and
//! `**/*.png` never matches a bare `foo.png`.

use std::cell::Cell;
use std::fmt;

/// Maximum number of recursive calls for one match. Protects against
/// adversarial patterns like `*a*a*a*...*a` that cause O(n^k) backtracking.
/// Counted as total work (calls), not stack depth, to bound actual CPU cost.
const MAX_MATCH_CALLS: usize = 100_000;

/// Upper bound on the alternatives one pattern expands to. Groups past the
/// bound are dropped, so `{a,b}` repeated 25 times compiles to 1024
/// alternatives instead of 33 million.
const MAX_BRACE_EXPANSIONS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    /// `?`
    AnyChar,
    /// `*`, stops at `/`
    Star,
    /// `**`, crosses `/`
    GlobStar,
    Class { negated: bool, items: Vec<ClassItem> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClassItem {
    Char(char),
    Range(char, char),
}

impl ClassItem {
    fn contains(&self, ch: char) -> bool {
        match *self {
            ClassItem::Char(c) => c == ch,
            ClassItem::Range(lo, hi) => lo <= ch && ch <= hi,
        }
    }
}

/// A compiled glob pattern.
///
/// Compilation never fails: malformed constructs (an unclosed `[`, a
/// trailing `\`) are taken literally.
///
/// # Examples
/// ```
/// use themesync_filter::GlobPattern;
///
/// let pattern = GlobPattern::new("**/*.png");
/// assert!(pattern.matches("assets/logo.png"));
/// assert!(!pattern.matches("logo.png"));
/// assert!(!GlobPattern::new("*.png").matches("assets/logo.png"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    raw: String,
    alternatives: Vec<Vec<Token>>,
}

impl GlobPattern {
    /// Compile a pattern, expanding braces up front.
    pub fn new(pattern: &str) -> Self {
        let expanded = expand_braces(pattern);
        if expanded.len() >= MAX_BRACE_EXPANSIONS {
            tracing::warn!(pattern, limit = MAX_BRACE_EXPANSIONS, "brace expansion truncated");
        }
        let alternatives = expanded
            .iter()
            .map(|alt| tokenize(alt))
            .collect();
        Self {
            raw: pattern.to_string(),
            alternatives,
        }
    }

    /// The pattern as it was written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True if the pattern contains a path separator.
    ///
    /// Separator-free patterns can only ever match within one segment.
    pub fn has_separator(&self) -> bool {
        self.raw.contains('/')
    }

    /// Returns true if the pattern matches the entire input.
    ///
    /// Each alternative gets its own work budget.
    pub fn matches(&self, input: &str) -> bool {
        let input: Vec<char> = input.chars().collect();
        self.alternatives.iter().any(|tokens| {
            let calls = Cell::new(0usize);
            match_bounded(tokens, 0, &input, 0, &calls)
        })
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Match a path string against a glob pattern without keeping the
/// compiled form around.
pub fn glob_match(pattern: &str, input: &str) -> bool {
    GlobPattern::new(pattern).matches(input)
}

/// Expand brace expressions in a pattern.
///
/// `{a,b,c}` expands to multiple patterns. Supports nested braces.
/// Unbalanced braces are kept literally. At most 1024 patterns are
/// produced; later alternatives are dropped.
///
/// # Examples
/// ```
/// use themesync_filter::glob::expand_braces;
///
/// assert_eq!(expand_braces("simple"), vec!["simple"]);
/// assert_eq!(expand_braces("*.{css,js}"), vec!["*.css", "*.js"]);
/// ```
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let mut results = Vec::new();
    expand_into(pattern, &mut results);
    results
}

/// Append the expansions of `pattern` to `out`, stopping once it holds
/// `MAX_BRACE_EXPANSIONS` entries.
fn expand_into(pattern: &str, out: &mut Vec<String>) {
    if out.len() >= MAX_BRACE_EXPANSIONS {
        return;
    }
    let chars: Vec<char> = pattern.chars().collect();

    // Find the first top-level brace group
    let mut depth = 0i32;
    let mut brace_start = None;
    let mut brace_end = None;

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '{' => {
                if depth == 0 {
                    brace_start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 && brace_start.is_some() {
                    brace_end = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }

    let (start, end) = match (brace_start, brace_end) {
        (Some(s), Some(e)) => (s, e),
        _ => {
            out.push(pattern.to_string());
            return;
        }
    };

    let prefix: String = chars[..start].iter().collect();
    let suffix: String = chars[end + 1..].iter().collect();
    let brace_content: String = chars[start + 1..end].iter().collect();

    for alt in split_brace_alternatives(&brace_content) {
        if out.len() >= MAX_BRACE_EXPANSIONS {
            break;
        }
        // More groups may follow
        expand_into(&format!("{prefix}{alt}{suffix}"), out);
    }
}

/// Split brace content by commas, respecting nested braces.
fn split_brace_alternatives(content: &str) -> Vec<String> {
    let mut alternatives = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for c in content.chars() {
        match c {
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => alternatives.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    alternatives.push(current);
    alternatives
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                let mut run = 0;
                while i < chars.len() && chars[i] == '*' {
                    run += 1;
                    i += 1;
                }
                tokens.push(if run >= 2 { Token::GlobStar } else { Token::Star });
            }
            '?' => {
                tokens.push(Token::AnyChar);
                i += 1;
            }
            '[' => match parse_class(&chars[i..]) {
                Some((token, consumed)) => {
                    tokens.push(token);
                    i += consumed;
                }
                None => {
                    tokens.push(Token::Literal('['));
                    i += 1;
                }
            },
            '\\' if i + 1 < chars.len() => {
                tokens.push(Token::Literal(chars[i + 1]));
                i += 2;
            }
            c => {
                tokens.push(Token::Literal(c));
                i += 1;
            }
        }
    }
    tokens
}

/// Parse a character class starting at `[`.
///
/// Returns the token and how many pattern chars it consumed, or `None` if
/// the class is never closed.
fn parse_class(pattern: &[char]) -> Option<(Token, usize)> {
    let mut idx = 1;
    let mut negated = false;

    if idx < pattern.len() && (pattern[idx] == '!' || pattern[idx] == '^') {
        negated = true;
        idx += 1;
    }

    // `]` as the first member is literal
    let first = idx;
    let mut items = Vec::new();

    while idx < pattern.len() {
        let c = pattern[idx];

        if c == ']' && idx > first {
            return Some((Token::Class { negated, items }, idx + 1));
        }

        if idx + 2 < pattern.len() && pattern[idx + 1] == '-' && pattern[idx + 2] != ']' {
            items.push(ClassItem::Range(c, pattern[idx + 2]));
            idx += 3;
            continue;
        }

        items.push(ClassItem::Char(c));
        idx += 1;
    }

    None
}

/// Work-bounded recursive matching with backtracking for `*` and `**`.
///
/// Returns `false` (non-match) once total recursive calls exceed
/// `MAX_MATCH_CALLS`.
fn match_bounded(
    tokens: &[Token],
    ti: usize,
    input: &[char],
    ii: usize,
    calls: &Cell<usize>,
) -> bool {
    let count = calls.get() + 1;
    calls.set(count);
    if count > MAX_MATCH_CALLS {
        return false;
    }

    if ti >= tokens.len() {
        return ii >= input.len();
    }

    match &tokens[ti] {
        Token::GlobStar => {
            if ti + 1 == tokens.len() {
                return true;
            }
            (ii..=input.len()).any(|next| match_bounded(tokens, ti + 1, input, next, calls))
        }

        Token::Star => {
            if ti + 1 == tokens.len() {
                return !input[ii..].contains(&'/');
            }
            let mut next = ii;
            loop {
                if match_bounded(tokens, ti + 1, input, next, calls) {
                    return true;
                }
                if next >= input.len() || input[next] == '/' {
                    return false;
                }
                next += 1;
            }
        }

        Token::AnyChar => {
            ii < input.len()
                && input[ii] != '/'
                && match_bounded(tokens, ti + 1, input, ii + 1, calls)
        }

        Token::Class { negated, items } => {
            if ii >= input.len() || input[ii] == '/' {
                return false;
            }
            let hit = items.iter().any(|item| item.contains(input[ii]));
            hit != *negated && match_bounded(tokens, ti + 1, input, ii + 1, calls)
        }

        Token::Literal(c) => {
            ii < input.len()
                && input[ii] == *c
                && match_bounded(tokens, ti + 1, input, ii + 1, calls)
        }
    }
}
