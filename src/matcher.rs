//! A compact regular-expression matcher used by `grep`.
//!
//! Supported syntax:
//! - `c`: any literal character matches itself
//! - `.`: matches any single character
//! - `^`: at the start of the pattern, anchors the match to the start of the text
//! - `$`: at the end of the pattern, anchors the match to the end of the text
//! - `c*`: zero or more occurrences of the preceding character (or of any character for `.*`)
//!
//! There is no compiled form: the pattern text is walked directly on every call.
//! A `*` without a preceding atom is matched as a literal `*`.

/// Returns `true` if `pattern` matches anywhere in `text`.
///
/// ```
/// use lineshell::matcher::is_match;
///
/// assert!(is_match("^abc$", "abc"));
/// assert!(!is_match("^abc$", "abcd"));
/// assert!(is_match("a*b", "b"));
/// ```
pub fn is_match(pattern: &str, text: &str) -> bool {
    if let Some(rest) = pattern.strip_prefix('^') {
        return match_here(rest, text);
    }
    let mut text = text;
    // The empty suffix is tried as well, so `$` and `x*` can match at the end.
    loop {
        if match_here(pattern, text) {
            return true;
        }
        let mut chars = text.chars();
        if chars.next().is_none() {
            return false;
        }
        text = chars.as_str();
    }
}

/// Match `pattern` at the beginning of `text`.
fn match_here(pattern: &str, text: &str) -> bool {
    let mut pattern_chars = pattern.chars();
    let Some(atom) = pattern_chars.next() else {
        return true;
    };
    let rest = pattern_chars.as_str();

    if let Some(after_star) = rest.strip_prefix('*') {
        return match_star(atom, after_star, text);
    }
    if atom == '$' && rest.is_empty() {
        return text.is_empty();
    }

    let mut text_chars = text.chars();
    match text_chars.next() {
        Some(c) if atom == '.' || atom == c => match_here(rest, text_chars.as_str()),
        _ => false,
    }
}

/// Match `atom*` followed by `pattern` at the beginning of `text`.
///
/// Zero repetitions are tried first, then one more character at a time.
fn match_star(atom: char, pattern: &str, text: &str) -> bool {
    let mut text = text;
    loop {
        if match_here(pattern, text) {
            return true;
        }
        let mut text_chars = text.chars();
        match text_chars.next() {
            Some(c) if atom == '.' || atom == c => text = text_chars.as_str(),
            _ => return false,
        }
    }
}
