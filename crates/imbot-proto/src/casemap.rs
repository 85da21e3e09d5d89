//! Case-insensitive name handling.
//!
//! Command names, aliases, role names and member names are all matched
//! without regard to case, using Unicode lowercase folding.

/// Fold a name for use as a lookup key.
pub fn fold(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Compare two names case-insensitively.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    fold(a) == fold(b)
}

/// Check whether `haystack` starts with `prefix`, ignoring case.
///
/// An empty prefix matches everything.
pub fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    if haystack.is_ascii() && prefix.is_ascii() {
        return haystack.len() >= prefix.len()
            && haystack.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes());
    }
    fold(haystack).starts_with(&fold(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold() {
        assert_eq!(fold("MentionRole"), "mentionrole");
        assert_eq!(fold("ÄBC"), "äbc");
    }

    #[test]
    fn test_eq_ignore_case() {
        assert!(eq_ignore_case("ranks", "RANKS"));
        assert!(eq_ignore_case("Ünter", "ünter"));
        assert!(!eq_ignore_case("ranks", "rank"));
    }

    #[test]
    fn test_starts_with_ignore_case() {
        assert!(starts_with_ignore_case("Moderators", "mod"));
        assert!(starts_with_ignore_case("Moderators", ""));
        assert!(!starts_with_ignore_case("Mo", "mod"));
        assert!(starts_with_ignore_case("Ärzte", "är"));
    }
}
