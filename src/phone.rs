//! Phone-number heuristics.
//!
//! A suffix match on the last 7 digits is the fuzzy identity heuristic used
//! both to match submitted contacts against the remote feed and to decide
//! whether a submitted number already exists on a matched entry.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Strips everything but ASCII digits from a phone number.
#[must_use]
pub fn normalize_digits(number: &str) -> String {
    number.chars().filter(char::is_ascii_digit).collect()
}

/// Returns true if two phone numbers refer to the same line.
///
/// Numbers are compared on their final 7 digits, ignoring punctuation and
/// spacing. Either side having fewer than 6 digits never matches; when
/// either side has fewer than 7 digits the full digit strings must be
/// equal (so a 6-digit number only matches itself).
#[must_use]
pub fn suffix_match(a: &str, b: &str) -> bool {
    let a = normalize_digits(a);
    let b = normalize_digits(b);
    if a.len() < 6 || b.len() < 6 {
        return false;
    }
    if a.len() < 7 || b.len() < 7 {
        return a == b;
    }
    a[a.len() - 7..] == b[b.len() - 7..]
}

/// Relation type assigned to phone numbers added during reconciliation.
///
/// Submitted numbers carry free-text labels ("Mobile", "work fax", ...);
/// classification is prefix-anchored and case-insensitive, first match
/// wins: mobile/cell, work/office, house/home, anything else is other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    Mobile,
    Work,
    Home,
    Other,
}

impl RelationType {
    /// Classifies a free-text number label.
    #[must_use]
    pub fn classify(label: &str) -> Self {
        let label = label.trim().to_ascii_lowercase();
        if label.starts_with("mobile") || label.starts_with("cell") {
            Self::Mobile
        } else if label.starts_with("work") || label.starts_with("office") {
            Self::Work
        } else if label.starts_with("house") || label.starts_with("home") {
            Self::Home
        } else {
            Self::Other
        }
    }

    /// The rel URI the remote service uses for this relation.
    #[must_use]
    pub const fn as_rel(&self) -> &'static str {
        match self {
            Self::Mobile => "http://schemas.google.com/g/2005#mobile",
            Self::Work => "http://schemas.google.com/g/2005#work",
            Self::Home => "http://schemas.google.com/g/2005#home",
            Self::Other => "http://schemas.google.com/g/2005#other",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mobile => "mobile",
            Self::Work => "work",
            Self::Home => "home",
            Self::Other => "other",
        };
        write!(f, "{name}")
    }
}

static OBFUSCATE_RE: OnceLock<Regex> = OnceLock::new();

/// Replaces the final three digits of a number with `xxx` for preview
/// display. Numbers without three trailing digits are returned unchanged.
#[must_use]
pub fn obfuscate_tail(number: &str) -> String {
    let re = OBFUSCATE_RE.get_or_init(|| {
        Regex::new(r"\d{3}$").expect("obfuscation pattern is valid")
    });
    re.replace(number, "xxx").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize_digits("(206) 555-1212"), "2065551212");
        assert_eq!(normalize_digits("+1 800.555.0199"), "18005550199");
        assert_eq!(normalize_digits("no digits"), "");
    }

    #[test]
    fn test_suffix_match_last_seven() {
        assert!(suffix_match("(206) 555-1212", "555-1212"));
        assert!(suffix_match("206-555-1212", "+1 (206) 555 1212"));
        assert!(!suffix_match("206-555-1212", "206-555-1213"));
    }

    #[test]
    fn test_suffix_match_short_numbers_never_match() {
        // Fewer than 6 digits on either side is never a match.
        assert!(!suffix_match("55512", "55512"));
        assert!(!suffix_match("911", "911"));
        assert!(!suffix_match("12345", "206-555-12345"));
    }

    #[test]
    fn test_suffix_match_six_digit_degenerate() {
        // Six digits compare as whole strings.
        assert!(suffix_match("555123", "555-123"));
        assert!(!suffix_match("555123", "555124"));
        // A 6-digit number never matches a longer one.
        assert!(!suffix_match("555123", "206555123"));
    }

    #[test]
    fn test_suffix_match_seven_digit_boundary() {
        assert!(suffix_match("5551212", "5551212"));
        assert!(suffix_match("5551212", "2065551212"));
        assert!(!suffix_match("555123", "5550123"));
    }

    #[test]
    fn test_classify_prefixes() {
        assert_eq!(RelationType::classify("mobile"), RelationType::Mobile);
        assert_eq!(RelationType::classify("Cell phone"), RelationType::Mobile);
        assert_eq!(RelationType::classify("WORK"), RelationType::Work);
        assert_eq!(RelationType::classify("office direct"), RelationType::Work);
        assert_eq!(RelationType::classify("home"), RelationType::Home);
        assert_eq!(RelationType::classify("House"), RelationType::Home);
        assert_eq!(RelationType::classify("fax"), RelationType::Other);
        assert_eq!(RelationType::classify(""), RelationType::Other);
    }

    #[test]
    fn test_classify_first_match_wins() {
        // Prefix-anchored: "homework" still reads as home.
        assert_eq!(RelationType::classify("homework"), RelationType::Home);
        // Not prefix-anchored on the right: "my mobile" is other.
        assert_eq!(RelationType::classify("my mobile"), RelationType::Other);
    }

    #[test]
    fn test_rel_uris() {
        assert_eq!(
            RelationType::Mobile.as_rel(),
            "http://schemas.google.com/g/2005#mobile"
        );
        assert_eq!(
            RelationType::classify("office").as_rel(),
            "http://schemas.google.com/g/2005#work"
        );
    }

    #[test]
    fn test_obfuscate_tail() {
        assert_eq!(obfuscate_tail("206-555-1212"), "206-555-1xxx");
        assert_eq!(obfuscate_tail("555-0199"), "555-0xxx");
        assert_eq!(obfuscate_tail("12"), "12");
        assert_eq!(obfuscate_tail("ext. 12a"), "ext. 12a");
    }
}
