//! Heuristic value classification.
//!
//! Pure predicates that detect placeholder, fake, and masked field values.
//! Every function is total over arbitrary string input; no predicate ever
//! errors, including on empty strings.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// Placeholder phrases inserted by upstream sources. Matched exactly against
/// the lower-cased trimmed value, never as substrings.
const JUNK_VALUES: &[&str] = &[
    "not publicly available",
    "not provided",
    "not found",
    "preparing profile",
    "unknown",
    "n/a",
    "none",
    "null",
    "protected",
    "http://click-to-open",
];

/// Known placeholder phone numbers returned verbatim by lookup services.
const FAKE_PHONES: &[&str] = &[
    "123-456-7890",
    "+1 123-456-7890",
    "123 456 7890",
    "+1-202-555-0123",
    "+1-512-555-1234",
    "+1 234 567 8900",
    "+1-555-123-4567",
    "+1-407-555-1234",
    "+1 416-123-4567",
];

/// Contact-lookup aggregator domains that show up in email fields.
const VENDOR_DOMAINS: &[&str] = &["rocketreach.co", "contactout.com"];

// Compile-once regex patterns via OnceLock.
fn re_fake_555() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b555[-.\s]?\d{4}\b").unwrap())
}

/// True if the value is a known placeholder/junk phrase.
pub fn is_junk(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    let low = value.trim().to_lowercase();
    JUNK_VALUES.contains(&low.as_str())
}

/// True if an email field was filled with a URL instead of an address.
pub fn is_url_not_email(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    let v = value.trim();
    v.starts_with("http")
        || v.starts_with("www.")
        || VENDOR_DOMAINS.iter().any(|d| v.contains(d))
}

/// True if the value is mostly redaction characters (`*` ratio above 0.6).
pub fn is_too_masked(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    let stars = value.chars().filter(|&c| c == '*').count();
    let total = value.chars().count();
    stars > 0 && (stars as f64 / total as f64) > 0.6
}

/// True if the phone value is recognizably fake: a known placeholder number,
/// a 555 exchange, or a long run of at most two distinct digits.
pub fn is_fake_phone(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    let p = value.trim();
    if FAKE_PHONES.contains(&p) {
        return true;
    }
    if re_fake_555().is_match(p) {
        return true;
    }
    let digits = digits(p);
    if digits.len() >= 7 {
        let distinct: HashSet<char> = digits.chars().collect();
        if distinct.len() <= 2 {
            return true;
        }
    }
    false
}

/// Strip a trailing "Verified" badge label glued onto a name by the scraper.
pub fn strip_verified_suffix(name: &str) -> String {
    match name.strip_suffix("Verified") {
        Some(stripped) => stripped.trim().to_string(),
        None => name.to_string(),
    }
}

/// Digit-only form of a value.
pub fn digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn junk_is_exact_match_after_normalization() {
        assert!(is_junk("Not Provided"));
        assert!(is_junk("  n/a  "));
        assert!(is_junk("UNKNOWN"));
        assert!(!is_junk("unknown person"));
        assert!(!is_junk(""));
    }

    #[test]
    fn url_not_email() {
        assert!(is_url_not_email("https://rocketreach.co/jane"));
        assert!(is_url_not_email("www.example.com"));
        assert!(is_url_not_email("see contactout.com profile"));
        assert!(!is_url_not_email("jane@acme.com"));
        assert!(!is_url_not_email(""));
    }

    #[test]
    fn masked_ratio_threshold() {
        // 6 stars out of 9 chars = 0.67 > 0.6
        assert!(is_too_masked("J*** D***"));
        assert!(!is_too_masked("Jo*n"));
        assert!(!is_too_masked("no stars here"));
        assert!(!is_too_masked(""));
    }

    #[test]
    fn fake_phone_555_exchange() {
        assert!(is_fake_phone("555-0123"));
        assert!(is_fake_phone("+1-202-555-0123"));
        assert!(is_fake_phone("202 555 0123"));
        assert!(!is_fake_phone("212-867-5309"));
    }

    #[test]
    fn fake_phone_denylist() {
        assert!(is_fake_phone("123-456-7890"));
        assert!(is_fake_phone("  +1 123-456-7890 "));
    }

    #[test]
    fn fake_phone_repeated_digits() {
        assert!(is_fake_phone("1111111111"));
        assert!(is_fake_phone("2222222"));
        assert!(is_fake_phone("121-212-1212"));
        // Six digits is below the repeated-digit rule's floor
        assert!(!is_fake_phone("111111"));
        assert!(!is_fake_phone("303-555"));
    }

    #[test]
    fn verified_suffix_stripped() {
        assert_eq!(strip_verified_suffix("Jane DoeVerified"), "Jane Doe");
        assert_eq!(strip_verified_suffix("Jane Doe"), "Jane Doe");
        assert_eq!(strip_verified_suffix("Verified"), "");
    }

    #[test]
    fn digit_extraction() {
        assert_eq!(digits("+1 (305) 555-0199"), "13055550199");
        assert_eq!(digits("no digits"), "");
    }
}
