//! Canonical field cleaning.
//!
//! Each cleaner reduces a possibly comma-separated multi-value string to at
//! most one accepted value, rejecting junk/fake/masked candidates. Cleaners
//! are idempotent: cleaning a cleaned value is a no-op.

use serde::Serialize;

use crate::classify::{
    digits, is_fake_phone, is_junk, is_too_masked, is_url_not_email, strip_verified_suffix,
};
use crate::record::{fields, PersonRecord};

/// Per-field change counts for a cleaning pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanStats {
    pub total: usize,
    pub names: usize,
    pub emails: usize,
    pub phones: usize,
    pub linkedin: usize,
    pub roles: usize,
    pub companies: usize,
}

impl CleanStats {
    /// Total number of field values changed by cleaning.
    pub fn changed(&self) -> usize {
        self.names + self.emails + self.phones + self.linkedin + self.roles + self.companies
    }
}

/// Keep the first candidate that looks like an email address.
pub fn clean_email(email: &str) -> String {
    if email.is_empty() {
        return String::new();
    }
    for candidate in email.split(',') {
        let c = candidate.trim();
        if is_junk(c) || is_url_not_email(c) || is_too_masked(c) {
            continue;
        }
        if c.contains("@example.com") {
            continue;
        }
        if c.contains('@') && c.contains('.') && !c.starts_with("http") {
            return c.to_string();
        }
    }
    String::new()
}

/// Keep the first candidate with at least 7 digits that isn't junk or fake.
pub fn clean_phone(phone: &str) -> String {
    if phone.is_empty() {
        return String::new();
    }
    for candidate in phone.split(',') {
        let c = candidate.trim();
        if is_junk(c) || is_fake_phone(c) || is_too_masked(c) {
            continue;
        }
        if digits(c).len() >= 7 {
            return c.to_string();
        }
    }
    String::new()
}

/// Keep a LinkedIn profile URL; drop bare domain roots, authwall redirects,
/// and anything not on linkedin.com.
pub fn clean_linkedin(url: &str) -> String {
    if url.is_empty() || is_junk(url) {
        return String::new();
    }
    let trimmed = url.trim();
    let bare = trimmed.trim_end_matches('/');
    if matches!(
        bare,
        "https://linkedin.com" | "http://linkedin.com" | "https://www.linkedin.com"
    ) {
        return String::new();
    }
    if !trimmed.contains("linkedin.com") {
        return String::new();
    }
    if trimmed.contains("authwall") {
        return String::new();
    }
    trimmed.to_string()
}

/// Role and company are trimmed pass-throughs unless junk.
pub fn clean_text_field(value: &str) -> String {
    if is_junk(value) {
        return String::new();
    }
    value.trim().to_string()
}

/// Apply every field cleaner to one record, tallying changed fields.
///
/// The name repair runs against both `name` and `full_name` (raw scrape
/// exports carry the latter); a change to either counts once.
pub fn clean_record(record: &mut PersonRecord, stats: &mut CleanStats) {
    let mut name_changed = false;
    for field in [fields::NAME, "full_name"] {
        let orig = record.get(field).to_string();
        if orig.is_empty() {
            continue;
        }
        let cleaned = strip_verified_suffix(&orig);
        if cleaned != orig {
            record.set(field, cleaned);
            name_changed = true;
        }
    }
    if name_changed {
        stats.names += 1;
    }

    let orig = record.get(fields::EMAIL).to_string();
    let cleaned = clean_email(&orig);
    if cleaned != orig {
        record.set(fields::EMAIL, cleaned);
        stats.emails += 1;
    }

    let orig = record.get(fields::PHONE_NUMBER).to_string();
    let cleaned = clean_phone(&orig);
    if cleaned != orig {
        record.set(fields::PHONE_NUMBER, cleaned);
        stats.phones += 1;
    }

    let orig = record.get(fields::LINKEDIN).to_string();
    let cleaned = clean_linkedin(&orig);
    if cleaned != orig {
        record.set(fields::LINKEDIN, cleaned);
        stats.linkedin += 1;
    }

    let orig = record.get(fields::ROLE).to_string();
    let cleaned = clean_text_field(&orig);
    if cleaned != orig {
        record.set(fields::ROLE, cleaned);
        stats.roles += 1;
    }

    let orig = record.get(fields::COMPANY).to_string();
    let cleaned = clean_text_field(&orig);
    if cleaned != orig {
        record.set(fields::COMPANY, cleaned);
        stats.companies += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_first_valid_candidate_wins() {
        assert_eq!(
            clean_email("not provided, jane@acme.com, j***@acme.com"),
            "jane@acme.com"
        );
    }

    #[test]
    fn email_rejects_urls_and_example_domain() {
        assert_eq!(clean_email("https://rocketreach.co/jane"), "");
        assert_eq!(clean_email("jane@example.com"), "");
        assert_eq!(clean_email("http://jane@acme.com"), "");
    }

    #[test]
    fn email_idempotent() {
        for input in ["not provided, jane@acme.com", "", "jane@acme.com", "n/a"] {
            let once = clean_email(input);
            assert_eq!(clean_email(&once), once);
        }
    }

    #[test]
    fn phone_rejects_fake_and_short() {
        assert_eq!(clean_phone("555-0123"), "");
        assert_eq!(clean_phone("12345"), "");
        assert_eq!(clean_phone("555-0123, +44 20 7946 0958"), "+44 20 7946 0958");
    }

    #[test]
    fn phone_idempotent() {
        for input in ["555-0123, +44 20 7946 0958", "", "303-492-8463", "none"] {
            let once = clean_phone(input);
            assert_eq!(clean_phone(&once), once);
        }
    }

    #[test]
    fn linkedin_bare_root_rejected() {
        assert_eq!(clean_linkedin("https://linkedin.com"), "");
        assert_eq!(clean_linkedin("https://www.linkedin.com/"), "");
        assert_eq!(
            clean_linkedin("https://linkedin.com/in/janedoe"),
            "https://linkedin.com/in/janedoe"
        );
    }

    #[test]
    fn linkedin_authwall_and_foreign_domains_rejected() {
        assert_eq!(clean_linkedin("https://linkedin.com/authwall?x=1"), "");
        assert_eq!(clean_linkedin("https://twitter.com/janedoe"), "");
        assert_eq!(clean_linkedin("not found"), "");
    }

    #[test]
    fn linkedin_idempotent() {
        for input in [
            "https://linkedin.com/in/janedoe",
            "  https://linkedin.com/in/janedoe  ",
            "https://linkedin.com",
            "",
        ] {
            let once = clean_linkedin(input);
            assert_eq!(clean_linkedin(&once), once);
        }
    }

    #[test]
    fn text_field_junk_emptied() {
        assert_eq!(clean_text_field("Unknown"), "");
        assert_eq!(clean_text_field("  CTO "), "CTO");
    }

    #[test]
    fn text_field_idempotent() {
        for input in ["Unknown", "  CTO ", ""] {
            let once = clean_text_field(input);
            assert_eq!(clean_text_field(&once), once);
        }
    }

    #[test]
    fn record_cleaning_counts_changes() {
        let mut record = PersonRecord::new();
        record.set("name", "Jane DoeVerified");
        record.set("email", "not provided");
        record.set("phone_number", "+1-202-555-0123");
        record.set("linkedin", "https://linkedin.com/in/janedoe");
        record.set("role", "CTO");

        let mut stats = CleanStats::default();
        clean_record(&mut record, &mut stats);

        assert_eq!(record.get("name"), "Jane Doe");
        assert_eq!(record.get("email"), "");
        assert_eq!(record.get("phone_number"), "");
        assert_eq!(record.get("linkedin"), "https://linkedin.com/in/janedoe");
        assert_eq!(stats.names, 1);
        assert_eq!(stats.emails, 1);
        assert_eq!(stats.phones, 1);
        assert_eq!(stats.linkedin, 0);
        assert_eq!(stats.roles, 0);
        assert_eq!(stats.changed(), 3);
    }
}
