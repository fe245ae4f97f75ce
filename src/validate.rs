//! Phone validation state machine.
//!
//! Two phases. Cheap local heuristics first: every phone lands in one of
//! `empty / ok / fake / partial / invalid / suspect`, and `fake`/`invalid`
//! immediately resolve to `removed` with the value cleared. Only the
//! `suspect` subset (numbers that look valid but are attributed to an
//! institutional source) pays for an external verification query, resolving
//! to `verified / rejected / unverified`. This bounds external call volume
//! to the suspect fraction of records.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::answer::{decode_object_answer, str_field, AnswerClient};
use crate::config::Config;
use crate::record::{fields, PersonRecord};
use crate::table::RecordTable;

/// Columns the validation pass introduces.
pub const VALIDATION_FIELDS: &[&str] = &[
    fields::PHONE_STATUS,
    fields::PHONE_REVIEW_NOTE,
    fields::VERIFIED_PHONE,
];

/// Lifecycle status of a phone value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneStatus {
    Empty,
    Ok,
    Fake,
    Partial,
    Invalid,
    Suspect,
    Verified,
    Rejected,
    Removed,
    Unverified,
}

impl PhoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Ok => "ok",
            Self::Fake => "fake",
            Self::Partial => "partial",
            Self::Invalid => "invalid",
            Self::Suspect => "suspect",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::Removed => "removed",
            Self::Unverified => "unverified",
        }
    }
}

/// Per-status counts for a validation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationStats {
    pub total: usize,
    pub empty: usize,
    pub ok: usize,
    pub fake: usize,
    pub partial: usize,
    pub invalid: usize,
    pub suspect: usize,
    pub verified: usize,
    pub rejected: usize,
    pub unverified: usize,
}

impl ValidationStats {
    fn bump(&mut self, status: PhoneStatus) {
        match status {
            PhoneStatus::Empty => self.empty += 1,
            PhoneStatus::Ok => self.ok += 1,
            PhoneStatus::Fake => self.fake += 1,
            PhoneStatus::Partial => self.partial += 1,
            PhoneStatus::Invalid => self.invalid += 1,
            PhoneStatus::Suspect => self.suspect += 1,
            PhoneStatus::Verified => self.verified += 1,
            PhoneStatus::Rejected => self.rejected += 1,
            PhoneStatus::Removed => {}
            PhoneStatus::Unverified => self.unverified += 1,
        }
    }

    /// Numbers cleared or rejected by the run.
    pub fn removed(&self) -> usize {
        self.fake + self.invalid
    }
}

// Compile-once regex patterns via OnceLock.
fn re_masked_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[Xx*\.]{3,}").unwrap())
}

fn re_555() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"555-?\d{4}").unwrap())
}

fn re_ascending_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"123-?4567").unwrap())
}

fn re_zeros_tail() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"000-?0000").unwrap())
}

/// Source attributions that indicate a shared institutional line rather than
/// a personal number: universities, retailers, government, generic contact
/// pages.
fn company_page_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"kroger\.com",
            r"fiu\.edu",
            r"rit\.edu",
            r"utdallas\.edu",
            r"fremont\.gov",
            r"umich\.edu",
            r"stanford\.edu",
            r"/contact-us",
            r"/contact$",
            r"/faqs",
        ]
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
        .collect()
    })
}

/// Heuristic outcome for one phone value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicOutcome {
    pub status: PhoneStatus,
    pub reason: String,
}

/// Classify a phone value, in precedence order. Total over arbitrary input.
pub fn heuristic_check(phone: &str, source: &str) -> HeuristicOutcome {
    let phone = phone.trim();
    if phone.is_empty() {
        return HeuristicOutcome {
            status: PhoneStatus::Empty,
            reason: "no phone".to_string(),
        };
    }

    // Masked/partial numbers (XXXX, ****, ....)
    if re_masked_run().is_match(phone) {
        return HeuristicOutcome {
            status: PhoneStatus::Partial,
            reason: format!("masked/partial number: {}", phone),
        };
    }

    if re_555().is_match(phone) {
        return HeuristicOutcome {
            status: PhoneStatus::Fake,
            reason: format!("likely fake 555 number: {}", phone),
        };
    }

    let digits = crate::classify::digits(phone);
    if digits.len() < 7 {
        return HeuristicOutcome {
            status: PhoneStatus::Invalid,
            reason: format!("too few digits ({}): {}", digits.len(), phone),
        };
    }
    if digits.len() > 15 {
        return HeuristicOutcome {
            status: PhoneStatus::Invalid,
            reason: format!("too many digits ({}): {}", digits.len(), phone),
        };
    }

    if re_zeros_tail().is_match(phone) {
        return HeuristicOutcome {
            status: PhoneStatus::Fake,
            reason: format!("zeros pattern: {}", phone),
        };
    }
    if re_ascending_placeholder().is_match(phone) || crate::classify::is_fake_phone(phone) {
        return HeuristicOutcome {
            status: PhoneStatus::Fake,
            reason: format!("placeholder number: {}", phone),
        };
    }

    if company_page_patterns().iter().any(|p| p.is_match(source)) {
        return HeuristicOutcome {
            status: PhoneStatus::Suspect,
            reason: format!("likely company/org number from {}", source),
        };
    }

    HeuristicOutcome {
        status: PhoneStatus::Ok,
        reason: "passed heuristic checks".to_string(),
    }
}

/// Apply the heuristic outcome to a record: write status/note columns, clear
/// fake and invalid numbers. Returns the status the record lands in.
pub fn apply_heuristic(record: &mut PersonRecord) -> PhoneStatus {
    let phone = record.get(fields::PHONE_NUMBER).trim().to_string();
    let source = record.phone_source().trim().to_string();
    let outcome = heuristic_check(&phone, &source);

    record.set(fields::PHONE_STATUS, outcome.status.as_str());
    record.set(fields::PHONE_REVIEW_NOTE, outcome.reason);
    record.set(fields::VERIFIED_PHONE, "");

    match outcome.status {
        PhoneStatus::Fake | PhoneStatus::Invalid => {
            record.set(fields::PHONE_NUMBER, "");
            record.set(fields::PHONE_STATUS, PhoneStatus::Removed.as_str());
        }
        _ => {}
    }
    outcome.status
}

// ---------------------------------------------------------------------------
// Verification of suspect numbers
// ---------------------------------------------------------------------------

fn verify_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "is_valid": {
                "type": "boolean",
                "description": "True if the phone number is likely correct for this specific person.",
            },
            "reason": {
                "type": "string",
                "description": "Brief explanation of why it is or isn't valid.",
            },
            "corrected_phone": {
                "type": "string",
                "description": "Corrected phone number if you found the right one. Empty string otherwise.",
            },
        },
        "required": ["is_valid", "reason", "corrected_phone"],
    })
}

/// Build the verification query for a suspect number, with whatever
/// auxiliary context the record carries.
pub fn build_verify_query(record: &PersonRecord) -> String {
    let name = record.name().trim();
    let phone = record.get(fields::PHONE_NUMBER).trim();
    let bio = record.get("bio").trim();
    let location = record.get("location").trim();
    let email = record.get(fields::EMAIL).trim();

    let mut person_desc = name.to_string();
    if !bio.is_empty() {
        let short: String = bio.chars().take(100).collect();
        person_desc.push_str(&format!(" ({})", short));
    }
    if !location.is_empty() {
        person_desc.push_str(&format!(" in {}", location));
    }

    format!(
        "Verify: does the phone number {} belong to {}? \
         Their email is {}. \
         Search for this person and check if this phone number is actually theirs, \
         or if it's a company main line / wrong person / generic number. \
         If you find their real phone number, provide it.",
        phone, person_desc, email
    )
}

/// Verification verdict. `is_valid` stays `None` when the service could not
/// decide or the call failed.
#[derive(Debug, Clone, Default)]
pub struct Verification {
    pub is_valid: Option<bool>,
    pub reason: String,
    pub corrected_phone: String,
}

/// Decode a verification answer, tolerating the object-or-string shapes.
pub fn parse_verification(answer: &Value) -> Verification {
    match decode_object_answer(answer) {
        Some(map) => Verification {
            is_valid: map.get("is_valid").and_then(Value::as_bool),
            reason: str_field(&map, "reason"),
            corrected_phone: str_field(&map, "corrected_phone"),
        },
        None => {
            let reason = match answer {
                Value::String(text) => text.chars().take(200).collect(),
                _ => String::new(),
            };
            Verification {
                is_valid: None,
                reason,
                corrected_phone: String::new(),
            }
        }
    }
}

/// Ask the answer service whether a suspect number belongs to the person.
pub async fn verify_phone(client: &AnswerClient, record: &PersonRecord) -> Verification {
    let query = build_verify_query(record);
    match client.answer(&query, &verify_schema()).await {
        Ok(answer) => parse_verification(&answer),
        Err(e) => Verification {
            is_valid: None,
            reason: format!("API error: {}", e),
            corrected_phone: String::new(),
        },
    }
}

/// Apply a verification verdict to a suspect record.
///
/// - valid → `verified`, phone retained;
/// - invalid with a correction → `rejected`, the correction replaces the
///   phone and is stored in `verified_phone`;
/// - invalid without a correction → `rejected`, phone cleared;
/// - indeterminate → `unverified`, phone retained for manual review.
pub fn apply_verification(record: &mut PersonRecord, verdict: &Verification) -> PhoneStatus {
    match verdict.is_valid {
        Some(true) => {
            record.set(fields::PHONE_STATUS, PhoneStatus::Verified.as_str());
            record.set(
                fields::PHONE_REVIEW_NOTE,
                format!("Verified: {}", verdict.reason),
            );
            PhoneStatus::Verified
        }
        Some(false) => {
            record.set(fields::PHONE_STATUS, PhoneStatus::Rejected.as_str());
            record.set(
                fields::PHONE_REVIEW_NOTE,
                format!("Rejected: {}", verdict.reason),
            );
            if verdict.corrected_phone.is_empty() {
                record.set(fields::PHONE_NUMBER, "");
            } else {
                record.set(fields::VERIFIED_PHONE, verdict.corrected_phone.clone());
                record.set(fields::PHONE_NUMBER, verdict.corrected_phone.clone());
            }
            PhoneStatus::Rejected
        }
        None => {
            record.set(fields::PHONE_STATUS, PhoneStatus::Unverified.as_str());
            record.set(
                fields::PHONE_REVIEW_NOTE,
                format!("Could not verify: {}", verdict.reason),
            );
            PhoneStatus::Unverified
        }
    }
}

/// Validate a whole table: heuristic pass over every record, then one
/// verification query per suspect with a courtesy pause between calls.
pub async fn validate_table(
    client: &AnswerClient,
    table: &mut RecordTable,
    config: &Config,
) -> ValidationStats {
    for field in VALIDATION_FIELDS {
        table.ensure_column(field);
    }

    let mut stats = ValidationStats {
        total: table.len(),
        ..Default::default()
    };

    let mut suspects = Vec::new();
    for (index, record) in table.records_mut().iter_mut().enumerate() {
        let status = apply_heuristic(record);
        stats.bump(status);
        match status {
            PhoneStatus::Fake | PhoneStatus::Invalid => {
                log::info!("REMOVED  {}: {}", record.name(), record.get(fields::PHONE_REVIEW_NOTE));
            }
            PhoneStatus::Partial => {
                log::info!("PARTIAL  {}: {}", record.name(), record.get(fields::PHONE_REVIEW_NOTE));
            }
            PhoneStatus::Suspect => {
                log::info!("SUSPECT  {}: {}", record.name(), record.get(fields::PHONE_REVIEW_NOTE));
                suspects.push(index);
            }
            _ => {}
        }
    }

    if suspects.is_empty() {
        return stats;
    }

    log::info!("Verifying {} suspect numbers", suspects.len());
    let delay = Duration::from_millis(config.verify_delay_ms);
    let last = suspects.len() - 1;

    for (position, index) in suspects.into_iter().enumerate() {
        let record = &mut table.records_mut()[index];
        log::info!(
            "[{}/{}] {} — {}",
            position + 1,
            last + 1,
            record.name(),
            record.get(fields::PHONE_NUMBER)
        );

        let verdict = verify_phone(client, record).await;
        let status = apply_verification(record, &verdict);
        stats.bump(status);
        match status {
            PhoneStatus::Verified => log::info!("    VERIFIED: {}", verdict.reason),
            PhoneStatus::Rejected => {
                log::info!("    REJECTED: {}", verdict.reason);
                if !verdict.corrected_phone.is_empty() {
                    log::info!("    CORRECTED -> {}", verdict.corrected_phone);
                }
            }
            _ => log::warn!("    UNVERIFIED: {}", verdict.reason),
        }

        if position < last {
            tokio::time::sleep(delay).await;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(phone: &str, source: &str) -> (PhoneStatus, String) {
        let o = heuristic_check(phone, source);
        (o.status, o.reason)
    }

    #[test]
    fn empty_phone_is_terminal() {
        assert_eq!(outcome("", "").0, PhoneStatus::Empty);
        assert_eq!(outcome("   ", "").0, PhoneStatus::Empty);
    }

    #[test]
    fn masked_runs_flag_partial() {
        assert_eq!(outcome("+1 303 XXX-4821", "").0, PhoneStatus::Partial);
        assert_eq!(outcome("303-***-4821", "").0, PhoneStatus::Partial);
        assert_eq!(outcome("303....4821", "").0, PhoneStatus::Partial);
        // Masking takes precedence over the length rule
        assert_eq!(outcome("XXX", "").0, PhoneStatus::Partial);
    }

    #[test]
    fn fake_555_detected() {
        assert_eq!(outcome("+1-202-555-0123", "").0, PhoneStatus::Fake);
        assert_eq!(outcome("5550123", "").0, PhoneStatus::Fake);
    }

    #[test]
    fn digit_count_bounds() {
        let (status, reason) = outcome("303-49", "");
        assert_eq!(status, PhoneStatus::Invalid);
        assert!(reason.contains("too few digits (5)"));
        assert_eq!(
            outcome("+1 303 492 8463 8463 8463", "").0,
            PhoneStatus::Invalid
        );
    }

    #[test]
    fn placeholder_sequences_are_fake() {
        assert_eq!(outcome("123-456-7890", "").0, PhoneStatus::Fake);
        assert_eq!(outcome("+1 303 000-0000", "").0, PhoneStatus::Fake);
    }

    #[test]
    fn institutional_sources_are_suspect() {
        let (status, reason) = outcome("+1 305 348 2000", "contact@fiu.edu");
        assert_eq!(status, PhoneStatus::Suspect);
        assert!(reason.contains("fiu.edu"));
        assert_eq!(
            outcome("+1 510 284 4000", "https://fremont.gov/residents").0,
            PhoneStatus::Suspect
        );
        assert_eq!(
            outcome("+1 303 492 8463", "https://acme.com/contact").0,
            PhoneStatus::Suspect
        );
        // "/contact" only matches at the end of the attribution
        assert_eq!(
            outcome("+1 303 492 8463", "https://acme.com/contacting-jane").0,
            PhoneStatus::Ok
        );
    }

    #[test]
    fn clean_numbers_pass() {
        assert_eq!(outcome("212-867-5309", "jane.dev").0, PhoneStatus::Ok);
    }

    #[test]
    fn heuristic_removal_clears_fake_numbers() {
        let mut record = PersonRecord::new();
        record.set("name", "Jane Doe");
        record.set("phone_number", "123-456-7890");
        let status = apply_heuristic(&mut record);
        assert_eq!(status, PhoneStatus::Fake);
        assert_eq!(record.get("phone_status"), "removed");
        assert_eq!(record.get("phone_number"), "");
        assert_eq!(record.get("verified_phone"), "");
    }

    #[test]
    fn heuristic_keeps_partial_numbers() {
        let mut record = PersonRecord::new();
        record.set("phone_number", "303-XXX-4821");
        apply_heuristic(&mut record);
        assert_eq!(record.get("phone_status"), "partial");
        assert_eq!(record.get("phone_number"), "303-XXX-4821");
    }

    #[test]
    fn verification_accepts_valid_numbers() {
        let mut record = PersonRecord::new();
        record.set("phone_number", "+1 305 348 2000");
        let verdict = Verification {
            is_valid: Some(true),
            reason: "listed on her personal site".into(),
            corrected_phone: String::new(),
        };
        assert_eq!(apply_verification(&mut record, &verdict), PhoneStatus::Verified);
        assert_eq!(record.get("phone_status"), "verified");
        assert_eq!(record.get("phone_number"), "+1 305 348 2000");
        assert!(record.get("phone_review_note").starts_with("Verified:"));
    }

    #[test]
    fn verification_rejection_with_correction_replaces_phone() {
        let mut record = PersonRecord::new();
        record.set("phone_number", "+1 305 348 2000");
        record.set("verified_phone", "");
        let verdict = Verification {
            is_valid: Some(false),
            reason: "that is the university switchboard".into(),
            corrected_phone: "+1 305 555 1234".into(),
        };
        assert_eq!(apply_verification(&mut record, &verdict), PhoneStatus::Rejected);
        assert_eq!(record.get("phone_status"), "rejected");
        assert_eq!(record.get("verified_phone"), "+1 305 555 1234");
        assert_eq!(record.get("phone_number"), "+1 305 555 1234");
    }

    #[test]
    fn verification_rejection_without_correction_clears_phone() {
        let mut record = PersonRecord::new();
        record.set("phone_number", "+1 305 348 2000");
        let verdict = Verification {
            is_valid: Some(false),
            reason: "wrong person".into(),
            corrected_phone: String::new(),
        };
        apply_verification(&mut record, &verdict);
        assert_eq!(record.get("phone_number"), "");
        assert_eq!(record.get("verified_phone"), "");
    }

    #[test]
    fn indeterminate_verification_is_explicit() {
        let mut record = PersonRecord::new();
        record.set("phone_number", "+1 305 348 2000");
        let verdict = Verification {
            is_valid: None,
            reason: "API error: timeout".into(),
            corrected_phone: String::new(),
        };
        assert_eq!(
            apply_verification(&mut record, &verdict),
            PhoneStatus::Unverified
        );
        assert_eq!(record.get("phone_status"), "unverified");
        assert_eq!(record.get("phone_number"), "+1 305 348 2000");
        assert!(record.get("phone_review_note").starts_with("Could not verify:"));
    }

    #[test]
    fn parse_verification_shapes() {
        let structured = serde_json::json!({
            "is_valid": false,
            "reason": "switchboard",
            "corrected_phone": "+1 303 555 9999",
        });
        let v = parse_verification(&structured);
        assert_eq!(v.is_valid, Some(false));
        assert_eq!(v.corrected_phone, "+1 303 555 9999");

        let text = serde_json::json!("I can't tell whose number this is.");
        let v = parse_verification(&text);
        assert_eq!(v.is_valid, None);
        assert!(v.reason.starts_with("I can't tell"));
    }

    #[test]
    fn verify_query_embeds_context() {
        let mut record = PersonRecord::new();
        record.set("name", "Jane Doe");
        record.set("phone_number", "+1 305 348 2000");
        record.set("bio", "Professor of Marine Biology");
        record.set("location", "Miami");
        record.set("email", "jdoe@fiu.edu");
        let query = build_verify_query(&record);
        assert!(query.contains("+1 305 348 2000"));
        assert!(query.contains("Jane Doe (Professor of Marine Biology) in Miami"));
        assert!(query.contains("Their email is jdoe@fiu.edu."));
    }
}
