//! Single-record enrichment.
//!
//! Cardinality-1 variant of the batch coordinator: one query per record with
//! the record's own context (bio, location, email, profile links) embedded in
//! the prompt to maximize answer quality. Two query variants: a contact
//! lookup (phone, alternate email, socials) and a LinkedIn profile lookup.

use std::time::Duration;

use serde_json::{json, Value};

use crate::answer::{decode_object_answer, str_field, AnswerClient};
use crate::config::Config;
use crate::record::{fields, PersonRecord};
use crate::table::RecordTable;

/// Columns the contact lookup introduces.
pub const CONTACT_FIELDS: &[&str] = &[
    fields::PHONE_NUMBER,
    fields::PHONE_SOURCE,
    "personal_email",
    "found_twitter",
    "found_website",
];

/// Columns the LinkedIn lookup introduces.
pub const LINKEDIN_FIELDS: &[&str] = &["linkedin_url", "linkedin_headline", "confidence"];

// ---------------------------------------------------------------------------
// Context assembly
// ---------------------------------------------------------------------------

/// Per-record context pulled from existing columns and the raw scrape payload.
#[derive(Debug, Clone, Default)]
pub struct RecordContext {
    pub name: String,
    pub email: String,
    pub bio: String,
    pub location: String,
    pub linkedin: String,
    pub twitter: String,
    pub links: Vec<String>,
}

/// Assemble the lookup context for one record.
///
/// Profile links buried in a `raw_response` JSON column (a `links` array and
/// a `twitterHandle` field) supplement whatever the flat columns carry.
pub fn extract_context(record: &PersonRecord) -> RecordContext {
    let mut ctx = RecordContext {
        name: record.name().trim().to_string(),
        email: record.get(fields::EMAIL).trim().to_string(),
        bio: record.get("bio").trim().to_string(),
        location: record.get("location").trim().to_string(),
        linkedin: record.get(fields::LINKEDIN).trim().to_string(),
        twitter: record.get("twitter").trim().to_string(),
        links: Vec::new(),
    };

    let raw = record.get("raw_response").trim();
    if raw.is_empty() {
        return ctx;
    }
    let data: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => return ctx,
    };

    if let Some(links) = data.get("links").and_then(Value::as_array) {
        for link in links {
            let url = link.get("url").and_then(Value::as_str).unwrap_or("");
            let title = link.get("title").and_then(Value::as_str).unwrap_or("");
            if url.contains("linkedin.com") {
                ctx.linkedin = url.to_string();
            } else if url.contains("twitter.com") || title.starts_with('@') {
                ctx.twitter = url.to_string();
            } else if !url.is_empty() {
                ctx.links.push(url.to_string());
            }
        }
    }

    if let Some(handle) = data.get("twitterHandle").and_then(Value::as_str) {
        if !handle.is_empty() {
            ctx.twitter = format!("@{}", handle);
        }
    }

    ctx
}

// ---------------------------------------------------------------------------
// Contact lookup
// ---------------------------------------------------------------------------

fn contact_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "phone_number": {
                "type": "string",
                "description": "Phone number with country code. Empty string if not found.",
            },
            "phone_source": {
                "type": "string",
                "description": "URL or name of site where phone was found.",
            },
            "personal_email": {
                "type": "string",
                "description": "Personal or alternate email if found. Empty string if not found.",
            },
            "twitter": {
                "type": "string",
                "description": "Twitter/X handle or URL. Empty string if not found.",
            },
            "website": {
                "type": "string",
                "description": "Personal website URL. Empty string if not found.",
            },
        },
        "required": ["phone_number", "phone_source", "personal_email", "twitter", "website"],
    })
}

/// Build the contact-lookup query from a record's context.
pub fn build_contact_query(ctx: &RecordContext) -> String {
    let mut lines = vec![format!("Find the phone number for {}.", ctx.name)];
    if !ctx.bio.is_empty() {
        lines.push(format!("They are {}.", ctx.bio));
    }
    if !ctx.location.is_empty() {
        lines.push(format!("Located in {}.", ctx.location));
    }
    if !ctx.email.is_empty() {
        lines.push(format!("Their email is {}.", ctx.email));
    }
    if !ctx.linkedin.is_empty() {
        lines.push(format!("Their LinkedIn is {}.", ctx.linkedin));
    }
    if !ctx.twitter.is_empty() {
        lines.push(format!("Their Twitter is {}.", ctx.twitter));
    }
    if !ctx.links.is_empty() {
        lines.push(format!("Other profiles: {}.", ctx.links.join(", ")));
    }
    lines.push(
        "Search public directories, personal websites, contact pages, \
         Crunchbase, AngelList, company about pages, and any public records. \
         Return their phone number, any alternate email, Twitter, and personal website."
            .to_string(),
    );
    lines.join(" ")
}

/// Decoded contact answer; all fields default to empty.
#[derive(Debug, Clone, Default)]
pub struct ContactAnswer {
    pub phone_number: String,
    pub phone_source: String,
    pub personal_email: String,
    pub twitter: String,
    pub website: String,
}

/// Decode a contact answer, tolerating the object-or-string shapes.
pub fn parse_contact_answer(answer: &Value) -> ContactAnswer {
    match decode_object_answer(answer) {
        Some(map) => ContactAnswer {
            phone_number: str_field(&map, "phone_number"),
            phone_source: str_field(&map, "phone_source"),
            personal_email: str_field(&map, "personal_email"),
            twitter: str_field(&map, "twitter"),
            website: str_field(&map, "website"),
        },
        None => ContactAnswer::default(),
    }
}

/// Look up contact data for one record. Failures degrade to empty fields.
pub async fn enrich_contact(client: &AnswerClient, record: &mut PersonRecord) -> bool {
    let ctx = extract_context(record);
    let query = build_contact_query(&ctx);
    let result = match client.answer(&query, &contact_schema()).await {
        Ok(answer) => parse_contact_answer(&answer),
        Err(e) => {
            log::warn!("Contact lookup failed for {}: {}", ctx.name, e);
            ContactAnswer::default()
        }
    };

    record.set(fields::PHONE_NUMBER, result.phone_number.clone());
    record.set(fields::PHONE_SOURCE, result.phone_source);
    record.set("personal_email", result.personal_email);
    record.set("found_twitter", result.twitter);
    record.set("found_website", result.website);
    !result.phone_number.is_empty()
}

/// Contact-enrich a whole table, one record at a time. Returns the number of
/// records that gained a phone number.
pub async fn enrich_table_contacts(
    client: &AnswerClient,
    table: &mut RecordTable,
    config: &Config,
) -> usize {
    for field in CONTACT_FIELDS {
        table.ensure_column(field);
    }

    let total = table.len();
    let delay = Duration::from_millis(config.record_delay_ms);
    let mut found = 0;

    for index in 0..total {
        let record = &mut table.records_mut()[index];
        if record.name().trim().is_empty() {
            continue;
        }
        log::info!("[{}/{}] {}", index + 1, total, record.display_label());

        if enrich_contact(client, record).await {
            found += 1;
            log::info!(
                "    phone: {} (via {})",
                record.get(fields::PHONE_NUMBER),
                record.get(fields::PHONE_SOURCE)
            );
        } else {
            log::info!("    no phone");
        }

        if index + 1 < total {
            tokio::time::sleep(delay).await;
        }
    }
    found
}

// ---------------------------------------------------------------------------
// LinkedIn lookup
// ---------------------------------------------------------------------------

fn linkedin_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "linkedin_url": {
                "type": "string",
                "description": "The LinkedIn profile URL for this person. Empty string if not found.",
            },
            "linkedin_headline": {
                "type": "string",
                "description": "The person's LinkedIn headline or current role description.",
            },
            "confidence": {
                "type": "string",
                "enum": ["high", "medium", "low"],
                "description": "How confident you are this is the right person.",
            },
        },
        "required": ["linkedin_url", "linkedin_headline", "confidence"],
    })
}

/// Build the LinkedIn-lookup query for a person description.
pub fn build_linkedin_query(record: &PersonRecord) -> String {
    let mut desc = record.name().trim().to_string();
    let title = record.title_or_role();
    if !title.is_empty() {
        desc.push_str(&format!(", {}", title));
    }
    let company = record.get(fields::COMPANY);
    if !company.is_empty() {
        desc.push_str(&format!(" at {}", company));
    }
    format!(
        "Find the LinkedIn profile URL for {}. \
         Search LinkedIn specifically. \
         Return their exact linkedin.com/in/ profile URL and their headline.",
        desc
    )
}

/// Decoded LinkedIn answer.
#[derive(Debug, Clone, Default)]
pub struct LinkedinAnswer {
    pub url: String,
    pub headline: String,
    pub confidence: String,
}

/// Scan free text for a token containing a profile URL.
pub fn salvage_linkedin_url(text: &str) -> String {
    text.split_whitespace()
        .find(|word| word.contains("linkedin.com/in/"))
        .map(|word| word.trim_matches(|c| "(),\"'".contains(c)).to_string())
        .unwrap_or_default()
}

/// Decode a LinkedIn answer. A text answer that won't parse as the expected
/// object is salvaged: any profile URL in the text is kept, and the text
/// itself (truncated) becomes the headline.
pub fn parse_linkedin_answer(answer: &Value) -> LinkedinAnswer {
    if let Some(map) = decode_object_answer(answer) {
        return LinkedinAnswer {
            url: str_field(&map, "linkedin_url"),
            headline: str_field(&map, "linkedin_headline"),
            confidence: str_field(&map, "confidence"),
        };
    }
    if let Value::String(text) = answer {
        return LinkedinAnswer {
            url: salvage_linkedin_url(text),
            headline: text.chars().take(200).collect(),
            confidence: String::new(),
        };
    }
    LinkedinAnswer::default()
}

/// Look up the LinkedIn profile for one record.
pub async fn enrich_linkedin(client: &AnswerClient, record: &mut PersonRecord) -> bool {
    let query = build_linkedin_query(record);
    let result = match client.answer(&query, &linkedin_schema()).await {
        Ok(answer) => parse_linkedin_answer(&answer),
        Err(e) => {
            log::warn!("LinkedIn lookup failed for {}: {}", record.name(), e);
            LinkedinAnswer::default()
        }
    };

    record.set("linkedin_url", result.url.clone());
    record.set("linkedin_headline", result.headline);
    record.set("confidence", result.confidence);
    !result.url.is_empty()
}

/// LinkedIn-enrich a whole table, one record at a time.
pub async fn enrich_table_linkedin(
    client: &AnswerClient,
    table: &mut RecordTable,
    config: &Config,
) -> usize {
    for field in LINKEDIN_FIELDS {
        table.ensure_column(field);
    }

    let total = table.len();
    let delay = Duration::from_millis(config.record_delay_ms);
    let mut found = 0;

    for index in 0..total {
        let record = &mut table.records_mut()[index];
        if record.name().trim().is_empty() {
            continue;
        }
        log::info!("[{}/{}] {}", index + 1, total, record.display_label());

        if enrich_linkedin(client, record).await {
            found += 1;
            log::info!("    -> {}", record.get("linkedin_url"));
        } else {
            log::info!("    no LinkedIn found");
        }

        if index + 1 < total {
            tokio::time::sleep(delay).await;
        }
    }
    found
}
