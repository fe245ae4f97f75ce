//! Person record model.
//!
//! A record is a string-to-string field map. Canonical contact fields get
//! named accessors; unknown columns from the input table pass through
//! untouched (column ordering lives in [`crate::table::RecordTable`]).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::classify::strip_verified_suffix;

/// Canonical field names.
pub mod fields {
    pub const NAME: &str = "name";
    pub const COMPANY: &str = "company";
    pub const ROLE: &str = "role";
    pub const EMAIL: &str = "email";
    pub const PHONE_NUMBER: &str = "phone_number";
    pub const LINKEDIN: &str = "linkedin";
    pub const SOURCE: &str = "source";
    pub const PHONE_SOURCE: &str = "phone_source";
    pub const PHONE_STATUS: &str = "phone_status";
    pub const PHONE_REVIEW_NOTE: &str = "phone_review_note";
    pub const VERIFIED_PHONE: &str = "verified_phone";
}

/// One person row: field name → string value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(flatten)]
    values: HashMap<String, String>,
}

impl PersonRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field value, or "" when the field is absent.
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    /// Set a field only when it is absent (keeps existing values, including "").
    pub fn set_default(&mut self, field: &str, value: impl Into<String>) {
        if !self.values.contains_key(field) {
            self.values.insert(field.to_string(), value.into());
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn name(&self) -> &str {
        self.get(fields::NAME)
    }

    /// Source attribution for the current phone value.
    ///
    /// Single-record enrichment writes `phone_source`; batched enrichment
    /// writes `source`. Both feed the validator.
    pub fn phone_source(&self) -> &str {
        let specific = self.get(fields::PHONE_SOURCE);
        if !specific.is_empty() {
            specific
        } else {
            self.get(fields::SOURCE)
        }
    }

    /// Progress-log label: "Name (Title) at Company", parts optional.
    pub fn display_label(&self) -> String {
        let mut label = self.name().to_string();
        let title = self.title_or_role();
        if !title.is_empty() {
            label.push_str(&format!(" ({})", title));
        }
        let company = self.get(fields::COMPANY);
        if !company.is_empty() {
            label.push_str(&format!(" at {}", company));
        }
        label
    }

    /// Job title, reading `title` (raw scrape exports) before `role`.
    pub fn title_or_role(&self) -> &str {
        let title = self.get("title");
        if !title.is_empty() {
            title
        } else {
            self.get(fields::ROLE)
        }
    }
}

/// Fixed record shape produced by the upstream follower scraper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FollowerRecord {
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub biography: String,
    #[serde(default)]
    pub external_url: String,
    #[serde(default)]
    pub followers_count: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_business_account: bool,
}

impl FollowerRecord {
    /// Convert into a person record for the pipeline.
    ///
    /// The display name falls back to the username, and a trailing badge
    /// label glued onto the name by the scraper is repaired.
    pub fn into_person_record(self) -> PersonRecord {
        let mut record = PersonRecord::new();
        let name = strip_verified_suffix(&self.full_name);
        let name = if name.is_empty() {
            self.username.clone()
        } else {
            name
        };
        record.set(fields::NAME, name);
        record.set("username", self.username);
        record.set("bio", self.biography);
        record.set("website", self.external_url);
        record.set("followers_count", self.followers_count);
        record.set("is_verified", if self.is_verified { "true" } else { "false" });
        record.set(
            "is_business_account",
            if self.is_business_account { "true" } else { "false" },
        );
        record
    }
}
