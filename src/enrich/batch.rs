//! Batched contact enrichment.
//!
//! Groups records into fixed-size windows, renders one natural-language
//! query per window, and reconciles the structured answers back onto the
//! originating records by exact lower-cased name match. A failed lookup
//! degrades to an empty result set for that batch and the run continues.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::{json, Value};

use crate::answer::{decode_array_answer, str_field, AnswerClient};
use crate::config::Config;
use crate::record::{fields, PersonRecord};
use crate::table::RecordTable;

/// Columns the batched lookup introduces on every record.
pub const BATCH_FIELDS: &[&str] = &[fields::PHONE_NUMBER, fields::EMAIL, fields::SOURCE];

/// Key under which the service wraps the per-person result array.
const RESULT_ARRAY_KEY: &str = "people";

/// Output schema for the batched people lookup.
fn people_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "people": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "The person's full name as provided.",
                        },
                        "phone_number": {
                            "type": "string",
                            "description": "Phone number with country code. Empty string if not found.",
                        },
                        "email": {
                            "type": "string",
                            "description": "Email address. Empty string if not found.",
                        },
                        "source": {
                            "type": "string",
                            "description": "Where the contact info was found.",
                        },
                    },
                    "required": ["name", "phone_number", "email", "source"],
                },
            },
        },
        "required": ["people"],
    })
}

/// One description line per person: name, optional title, optional company,
/// optional handle annotation, joined with " - ".
pub fn render_people_list(records: &[PersonRecord]) -> String {
    records
        .iter()
        .map(|record| {
            let mut parts = vec![record.name().to_string()];
            let title = record.title_or_role();
            if !title.is_empty() {
                parts.push(title.to_string());
            }
            let company = record.get(fields::COMPANY);
            if !company.is_empty() {
                parts.push(format!("at {}", company));
            }
            let instagram = record.get("instagram");
            let instagram = if instagram.is_empty() {
                record.get("username")
            } else {
                instagram
            };
            if !instagram.is_empty() {
                parts.push(format!("(Instagram: @{})", instagram.trim_start_matches('@')));
            }
            parts.join(" - ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The full query for one batch.
pub fn build_batch_query(records: &[PersonRecord]) -> String {
    format!(
        "Here are some people:\n\n{}\n\n\
         What are the phone numbers and emails of these people? \
         Search public directories, personal websites, about pages, and contact pages. \
         Give in array structure.",
        render_people_list(records)
    )
}

/// Copy matched answers onto records by exact lower-cased trimmed name.
///
/// Unmatched records keep their existing values and receive empty defaults
/// for every new column, never an error. Matching is deliberately exact
/// after normalization; formatting drift in returned names fails to match.
pub fn apply_batch_results(records: &mut [PersonRecord], results: &[Value]) -> usize {
    let mut by_name: HashMap<String, &Value> = HashMap::new();
    for result in results {
        if let Some(name) = result.get("name").and_then(Value::as_str) {
            let key = name.trim().to_lowercase();
            if !key.is_empty() {
                by_name.insert(key, result);
            }
        }
    }

    let mut matched = 0;
    for record in records.iter_mut() {
        let key = record.name().trim().to_lowercase();
        match by_name.get(&key).and_then(|v| v.as_object()) {
            Some(map) => {
                for field in BATCH_FIELDS {
                    record.set(*field, str_field(map, field));
                }
                matched += 1;
            }
            None => {
                for field in BATCH_FIELDS {
                    record.set_default(field, "");
                }
            }
        }
    }
    matched
}

/// Look up one batch. Transport/decode failures degrade to an empty result
/// set; every record still receives its default columns.
pub async fn enrich_batch(client: &AnswerClient, records: &mut [PersonRecord]) -> usize {
    let query = build_batch_query(records);
    let results = match client.answer(&query, &people_schema()).await {
        Ok(answer) => decode_array_answer(&answer, RESULT_ARRAY_KEY),
        Err(e) => {
            log::warn!("Batch lookup failed: {}", e);
            Vec::new()
        }
    };
    apply_batch_results(records, &results)
}

/// Enrich a whole table in contiguous batches with a courtesy pause between
/// calls (not after the last). Returns the number of records matched.
pub async fn enrich_table(
    client: &AnswerClient,
    table: &mut RecordTable,
    config: &Config,
) -> usize {
    for field in BATCH_FIELDS {
        table.ensure_column(field);
    }

    let batch_size = config.batch_size.max(1);
    let total_batches = table.len().div_ceil(batch_size);
    let delay = Duration::from_millis(config.batch_delay_ms);

    let mut matched = 0;
    for (index, batch) in table.records_mut().chunks_mut(batch_size).enumerate() {
        let names: Vec<&str> = batch.iter().map(|r| r.name()).collect();
        log::info!(
            "Batch {}/{}: {}",
            index + 1,
            total_batches,
            names.join(", ")
        );

        let batch_matched = enrich_batch(client, batch).await;
        matched += batch_matched;
        if batch_matched == 0 {
            log::warn!("Batch {}/{}: no results matched", index + 1, total_batches);
        }

        if index + 1 < total_batches {
            tokio::time::sleep(delay).await;
        }
    }
    matched
}
