//! Pipeline driver.
//!
//! Sequences the stages over one record table: clean → enrich → validate.
//! The driver owns the records for the duration of a run; stages execute
//! sequentially and per-unit external failures have already been degraded to
//! empty results by the time they reach this layer.

use chrono::Utc;
use serde::Serialize;

use crate::answer::AnswerClient;
use crate::clean::{clean_record, CleanStats};
use crate::config::Config;
use crate::enrich::{batch, single};
use crate::error::PipelineError;
use crate::record::fields;
use crate::table::RecordTable;
use crate::validate::{self, ValidationStats};

/// How many records carry each contact field. Computed from the table alone,
/// so the numbers are reproducible from the output file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub total: usize,
    pub with_linkedin: usize,
    pub with_email: usize,
    pub with_phone: usize,
    pub with_role: usize,
    pub with_any: usize,
}

/// Count contact-field coverage across a table.
pub fn coverage(table: &RecordTable) -> Coverage {
    let mut cov = Coverage {
        total: table.len(),
        ..Default::default()
    };
    for record in table.records() {
        let linkedin = !record.get(fields::LINKEDIN).is_empty()
            || !record.get("linkedin_url").is_empty();
        let email = !record.get(fields::EMAIL).is_empty();
        let phone = !record.get(fields::PHONE_NUMBER).is_empty();
        if linkedin {
            cov.with_linkedin += 1;
        }
        if email {
            cov.with_email += 1;
        }
        if phone {
            cov.with_phone += 1;
        }
        if !record.get(fields::ROLE).is_empty() {
            cov.with_role += 1;
        }
        if linkedin || email || phone {
            cov.with_any += 1;
        }
    }
    cov
}

/// Per-run accounting: what was processed, what changed, what remains.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: String,
    pub total: usize,
    pub clean: CleanStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationStats>,
    pub coverage: Coverage,
}

/// Clean every record in place, returning per-field change counts.
pub fn clean_table(table: &mut RecordTable) -> CleanStats {
    let mut stats = CleanStats {
        total: table.len(),
        ..Default::default()
    };
    for record in table.records_mut() {
        clean_record(record, &mut stats);
    }
    stats
}

/// Which enrichment variant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichMode {
    /// Batched phone + email lookup.
    Batch,
    /// Per-record contact lookup with bio/location context.
    Contact,
    /// Per-record LinkedIn profile lookup.
    Linkedin,
}

/// Run one enrichment stage over the table.
pub async fn enrich_table(
    client: &AnswerClient,
    table: &mut RecordTable,
    config: &Config,
    mode: EnrichMode,
) -> usize {
    match mode {
        EnrichMode::Batch => batch::enrich_table(client, table, config).await,
        EnrichMode::Contact => single::enrich_table_contacts(client, table, config).await,
        EnrichMode::Linkedin => single::enrich_table_linkedin(client, table, config).await,
    }
}

/// Full pipeline over one input table: clean → batched enrich → validate.
pub async fn run_all(
    client: &AnswerClient,
    table: &mut RecordTable,
    config: &Config,
) -> Result<RunSummary, PipelineError> {
    let started_at = Utc::now().to_rfc3339();

    log::info!("Cleaning {} records", table.len());
    let clean = clean_table(table);
    log::info!("Cleaned {} field values", clean.changed());

    log::info!("Enriching {} records (batch size {})", table.len(), config.batch_size);
    let matched = batch::enrich_table(client, table, config).await;
    log::info!("Matched {}/{} records", matched, table.len());

    log::info!("Validating phone numbers");
    let validation = validate::validate_table(client, table, config).await;

    Ok(RunSummary {
        started_at,
        total: table.len(),
        clean,
        validation: Some(validation),
        coverage: coverage(table),
    })
}

/// Log a run summary in a shape a reviewer can eyeball.
pub fn log_summary(summary: &RunSummary) {
    log::info!("Total rows:       {}", summary.total);
    log::info!("Names fixed:      {}", summary.clean.names);
    log::info!("Emails cleaned:   {}", summary.clean.emails);
    log::info!("Phones cleaned:   {}", summary.clean.phones);
    log::info!("LinkedIn cleaned: {}", summary.clean.linkedin);
    log::info!(
        "Roles cleaned:    {}",
        summary.clean.roles + summary.clean.companies
    );
    if let Some(ref v) = summary.validation {
        log::info!("Phone status:     ok {} / verified {} / partial {} / unverified {}",
            v.ok, v.verified, v.partial, v.unverified);
        log::info!("Phones removed:   {}", v.removed() + v.rejected);
        log::info!("No phone found:   {}", v.empty);
    }
    let c = &summary.coverage;
    log::info!("With LinkedIn:    {}/{}", c.with_linkedin, c.total);
    log::info!("With email:       {}/{}", c.with_email, c.total);
    log::info!("With phone:       {}/{}", c.with_phone, c.total);
    log::info!("With role:        {}/{}", c.with_role, c.total);
    log::info!("With any data:    {}/{}", c.with_any, c.total);
}
