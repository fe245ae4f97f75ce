//! Contact enrichment and validation for people lists.
//!
//! Takes a table of people (a scraped follower export or any CSV with a
//! `name` column), looks up contact data (LinkedIn, email, phone, role,
//! company) through a natural-language answer service, and cleans/validates
//! the results against heuristics for placeholder, fake, and masked values.
//!
//! Stages run one direction: raw records → cleaned records → enriched
//! records → validated records → output table.

pub mod answer;
pub mod classify;
pub mod clean;
pub mod config;
pub mod enrich;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod table;
pub mod validate;
