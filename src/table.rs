//! Tabular file I/O.
//!
//! UTF-8 delimited text with a header row, one record per row. Column order
//! is preserved from the input; columns added by a stage are appended at the
//! end. Reads tolerate NUL bytes (some scrape exports carry them) and ragged
//! rows; writes serialize every row over the full column set.

use std::path::Path;

use crate::error::PipelineError;
use crate::record::{FollowerRecord, PersonRecord};

/// An ordered set of columns plus the records read under them.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    columns: Vec<String>,
    records: Vec<PersonRecord>,
}

impl RecordTable {
    /// Build a table from explicit parts (primarily for tests and staged
    /// pipelines that assemble records in memory).
    pub fn from_parts(columns: Vec<String>, records: Vec<PersonRecord>) -> Self {
        Self { columns, records }
    }

    /// Build a table from scraped follower records (the upstream producer's
    /// fixed shape), ready for the enrichment stages.
    pub fn from_followers(followers: Vec<FollowerRecord>) -> Self {
        let columns = [
            "name",
            "username",
            "bio",
            "website",
            "followers_count",
            "is_verified",
            "is_business_account",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let records = followers
            .into_iter()
            .map(FollowerRecord::into_person_record)
            .collect();
        Self { columns, records }
    }

    /// Read a table from a delimited file.
    ///
    /// A missing file or a file with no data rows is fatal: the pipeline has
    /// nothing to process and must not produce an empty output table that
    /// looks like a successful run.
    pub fn read(path: &Path) -> Result<Self, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::InputNotFound(path.to_path_buf()));
        }
        let raw = std::fs::read(path)
            .map_err(|e| PipelineError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        // Scrub NUL bytes before parsing; they show up in some exports and
        // break the CSV reader mid-field.
        let content = String::from_utf8_lossy(&raw).replace('\0', "");

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| PipelineError::Table(format!("Failed to parse header: {}", e)))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row =
                row.map_err(|e| PipelineError::Table(format!("Failed to parse row: {}", e)))?;
            let mut record = PersonRecord::new();
            for (i, column) in columns.iter().enumerate() {
                record.set(column, row.get(i).unwrap_or(""));
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(PipelineError::EmptyInput(path.to_path_buf()));
        }

        Ok(Self { columns, records })
    }

    /// Write the table, header first, every row over the full column set.
    pub fn write(&self, path: &Path) -> Result<(), PipelineError> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| PipelineError::Io(format!("Failed to create {}: {}", path.display(), e)))?;
        writer
            .write_record(&self.columns)
            .map_err(|e| PipelineError::Table(format!("Failed to write header: {}", e)))?;
        for record in &self.records {
            let row: Vec<&str> = self.columns.iter().map(|c| record.get(c)).collect();
            writer
                .write_record(&row)
                .map_err(|e| PipelineError::Table(format!("Failed to write row: {}", e)))?;
        }
        writer
            .flush()
            .map_err(|e| PipelineError::Io(format!("Failed to flush {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Append a column at the end unless it already exists.
    pub fn ensure_column(&mut self, name: &str) {
        if !self.columns.iter().any(|c| c == name) {
            self.columns.push(name.to_string());
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[PersonRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [PersonRecord] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keep only the first `limit` records.
    pub fn truncate(&mut self, limit: usize) {
        self.records.truncate(limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn read_preserves_column_order() {
        let file = write_temp("name,zebra,alpha\nJane,z1,a1\n");
        let table = RecordTable::read(file.path()).unwrap();
        assert_eq!(table.columns(), ["name", "zebra", "alpha"]);
        assert_eq!(table.records()[0].get("zebra"), "z1");
    }

    #[test]
    fn read_scrubs_nul_bytes() {
        let file = write_temp("name,email\nJane\0 Doe,jane@acme.com\n");
        let table = RecordTable::read(file.path()).unwrap();
        assert_eq!(table.records()[0].get("name"), "Jane Doe");
    }

    #[test]
    fn read_tolerates_ragged_rows() {
        let file = write_temp("name,email,phone_number\nJane,jane@acme.com\n");
        let table = RecordTable::read(file.path()).unwrap();
        assert_eq!(table.records()[0].get("phone_number"), "");
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = RecordTable::read(Path::new("/nonexistent/people.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::InputNotFound(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn empty_table_is_fatal() {
        let file = write_temp("name,email\n");
        let err = RecordTable::read(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput(_)));
    }

    #[test]
    fn new_columns_append_at_end() {
        let file = write_temp("name,email\nJane,jane@acme.com\n");
        let mut table = RecordTable::read(file.path()).unwrap();
        table.ensure_column("phone_status");
        table.ensure_column("email"); // already present, no duplicate
        assert_eq!(table.columns(), ["name", "email", "phone_status"]);
    }

    #[test]
    fn follower_table_has_fixed_columns() {
        let followers = vec![FollowerRecord {
            username: "jdoe".into(),
            full_name: "Jane DoeVerified".into(),
            biography: "founder".into(),
            ..Default::default()
        }];
        let table = RecordTable::from_followers(followers);
        assert_eq!(table.columns()[0], "name");
        assert_eq!(table.records()[0].get("name"), "Jane Doe");
        assert_eq!(table.records()[0].get("bio"), "founder");
        assert_eq!(table.records()[0].get("is_verified"), "false");
    }

    #[test]
    fn write_then_read_round_trip() {
        let file = write_temp("name,email\nJane,jane@acme.com\nBob,\n");
        let mut table = RecordTable::read(file.path()).unwrap();
        table.ensure_column("phone_status");
        table.records_mut()[0].set("phone_status", "ok");

        let out = tempfile::NamedTempFile::new().unwrap();
        table.write(out.path()).unwrap();

        let reread = RecordTable::read(out.path()).unwrap();
        assert_eq!(reread.columns(), ["name", "email", "phone_status"]);
        assert_eq!(reread.records()[0].get("phone_status"), "ok");
        assert_eq!(reread.records()[1].get("phone_status"), "");
    }
}
