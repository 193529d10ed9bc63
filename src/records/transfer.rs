//! JSON documents for export/import. The persisted collection uses the same
//! format, so older data written by earlier versions goes through the same
//! tolerant reader.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::models::Record;

use super::error::RecordError;

/// One entry of an incoming document. Accepts the legacy `length`/`segment`
/// names and tolerates a missing id, total or date.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedRecord {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(alias = "length")]
    pub rebar_length: f64,
    #[serde(alias = "segment")]
    pub segment_length: f64,
    pub quantity: u32,
    pub segments: u64,
    pub remainder: f64,
    #[serde(default)]
    pub total_remainder: Option<f64>,
    #[serde(default)]
    pub date: String,
}

impl ImportedRecord {
    /// Finish the entry with the id the store settled on.
    pub fn into_record(self, id: u64) -> Record {
        let total_remainder = self
            .total_remainder
            .unwrap_or(self.remainder * f64::from(self.quantity));
        Record {
            id,
            name: self.name,
            rebar_length: self.rebar_length,
            segment_length: self.segment_length,
            quantity: self.quantity,
            segments: self.segments,
            remainder: self.remainder,
            total_remainder,
            date: self.date,
        }
    }
}

/// Parse a document into its entries without touching any store.
pub fn parse_document(document: &str) -> Result<Vec<ImportedRecord>, RecordError> {
    let value: Value = serde_json::from_str(document).map_err(RecordError::MalformedDocument)?;
    if !value.is_array() {
        return Err(RecordError::NotAnArray);
    }
    serde_json::from_value(value).map_err(RecordError::MalformedDocument)
}

/// Pretty-printed document, as written to export files.
pub fn encode_pretty(records: &[Record]) -> Result<String, RecordError> {
    serde_json::to_string_pretty(records).map_err(RecordError::Encode)
}

/// Compact document, as written to the key-value store.
pub fn encode_compact(records: &[Record]) -> Result<String, RecordError> {
    serde_json::to_string(records).map_err(RecordError::Encode)
}

/// Default export file name for a given day.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("armature_data_{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_arrays() {
        assert!(matches!(parse_document("{}"), Err(RecordError::NotAnArray)));
        assert!(matches!(parse_document("42"), Err(RecordError::NotAnArray)));
        assert!(matches!(
            parse_document("not json"),
            Err(RecordError::MalformedDocument(_))
        ));
    }

    #[test]
    fn rejects_entries_with_wrong_shape() {
        let result = parse_document(r#"[{"name": "x"}]"#);
        assert!(matches!(result, Err(RecordError::MalformedDocument(_))));

        let result = parse_document(r#"[1, 2, 3]"#);
        assert!(matches!(result, Err(RecordError::MalformedDocument(_))));
    }

    #[test]
    fn accepts_empty_array() {
        assert!(parse_document("[]").unwrap().is_empty());
    }

    #[test]
    fn reads_legacy_field_names() {
        let document = r#"[{
            "id": 1700000000000,
            "name": "Балка",
            "length": 1750,
            "segment": 300,
            "quantity": 4,
            "segments": 5,
            "remainder": 250,
            "date": "01.02.2024, 10:11:12"
        }]"#;

        let entries = parse_document(document).unwrap();
        assert_eq!(entries.len(), 1);
        let record = entries[0].clone().into_record(1_700_000_000_000);
        assert_eq!(record.rebar_length, 1750.0);
        assert_eq!(record.segment_length, 300.0);
        assert_eq!(record.total_remainder, 1000.0);
        assert_eq!(record.date, "01.02.2024, 10:11:12");
    }

    #[test]
    fn missing_id_and_date_are_tolerated() {
        let document = r#"[{
            "name": "x",
            "rebarLength": 10,
            "segmentLength": 3,
            "quantity": 1,
            "segments": 3,
            "remainder": 1,
            "totalRemainder": 1
        }]"#;
        let entries = parse_document(document).unwrap();
        assert_eq!(entries[0].id, None);
        assert_eq!(entries[0].date, "");
    }

    #[test]
    fn export_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(export_file_name(date), "armature_data_2026-10-18.json");
    }
}
