use anyhow::{Context, Result};
use serde_json::json;

use super::ReportGenerator;
use crate::shade::BatchedImageRecord;

/// JSON array report, one object per record
pub struct JsonReportGenerator;

impl ReportGenerator for JsonReportGenerator {
    fn generate(&self, records: &[BatchedImageRecord]) -> Result<String> {
        let rows: Vec<_> = records
            .iter()
            .map(|record| {
                json!({
                    "batch": record.batch,
                    "filename": record.filename(),
                    "filepath": record.record.filepath,
                    "shade": record.record.shade,
                    "square": record.record.is_square,
                })
            })
            .collect();

        serde_json::to_string_pretty(&rows).context("Failed to serialize JSON report")
    }
}
