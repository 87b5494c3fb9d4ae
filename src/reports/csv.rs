use anyhow::Result;

use super::ReportGenerator;
use crate::shade::BatchedImageRecord;

pub const CSV_HEADER: &str = "Batch,Filename,Shade,Square";

/// Comma-delimited report with a fixed header row
pub struct CsvReportGenerator;

impl ReportGenerator for CsvReportGenerator {
    fn generate(&self, records: &[BatchedImageRecord]) -> Result<String> {
        let mut output = String::with_capacity(32 * (records.len() + 1));
        output.push_str(CSV_HEADER);
        output.push('\n');

        for record in records {
            output.push_str(&format!(
                "{},{},{:.2},{}\n",
                record.batch,
                escape_field(&record.filename()),
                record.record.shade,
                if record.record.is_square { "Yes" } else { "No" }
            ));
        }

        Ok(output)
    }
}

/// Quote a field when it contains a delimiter, quote or line break
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::ImageRecord;
    use std::path::PathBuf;

    fn batched(batch: u32, path: &str, shade: f64, is_square: bool) -> BatchedImageRecord {
        BatchedImageRecord {
            batch,
            record: ImageRecord {
                filepath: PathBuf::from(path),
                shade,
                is_square,
            },
        }
    }

    #[test]
    fn test_csv_rows_in_given_order() {
        let records = vec![
            batched(1, "/p/dark.jpg", 0.98, true),
            batched(5, "/p/mid.jpeg", 4.5, false),
            batched(10, "/p/light.JPG", 10.0, true),
        ];
        let content = CsvReportGenerator.generate(&records).unwrap();
        assert_eq!(
            content,
            "Batch,Filename,Shade,Square\n\
             1,dark.jpg,0.98,Yes\n\
             5,mid.jpeg,4.50,No\n\
             10,light.JPG,10.00,Yes\n"
        );
    }

    #[test]
    fn test_empty_report_has_header_only() {
        assert_eq!(CsvReportGenerator.generate(&[]).unwrap(), "Batch,Filename,Shade,Square\n");
    }

    #[test]
    fn test_awkward_filenames_are_quoted() {
        assert_eq!(escape_field("plain.jpg"), "plain.jpg");
        assert_eq!(escape_field("a,b.jpg"), "\"a,b.jpg\"");
        assert_eq!(escape_field("say \"hi\".jpg"), "\"say \"\"hi\"\".jpg\"");
    }
}
