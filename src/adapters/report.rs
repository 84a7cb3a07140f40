use crate::core::etl::BatchReport;
use crate::utils::error::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    file: &'a str,
    field: &'a str,
    ordinal: usize,
    original: &'a str,
    translated: &'a str,
    provider: &'a str,
}

/// One CSV row per candidate field across the batch. Untranslated fields
/// have an empty `provider` column.
pub fn write_csv_report<P: AsRef<Path>>(path: P, report: &BatchReport) -> Result<()> {
    let writer = csv::Writer::from_path(path)?;
    write_rows(writer, report)
}

pub fn write_rows<W: Write>(mut writer: csv::Writer<W>, report: &BatchReport) -> Result<()> {
    for document in report.reports() {
        for t in &document.translations {
            writer.serialize(ReportRow {
                file: &document.path,
                field: &t.field,
                ordinal: t.ordinal,
                original: &t.original,
                translated: &t.translated,
                provider: t.provider.map(|p| p.as_str()).unwrap_or(""),
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::etl::DocumentOutcome;
    use crate::core::pipeline::{DocumentReport, DocumentStatus};
    use crate::domain::model::{FieldTranslation, ProviderKind, ProviderUsage};
    use chrono::Utc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn sample_report() -> BatchReport {
        let translations = vec![
            FieldTranslation {
                ordinal: 0,
                field: "strName".to_string(),
                original: "Iron Sword".to_string(),
                translated: "Железный меч".to_string(),
                provider: Some(ProviderKind::MyMemory),
            },
            FieldTranslation {
                ordinal: 1,
                field: "strDesc".to_string(),
                original: "Sharp, heavy".to_string(),
                translated: "Sharp, heavy".to_string(),
                provider: None,
            },
        ];
        BatchReport {
            started_at: Utc::now(),
            elapsed: Duration::from_millis(5),
            documents: vec![
                DocumentOutcome::Processed(DocumentReport {
                    path: "Mods/items.xml".to_string(),
                    status: DocumentStatus::Translated { count: 2 },
                    translations,
                    usage: ProviderUsage::default(),
                }),
                DocumentOutcome::Failed {
                    path: "Mods/broken.xml".to_string(),
                    error: "Malformed document".to_string(),
                },
            ],
            usage: ProviderUsage::default(),
        }
    }

    #[test]
    fn test_rows_cover_processed_documents() {
        let mut buffer = Vec::new();
        write_rows(csv::Writer::from_writer(&mut buffer), &sample_report()).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "file,field,ordinal,original,translated,provider");
        assert_eq!(
            lines[1],
            "Mods/items.xml,strName,0,Iron Sword,Железный меч,mymemory"
        );
        assert_eq!(
            lines[2],
            "Mods/items.xml,strDesc,1,\"Sharp, heavy\",\"Sharp, heavy\","
        );
    }

    #[test]
    fn test_write_csv_report_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.csv");

        write_csv_report(&path, &sample_report()).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][4], "Железный меч");
    }
}
