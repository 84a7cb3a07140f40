use crate::core::pipeline::{DocumentReport, DocumentStatus};
use crate::core::Pipeline;
use crate::domain::model::ProviderUsage;
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DocumentOutcome {
    Processed(DocumentReport),
    Failed { path: String, error: String },
}

impl DocumentOutcome {
    pub fn path(&self) -> &str {
        match self {
            Self::Processed(report) => &report.path,
            Self::Failed { path, .. } => path,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// One-line final status for the run summary.
    pub fn status_line(&self) -> String {
        match self {
            Self::Processed(report) => match report.status {
                DocumentStatus::Translated { count } => {
                    format!("✅ {}: translated {} fields", report.path, count)
                }
                DocumentStatus::DryRun { count } => {
                    format!("🔍 {}: dry run, {} fields would change", report.path, count)
                }
                DocumentStatus::NoFields => format!("➖ {}: no fields to translate", report.path),
            },
            Self::Failed { path, error } => format!("❌ {}: failed: {}", path, error),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub documents: Vec<DocumentOutcome>,
    pub usage: ProviderUsage,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.documents.iter().filter(|d| d.is_failed()).count()
    }

    pub fn translated_fields(&self) -> usize {
        self.reports()
            .map(|r| match r.status {
                DocumentStatus::Translated { count } => count,
                _ => 0,
            })
            .sum()
    }

    pub fn reports(&self) -> impl Iterator<Item = &DocumentReport> {
        self.documents.iter().filter_map(|d| match d {
            DocumentOutcome::Processed(report) => Some(report),
            DocumentOutcome::Failed { .. } => None,
        })
    }
}

/// Runs a pipeline over a list of documents, one after another. A failing
/// document is recorded and the batch moves on.
pub struct BatchEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> BatchEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self, paths: &[String]) -> BatchReport {
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut documents = Vec::with_capacity(paths.len());
        let mut usage = ProviderUsage::default();

        println!("Found {} documents to process", paths.len());

        for path in paths {
            println!("Processing {}", path);

            let outcome = match self.process(path).await {
                Ok(report) => {
                    usage.merge(&report.usage);
                    self.monitor.log_document(path, report.translations.len());
                    DocumentOutcome::Processed(report)
                }
                Err(e) => {
                    tracing::error!("Error processing {}: {}", path, e);
                    DocumentOutcome::Failed {
                        path: path.clone(),
                        error: e.to_string(),
                    }
                }
            };
            documents.push(outcome);

            println!("Finished processing {}", path);
            println!("{}", "-".repeat(50));
        }

        self.monitor.log_final_stats();

        BatchReport {
            started_at,
            elapsed: clock.elapsed(),
            documents,
            usage,
        }
    }

    async fn process(&self, path: &str) -> Result<DocumentReport> {
        let extracted = self.pipeline.extract(path).await?;
        if !extracted.fields.is_empty() {
            println!("Found {} elements to translate", extracted.fields.len());
        }

        let transformed = self.pipeline.transform(extracted).await?;
        self.pipeline.load(transformed).await
    }
}
