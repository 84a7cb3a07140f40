use crate::config::{Settings, TranslationSettings};
use crate::core::dispatcher::Dispatcher;
use crate::core::document::{Document, Field};
use crate::core::{Pipeline, Storage};
use crate::domain::model::{FieldTranslation, ProviderUsage, TranslationRequest};
use crate::utils::error::Result;
use serde::Serialize;
use std::sync::Arc;

/// A parsed document together with the fields selected for translation.
pub struct ExtractedDocument {
    pub path: String,
    pub original: Vec<u8>,
    pub document: Document,
    pub fields: Vec<Field>,
}

pub struct TransformResult {
    pub path: String,
    pub original: Vec<u8>,
    pub translations: Vec<FieldTranslation>,
    pub usage: ProviderUsage,
    /// Serialized document, `None` when there is nothing to write.
    pub output: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStatus {
    Translated { count: usize },
    NoFields,
    DryRun { count: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub path: String,
    pub status: DocumentStatus,
    pub translations: Vec<FieldTranslation>,
    pub usage: ProviderUsage,
}

/// Outcome of translating a document held in memory.
#[derive(Debug, Clone)]
pub struct TranslationSummary {
    pub translated_xml: Option<Vec<u8>>,
    pub translated_count: usize,
    pub provider_used: String,
    pub message: String,
}

pub struct XmlPipeline<S: Storage> {
    storage: S,
    settings: Settings,
    dispatcher: Arc<Dispatcher>,
}

impl<S: Storage> XmlPipeline<S> {
    pub fn new(storage: S, settings: Settings, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            storage,
            settings,
            dispatcher,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn backup_path(&self, path: &str) -> String {
        format!("{}.{}", path, self.settings.translation.backup_suffix)
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for XmlPipeline<S> {
    async fn extract(&self, path: &str) -> Result<ExtractedDocument> {
        let original = self.storage.read_file(path).await?;
        let document = Document::parse(&original)?;
        let fields = document.select(&self.settings.translation.field_set());

        tracing::debug!(
            "{}: {} columns, {} selected for translation",
            path,
            document.column_count(),
            fields.len()
        );

        Ok(ExtractedDocument {
            path: path.to_string(),
            original,
            document,
            fields,
        })
    }

    async fn transform(&self, extracted: ExtractedDocument) -> Result<TransformResult> {
        let ExtractedDocument {
            path,
            original,
            mut document,
            fields,
        } = extracted;

        if fields.is_empty() {
            return Ok(TransformResult {
                path,
                original,
                translations: Vec::new(),
                usage: ProviderUsage::default(),
                output: None,
            });
        }

        let translation = &self.settings.translation;
        let apply = !translation.dry_run;
        let (translations, usage) =
            translate_fields(&mut document, &fields, translation, &self.dispatcher, apply).await;

        let output = if apply {
            Some(document.to_bytes()?)
        } else {
            None
        };

        Ok(TransformResult {
            path,
            original,
            translations,
            usage,
            output,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<DocumentReport> {
        let count = result.translations.len();

        let status = if count == 0 {
            tracing::info!("No text to translate in {}", result.path);
            DocumentStatus::NoFields
        } else if let Some(output) = &result.output {
            let backup_path = self.backup_path(&result.path);
            if !self.storage.exists(&backup_path).await? {
                self.storage.write_file(&backup_path, &result.original).await?;
                tracing::info!("Created backup at {}", backup_path);
            }

            self.storage.write_file(&result.path, output).await?;
            tracing::info!("Saved translated XML to {}", result.path);
            DocumentStatus::Translated { count }
        } else {
            for t in &result.translations {
                tracing::info!("Would translate: {} -> {}", t.original, t.translated);
            }
            DocumentStatus::DryRun { count }
        };

        Ok(DocumentReport {
            path: result.path,
            status,
            translations: result.translations,
            usage: result.usage,
        })
    }
}

/// Dispatches every field in order, pausing between batches. With `apply`
/// set the translated text is written into `document`.
async fn translate_fields(
    document: &mut Document,
    fields: &[Field],
    settings: &TranslationSettings,
    dispatcher: &Dispatcher,
    apply: bool,
) -> (Vec<FieldTranslation>, ProviderUsage) {
    let mut translations = Vec::with_capacity(fields.len());
    let mut usage = ProviderUsage::default();
    let batch_size = settings.batch_size.max(1);
    let delay = settings.delay();

    for (i, field) in fields.iter().enumerate() {
        let request = TranslationRequest::new(
            field.text.clone(),
            settings.source_lang.clone(),
            settings.target_lang.clone(),
            settings.provider,
        );
        let outcome = dispatcher.translate(&request).await;

        if apply {
            document.set_text(field, &outcome.text);
        }
        usage.record(outcome.provider);
        translations.push(FieldTranslation {
            ordinal: field.ordinal,
            field: field.name.clone(),
            original: field.text.clone(),
            translated: outcome.text,
            provider: outcome.provider,
        });

        let done = i + 1;
        if done % batch_size == 0 && done < fields.len() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    (translations, usage)
}

/// Translates the configured fields of an in-memory document and returns
/// the serialized result.
pub async fn translate_document(
    bytes: &[u8],
    settings: &Settings,
    dispatcher: &Dispatcher,
) -> Result<TranslationSummary> {
    let translation = &settings.translation;
    let mut document = Document::parse(bytes)?;
    let fields = document.select(&translation.field_set());

    if fields.is_empty() {
        return Ok(TranslationSummary {
            translated_xml: None,
            translated_count: 0,
            provider_used: translation.provider.to_string(),
            message: "No text found to translate in the XML file.".to_string(),
        });
    }

    let (translations, usage) =
        translate_fields(&mut document, &fields, translation, dispatcher, true).await;

    Ok(TranslationSummary {
        translated_xml: Some(document.to_bytes()?),
        translated_count: translations.len(),
        provider_used: usage.label(translation.provider),
        message: format!("Successfully translated {} elements.", translations.len()),
    })
}
