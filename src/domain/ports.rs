use crate::core::pipeline::{DocumentReport, ExtractedDocument, TransformResult};
use crate::domain::model::{Language, ProviderKind};
use crate::utils::error::{Result, TranslatorError};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
}

/// A single translation backend, or one instance of a multi-instance backend.
///
/// Implementations report every failure (transport, timeout, status,
/// malformed body) as an `Err`; the dispatcher decides what happens next.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Human readable identity used in logs, typically the endpoint.
    fn label(&self) -> &str;

    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str)
        -> Result<String>;

    async fn languages(&self) -> Result<Vec<Language>> {
        Err(TranslatorError::provider(
            self.kind().as_str(),
            "language listing is not supported",
        ))
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self, path: &str) -> Result<ExtractedDocument>;
    async fn transform(&self, document: ExtractedDocument) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<DocumentReport>;
}
