use crate::domain::model::{Language, ProviderKind};
use crate::domain::ports::TranslationProvider;
use crate::utils::error::{Result, TranslatorError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIBRETRANSLATE_INSTANCES: [&str; 4] = [
    "https://libretranslate.de",
    "https://translate.argosopentech.com",
    "https://translate.terraprint.co",
    "https://lt.vern.cc",
];

#[derive(Debug, Serialize)]
struct TranslateBody<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: Option<String>,
    error: Option<String>,
}

/// One LibreTranslate server. The dispatcher holds one of these per
/// configured instance and rotates through them.
pub struct LibreTranslateProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl LibreTranslateProvider {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    fn fail(&self, message: impl Into<String>) -> TranslatorError {
        TranslatorError::provider(
            format!("{} ({})", self.kind(), self.base_url),
            message,
        )
    }
}

#[async_trait]
impl TranslationProvider for LibreTranslateProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::LibreTranslate
    }

    fn label(&self) -> &str {
        &self.base_url
    }

    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let url = format!("{}/translate", self.base_url);
        let body = TranslateBody {
            q: text,
            source: source_lang,
            target: target_lang,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        tracing::debug!("LibreTranslate request to {}", url);
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        let raw = response.text().await?;

        let parsed: TranslateResponse = serde_json::from_str(&raw)
            .map_err(|e| self.fail(format!("malformed response (HTTP {}): {}", status, e)))?;

        match (status, parsed.translated_text) {
            (StatusCode::OK, Some(translated)) => Ok(translated),
            (status, _) => Err(self.fail(format!(
                "HTTP {}: {}",
                status,
                parsed.error.unwrap_or_else(|| "Unknown error".to_string())
            ))),
        }
    }

    async fn languages(&self) -> Result<Vec<Language>> {
        let url = format!("{}/languages", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(self.fail(format!("HTTP {}", response.status())));
        }

        let languages: Vec<Language> = response.json().await?;
        Ok(languages)
    }
}
