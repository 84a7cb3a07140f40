use crate::domain::model::ProviderKind;
use crate::domain::ports::TranslationProvider;
use crate::utils::error::{Result, TranslatorError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GOOGLE_URL: &str = "https://translation.googleapis.com/language/translate/v2";
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_TRANSLATE_API_KEY";

#[derive(Debug, Serialize)]
struct TranslateBody<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Google Cloud Translation (v2 REST, API key authentication).
pub struct GoogleProvider {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GoogleProvider {
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl TranslationProvider for GoogleProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn label(&self) -> &str {
        &self.endpoint
    }

    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let body = TranslateBody {
            q: text,
            source: source_lang,
            target: target_lang,
            format: "text",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(TranslatorError::provider(
                self.kind().as_str(),
                format!("HTTP {}: {}", status, detail),
            ));
        }

        let parsed: TranslateResponse = response.json().await?;
        parsed
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| {
                TranslatorError::provider(self.kind().as_str(), "response contained no translations")
            })
    }
}
