use crate::domain::model::ProviderKind;
use crate::domain::ports::TranslationProvider;
use crate::utils::error::{Result, TranslatorError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub const DEFAULT_MYMEMORY_URL: &str = "https://api.mymemory.translated.net/get";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: Option<ResponseData>,
    #[serde(default)]
    response_status: serde_json::Value,
    #[serde(default)]
    response_details: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    translated_text: Option<String>,
}

impl MyMemoryResponse {
    // The API reports its own status in the body, as a number or a string.
    fn status_ok(&self) -> bool {
        match &self.response_status {
            serde_json::Value::Number(n) => n.as_u64() == Some(200),
            serde_json::Value::String(s) => s.trim() == "200",
            _ => false,
        }
    }

    fn details(&self) -> String {
        match &self.response_details {
            serde_json::Value::String(s) if !s.is_empty() => s.clone(),
            serde_json::Value::Null => "Unknown error".to_string(),
            other => other.to_string(),
        }
    }
}

pub struct MyMemoryProvider {
    client: Client,
    endpoint: String,
    email: Option<String>,
}

impl MyMemoryProvider {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            email: None,
        }
    }

    /// Contact address sent as `de`, which raises the anonymous daily quota.
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    fn fail(&self, message: impl Into<String>) -> TranslatorError {
        TranslatorError::provider(self.kind().as_str(), message)
    }
}

#[async_trait]
impl TranslationProvider for MyMemoryProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::MyMemory
    }

    fn label(&self) -> &str {
        &self.endpoint
    }

    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let langpair = format!("{}|{}", source_lang, target_lang);
        let mut query: Vec<(&str, &str)> = vec![("q", text), ("langpair", langpair.as_str())];
        if let Some(email) = &self.email {
            query.push(("de", email.as_str()));
        }

        tracing::debug!("MyMemory request to {} ({})", self.endpoint, langpair);
        let response = self.client.get(&self.endpoint).query(&query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed: MyMemoryResponse = serde_json::from_str(&body)
            .map_err(|e| self.fail(format!("malformed response (HTTP {}): {}", status, e)))?;

        if status != StatusCode::OK || !parsed.status_ok() {
            return Err(self.fail(format!(
                "HTTP {}, responseStatus {}: {}",
                status,
                parsed.response_status,
                parsed.details()
            )));
        }

        parsed
            .response_data
            .and_then(|data| data.translated_text)
            .ok_or_else(|| self.fail("response has no responseData.translatedText"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::build_client;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn provider(server: &MockServer) -> MyMemoryProvider {
        let client = build_client(Duration::from_secs(5)).unwrap();
        MyMemoryProvider::new(client, server.url("/get"))
    }

    #[tokio::test]
    async fn test_translate_success() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/get")
                .query_param("q", "Old Name")
                .query_param("langpair", "en|ru");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "responseData": {"translatedText": "Старое имя", "match": 1},
                    "responseStatus": 200,
                    "responseDetails": ""
                }));
        });

        let translated = provider(&server)
            .translate("Old Name", "en", "ru")
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(translated, "Старое имя");
    }

    #[tokio::test]
    async fn test_translate_sends_contact_email() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/get").query_param("de", "ops@example.com");
            then.status(200).json_body(serde_json::json!({
                "responseData": {"translatedText": "Hallo"},
                "responseStatus": "200"
            }));
        });

        let translated = provider(&server)
            .with_email(Some("ops@example.com".to_string()))
            .translate("Hello", "en", "de")
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(translated, "Hallo");
    }

    #[tokio::test]
    async fn test_body_status_failure_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/get");
            then.status(200).json_body(serde_json::json!({
                "responseData": {"translatedText": "MYMEMORY WARNING: YOU USED ALL AVAILABLE FREE TRANSLATIONS"},
                "responseStatus": 429,
                "responseDetails": "quota exceeded"
            }));
        });

        let err = provider(&server)
            .translate("Hello", "en", "ru")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_http_failure_and_malformed_body_are_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/get").query_param("q", "boom");
            then.status(500).body("internal error");
        });
        server.mock(|when, then| {
            when.method(GET).path("/get").query_param("q", "garbled");
            then.status(200).body("<html>not json</html>");
        });

        let provider = provider(&server);
        assert!(provider.translate("boom", "en", "ru").await.is_err());
        assert!(provider.translate("garbled", "en", "ru").await.is_err());
    }
}
