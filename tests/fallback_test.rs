use anyhow::Result;
use httpmock::prelude::*;
use std::time::{Duration, Instant};
use xml_field_translator::domain::model::{ProviderKind, TranslationRequest};
use xml_field_translator::{translate_document, Dispatcher, Settings};

const SINGLE_FIELD_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items><table><column name="strName">Old Name</column></table></items>"#;

// Nothing listens on port 1, so requests there fail to connect.
const DEAD_INSTANCE: &str = "http://127.0.0.1:1";

fn settings(mymemory: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.translation.delay_ms = 0;
    settings.providers.timeout_seconds = 5;
    settings.providers.mymemory_url = mymemory.url("/get");
    settings
}

#[tokio::test]
async fn test_libretranslate_rotates_then_falls_back_to_mymemory() -> Result<()> {
    let libre = MockServer::start();
    let libre_error = libre.mock(|when, then| {
        when.method(POST).path("/translate");
        then.status(500)
            .json_body(serde_json::json!({"error": "Internal server error"}));
    });

    let mymemory = MockServer::start();
    let mymemory_ok = mymemory.mock(|when, then| {
        when.method(GET).path("/get").query_param("q", "Old Name");
        then.status(200).json_body(serde_json::json!({
            "responseData": {"translatedText": "Ancien nom"},
            "responseStatus": 200
        }));
    });

    let mut settings = settings(&mymemory);
    settings.translation.provider = ProviderKind::LibreTranslate;
    settings.translation.target_lang = "fr".to_string();
    settings.providers.max_retries = 2;
    settings.providers.libretranslate_instances =
        vec![DEAD_INSTANCE.to_string(), libre.base_url()];

    let dispatcher = Dispatcher::from_settings(&settings.providers)?;
    let summary = translate_document(SINGLE_FIELD_XML.as_bytes(), &settings, &dispatcher).await?;

    // Attempts go dead, libre, dead before the budget runs out
    libre_error.assert_hits(1);
    mymemory_ok.assert_hits(1);
    assert_eq!(summary.translated_count, 1);
    assert_eq!(summary.provider_used, "mymemory (fallback)");

    let xml = String::from_utf8(summary.translated_xml.expect("translated document"))?;
    assert!(xml.contains(r#"<column name="strName">Ancien nom</column>"#));

    Ok(())
}

#[tokio::test]
async fn test_healthy_libretranslate_instance_is_used() -> Result<()> {
    let libre = MockServer::start();
    let libre_ok = libre.mock(|when, then| {
        when.method(POST)
            .path("/translate")
            .json_body_partial(r#"{"q": "Old Name", "source": "en", "target": "ru", "format": "text"}"#);
        then.status(200)
            .json_body(serde_json::json!({"translatedText": "Старое имя"}));
    });

    let mymemory = MockServer::start();
    let mymemory_unused = mymemory.mock(|when, then| {
        when.method(GET).path("/get");
        then.status(500);
    });

    let mut settings = settings(&mymemory);
    settings.providers.libretranslate_instances =
        vec![DEAD_INSTANCE.to_string(), libre.base_url()];

    let dispatcher = Dispatcher::from_settings(&settings.providers)?;
    let outcome = dispatcher
        .translate(&TranslationRequest::new(
            "Old Name",
            "en",
            "ru",
            ProviderKind::LibreTranslate,
        ))
        .await;

    libre_ok.assert_hits(1);
    mymemory_unused.assert_hits(0);
    assert_eq!(outcome.text, "Старое имя");
    assert_eq!(outcome.provider, Some(ProviderKind::LibreTranslate));

    Ok(())
}

#[tokio::test]
async fn test_timed_out_instance_falls_back_to_mymemory() -> Result<()> {
    let libre = MockServer::start();
    let libre_slow = libre.mock(|when, then| {
        when.method(POST).path("/translate");
        then.status(200)
            .delay(Duration::from_secs(3))
            .json_body(serde_json::json!({"translatedText": "Trop tard"}));
    });

    let mymemory = MockServer::start();
    let mymemory_ok = mymemory.mock(|when, then| {
        when.method(GET).path("/get").query_param("q", "Old Name");
        then.status(200).json_body(serde_json::json!({
            "responseData": {"translatedText": "Ancien nom"},
            "responseStatus": 200
        }));
    });

    let mut settings = settings(&mymemory);
    settings.providers.timeout_seconds = 1;
    settings.providers.max_retries = 0;
    settings.providers.libretranslate_instances = vec![libre.base_url()];

    let dispatcher = Dispatcher::from_settings(&settings.providers)?;
    let started = Instant::now();
    let outcome = dispatcher
        .translate(&TranslationRequest::new(
            "Old Name",
            "en",
            "fr",
            ProviderKind::LibreTranslate,
        ))
        .await;
    let elapsed = started.elapsed();

    libre_slow.assert_hits(1);
    mymemory_ok.assert_hits(1);
    assert_eq!(outcome.text, "Ancien nom");
    assert_eq!(outcome.provider, Some(ProviderKind::MyMemory));
    // Bounded by the client timeout, not by the slow instance
    assert!(elapsed >= Duration::from_millis(900), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(2500), "elapsed {:?}", elapsed);

    Ok(())
}

#[tokio::test]
async fn test_google_failure_keeps_original_without_fallback() -> Result<()> {
    let google = MockServer::start();
    let google_denied = google.mock(|when, then| {
        when.method(POST).path("/language/translate/v2").query_param("key", "bad-key");
        then.status(403).json_body(serde_json::json!({
            "error": {"code": 403, "message": "API key not valid"}
        }));
    });

    let mymemory = MockServer::start();
    let mymemory_unused = mymemory.mock(|when, then| {
        when.method(GET).path("/get");
        then.status(200);
    });

    let mut settings = settings(&mymemory);
    settings.translation.provider = ProviderKind::Google;
    settings.providers.google_url = google.url("/language/translate/v2");
    settings.providers.google_api_key = Some("bad-key".to_string());

    let dispatcher = Dispatcher::from_settings(&settings.providers)?;
    let summary = translate_document(SINGLE_FIELD_XML.as_bytes(), &settings, &dispatcher).await?;

    google_denied.assert_hits(1);
    mymemory_unused.assert_hits(0);
    assert_eq!(summary.provider_used, "google");
    assert_eq!(
        String::from_utf8(summary.translated_xml.expect("serialized document"))?,
        SINGLE_FIELD_XML
    );

    Ok(())
}

#[tokio::test]
async fn test_languages_from_first_answering_instance() -> Result<()> {
    let libre = MockServer::start();
    libre.mock(|when, then| {
        when.method(GET).path("/languages");
        then.status(200).json_body(serde_json::json!([
            {"code": "en", "name": "English"},
            {"code": "uk", "name": "Ukrainian"}
        ]));
    });

    let mymemory = MockServer::start();
    let mut settings = settings(&mymemory);
    settings.providers.libretranslate_instances =
        vec![DEAD_INSTANCE.to_string(), libre.base_url()];

    let dispatcher = Dispatcher::from_settings(&settings.providers)?;
    let languages = dispatcher.languages().await;

    assert_eq!(languages.len(), 2);
    assert_eq!(languages[1].code, "uk");

    settings.providers.libretranslate_instances = vec![DEAD_INSTANCE.to_string()];
    let dispatcher = Dispatcher::from_settings(&settings.providers)?;
    assert_eq!(dispatcher.languages().await.len(), 13);

    Ok(())
}
