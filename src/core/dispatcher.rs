//! Provider selection and fallback.
//!
//! `google` and `mymemory` get a single call each. `libretranslate` walks the
//! configured instances in a bounded loop and hands over to `mymemory` once
//! its attempt budget is spent. Whatever happens, a failed dispatch yields the
//! original text; provider errors are logged and never returned.

use crate::adapters::http::{
    build_client, GoogleProvider, LibreTranslateProvider, MyMemoryProvider,
};
use crate::config::ProviderSettings;
use crate::domain::model::{Language, ProviderKind, TranslationOutcome, TranslationRequest};
use crate::domain::ports::TranslationProvider;
use crate::utils::error::Result;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

const LESS_THAN_ENTITY: &str = "&lt;";
const GREATER_THAN_ENTITY: &str = "&gt;";
const LESS_THAN_TOKEN: &str = "<LESSTHAN>";
const GREATER_THAN_TOKEN: &str = "<GREATERTHAN>";

static LESS_THAN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<\s*less\s*than\s*>").expect("placeholder pattern is valid"));
static GREATER_THAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*greater\s*than\s*>").expect("placeholder pattern is valid")
});

/// Swaps the literal `&lt;` / `&gt;` sequences for placeholder tokens that
/// translation engines leave alone.
pub fn protect_entities(text: &str) -> String {
    text.replace(LESS_THAN_ENTITY, LESS_THAN_TOKEN)
        .replace(GREATER_THAN_ENTITY, GREATER_THAN_TOKEN)
}

/// Inverse of [`protect_entities`], tolerant of case and spacing changes
/// made to the tokens in transit.
pub fn restore_entities(text: &str) -> String {
    let restored = LESS_THAN_PATTERN.replace_all(text, LESS_THAN_ENTITY);
    GREATER_THAN_PATTERN
        .replace_all(&restored, GREATER_THAN_ENTITY)
        .into_owned()
}

pub struct Dispatcher {
    mymemory: Box<dyn TranslationProvider>,
    libretranslate: Vec<Box<dyn TranslationProvider>>,
    google: Option<Box<dyn TranslationProvider>>,
    max_retries: usize,
}

impl Dispatcher {
    pub fn builder(mymemory: Box<dyn TranslationProvider>) -> DispatcherBuilder {
        DispatcherBuilder {
            mymemory,
            libretranslate: Vec::new(),
            google: None,
            max_retries: 2,
        }
    }

    /// Wires the HTTP providers enabled by `settings` onto one shared client.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        let client = build_client(settings.timeout())?;

        let mymemory = MyMemoryProvider::new(client.clone(), settings.mymemory_url.clone())
            .with_email(settings.mymemory_email.clone());
        let mut builder = Self::builder(Box::new(mymemory)).max_retries(settings.max_retries);

        for instance in &settings.libretranslate_instances {
            let provider = LibreTranslateProvider::new(client.clone(), instance.clone())
                .with_api_key(settings.libretranslate_api_key.clone());
            builder = builder.libretranslate_instance(Box::new(provider));
        }

        if let Some(api_key) = &settings.google_api_key {
            let provider = GoogleProvider::new(client, settings.google_url.clone(), api_key.clone());
            builder = builder.google(Box::new(provider));
        }

        Ok(builder.build())
    }

    pub fn enabled_providers(&self) -> BTreeSet<ProviderKind> {
        let mut enabled = BTreeSet::from([ProviderKind::MyMemory]);
        if !self.libretranslate.is_empty() {
            enabled.insert(ProviderKind::LibreTranslate);
        }
        if self.google.is_some() {
            enabled.insert(ProviderKind::Google);
        }
        enabled
    }

    pub async fn translate(&self, request: &TranslationRequest) -> TranslationOutcome {
        if request.text.trim().is_empty() {
            return TranslationOutcome::untouched(request.text.clone());
        }

        let protected = protect_entities(&request.text);
        let source = request.source_lang.as_str();
        let target = request.target_lang.as_str();

        let result = match request.provider {
            ProviderKind::Google => self.translate_with_google(&protected, source, target).await,
            ProviderKind::LibreTranslate => {
                self.translate_with_libretranslate(&protected, source, target)
                    .await
            }
            ProviderKind::MyMemory => self.translate_with_mymemory(&protected, source, target).await,
        };

        match result {
            Some((translated, provider)) => {
                TranslationOutcome::translated(restore_entities(&translated), provider)
            }
            None => TranslationOutcome::untouched(request.text.clone()),
        }
    }

    async fn translate_with_google(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Option<(String, ProviderKind)> {
        let Some(google) = &self.google else {
            tracing::error!("Google translation requested but the provider is not enabled");
            return None;
        };
        attempt(google.as_ref(), text, source, target).await
    }

    async fn translate_with_mymemory(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Option<(String, ProviderKind)> {
        attempt(self.mymemory.as_ref(), text, source, target).await
    }

    async fn translate_with_libretranslate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Option<(String, ProviderKind)> {
        if !self.libretranslate.is_empty() {
            for retry in 0..=self.max_retries {
                let instance = &self.libretranslate[retry % self.libretranslate.len()];
                if let Some(result) = attempt(instance.as_ref(), text, source, target).await {
                    return Some(result);
                }
            }
        }

        tracing::warn!(
            "LibreTranslate failed after {} attempts, falling back to MyMemory",
            self.max_retries + 1
        );
        self.translate_with_mymemory(text, source, target).await
    }

    /// Languages offered by the first LibreTranslate instance that answers,
    /// or a built-in list when none does.
    pub async fn languages(&self) -> Vec<Language> {
        for instance in &self.libretranslate {
            match instance.languages().await {
                Ok(languages) if !languages.is_empty() => return languages,
                Ok(_) => tracing::warn!("{} returned an empty language list", instance.label()),
                Err(e) => tracing::warn!("Language listing failed on {}: {}", instance.label(), e),
            }
        }
        fallback_languages()
    }
}

async fn attempt(
    provider: &dyn TranslationProvider,
    text: &str,
    source: &str,
    target: &str,
) -> Option<(String, ProviderKind)> {
    match provider.translate(text, source, target).await {
        Ok(translated) => Some((translated, provider.kind())),
        Err(e) => {
            tracing::warn!("{} failed: {}", provider.label(), e);
            None
        }
    }
}

pub fn fallback_languages() -> Vec<Language> {
    [
        ("en", "English"),
        ("ru", "Russian"),
        ("fr", "French"),
        ("de", "German"),
        ("es", "Spanish"),
        ("it", "Italian"),
        ("ja", "Japanese"),
        ("ko", "Korean"),
        ("zh", "Chinese"),
        ("ar", "Arabic"),
        ("hi", "Hindi"),
        ("pt", "Portuguese"),
        ("tr", "Turkish"),
    ]
    .iter()
    .map(|(code, name)| Language::new(code, name))
    .collect()
}

pub struct DispatcherBuilder {
    mymemory: Box<dyn TranslationProvider>,
    libretranslate: Vec<Box<dyn TranslationProvider>>,
    google: Option<Box<dyn TranslationProvider>>,
    max_retries: usize,
}

impl DispatcherBuilder {
    pub fn libretranslate_instance(mut self, provider: Box<dyn TranslationProvider>) -> Self {
        self.libretranslate.push(provider);
        self
    }

    pub fn google(mut self, provider: Box<dyn TranslationProvider>) -> Self {
        self.google = Some(provider);
        self
    }

    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            mymemory: self.mymemory,
            libretranslate: self.libretranslate,
            google: self.google,
            max_retries: self.max_retries,
        }
    }
}
