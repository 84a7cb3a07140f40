use crate::adapters::http::google::{DEFAULT_GOOGLE_URL, GOOGLE_API_KEY_ENV};
use crate::adapters::http::libretranslate::DEFAULT_LIBRETRANSLATE_INSTANCES;
use crate::adapters::http::mymemory::DEFAULT_MYMEMORY_URL;
use crate::domain::model::{FieldSet, ProviderKind};
use crate::utils::error::{Result, TranslatorError};
use crate::utils::validation::{
    validate_language_code, validate_non_empty_list, validate_non_empty_string,
    validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

pub const DEFAULT_SOURCE_LANG: &str = "en";
pub const DEFAULT_TARGET_LANG: &str = "ru";
pub const DEFAULT_FIELDS: [&str; 2] = ["strName", "strDesc"];

/// Everything one run needs, resolved from defaults, the TOML file and CLI
/// flags. Passed explicitly to the dispatcher and the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub translation: TranslationSettings,
    pub providers: ProviderSettings,
    pub discovery: DiscoverySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    pub source_lang: String,
    pub target_lang: String,
    pub fields: Vec<String>,
    pub provider: ProviderKind,
    /// Pause between batches of provider calls.
    pub delay_ms: u64,
    pub batch_size: usize,
    pub backup_suffix: String,
    pub dry_run: bool,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            source_lang: DEFAULT_SOURCE_LANG.to_string(),
            target_lang: DEFAULT_TARGET_LANG.to_string(),
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            provider: ProviderKind::MyMemory,
            delay_ms: 500,
            batch_size: 1,
            backup_suffix: "backup".to_string(),
            dry_run: false,
        }
    }
}

impl TranslationSettings {
    pub fn field_set(&self) -> FieldSet {
        FieldSet::new(self.fields.iter().cloned())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub timeout_seconds: u64,
    /// Extra LibreTranslate attempts after the first one before MyMemory
    /// takes over.
    pub max_retries: usize,
    pub mymemory_url: String,
    pub mymemory_email: Option<String>,
    pub libretranslate_instances: Vec<String>,
    pub libretranslate_api_key: Option<String>,
    pub google_url: String,
    pub google_api_key: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            max_retries: 2,
            mymemory_url: DEFAULT_MYMEMORY_URL.to_string(),
            mymemory_email: None,
            libretranslate_instances: DEFAULT_LIBRETRANSLATE_INSTANCES
                .iter()
                .map(|i| i.to_string())
                .collect(),
            libretranslate_api_key: None,
            google_url: DEFAULT_GOOGLE_URL.to_string(),
            google_api_key: None,
        }
    }
}

impl ProviderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Fills in the Google key from the environment when the configuration
    /// did not provide a usable one.
    pub fn with_env_credentials(mut self) -> Self {
        let configured = self
            .google_api_key
            .take()
            .filter(|key| !key.trim().is_empty() && !is_unresolved_placeholder(key));
        self.google_api_key = configured.or_else(|| {
            std::env::var(GOOGLE_API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty())
        });
        self
    }

    /// Providers that can actually be called with these settings.
    pub fn enabled_providers(&self) -> BTreeSet<ProviderKind> {
        let mut enabled = BTreeSet::new();
        enabled.insert(ProviderKind::MyMemory);
        if !self.libretranslate_instances.is_empty() {
            enabled.insert(ProviderKind::LibreTranslate);
        }
        if self.google_api_key.is_some() {
            enabled.insert(ProviderKind::Google);
        }
        enabled
    }

    pub fn ensure_enabled(&self, provider: ProviderKind) -> Result<()> {
        if self.enabled_providers().contains(&provider) {
            return Ok(());
        }
        let reason = match provider {
            ProviderKind::Google => format!(
                "google requires an API key (set {} or providers.google_api_key)",
                GOOGLE_API_KEY_ENV
            ),
            ProviderKind::LibreTranslate => {
                "libretranslate requires at least one entry in providers.libretranslate_instances"
                    .to_string()
            }
            ProviderKind::MyMemory => "mymemory is not configured".to_string(),
        };
        Err(TranslatorError::config(reason))
    }
}

fn is_unresolved_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("${") && value.ends_with('}')
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    pub path: String,
    pub extension: String,
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub file: Option<String>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            path: "Mods".to_string(),
            extension: "xml".to_string(),
            include: None,
            exclude: None,
            file: None,
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        let translation = &self.translation;
        validate_language_code("translation.source_lang", &translation.source_lang)?;
        validate_language_code("translation.target_lang", &translation.target_lang)?;
        validate_non_empty_list("translation.fields", &translation.fields)?;
        validate_positive_number("translation.batch_size", translation.batch_size, 1)?;
        validate_non_empty_string("translation.backup_suffix", &translation.backup_suffix)?;

        let providers = &self.providers;
        validate_range("providers.timeout_seconds", providers.timeout_seconds, 1, 300)?;
        validate_range("providers.max_retries", providers.max_retries, 0, 20)?;
        validate_url("providers.mymemory_url", &providers.mymemory_url)?;
        validate_url("providers.google_url", &providers.google_url)?;
        for instance in &providers.libretranslate_instances {
            validate_url("providers.libretranslate_instances", instance)?;
        }
        providers.ensure_enabled(translation.provider)?;

        validate_non_empty_string("discovery.extension", &self.discovery.extension)?;
        if self.discovery.file.is_none() {
            validate_non_empty_string("discovery.path", &self.discovery.path)?;
        }

        Ok(())
    }
}
