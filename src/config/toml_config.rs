use crate::config::settings::{DiscoverySettings, ProviderSettings, Settings, TranslationSettings};
use crate::utils::error::{Result, TranslatorError};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// On-disk configuration. Every section is optional; missing keys keep
/// their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub translation: TranslationSettings,
    pub providers: ProviderSettings,
    pub discovery: DiscoverySettings,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// Load the configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TranslatorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse the configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| TranslatorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR_NAME}` with the environment value; unknown variables
    /// are left as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }

    pub fn into_settings(self) -> Settings {
        Settings {
            translation: self.translation,
            providers: self.providers.with_env_credentials(),
            discovery: self.discovery,
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.clone().into_settings().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ProviderKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[translation]
source_lang = "en"
target_lang = "de"
fields = ["strName", "strDesc", "strTooltip"]
provider = "libretranslate"
delay_ms = 250
batch_size = 5
backup_suffix = "orig"

[providers]
timeout_seconds = 3
max_retries = 4
libretranslate_instances = ["http://localhost:5000", "http://localhost:5001"]

[discovery]
path = "./mods"
include = "Core"

[monitoring]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.translation.target_lang, "de");
        assert_eq!(config.translation.provider, ProviderKind::LibreTranslate);
        assert_eq!(config.translation.fields.len(), 3);
        assert_eq!(config.providers.max_retries, 4);
        assert_eq!(config.providers.libretranslate_instances.len(), 2);
        assert_eq!(config.discovery.include.as_deref(), Some("Core"));
        assert_eq!(config.discovery.extension, "xml");
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        let settings = config.into_settings();

        assert_eq!(settings.translation.source_lang, "en");
        assert_eq!(settings.translation.target_lang, "ru");
        assert_eq!(settings.providers.timeout_seconds, 10);
        assert_eq!(settings.discovery.path, "Mods");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("XFT_TEST_MYMEMORY_EMAIL", "ops@example.com");

        let toml_content = r#"
[providers]
mymemory_email = "${XFT_TEST_MYMEMORY_EMAIL}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.providers.mymemory_email.as_deref(),
            Some("ops@example.com")
        );

        std::env::remove_var("XFT_TEST_MYMEMORY_EMAIL");
    }

    #[test]
    fn test_unknown_provider_is_parse_error() {
        let toml_content = r#"
[translation]
provider = "deepl"
"#;

        assert!(TomlConfig::from_toml_str(toml_content).is_err());
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[providers]
mymemory_url = "invalid-url"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[translation]
target_lang = "fr"
dry_run = true
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.translation.target_lang, "fr");
        assert!(config.translation.dry_run);
    }
}
