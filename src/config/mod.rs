pub mod cli;
pub mod settings;
pub mod toml_config;

pub use settings::{DiscoverySettings, ProviderSettings, Settings, TranslationSettings};
pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::domain::model::ProviderKind;
#[cfg(feature = "cli")]
use crate::utils::error::{Result, TranslatorError};
#[cfg(feature = "cli")]
use clap::Parser;

/// Command line surface of the batch driver. Every translation option is
/// optional here so that unset flags fall through to the TOML file and then
/// to the built-in defaults.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "xml-field-translator")]
#[command(about = "Translate named fields inside XML data files")]
pub struct CliConfig {
    /// Directory searched recursively for documents [default: Mods]
    #[arg(long)]
    pub path: Option<String>,

    /// Process this single file instead of searching a directory
    #[arg(long)]
    pub file: Option<String>,

    /// Only process files whose path contains this substring
    #[arg(long)]
    pub include: Option<String>,

    /// Skip files whose path contains this substring
    #[arg(long)]
    pub exclude: Option<String>,

    /// File extension of documents to process [default: xml]
    #[arg(long)]
    pub extension: Option<String>,

    /// Source language code [default: en]
    #[arg(long)]
    pub src_lang: Option<String>,

    /// Target language code [default: ru]
    #[arg(long)]
    pub target_lang: Option<String>,

    /// Column names to translate [default: strName,strDesc]
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Translation provider [default: mymemory]
    #[arg(long, value_enum)]
    pub api: Option<ProviderKind>,

    /// LibreTranslate instance URL; repeat or comma-separate to try several
    #[arg(long = "libretranslate-url", value_delimiter = ',')]
    pub libretranslate_instances: Vec<String>,

    /// LibreTranslate attempts after the first before falling back to MyMemory [default: 2]
    #[arg(long)]
    pub max_retries: Option<usize>,

    /// Per-request timeout in seconds [default: 10]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Suffix for backup files [default: backup]
    #[arg(long)]
    pub backup_suffix: Option<String>,

    /// Delay between translation batches in seconds [default: 0.5]
    #[arg(long)]
    pub delay: Option<f64>,

    /// Number of translation calls between two delays [default: 1]
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Show what would be translated without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Write every field translation to this CSV file
    #[arg(long)]
    pub report: Option<String>,

    /// Print the languages offered by the LibreTranslate instances and exit
    #[arg(long)]
    pub list_languages: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage after each document")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn load_toml(&self) -> Result<TomlConfig> {
        match &self.config {
            Some(path) => TomlConfig::from_file(path),
            None => Ok(TomlConfig::default()),
        }
    }

    /// Layers the flags given on the command line over `base`.
    pub fn resolve(&self, base: TomlConfig) -> Result<Settings> {
        let mut settings = base.into_settings();

        let discovery = &mut settings.discovery;
        override_with(&mut discovery.path, &self.path);
        override_with(&mut discovery.extension, &self.extension);
        if self.file.is_some() {
            discovery.file = self.file.clone();
        }
        if self.include.is_some() {
            discovery.include = self.include.clone();
        }
        if self.exclude.is_some() {
            discovery.exclude = self.exclude.clone();
        }

        let translation = &mut settings.translation;
        override_with(&mut translation.source_lang, &self.src_lang);
        override_with(&mut translation.target_lang, &self.target_lang);
        override_with(&mut translation.backup_suffix, &self.backup_suffix);
        override_with(&mut translation.batch_size, &self.batch_size);
        override_with(&mut translation.provider, &self.api);
        if !self.fields.is_empty() {
            translation.fields = self.fields.clone();
        }
        if let Some(delay) = self.delay {
            if !delay.is_finite() || delay < 0.0 {
                return Err(TranslatorError::InvalidConfigValueError {
                    field: "delay".to_string(),
                    value: delay.to_string(),
                    reason: "Delay must be a non-negative number of seconds".to_string(),
                });
            }
            translation.delay_ms = (delay * 1000.0).round() as u64;
        }
        translation.dry_run |= self.dry_run;

        let providers = &mut settings.providers;
        override_with(&mut providers.max_retries, &self.max_retries);
        override_with(&mut providers.timeout_seconds, &self.timeout);
        if !self.libretranslate_instances.is_empty() {
            providers.libretranslate_instances = self.libretranslate_instances.clone();
        }

        Ok(settings)
    }
}

#[cfg(feature = "cli")]
fn override_with<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_match_settings_defaults() {
        let cli = CliConfig::parse_from(["xml-field-translator"]);
        let settings = cli.resolve(TomlConfig::default()).unwrap();

        assert_eq!(settings.translation, TranslationSettings::default());
        assert_eq!(settings.discovery, DiscoverySettings::default());
    }

    #[test]
    fn test_cli_flags_override_toml() {
        let toml = TomlConfig::from_toml_str(
            r#"
[translation]
target_lang = "de"
provider = "libretranslate"
delay_ms = 100
"#,
        )
        .unwrap();

        let cli = CliConfig::parse_from([
            "xml-field-translator",
            "--target-lang",
            "fr",
            "--fields",
            "strName,strTooltip",
            "--delay",
            "1.25",
            "--dry-run",
        ]);
        let settings = cli.resolve(toml).unwrap();

        assert_eq!(settings.translation.target_lang, "fr");
        assert_eq!(settings.translation.provider, ProviderKind::LibreTranslate);
        assert_eq!(settings.translation.fields, vec!["strName", "strTooltip"]);
        assert_eq!(settings.translation.delay_ms, 1250);
        assert!(settings.translation.dry_run);
    }

    #[test]
    fn test_api_flag_parses_provider_names() {
        let cli = CliConfig::parse_from(["xml-field-translator", "--api", "libretranslate"]);
        assert_eq!(cli.api, Some(ProviderKind::LibreTranslate));

        assert!(CliConfig::try_parse_from(["xml-field-translator", "--api", "deepl"]).is_err());
    }

    #[test]
    fn test_negative_delay_is_rejected() {
        let cli = CliConfig::parse_from(["xml-field-translator", "--delay=-1"]);
        assert!(cli.resolve(TomlConfig::default()).is_err());
    }
}
