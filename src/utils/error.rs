use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Malformed document: {message}")]
    DocumentError { message: String },

    #[error("{provider} request failed: {message}")]
    ProviderError { provider: String, message: String },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Document,
    Storage,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TranslatorError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn document(message: impl Into<String>) -> Self {
        Self::DocumentError {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. }
            | Self::TomlError(_) => ErrorCategory::Configuration,
            Self::ApiError(_) | Self::ProviderError { .. } => ErrorCategory::Network,
            Self::XmlError(_) | Self::DocumentError { .. } => ErrorCategory::Document,
            Self::IoError(_) | Self::CsvError(_) => ErrorCategory::Storage,
            Self::SerializationError(_) | Self::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // Provider failures degrade to the original text
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Document | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ApiError(_) | Self::ProviderError { .. } => {
                "Check network connectivity or pick another provider with --api"
            }
            Self::XmlError(_) | Self::DocumentError { .. } => {
                "Make sure the file is well-formed XML; the original file was left untouched"
            }
            Self::IoError(_) => "Check that the path exists and that you have write permission",
            Self::CsvError(_) => "Check that the report path is writable",
            Self::TomlError(_) => "Fix the syntax of the TOML configuration file",
            Self::MissingConfigError { .. } => "Provide the missing value via CLI flag or config file",
            Self::InvalidConfigValueError { .. } | Self::ConfigValidationError { .. } => {
                "Correct the configuration value and run again"
            }
            Self::ConfigError { .. } => {
                "Review the provider settings; Google needs GOOGLE_TRANSLATE_API_KEY and LibreTranslate needs at least one instance"
            }
            Self::SerializationError(_) | Self::ProcessingError { .. } => {
                "Re-run with --verbose for more details"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Network => format!("Translation service unavailable: {}", self),
            ErrorCategory::Document => format!("Could not process document: {}", self),
            ErrorCategory::Storage => format!("File access failed: {}", self),
            ErrorCategory::Processing => format!("Unexpected failure: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, TranslatorError>;
