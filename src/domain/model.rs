use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::TranslatorError;

/// External translation services the dispatcher knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[cfg_attr(feature = "cli", value(name = "mymemory"))]
    MyMemory,
    #[cfg_attr(feature = "cli", value(name = "libretranslate"))]
    LibreTranslate,
    #[cfg_attr(feature = "cli", value(name = "google"))]
    Google,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MyMemory => "mymemory",
            Self::LibreTranslate => "libretranslate",
            Self::Google => "google",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = TranslatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mymemory" => Ok(Self::MyMemory),
            "libretranslate" => Ok(Self::LibreTranslate),
            "google" => Ok(Self::Google),
            other => Err(TranslatorError::InvalidConfigValueError {
                field: "provider".to_string(),
                value: other.to_string(),
                reason: "Expected one of: mymemory, libretranslate, google".to_string(),
            }),
        }
    }
}

/// Names of the `column` fields eligible for translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    names: HashSet<String>,
}

impl FieldSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub provider: ProviderKind,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        provider: ProviderKind,
    ) -> Self {
        Self {
            text: text.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            provider,
        }
    }
}

/// Result of one dispatch. `provider` is `None` when the text came back
/// untouched, either because it was blank or because every provider failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationOutcome {
    pub text: String,
    pub provider: Option<ProviderKind>,
}

impl TranslationOutcome {
    pub fn translated(text: String, provider: ProviderKind) -> Self {
        Self {
            text,
            provider: Some(provider),
        }
    }

    pub fn untouched(text: String) -> Self {
        Self {
            text,
            provider: None,
        }
    }

    pub fn is_translated(&self) -> bool {
        self.provider.is_some()
    }
}

/// One candidate field and what became of it.
#[derive(Debug, Clone, Serialize)]
pub struct FieldTranslation {
    pub ordinal: usize,
    pub field: String,
    pub original: String,
    pub translated: String,
    pub provider: Option<ProviderKind>,
}

/// Per-provider success counts plus the number of fields left untranslated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProviderUsage {
    pub by_provider: BTreeMap<ProviderKind, usize>,
    pub untranslated: usize,
}

impl ProviderUsage {
    pub fn record(&mut self, provider: Option<ProviderKind>) {
        match provider {
            Some(kind) => *self.by_provider.entry(kind).or_insert(0) += 1,
            None => self.untranslated += 1,
        }
    }

    pub fn merge(&mut self, other: &ProviderUsage) {
        for (kind, count) in &other.by_provider {
            *self.by_provider.entry(*kind).or_insert(0) += count;
        }
        self.untranslated += other.untranslated;
    }

    pub fn translated(&self) -> usize {
        self.by_provider.values().sum()
    }

    /// Describes which provider actually did the work relative to the one
    /// requested, e.g. `"mymemory (fallback)"`.
    pub fn label(&self, requested: ProviderKind) -> String {
        let fallbacks: Vec<&ProviderKind> = self
            .by_provider
            .keys()
            .filter(|kind| **kind != requested)
            .collect();

        match (self.by_provider.contains_key(&requested), fallbacks.as_slice()) {
            (_, []) => requested.to_string(),
            (false, [only]) => format!("{} (fallback)", only),
            (true, [only]) => format!("{} + {} (fallback)", requested, only),
            (_, many) => {
                let names: Vec<String> = many.iter().map(|k| k.to_string()).collect();
                format!("{} + {} (fallback)", requested, names.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
}

impl Language {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}
