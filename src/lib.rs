pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{Settings, TomlConfig};

pub use crate::core::dispatcher::Dispatcher;
pub use crate::core::document::Document;
pub use crate::core::etl::{BatchEngine, BatchReport};
pub use crate::core::pipeline::{translate_document, TranslationSummary, XmlPipeline};
pub use crate::domain::model::ProviderKind;
pub use crate::utils::error::{Result, TranslatorError};
