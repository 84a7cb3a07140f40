pub mod dispatcher;
pub mod document;
pub mod etl;
pub mod pipeline;

pub use crate::domain::ports::{Pipeline, Storage, TranslationProvider};
pub use crate::utils::error::Result;
