pub mod google;
pub mod libretranslate;
pub mod mymemory;

use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;

pub use google::GoogleProvider;
pub use libretranslate::LibreTranslateProvider;
pub use mymemory::MyMemoryProvider;

/// Shared client for every provider; each call is bounded by `timeout`.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(concat!("xml-field-translator/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
