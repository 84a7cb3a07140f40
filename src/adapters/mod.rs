// Adapters layer: concrete implementations for external systems (filesystem discovery, translation APIs, reports).

pub mod discovery;
pub mod http;
pub mod report;
