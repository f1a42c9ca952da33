pub mod client;
pub mod schema;

use async_trait::async_trait;

use crate::error::{ExportFormat, Result};
use crate::models::Test;

// Public API exports
pub use client::{HttpTestService, suggested_shape};
pub use schema::{parse_stored_test, parse_test_response};

/// Remote generation service. Every call is a single request/response round
/// trip; timeouts belong to the implementation.
#[async_trait]
pub trait TestService: Send + Sync {
    /// Generates a test from non-empty source text.
    async fn generate_test(&self, text: &str) -> Result<Test>;

    /// Returns the text extracted from the page at `url`.
    async fn fetch_url_text(&self, url: &str) -> Result<String>;

    /// Renders `test` into a binary document of the given format.
    async fn render_document(&self, test: &Test, format: ExportFormat) -> Result<Vec<u8>>;
}
