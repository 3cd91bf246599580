//! Adapters for the two external systems and the local workbook formats.

use futures::future::LocalBoxFuture;

use crate::asset::sync::error::Result;
use crate::asset::sync::model::{Batch, BatchStatus, Content, Library, Sheet};

pub mod content_api;
pub mod excel_read;
pub mod excel_write;
mod http;
pub mod smartsheet;

pub use content_api::{BatchRequest, HttpContentService, SearchQuery, TypeValue, TypeValueRequest};

/// Read-only access to the asset sheet.
pub trait SheetSource {
    /// Fetches the full sheet (columns and rows).
    fn fetch_sheet(&self) -> Result<Sheet>;

    /// Short human-readable description used in log fields.
    fn describe(&self) -> String;
}

/// Operations offered by the content-management service.
pub trait ContentService {
    fn libraries(&self) -> Result<Vec<Library>>;

    /// Runs one search request and returns the page it produced.
    fn search(&self, query: &SearchQuery) -> Result<Vec<Content>>;

    fn submit_batch(&self, request: &BatchRequest) -> Result<Batch>;

    /// Reads the progress of a batch. Never waits for completion.
    fn batch_status<'a>(&'a self, batch_id: &'a str) -> LocalBoxFuture<'a, Result<BatchStatus>>;
}
