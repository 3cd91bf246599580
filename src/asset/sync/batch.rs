use std::fmt::Write as _;

use tracing::{info, instrument};

use crate::asset::sync::config::TypeNameEncoding;
use crate::asset::sync::error::Result;
use crate::asset::sync::io::{BatchRequest, ContentService, TypeValue, TypeValueRequest};
use crate::asset::sync::model::{Batch, BatchStatus, Content};

/// Submits parameter mutations to the content service and reads back their
/// progress. Polling is left to the caller.
pub struct BatchTracker<'a> {
    service: &'a dyn ContentService,
    encoding: TypeNameEncoding,
}

impl<'a> BatchTracker<'a> {
    pub fn new(service: &'a dyn ContentService) -> Self {
        Self {
            service,
            encoding: TypeNameEncoding::default(),
        }
    }

    pub fn with_encoding(mut self, encoding: TypeNameEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Builds the request that sets one type parameter of `content`.
    pub fn request(
        &self,
        content: &Content,
        type_name: &str,
        parameter_name: &str,
        value: &str,
        data_type: &str,
        target_version: i32,
    ) -> BatchRequest {
        let type_name = match self.encoding {
            TypeNameEncoding::Json => type_name.to_string(),
            TypeNameEncoding::Literal => to_literal(type_name),
        };
        BatchRequest {
            requests: vec![TypeValueRequest::set_type_values(
                content.repository_file_id,
                parameter_name,
                data_type,
                target_version,
                vec![TypeValue {
                    type_name,
                    value: value.to_string(),
                }],
            )],
        }
    }

    /// Issues one mutation of a named type parameter. Only the returned batch
    /// id is guaranteed.
    #[instrument(
        level = "info",
        skip(self, content, value),
        fields(content = %content.repository_file_id)
    )]
    pub fn submit(
        &self,
        content: &Content,
        type_name: &str,
        parameter_name: &str,
        value: &str,
        data_type: &str,
        target_version: i32,
    ) -> Result<Batch> {
        let request = self.request(
            content,
            type_name,
            parameter_name,
            value,
            data_type,
            target_version,
        );
        let batch = self.service.submit_batch(&request)?;
        info!(batch_id = %batch.batch_id, "batch submitted");
        Ok(batch)
    }

    /// Reads the current progress of a batch once.
    #[instrument(level = "info", skip(self))]
    pub async fn status(&self, batch_id: &str) -> Result<BatchStatus> {
        let status = self.service.batch_status(batch_id).await?;
        info!(
            total = status.total_files,
            pending = status.pending_files,
            ok = status.ok_files,
            failed = status.failed_files,
            "batch status"
        );
        Ok(status)
    }
}

/// Renders `input` as a double-quoted string literal, escaping backslashes,
/// quotes, and control characters.
pub fn to_literal(input: &str) -> String {
    let mut literal = String::with_capacity(input.len() + 2);
    literal.push('"');
    for ch in input.chars() {
        match ch {
            '\\' => literal.push_str("\\\\"),
            '"' => literal.push_str("\\\""),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            '\0' => literal.push_str("\\0"),
            ch if ch.is_control() => {
                let _ = write!(literal, "\\u{:04x}", ch as u32);
            }
            ch => literal.push(ch),
        }
    }
    literal.push('"');
    literal
}
