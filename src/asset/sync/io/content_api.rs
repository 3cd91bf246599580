use futures::FutureExt;
use futures::future::LocalBoxFuture;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::asset::sync::config::ContentConfig;
use crate::asset::sync::error::{Result, SyncError};
use crate::asset::sync::io::ContentService;
use crate::asset::sync::io::http::{HttpRuntime, joined};
use crate::asset::sync::model::{Batch, BatchStatus, Content, Library};

/// Only design families are reconciled.
pub const FAMILY_FILE_TYPE: i32 = 1;
const RETURN_WITH_PARAMETERS: &str = "with-parameters";
const SET_TYPE_VALUES: &str = "SetTypeValues";
const MAX_BODY_IN_ERROR: usize = 512;

/// Body of a `POST /search` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub terms: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libraries: Option<Vec<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_types: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<RevisionFilter>>,
    #[serde(rename = "return")]
    pub return_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

/// Restricts a search to one file revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionFilter {
    #[serde(rename = "FileRevisionId")]
    pub file_revision_id: Uuid,
}

impl SearchQuery {
    /// Free-text search returning parameters.
    pub fn terms(terms: impl Into<String>) -> Self {
        Self {
            terms: terms.into(),
            libraries: None,
            file_types: None,
            parameters: None,
            return_mode: RETURN_WITH_PARAMETERS.to_string(),
            size: None,
            offset: None,
        }
    }

    /// One page of the family files of a library.
    pub fn library_page(library_id: Uuid, size: usize, offset: usize) -> Self {
        Self {
            libraries: Some(vec![library_id]),
            file_types: Some(vec![FAMILY_FILE_TYPE]),
            size: Some(size),
            offset: Some(offset),
            ..Self::terms("*")
        }
    }

    /// The content of a library whose active revision is `revision_id`.
    pub fn revision(revision_id: Uuid, library_id: Uuid) -> Self {
        Self {
            libraries: Some(vec![library_id]),
            parameters: Some(vec![RevisionFilter {
                file_revision_id: revision_id,
            }]),
            ..Self::terms("*")
        }
    }
}

/// Body of a `POST /batch` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchRequest {
    pub requests: Vec<TypeValueRequest>,
}

/// Sets one type parameter on a content file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TypeValueRequest {
    pub object_id: Uuid,
    pub operation: String,
    pub existing_name: String,
    #[serde(rename = "Type")]
    pub data_type: String,
    #[serde(rename = "RevitYear")]
    pub target_version: i32,
    pub values: Vec<TypeValue>,
}

impl TypeValueRequest {
    pub fn set_type_values(
        object_id: Uuid,
        parameter_name: impl Into<String>,
        data_type: impl Into<String>,
        target_version: i32,
        values: Vec<TypeValue>,
    ) -> Self {
        Self {
            object_id,
            operation: SET_TYPE_VALUES.to_string(),
            existing_name: parameter_name.into(),
            data_type: data_type.into(),
            target_version,
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TypeValue {
    pub type_name: String,
    pub value: String,
}

/// JSON-over-HTTP client for the content service. Every request runs on the
/// client's own background runtime.
pub struct HttpContentService {
    base_url: String,
    client: reqwest::Client,
    runtime: HttpRuntime,
}

impl HttpContentService {
    pub fn new(config: &ContentConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|err| SyncError::Config(format!("invalid content API key: {err}")))?;
        headers.insert(AUTHORIZATION, api_key);
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let runtime = HttpRuntime::new()?;
        let client = {
            let _entered = runtime.enter();
            reqwest::Client::builder()
                .default_headers(headers)
                .timeout(config.timeout())
                .build()
                .map_err(|err| SyncError::RemoteUnavailable(err.to_string()))?
        };

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            runtime,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = self.url(path);
        debug!(%url, "GET");
        let request = self.client.get(&url);
        self.runtime.wait(self.runtime.spawn_json(url, request))
    }

    fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        let url = self.url(path);
        debug!(%url, "POST");
        let request = self.client.post(&url).json(body);
        self.runtime.wait(self.runtime.spawn_json(url, request))
    }
}

impl ContentService for HttpContentService {
    fn libraries(&self) -> Result<Vec<Library>> {
        self.get("libraries")
    }

    fn search(&self, query: &SearchQuery) -> Result<Vec<Content>> {
        self.post("search", query)
    }

    fn submit_batch(&self, request: &BatchRequest) -> Result<Batch> {
        self.post("batch", request)
    }

    fn batch_status<'a>(&'a self, batch_id: &'a str) -> LocalBoxFuture<'a, Result<BatchStatus>> {
        let url = self.url(&format!("batch/{batch_id}"));
        debug!(%url, "GET");
        let request = self.client.get(&url);
        joined(self.runtime.spawn_json(url, request)).boxed_local()
    }
}

/// Decodes a JSON response body. Rejected credentials count as the service
/// being unavailable.
pub(crate) fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(SyncError::RemoteUnavailable(format!(
            "credentials rejected ({status})"
        )));
    }
    if !status.is_success() {
        return Err(SyncError::Api {
            status: status.as_u16(),
            body: clip(body),
        });
    }
    serde_json::from_str(body)
        .map_err(|err| SyncError::ParseFailure(format!("{err}; body: {}", clip(body))))
}

fn clip(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_IN_ERROR) {
        Some((index, _)) => format!("{}...", &body[..index]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_is_decoded() {
        let batch: Batch = decode(StatusCode::OK, r#"{"BatchId":"b-1"}"#).expect("decoded");
        assert_eq!(batch.batch_id, "b-1");
    }

    #[test]
    fn rejected_credentials_mean_unavailable() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let error = decode::<Vec<Library>>(status, "denied").expect_err("rejected");
            assert!(matches!(error, SyncError::RemoteUnavailable(_)), "{status}");
        }
    }

    #[test]
    fn other_failures_are_api_errors() {
        let error = decode::<Vec<Content>>(StatusCode::INTERNAL_SERVER_ERROR, "boom")
            .expect_err("server error");
        assert!(matches!(
            error,
            SyncError::Api { status: 500, ref body } if body == "boom"
        ));

        let error = decode::<Vec<Content>>(StatusCode::NOT_FOUND, "").expect_err("not found");
        assert!(matches!(error, SyncError::Api { status: 404, .. }));
    }

    #[test]
    fn undecodable_body_is_a_parse_failure() {
        let error = decode::<Vec<Content>>(StatusCode::OK, "<html>").expect_err("not JSON");
        assert!(matches!(error, SyncError::ParseFailure(_)));

        let error = decode::<Vec<Content>>(StatusCode::OK, r#"{"items":[]}"#)
            .expect_err("wrong shape");
        assert!(matches!(error, SyncError::ParseFailure(_)));
    }

    #[test]
    fn long_bodies_are_clipped_in_errors() {
        let body = "x".repeat(MAX_BODY_IN_ERROR * 2);
        let error = decode::<Vec<Content>>(StatusCode::BAD_GATEWAY, &body).expect_err("bad gateway");
        match error {
            SyncError::Api { body, .. } => assert_eq!(body.len(), MAX_BODY_IN_ERROR + 3),
            other => panic!("unexpected error: {other}"),
        }
    }
}
