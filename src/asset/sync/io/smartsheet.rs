use std::time::Duration;

use tracing::{debug, instrument};

use crate::asset::sync::config::SheetConfig;
use crate::asset::sync::error::{Result, SyncError};
use crate::asset::sync::io::SheetSource;
use crate::asset::sync::io::http::HttpRuntime;
use crate::asset::sync::model::Sheet;

/// Reads a sheet from the hosted spreadsheet REST API.
pub struct SmartsheetClient {
    base_url: String,
    sheet_id: String,
    access_token: String,
    http_client: reqwest::Client,
    runtime: HttpRuntime,
}

impl SmartsheetClient {
    pub fn new(config: &SheetConfig) -> Result<Self> {
        if config.sheet_id.is_empty() {
            return Err(SyncError::Config("sheet.sheet_id is not set".into()));
        }
        let runtime = HttpRuntime::new()?;
        let http_client = {
            let _entered = runtime.enter();
            reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .map_err(|err| SyncError::RemoteUnavailable(err.to_string()))?
        };

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            sheet_id: config.sheet_id.clone(),
            access_token: config.access_token.clone(),
            http_client,
            runtime,
        })
    }
}

impl SheetSource for SmartsheetClient {
    #[instrument(level = "debug", skip(self), fields(sheet_id = %self.sheet_id))]
    fn fetch_sheet(&self) -> Result<Sheet> {
        let url = format!("{}/sheets/{}", self.base_url, self.sheet_id);
        debug!(%url, "GET");
        let request = self.http_client.get(&url).bearer_auth(&self.access_token);
        self.runtime
            .wait(self.runtime.spawn_json(url, request))
            .map_err(sheet_error)
    }

    fn describe(&self) -> String {
        format!("sheet {}", self.sheet_id)
    }
}

/// Any rejected sheet request leaves no schema, so it is reported as the
/// service being unavailable.
fn sheet_error(err: SyncError) -> SyncError {
    match err {
        SyncError::Api { status, body } => {
            SyncError::RemoteUnavailable(format!("sheet request failed ({status}): {body}"))
        }
        other => other,
    }
}
