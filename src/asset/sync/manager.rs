use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::asset::sync::batch::BatchTracker;
use crate::asset::sync::config::Config;
use crate::asset::sync::content::{ContentFetcher, MANUFACTURER_PARAMETER, MODEL_PARAMETER};
use crate::asset::sync::error::{Result, Warning};
use crate::asset::sync::io::{ContentService, SheetSource};
use crate::asset::sync::mapper::map_rows;
use crate::asset::sync::model::{Asset, Batch, BatchStatus, Content, Diff, Library};
use crate::asset::sync::reconcile::{Reconciler, Reconciliation};
use crate::asset::sync::schema::{self, ColumnMap};

/// A batch submitted during this session, with what it was meant to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRecord {
    pub batch: Batch,
    pub repository_file_id: Uuid,
    pub type_name: String,
    pub parameter_name: String,
    pub value: String,
}

/// In-memory snapshot of one reconciliation session. Each trigger replaces the
/// affected collection wholesale; nothing is persisted.
pub struct Manager {
    config: Config,
    service: Box<dyn ContentService>,
    reconciler: Reconciler,
    libraries: Vec<Library>,
    columns: ColumnMap,
    assets: Vec<Asset>,
    selected_library: Option<Uuid>,
    content: Vec<Content>,
    reconciliation: Reconciliation,
    batches: Vec<BatchRecord>,
    asset_warnings: Vec<Warning>,
    content_warnings: Vec<Warning>,
}

impl Manager {
    pub fn new(config: Config, service: Box<dyn ContentService>) -> Result<Self> {
        config.validate()?;
        let reconciler = Reconciler::from_config(&config.reconcile)?;
        Ok(Self {
            config,
            service,
            reconciler,
            libraries: Vec::new(),
            columns: ColumnMap::default(),
            assets: Vec::new(),
            selected_library: None,
            content: Vec::new(),
            reconciliation: Reconciliation::default(),
            batches: Vec::new(),
            asset_warnings: Vec::new(),
            content_warnings: Vec::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> ContentFetcher<'_> {
        ContentFetcher::new(self.service.as_ref()).with_page_size(self.config.content.page_size)
    }

    pub fn tracker(&self) -> BatchTracker<'_> {
        BatchTracker::new(self.service.as_ref()).with_encoding(self.config.content.type_name_encoding)
    }

    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn selected_library(&self) -> Option<Uuid> {
        self.selected_library
    }

    pub fn content(&self) -> &[Content] {
        &self.content
    }

    pub fn reconciliation(&self) -> &Reconciliation {
        &self.reconciliation
    }

    pub fn diffs(&self) -> &[Diff] {
        &self.reconciliation.diffs
    }

    pub fn batches(&self) -> &[BatchRecord] {
        &self.batches
    }

    /// Most recently submitted batch.
    pub fn latest_batch(&self) -> Option<&BatchRecord> {
        self.batches.last()
    }

    /// Warnings from the current asset load followed by those from the
    /// current content load.
    pub fn warnings(&self) -> Vec<Warning> {
        self.asset_warnings
            .iter()
            .chain(&self.content_warnings)
            .cloned()
            .collect()
    }

    pub fn asset_warnings(&self) -> &[Warning] {
        &self.asset_warnings
    }

    pub fn content_warnings(&self) -> &[Warning] {
        &self.content_warnings
    }

    pub fn load_libraries(&mut self) -> Result<&[Library]> {
        self.libraries = self.fetcher().libraries()?;
        Ok(&self.libraries)
    }

    /// Reloads the asset sheet, replacing the column map and the assets, and
    /// re-runs reconciliation. On failure the previous snapshot is kept.
    #[instrument(level = "info", skip_all)]
    pub fn load_assets(&mut self, source: &dyn SheetSource) -> Result<&[Asset]> {
        let resolved = schema::resolve(source)?;
        let (assets, warnings) = map_rows(&resolved, &self.config.columns).into_parts();
        info!(assets = assets.len(), warnings = warnings.len(), "assets loaded");
        self.columns = resolved.columns;
        self.assets = assets;
        self.asset_warnings = warnings;
        self.reconcile();
        Ok(&self.assets)
    }

    /// Replaces the content snapshot with every family of `library_id` and
    /// re-runs reconciliation.
    #[instrument(level = "info", skip(self))]
    pub fn select_library(&mut self, library_id: Uuid) -> Result<&[Content]> {
        let (content, warnings) = self.fetcher().fetch_library(library_id)?.into_parts();
        self.selected_library = Some(library_id);
        self.content = content;
        self.content_warnings = warnings;
        self.reconcile();
        Ok(&self.content)
    }

    /// Looks a content record up in the current snapshot by revision.
    pub fn content_by_revision(&self, revision_id: Uuid) -> Option<&Content> {
        self.content
            .iter()
            .find(|content| content.active_revision_id == revision_id)
    }

    /// Recomputes the diffs between the current assets and content and marks
    /// each asset's sync state.
    pub fn reconcile(&mut self) -> &Reconciliation {
        self.reconciliation = self.reconciler.reconcile(&self.assets, &self.content);
        self.reconciliation.annotate(&mut self.assets);
        &self.reconciliation
    }

    /// Sets one type parameter using the configured data type and target
    /// version, and records the batch.
    pub fn set_type_value(
        &mut self,
        content: &Content,
        type_name: &str,
        parameter_name: &str,
        value: &str,
    ) -> Result<Batch> {
        let batch = self.tracker().submit(
            content,
            type_name,
            parameter_name,
            value,
            &self.config.batch.data_type,
            self.config.batch.target_version,
        )?;
        self.batches.push(BatchRecord {
            batch: batch.clone(),
            repository_file_id: content.repository_file_id,
            type_name: type_name.to_string(),
            parameter_name: parameter_name.to_string(),
            value: value.to_string(),
        });
        Ok(batch)
    }

    /// Writes corrected manufacturer and model values to one family type:
    /// two batches, manufacturer first. Stops at the first failure.
    pub fn apply_correction(
        &mut self,
        content: &Content,
        type_name: &str,
        manufacturer: &str,
        model: &str,
    ) -> Result<Vec<Batch>> {
        let manufacturer_batch =
            self.set_type_value(content, type_name, MANUFACTURER_PARAMETER, manufacturer)?;
        let model_batch = self.set_type_value(content, type_name, MODEL_PARAMETER, model)?;
        Ok(vec![manufacturer_batch, model_batch])
    }

    /// Reads a batch's progress once; the caller decides when to ask again.
    pub async fn refresh_batch(&self, batch_id: &str) -> Result<BatchStatus> {
        self.tracker().status(batch_id).await
    }
}
