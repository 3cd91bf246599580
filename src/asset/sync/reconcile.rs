use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::asset::sync::config::{ContentKey, ReconcileConfig};
use crate::asset::sync::error::{Result, SyncError};
use crate::asset::sync::model::{Asset, Content, Diff};

/// Compares one named field of an asset with the same field of a content
/// record. Values are compared exactly: no case folding, no trimming.
#[derive(Clone, Copy)]
pub struct FieldComparator {
    pub name: &'static str,
    asset: fn(&Asset) -> &str,
    content: fn(&Content) -> &str,
}

impl fmt::Debug for FieldComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldComparator").field(&self.name).finish()
    }
}

impl PartialEq for FieldComparator {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

pub const MANUFACTURER: FieldComparator = FieldComparator {
    name: "manufacturer",
    asset: |asset| asset.manufacturer.as_str(),
    content: |content| content.manufacturer.as_str(),
};

pub const MODEL: FieldComparator = FieldComparator {
    name: "model",
    asset: |asset| asset.model.as_str(),
    content: |content| content.model.as_str(),
};

/// Every comparator that can be named in configuration.
pub const COMPARATORS: &[FieldComparator] = &[MANUFACTURER, MODEL];

impl FieldComparator {
    pub fn by_name(name: &str) -> Option<Self> {
        COMPARATORS.iter().copied().find(|field| field.name == name)
    }

    /// Returns a diff keyed by the asset identifier when the values differ.
    pub fn compare(&self, asset: &Asset, content: &Content) -> Option<Diff> {
        let asset_value = (self.asset)(asset);
        let content_value = (self.content)(content);
        if asset_value == content_value {
            return None;
        }
        Some(Diff {
            key: asset.id.clone(),
            field: self.name.to_string(),
            asset_value: asset_value.to_string(),
            content_value: content_value.to_string(),
        })
    }
}

/// Manufacturer-only comparison of one asset with one content record.
pub fn diff(asset: &Asset, content: &Content) -> Option<Diff> {
    MANUFACTURER.compare(asset, content)
}

/// Content record reference used in reconciliation results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRef {
    pub repository_file_id: Uuid,
    pub title: String,
}

impl From<&Content> for ContentRef {
    fn from(content: &Content) -> Self {
        Self {
            repository_file_id: content.repository_file_id,
            title: content.title.clone(),
        }
    }
}

/// An asset paired with the content record carrying its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pairing {
    pub asset_id: String,
    pub content: ContentRef,
}

/// Outcome of reconciling one asset set against one content set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub pairs: Vec<Pairing>,
    pub diffs: Vec<Diff>,
    pub unmatched_assets: Vec<String>,
    pub unmatched_content: Vec<ContentRef>,
}

impl Reconciliation {
    /// Marks each asset as synced when it was paired and shows no difference;
    /// otherwise records why not.
    pub fn annotate(&self, assets: &mut [Asset]) {
        let paired: HashSet<&str> = self.pairs.iter().map(|pair| pair.asset_id.as_str()).collect();
        let mut differing: HashMap<&str, Vec<&str>> = HashMap::new();
        for diff in &self.diffs {
            differing.entry(diff.key.as_str()).or_default().push(diff.field.as_str());
        }

        for asset in assets.iter_mut() {
            let (is_synced, comments) = match differing.get(asset.id.as_str()) {
                Some(fields) => (false, format!("differs: {}", fields.join(", "))),
                None if paired.contains(asset.id.as_str()) => (true, String::new()),
                None => (false, "no matching content".to_string()),
            };
            asset.is_synced = is_synced;
            asset.sync_comments = comments;
        }
    }
}

/// Pairs assets with content records and runs the configured comparators.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciler {
    fields: Vec<FieldComparator>,
    key: ContentKey,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            fields: vec![MANUFACTURER],
            key: ContentKey::Title,
        }
    }
}

impl Reconciler {
    pub fn new(fields: Vec<FieldComparator>, key: ContentKey) -> Self {
        Self { fields, key }
    }

    pub fn from_config(config: &ReconcileConfig) -> Result<Self> {
        let fields = config
            .fields
            .iter()
            .map(|name| {
                FieldComparator::by_name(name)
                    .ok_or_else(|| SyncError::Config(format!("unknown reconcile field '{name}'")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(fields, config.content_key.clone()))
    }

    pub fn fields(&self) -> &[FieldComparator] {
        &self.fields
    }

    /// Runs every comparator on one pair, in configured order.
    pub fn diff(&self, asset: &Asset, content: &Content) -> Vec<Diff> {
        self.fields
            .iter()
            .filter_map(|field| field.compare(asset, content))
            .collect()
    }

    fn content_key<'c>(&self, content: &'c Content) -> &'c str {
        match &self.key {
            ContentKey::Title => &content.title,
            ContentKey::Parameter(name) => content.parameter_value(name),
        }
    }

    /// Pairs each asset with the first content record whose key equals the
    /// asset identifier. Assets without an identifier are ignored.
    #[instrument(level = "info", skip_all, fields(assets = assets.len(), contents = contents.len()))]
    pub fn reconcile(&self, assets: &[Asset], contents: &[Content]) -> Reconciliation {
        let mut by_key: HashMap<&str, &Content> = HashMap::new();
        for content in contents {
            let key = self.content_key(content);
            if !key.is_empty() {
                by_key.entry(key).or_insert(content);
            }
        }

        let mut result = Reconciliation::default();
        let mut used: HashSet<Uuid> = HashSet::new();

        for asset in assets.iter().filter(|asset| !asset.id.is_empty()) {
            match by_key.get(asset.id.as_str()) {
                Some(content) => {
                    used.insert(content.repository_file_id);
                    result.diffs.extend(self.diff(asset, content));
                    result.pairs.push(Pairing {
                        asset_id: asset.id.clone(),
                        content: ContentRef::from(*content),
                    });
                }
                None => result.unmatched_assets.push(asset.id.clone()),
            }
        }

        result.unmatched_content = contents
            .iter()
            .filter(|content| !used.contains(&content.repository_file_id))
            .map(ContentRef::from)
            .collect();

        info!(
            pairs = result.pairs.len(),
            diffs = result.diffs.len(),
            unmatched_assets = result.unmatched_assets.len(),
            unmatched_content = result.unmatched_content.len(),
            "reconciled assets against content"
        );
        result
    }
}
