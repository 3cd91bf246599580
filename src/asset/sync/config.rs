use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::asset::sync::error::{Result, SyncError};

/// Default number of content records requested per search page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Runtime configuration. Every field has a default so an empty or absent file
/// is valid; credentials are usually supplied through the environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub content: ContentConfig,
    pub sheet: SheetConfig,
    pub columns: AssetColumns,
    pub reconcile: ReconcileConfig,
    pub batch: BatchConfig,
}

impl Config {
    /// Loads a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SyncError::MissingInput(path.to_path_buf()));
        }
        let source = std::fs::read_to_string(path)?;
        Self::from_toml(&source)
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.page_size == 0 {
            return Err(SyncError::Config("content.page_size must be positive".into()));
        }
        if self.reconcile.fields.is_empty() {
            return Err(SyncError::Config(
                "reconcile.fields must name at least one field".into(),
            ));
        }
        Ok(())
    }
}

/// How a family type name is carried in a batch request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeNameEncoding {
    /// Sent as-is; the JSON body encoding escapes it.
    #[default]
    Json,
    /// Wrapped in quotes and escaped as a C-style string literal first.
    Literal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    pub base_url: String,
    pub api_key: String,
    pub page_size: usize,
    pub timeout_secs: u64,
    pub type_name_encoding: TypeNameEncoding,
}

impl ContentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.unifilabs.com".to_string(),
            api_key: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: 30,
            type_name_encoding: TypeNameEncoding::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    pub base_url: String,
    pub sheet_id: String,
    pub access_token: String,
    pub timeout_secs: u64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.smartsheet.com/2.0".to_string(),
            sheet_id: String::new(),
            access_token: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Sheet column titles bound to each asset field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetColumns {
    pub id: String,
    pub manufacturer: String,
    pub model: String,
    pub vendor: String,
    pub department: String,
    pub sub_department: String,
    pub merchandisable: String,
    pub capacity_multiplier: String,
    pub state: String,
    pub description: String,
    pub procured_by: String,
    pub received_by: String,
    pub installed_by: String,
    pub connect_by: String,
}

impl Default for AssetColumns {
    fn default() -> Self {
        Self {
            id: "Asset ID".to_string(),
            manufacturer: "Manufacturer".to_string(),
            model: "Model".to_string(),
            vendor: "Vendor".to_string(),
            department: "Department".to_string(),
            sub_department: "Sub-Department".to_string(),
            merchandisable: "Merchandisable".to_string(),
            capacity_multiplier: "Capacity Multiplier".to_string(),
            state: "State".to_string(),
            description: "Description".to_string(),
            procured_by: "Procured By".to_string(),
            received_by: "Received By".to_string(),
            installed_by: "Installed By".to_string(),
            connect_by: "Connect By".to_string(),
        }
    }
}

/// Which content attribute is matched against the asset identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKey {
    #[default]
    Title,
    Parameter(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Names of the field comparators to run, in order.
    pub fields: Vec<String>,
    pub content_key: ContentKey,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            fields: vec!["manufacturer".to_string()],
            content_key: ContentKey::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Product version the edited design files are saved as.
    pub target_version: i32,
    pub data_type: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            target_version: 2016,
            data_type: "TEXT".to_string(),
        }
    }
}
