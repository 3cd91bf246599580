use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod content;

pub use content::{Batch, BatchStatus, Content, Library, Parameter};

/// Opaque, stable identifier of a sheet column. Remote sheets hand out large
/// integers; local workbooks use the 1-based column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(pub i64);

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Column header as published by the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
}

/// Single cell of a row. `value` is `None` for blank cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub column_id: ColumnId,
    #[serde(default)]
    pub value: Option<Value>,
}

impl Cell {
    pub fn new(column_id: ColumnId, value: impl Into<Value>) -> Self {
        Self {
            column_id,
            value: Some(value.into()),
        }
    }

    pub fn blank(column_id: ColumnId) -> Self {
        Self {
            column_id,
            value: None,
        }
    }

    /// Renders the value the way the sheet displays it. Checkbox cells become
    /// `True`/`False` and integral numbers lose their fractional part.
    pub fn display_value(&self) -> Option<String> {
        match self.value.as_ref()? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            Value::Bool(true) => Some("True".to_string()),
            Value::Bool(false) => Some("False".to_string()),
            Value::Number(number) => Some(match number.as_f64() {
                Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
                    format!("{}", float as i64)
                }
                _ => number.to_string(),
            }),
            other => Some(other.to_string()),
        }
    }
}

/// One sheet row: an unordered bag of cells keyed by column id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }
}

/// Snapshot of a sheet: its column layout and all of its rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// Physical asset as tracked in the asset sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Reconciliation key.
    pub id: String,
    pub manufacturer: String,
    pub model: String,
    pub vendor: String,
    pub department: String,
    pub sub_departments: Vec<String>,
    /// `None` when the sheet holds neither `True` nor `False`.
    pub merchandisable: Option<bool>,
    /// Never zero; an unset or unreadable source yields 1.
    pub capacity_multiplier: NonZeroU32,
    pub state: String,
    pub description: String,
    pub procured_by: String,
    pub received_by: String,
    pub installed_by: String,
    pub connect_by: String,
    /// Set after reconciliation: a content record matched and no field differs.
    pub is_synced: bool,
    pub sync_comments: String,
}

impl Asset {
    /// Creates an asset carrying only its identifier; every other field holds
    /// its default.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            manufacturer: String::new(),
            model: String::new(),
            vendor: String::new(),
            department: String::new(),
            sub_departments: Vec::new(),
            merchandisable: None,
            capacity_multiplier: NonZeroU32::MIN,
            state: String::new(),
            description: String::new(),
            procured_by: String::new(),
            received_by: String::new(),
            installed_by: String::new(),
            connect_by: String::new(),
            is_synced: false,
            sync_comments: String::new(),
        }
    }
}

/// Field-level mismatch between an asset and its content record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    /// Identifier of the asset the mismatch belongs to.
    pub key: String,
    /// Name of the compared field.
    pub field: String,
    pub asset_value: String,
    pub content_value: String,
}
