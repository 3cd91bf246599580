use std::path::{Path, PathBuf};

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use serde_json::Value;

use crate::asset::sync::error::{Result, SyncError};
use crate::asset::sync::io::SheetSource;
use crate::asset::sync::model::{Cell, Column, ColumnId, Row, Sheet};

/// Reads the asset sheet from a local `.xlsx` export. The first row holds the
/// column titles; column ids are 1-based positions.
#[derive(Debug, Clone)]
pub struct WorkbookSheet {
    path: PathBuf,
    sheet_name: Option<String>,
}

impl WorkbookSheet {
    /// Uses the first worksheet of the workbook.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet_name: None,
        }
    }

    pub fn with_sheet(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet_name: Some(sheet_name.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SheetSource for WorkbookSheet {
    fn fetch_sheet(&self) -> Result<Sheet> {
        if !self.path.exists() {
            return Err(SyncError::MissingInput(self.path.clone()));
        }
        let mut workbook: Xlsx<_> = open_workbook(&self.path)?;

        let (name, range) = match &self.sheet_name {
            Some(name) => (name.clone(), read_required_sheet(&mut workbook, name)?),
            None => {
                let name = workbook
                    .sheet_names()
                    .first()
                    .cloned()
                    .ok_or_else(|| SyncError::InvalidWorkbook("workbook has no sheets".into()))?;
                let range = read_required_sheet(&mut workbook, &name)?;
                (name, range)
            }
        };

        Ok(range_to_sheet(name, &range))
    }

    fn describe(&self) -> String {
        format!("workbook {}", self.path.display())
    }
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| SyncError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(SyncError::from)?;
    Ok(range)
}

fn range_to_sheet(name: String, range: &Range<DataType>) -> Sheet {
    let mut rows = range.rows();

    let columns: Vec<Column> = match rows.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(index, cell)| Column {
                id: position_id(index),
                title: cell_to_string(Some(cell)),
            })
            .collect(),
        None => Vec::new(),
    };

    let rows = rows
        .filter(|row| row.iter().any(|cell| !matches!(cell, DataType::Empty)))
        .map(|row| {
            let cells = row
                .iter()
                .enumerate()
                .take(columns.len())
                .map(|(index, cell)| match cell_to_value(cell) {
                    Some(value) => Cell::new(position_id(index), value),
                    None => Cell::blank(position_id(index)),
                })
                .collect();
            Row::new(cells)
        })
        .collect();

    Sheet {
        name,
        columns,
        rows,
    }
}

fn position_id(index: usize) -> ColumnId {
    ColumnId(index as i64 + 1)
}

fn cell_to_value(cell: &DataType) -> Option<Value> {
    match cell {
        DataType::Empty => None,
        DataType::String(value) => Some(Value::String(value.clone())),
        DataType::Int(value) => Some(Value::from(*value)),
        DataType::Float(value) => serde_json::Number::from_f64(*value).map(Value::Number),
        DataType::Bool(value) => Some(Value::Bool(*value)),
        other => Some(Value::String(other.to_string())),
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
