use std::path::Path;

use rust_xlsxwriter::{Table, Workbook};

use crate::asset::sync::error::Result;
use crate::asset::sync::reconcile::Reconciliation;

pub const DIFFS_SHEET: &str = "Diffs";
pub const UNMATCHED_ASSETS_SHEET: &str = "Unmatched Assets";
pub const UNMATCHED_CONTENT_SHEET: &str = "Unmatched Content";

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    fn new(sheet_name: &str, columns: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows,
        }
    }
}

/// Lays a reconciliation out as one table per sheet.
pub fn report_tables(reconciliation: &Reconciliation) -> Vec<SheetTable> {
    let diffs = reconciliation
        .diffs
        .iter()
        .map(|diff| {
            vec![
                diff.key.clone(),
                diff.field.clone(),
                diff.asset_value.clone(),
                diff.content_value.clone(),
            ]
        })
        .collect();
    let unmatched_assets = reconciliation
        .unmatched_assets
        .iter()
        .map(|id| vec![id.clone()])
        .collect();
    let unmatched_content = reconciliation
        .unmatched_content
        .iter()
        .map(|content| vec![content.repository_file_id.to_string(), content.title.clone()])
        .collect();

    vec![
        SheetTable::new(
            DIFFS_SHEET,
            &["Key", "Field", "Asset Value", "Content Value"],
            diffs,
        ),
        SheetTable::new(UNMATCHED_ASSETS_SHEET, &["Asset ID"], unmatched_assets),
        SheetTable::new(
            UNMATCHED_CONTENT_SHEET,
            &["Repository File ID", "Title"],
            unmatched_content,
        ),
    ]
}

/// Writes the reconciliation report to the given path: one sheet per table,
/// header on the first row, each sheet covered by an autofiltered table.
pub fn write_report(path: &Path, reconciliation: &Reconciliation) -> Result<()> {
    let mut workbook = Workbook::new();

    for table in report_tables(reconciliation) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        let lines = std::iter::once(&table.columns).chain(table.rows.iter());
        for (row, line) in lines.enumerate() {
            for (col, text) in line.iter().enumerate() {
                worksheet.write_string(row as u32, col as u16, text)?;
            }
        }

        // The table range must include at least one data row.
        let last_row = table.rows.len().max(1) as u32;
        let last_col = table.columns.len().saturating_sub(1) as u16;
        let mut filtered = Table::new();
        filtered.set_autofilter(true);
        worksheet.add_table(0, 0, last_row, last_col, &filtered)?;
        worksheet.autofit();
    }

    workbook.save(path)?;
    Ok(())
}
