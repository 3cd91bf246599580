use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::asset::sync::error::Result;
use crate::asset::sync::io::SheetSource;
use crate::asset::sync::model::{Column, ColumnId, Sheet};

/// Tie-break used for every title and cell lookup: scan in order, keep the last
/// item that matched. Duplicate titles and repeated cells are not errors.
pub fn last_wins<T>(matches: impl IntoIterator<Item = T>) -> Option<T> {
    matches.into_iter().fold(None, |_, item| Some(item))
}

/// Case-insensitive title → column id mapping. Built once per sheet load and
/// replaced wholesale on reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    ids: HashMap<String, ColumnId>,
}

impl ColumnMap {
    /// Folds the columns in order; a later duplicate title overwrites an
    /// earlier one.
    pub fn from_columns<'a>(columns: impl IntoIterator<Item = &'a Column>) -> Self {
        let ids = columns
            .into_iter()
            .fold(HashMap::new(), |mut ids, column| {
                ids.insert(fold_title(&column.title), column.id);
                ids
            });
        Self { ids }
    }

    pub fn get(&self, title: &str) -> Option<ColumnId> {
        self.ids.get(&fold_title(title)).copied()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.ids.contains_key(&fold_title(title))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A fetched sheet along with the column map derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSheet {
    pub sheet: Sheet,
    pub columns: ColumnMap,
}

/// Fetches the sheet and builds its column map. A failed fetch yields no map.
#[instrument(level = "info", skip_all, fields(source = %source.describe()))]
pub fn resolve(source: &dyn SheetSource) -> Result<ResolvedSheet> {
    let sheet = source.fetch_sheet()?;
    let columns = ColumnMap::from_columns(&sheet.columns);
    if columns.len() < sheet.columns.len() {
        debug!(
            declared = sheet.columns.len(),
            distinct = columns.len(),
            "duplicate column titles collapsed, last one kept"
        );
    }
    info!(
        columns = columns.len(),
        rows = sheet.rows.len(),
        "resolved sheet layout"
    );
    Ok(ResolvedSheet { sheet, columns })
}

/// Looks a column up by title directly on the sheet, ignoring case.
pub fn column_id(sheet: &Sheet, name: &str) -> Option<ColumnId> {
    let wanted = fold_title(name);
    last_wins(
        sheet
            .columns
            .iter()
            .filter(|column| fold_title(&column.title) == wanted)
            .map(|column| column.id),
    )
}

fn fold_title(title: &str) -> String {
    title.to_lowercase()
}
