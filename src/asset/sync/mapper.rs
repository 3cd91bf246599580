use std::num::NonZeroU32;

use tracing::{instrument, warn};

use crate::asset::sync::config::AssetColumns;
use crate::asset::sync::error::{Reported, Warning};
use crate::asset::sync::model::{Asset, ColumnId, Row};
use crate::asset::sync::schema::{ColumnMap, ResolvedSheet, last_wins};

const CAPACITY_FIELD: &str = "capacity multiplier";

/// Returns the display value of the cell in `column`, or an empty string when
/// the row, the column, or the value is missing. Repeated cells resolve to the
/// last one.
pub fn cell_value(row: Option<&Row>, column: Option<ColumnId>) -> String {
    let (Some(row), Some(column)) = (row, column) else {
        return String::new();
    };
    last_wins(
        row.cells
            .iter()
            .filter(|cell| cell.column_id == column)
            .filter_map(|cell| cell.display_value()),
    )
    .unwrap_or_default()
}

/// Splits the sub-department cell. A comma-separated value is split and
/// trimmed; anything else non-empty is a single entry kept verbatim.
pub fn parse_sub_departments(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        Vec::new()
    } else if raw.contains(',') {
        raw.split(',').map(|part| part.trim().to_string()).collect()
    } else {
        vec![raw.to_string()]
    }
}

/// Only the exact strings `True` and `False` are meaningful.
pub fn parse_merchandisable(raw: &str) -> Option<bool> {
    match raw {
        "True" => Some(true),
        "False" => Some(false),
        _ => None,
    }
}

/// Parses the capacity multiplier. Empty and zero mean "unset" and yield 1;
/// unreadable or negative input also yields 1 but is reported.
pub fn parse_capacity_multiplier(raw: &str) -> (NonZeroU32, Option<Warning>) {
    if raw.is_empty() {
        return (NonZeroU32::MIN, None);
    }
    let failure = |reason: String| {
        Some(Warning::ParseFailure {
            field: CAPACITY_FIELD.to_string(),
            value: raw.to_string(),
            reason,
        })
    };
    match raw.trim().parse::<i64>() {
        Ok(0) => (NonZeroU32::MIN, None),
        Ok(parsed) => match u32::try_from(parsed).ok().and_then(NonZeroU32::new) {
            Some(multiplier) => (multiplier, None),
            None => (
                NonZeroU32::MIN,
                failure(format!("{parsed} is not a positive 32-bit integer")),
            ),
        },
        Err(err) => (NonZeroU32::MIN, failure(err.to_string())),
    }
}

/// Converts sheet rows into [`Asset`] records using a fixed field → column
/// binding resolved against one column map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMapper {
    id: Option<ColumnId>,
    manufacturer: Option<ColumnId>,
    model: Option<ColumnId>,
    vendor: Option<ColumnId>,
    department: Option<ColumnId>,
    sub_department: Option<ColumnId>,
    merchandisable: Option<ColumnId>,
    capacity_multiplier: Option<ColumnId>,
    state: Option<ColumnId>,
    description: Option<ColumnId>,
    procured_by: Option<ColumnId>,
    received_by: Option<ColumnId>,
    installed_by: Option<ColumnId>,
    connect_by: Option<ColumnId>,
}

impl RecordMapper {
    /// Resolves every bound title against the map. Titles absent from the
    /// sheet map to empty values rather than failing.
    pub fn new(columns: &ColumnMap, binding: &AssetColumns) -> Self {
        let lookup = |title: &str| columns.get(title);
        Self {
            id: lookup(&binding.id),
            manufacturer: lookup(&binding.manufacturer),
            model: lookup(&binding.model),
            vendor: lookup(&binding.vendor),
            department: lookup(&binding.department),
            sub_department: lookup(&binding.sub_department),
            merchandisable: lookup(&binding.merchandisable),
            capacity_multiplier: lookup(&binding.capacity_multiplier),
            state: lookup(&binding.state),
            description: lookup(&binding.description),
            procured_by: lookup(&binding.procured_by),
            received_by: lookup(&binding.received_by),
            installed_by: lookup(&binding.installed_by),
            connect_by: lookup(&binding.connect_by),
        }
    }

    /// Maps one row. Never fails; a bad capacity multiplier is reported.
    pub fn map_row(&self, row: Option<&Row>) -> Reported<Asset> {
        let value = |column: Option<ColumnId>| cell_value(row, column);

        let mut asset = Asset::new(value(self.id));
        asset.manufacturer = value(self.manufacturer);
        asset.model = value(self.model);
        asset.vendor = value(self.vendor);
        asset.department = value(self.department);
        asset.state = value(self.state);
        asset.description = value(self.description);
        asset.procured_by = value(self.procured_by);
        asset.received_by = value(self.received_by);
        asset.installed_by = value(self.installed_by);
        asset.connect_by = value(self.connect_by);
        asset.sub_departments = parse_sub_departments(&value(self.sub_department));
        asset.merchandisable = parse_merchandisable(&value(self.merchandisable));

        let (multiplier, warning) = parse_capacity_multiplier(&value(self.capacity_multiplier));
        asset.capacity_multiplier = multiplier;

        let warnings: Vec<Warning> = warning.into_iter().collect();
        for warning in &warnings {
            warn!(asset = %asset.id, %warning, "using default capacity multiplier");
        }
        Reported::with_warnings(asset, warnings)
    }
}

/// Maps a row with the default column binding.
pub fn map_row(row: Option<&Row>, columns: &ColumnMap) -> Reported<Asset> {
    RecordMapper::new(columns, &AssetColumns::default()).map_row(row)
}

/// Maps every row of a resolved sheet, collecting the per-row warnings.
#[instrument(level = "info", skip_all, fields(rows = resolved.sheet.rows.len()))]
pub fn map_rows(resolved: &ResolvedSheet, binding: &AssetColumns) -> Reported<Vec<Asset>> {
    let mapper = RecordMapper::new(&resolved.columns, binding);
    let mut warnings = Vec::new();
    let assets = resolved
        .sheet
        .rows
        .iter()
        .map(|row| {
            let (asset, row_warnings) = mapper.map_row(Some(row)).into_parts();
            warnings.extend(row_warnings);
            asset
        })
        .collect();
    Reported::with_warnings(assets, warnings)
}
