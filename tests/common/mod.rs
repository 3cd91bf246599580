#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use asset_content_sync::io::{BatchRequest, ContentService, SearchQuery, SheetSource};
use asset_content_sync::model::{
    Batch, BatchStatus, Cell, Column, ColumnId, Content, Library, Parameter, Row, Sheet,
};
use asset_content_sync::{Result, SyncError};
use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use serde_json::Value;
use uuid::Uuid;

/// Scripted answer to one search request.
pub enum Reply {
    Items(Vec<Content>),
    Malformed,
    Offline,
}

/// In-memory content service that replays scripted search replies and
/// records every request it receives.
#[derive(Default)]
pub struct FakeContentService {
    pub libraries: Vec<Library>,
    pub statuses: HashMap<String, BatchStatus>,
    pub replies: RefCell<VecDeque<Reply>>,
    pub searches: Rc<RefCell<Vec<SearchQuery>>>,
    pub submitted: Rc<RefCell<Vec<BatchRequest>>>,
}

impl FakeContentService {
    pub fn with_replies(replies: Vec<Reply>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            ..Self::default()
        }
    }

    /// One reply per entry, each holding that many generated records.
    pub fn with_pages(sizes: &[usize]) -> Self {
        let replies = sizes
            .iter()
            .enumerate()
            .map(|(page, size)| {
                Reply::Items(
                    (0..*size)
                        .map(|index| family(&format!("family-{page}-{index}"), "Acme"))
                        .collect(),
                )
            })
            .collect();
        Self::with_replies(replies)
    }

    pub fn search_count(&self) -> usize {
        self.searches.borrow().len()
    }
}

impl ContentService for FakeContentService {
    fn libraries(&self) -> Result<Vec<Library>> {
        Ok(self.libraries.clone())
    }

    fn search(&self, query: &SearchQuery) -> Result<Vec<Content>> {
        self.searches.borrow_mut().push(query.clone());
        match self.replies.borrow_mut().pop_front() {
            Some(Reply::Items(items)) => Ok(items),
            Some(Reply::Malformed) => Err(SyncError::ParseFailure("expected an array".into())),
            Some(Reply::Offline) => Err(SyncError::RemoteUnavailable("connection refused".into())),
            None => Ok(Vec::new()),
        }
    }

    fn submit_batch(&self, request: &BatchRequest) -> Result<Batch> {
        let mut submitted = self.submitted.borrow_mut();
        submitted.push(request.clone());
        Ok(Batch {
            batch_id: format!("batch-{}", submitted.len()),
        })
    }

    fn batch_status<'a>(&'a self, batch_id: &'a str) -> LocalBoxFuture<'a, Result<BatchStatus>> {
        let status = self
            .statuses
            .get(batch_id)
            .copied()
            .ok_or_else(|| SyncError::NotFound(format!("batch {batch_id}")));
        future::ready(status).boxed_local()
    }
}

/// Sheet source returning a fixed sheet.
pub struct StaticSheet(pub Sheet);

impl SheetSource for StaticSheet {
    fn fetch_sheet(&self) -> Result<Sheet> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "static sheet".to_string()
    }
}

/// Sheet source whose service is unreachable.
pub struct OfflineSheet;

impl SheetSource for OfflineSheet {
    fn fetch_sheet(&self) -> Result<Sheet> {
        Err(SyncError::RemoteUnavailable("401 Unauthorized".into()))
    }

    fn describe(&self) -> String {
        "offline sheet".to_string()
    }
}

/// Family record carrying a manufacturer parameter on one family type.
pub fn family(title: &str, manufacturer: &str) -> Content {
    let mut content = Content::new(Uuid::new_v4(), Uuid::new_v4(), title);
    content.parameters = vec![Parameter::new("Manufacturer", manufacturer, "Type A")];
    content
}

pub fn column(id: i64, title: &str) -> Column {
    Column {
        id: ColumnId(id),
        title: title.to_string(),
    }
}

/// Builds a row from `(column id, value)` pairs.
pub fn row(cells: &[(i64, Value)]) -> Row {
    Row::new(
        cells
            .iter()
            .map(|(id, value)| Cell::new(ColumnId(*id), value.clone()))
            .collect(),
    )
}

/// Sheet laid out with the default asset column titles.
pub fn asset_sheet(rows: Vec<Row>) -> Sheet {
    Sheet {
        name: "Assets".to_string(),
        columns: vec![
            column(10, "Asset ID"),
            column(11, "Manufacturer"),
            column(12, "Model"),
            column(13, "Vendor"),
            column(14, "Department"),
            column(15, "Sub-Department"),
            column(16, "Merchandisable"),
            column(17, "Capacity Multiplier"),
        ],
        rows,
    }
}
