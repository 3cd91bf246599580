use std::collections::BTreeSet;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::asset::sync::config::DEFAULT_PAGE_SIZE;
use crate::asset::sync::error::{Reported, Result, SyncError, Warning};
use crate::asset::sync::io::{ContentService, SearchQuery};
use crate::asset::sync::model::{Content, Library};

/// Parameter holding the manufacturer of a design file.
pub const MANUFACTURER_PARAMETER: &str = "Manufacturer";
/// Parameter holding the model of a design file.
pub const MODEL_PARAMETER: &str = "Model";

/// Retrieves content records from the content service.
pub struct ContentFetcher<'a> {
    service: &'a dyn ContentService,
    page_size: usize,
}

impl<'a> ContentFetcher<'a> {
    pub fn new(service: &'a dyn ContentService) -> Self {
        Self {
            service,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Overrides the number of records requested per page (minimum 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Lists the libraries, ordered by name ignoring case.
    #[instrument(level = "info", skip_all)]
    pub fn libraries(&self) -> Result<Vec<Library>> {
        let mut libraries = self.service.libraries()?;
        libraries.sort_by_key(|library| library.name.to_lowercase());
        info!(count = libraries.len(), "listed libraries");
        Ok(libraries)
    }

    /// Fetches every family in a library, one page at a time in increasing
    /// offset order. A page shorter than the page size ends the fetch.
    ///
    /// A page that fails for any reason other than the service being
    /// unreachable counts as an empty page: it is reported as
    /// [`Warning::PageFailed`] and, being short, ends the fetch. An unreachable
    /// service aborts the whole fetch.
    #[instrument(level = "info", skip(self), fields(page_size = self.page_size))]
    pub fn fetch_library(&self, library_id: Uuid) -> Result<Reported<Vec<Content>>> {
        let mut contents = Vec::new();
        let mut warnings = Vec::new();

        for page in 0.. {
            let offset = page * self.page_size;
            let query = SearchQuery::library_page(library_id, self.page_size, offset);
            let items = match self.service.search(&query) {
                Ok(items) => items,
                Err(err @ SyncError::RemoteUnavailable(_)) => return Err(err),
                Err(err) => {
                    let warning = Warning::PageFailed {
                        page,
                        offset,
                        reason: err.to_string(),
                    };
                    warn!(%warning, "treating failed page as empty");
                    warnings.push(warning);
                    Vec::new()
                }
            };

            let received = items.len();
            debug!(page, offset, received, "content page received");
            contents.extend(items.into_iter().map(enrich));

            if received < self.page_size {
                break;
            }
        }

        info!(count = contents.len(), "fetched library content");
        Ok(Reported::with_warnings(contents, warnings))
    }

    /// Looks content up by name. More than one match is reported and the first
    /// one, in response order, is used.
    #[instrument(level = "info", skip(self))]
    pub fn fetch_by_name(&self, name: &str) -> Result<Reported<Content>> {
        let results = self.service.search(&SearchQuery::terms(name))?;
        first_match(results, format!("name '{name}'"))
    }

    /// Looks content up by its active revision within a library.
    #[instrument(level = "info", skip(self))]
    pub fn fetch_by_revision(&self, revision_id: Uuid, library_id: Uuid) -> Result<Reported<Content>> {
        let results = self
            .service
            .search(&SearchQuery::revision(revision_id, library_id))?;
        first_match(results, format!("revision {revision_id}"))
    }
}

fn first_match(results: Vec<Content>, query: String) -> Result<Reported<Content>> {
    let matches = results.len();
    let Some(first) = results.into_iter().next() else {
        return Err(SyncError::NotFound(query));
    };
    let mut warnings = Vec::new();
    if matches > 1 {
        let warning = Warning::AmbiguousMatch { query, matches };
        warn!(%warning, "ambiguous content lookup");
        warnings.push(warning);
    }
    Ok(Reported::with_warnings(enrich(first), warnings))
}

/// Distinct, non-empty family type names seen on the content's parameters.
pub fn family_types(content: &Content) -> BTreeSet<String> {
    content
        .parameters
        .iter()
        .filter(|parameter| !parameter.type_name.is_empty())
        .map(|parameter| parameter.type_name.clone())
        .collect()
}

/// Fills the fields derived from the parameter list.
pub fn enrich(mut content: Content) -> Content {
    content.manufacturer = content.parameter_value(MANUFACTURER_PARAMETER).to_string();
    content.model = content.parameter_value(MODEL_PARAMETER).to_string();
    content.family_types = family_types(&content);
    content
}
