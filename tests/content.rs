mod common;

use asset_content_sync::content::{ContentFetcher, enrich, family_types};
use asset_content_sync::io::SearchQuery;
use asset_content_sync::model::{Content, Library, Parameter};
use asset_content_sync::{SyncError, Warning};
use common::{FakeContentService, Reply, family};
use uuid::Uuid;

#[test]
fn short_page_ends_pagination() {
    let service = FakeContentService::with_pages(&[20, 20, 7]);
    let fetcher = ContentFetcher::new(&service);

    let reported = fetcher.fetch_library(Uuid::new_v4()).expect("library fetched");

    assert_eq!(reported.value.len(), 47);
    assert!(reported.is_clean());
    assert_eq!(service.search_count(), 3);
}

#[test]
fn full_last_page_needs_one_more_request() {
    let service = FakeContentService::with_pages(&[20, 20, 20]);
    let fetcher = ContentFetcher::new(&service);

    let reported = fetcher.fetch_library(Uuid::new_v4()).expect("library fetched");

    assert_eq!(reported.value.len(), 60);
    assert_eq!(service.search_count(), 4);
}

#[test]
fn pages_are_requested_in_increasing_offset_order() {
    let library_id = Uuid::new_v4();
    let service = FakeContentService::with_pages(&[5, 5, 2]);
    let fetcher = ContentFetcher::new(&service).with_page_size(5);

    fetcher.fetch_library(library_id).expect("library fetched");

    let searches = service.searches.borrow();
    let offsets: Vec<_> = searches.iter().map(|query| query.offset).collect();
    assert_eq!(offsets, vec![Some(0), Some(5), Some(10)]);
    for query in searches.iter() {
        assert_eq!(query.size, Some(5));
        assert_eq!(query.libraries, Some(vec![library_id]));
        assert_eq!(query.file_types, Some(vec![1]));
        assert_eq!(query.terms, "*");
    }
}

#[test]
fn malformed_page_stops_fetch_and_is_reported() {
    let service = FakeContentService::with_replies(vec![
        Reply::Items((0..20).map(|i| family(&format!("f{i}"), "Acme")).collect()),
        Reply::Malformed,
        Reply::Items((0..20).map(|i| family(&format!("g{i}"), "Acme")).collect()),
    ]);
    let fetcher = ContentFetcher::new(&service);

    let reported = fetcher.fetch_library(Uuid::new_v4()).expect("partial fetch");

    assert_eq!(reported.value.len(), 20);
    assert_eq!(service.search_count(), 2);
    assert!(matches!(
        reported.warnings.as_slice(),
        [Warning::PageFailed { page: 1, offset: 20, .. }]
    ));
}

#[test]
fn unreachable_service_aborts_fetch() {
    let service = FakeContentService::with_replies(vec![
        Reply::Items((0..20).map(|i| family(&format!("f{i}"), "Acme")).collect()),
        Reply::Offline,
    ]);
    let fetcher = ContentFetcher::new(&service);

    let error = fetcher
        .fetch_library(Uuid::new_v4())
        .expect_err("fetch aborted");

    assert!(matches!(error, SyncError::RemoteUnavailable(_)));
}

#[test]
fn fetched_content_is_enriched_from_parameters() {
    let mut content = family("Shelf", "Acme");
    content.parameters.push(Parameter::new("Model", "S-200", "Type B"));
    let service = FakeContentService::with_replies(vec![Reply::Items(vec![content])]);

    let fetched = ContentFetcher::new(&service)
        .fetch_library(Uuid::new_v4())
        .expect("library fetched")
        .value;

    assert_eq!(fetched[0].manufacturer, "Acme");
    assert_eq!(fetched[0].model, "S-200");
    assert_eq!(fetched[0].family_types.len(), 2);
}

#[test]
fn lookup_by_name_without_match_is_not_found() {
    let service = FakeContentService::with_replies(vec![Reply::Items(Vec::new())]);

    let error = ContentFetcher::new(&service)
        .fetch_by_name("Missing Shelf")
        .expect_err("nothing matches");

    assert!(matches!(error, SyncError::NotFound(_)));
}

#[test]
fn ambiguous_lookup_by_name_returns_first_match() {
    let first = family("Shelf", "Acme");
    let second = family("Shelf", "Globex");
    let first_id = first.repository_file_id;
    let service = FakeContentService::with_replies(vec![Reply::Items(vec![first, second])]);

    let reported = ContentFetcher::new(&service)
        .fetch_by_name("Shelf")
        .expect("first match returned");

    assert_eq!(reported.value.repository_file_id, first_id);
    assert_eq!(reported.value.manufacturer, "Acme");
    assert!(matches!(
        reported.warnings.as_slice(),
        [Warning::AmbiguousMatch { matches: 2, .. }]
    ));
    assert_eq!(service.searches.borrow()[0].terms, "Shelf");
}

#[test]
fn single_lookup_by_name_is_clean() {
    let service = FakeContentService::with_replies(vec![Reply::Items(vec![family("Shelf", "Acme")])]);

    let reported = ContentFetcher::new(&service)
        .fetch_by_name("Shelf")
        .expect("content found");

    assert!(reported.is_clean());
}

#[test]
fn lookup_by_revision_filters_on_revision_and_library() {
    let revision_id = Uuid::new_v4();
    let library_id = Uuid::new_v4();
    let service = FakeContentService::with_replies(vec![Reply::Items(vec![family("Shelf", "Acme")])]);

    ContentFetcher::new(&service)
        .fetch_by_revision(revision_id, library_id)
        .expect("content found");

    let query = serde_json::to_value(&service.searches.borrow()[0]).expect("query serialised");
    assert_eq!(
        query,
        serde_json::json!({
            "terms": "*",
            "libraries": [library_id],
            "parameters": [{"FileRevisionId": revision_id}],
            "return": "with-parameters"
        })
    );
}

#[test]
fn lookup_errors_are_surfaced() {
    let service = FakeContentService::with_replies(vec![Reply::Malformed]);

    let error = ContentFetcher::new(&service)
        .fetch_by_name("Shelf")
        .expect_err("lookup fails");

    assert!(matches!(error, SyncError::ParseFailure(_)));
}

#[test]
fn family_types_skip_empty_names_and_duplicates() {
    let mut content = Content::new(Uuid::new_v4(), Uuid::new_v4(), "Shelf");
    content.parameters = vec![
        Parameter::new("Width", "900", "Type A"),
        Parameter::new("Height", "1800", "Type A"),
        Parameter::new("Depth", "400", "Type B"),
        Parameter::new("Comments", "", ""),
    ];

    let types = family_types(&content);

    assert_eq!(types.len(), 2);
    assert!(types.contains("Type A"));
    assert!(types.contains("Type B"));
}

#[test]
fn enrich_uses_first_named_parameter() {
    let mut content = Content::new(Uuid::new_v4(), Uuid::new_v4(), "Shelf");
    content.parameters = vec![
        Parameter::new("Manufacturer", "Acme", "Type A"),
        Parameter::new("Manufacturer", "Globex", "Type B"),
    ];

    let content = enrich(content);

    assert_eq!(content.manufacturer, "Acme");
    assert_eq!(content.model, "");
}

#[test]
fn libraries_are_sorted_by_name() {
    let service = FakeContentService {
        libraries: vec![
            Library {
                id: Uuid::new_v4(),
                name: "lighting".to_string(),
            },
            Library {
                id: Uuid::new_v4(),
                name: "Fixtures".to_string(),
            },
            Library {
                id: Uuid::new_v4(),
                name: "Casework".to_string(),
            },
        ],
        ..FakeContentService::default()
    };

    let libraries = ContentFetcher::new(&service).libraries().expect("libraries listed");
    let names: Vec<_> = libraries.iter().map(|library| library.name.as_str()).collect();

    assert_eq!(names, vec!["Casework", "Fixtures", "lighting"]);
}

#[test]
fn library_page_query_matches_wire_format() {
    let library_id = Uuid::new_v4();
    let query = SearchQuery::library_page(library_id, 20, 40);

    assert_eq!(
        serde_json::to_value(&query).expect("query serialised"),
        serde_json::json!({
            "terms": "*",
            "libraries": [library_id],
            "fileTypes": [1],
            "return": "with-parameters",
            "size": 20,
            "offset": 40
        })
    );
}

#[test]
fn content_payload_tolerates_nulls_and_numbers() {
    let payload = serde_json::json!([{
        "repositoryFileId": "0f8fad5b-d9cb-469f-a165-70867728950e",
        "activeRevisionId": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
        "title": "Shelf",
        "parameters": [
            {"name": "Width", "value": 900, "typeName": "Type A"},
            {"name": "Comments", "value": null, "typeName": null}
        ]
    }]);

    let contents: Vec<Content> = serde_json::from_value(payload).expect("payload parsed");

    assert_eq!(contents[0].title, "Shelf");
    assert_eq!(contents[0].parameters[0].value, "900");
    assert_eq!(contents[0].parameters[1].value, "");
    assert_eq!(contents[0].parameters[1].type_name, "");
}
