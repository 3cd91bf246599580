mod common;

use asset_content_sync::SyncError;
use asset_content_sync::config::{Config, ContentKey, DEFAULT_PAGE_SIZE, TypeNameEncoding};
use asset_content_sync::manager::Manager;
use common::FakeContentService;
use std::fs;
use tempfile::tempdir;

#[test]
fn empty_file_yields_defaults() {
    let config = Config::from_toml("").expect("defaults parsed");

    assert_eq!(config, Config::default());
    assert_eq!(config.content.page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(config.content.type_name_encoding, TypeNameEncoding::Json);
    assert_eq!(config.columns.id, "Asset ID");
    assert_eq!(config.reconcile.fields, vec!["manufacturer"]);
    assert_eq!(config.reconcile.content_key, ContentKey::Title);
    assert_eq!(config.batch.target_version, 2016);
    assert_eq!(config.batch.data_type, "TEXT");
}

#[test]
fn file_overrides_selected_values() {
    let source = r#"
        [content]
        page_size = 50
        type_name_encoding = "literal"

        [sheet]
        sheet_id = "4583173393803140"

        [columns]
        id = "Tag"

        [reconcile]
        fields = ["manufacturer", "model"]
        content_key = { parameter = "Asset ID" }

        [batch]
        target_version = 2021
    "#;
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("sync.toml");
    fs::write(&path, source).expect("config written");

    let config = Config::load(&path).expect("config loaded");

    assert_eq!(config.content.page_size, 50);
    assert_eq!(config.content.type_name_encoding, TypeNameEncoding::Literal);
    assert_eq!(config.content.base_url, "https://api.unifilabs.com");
    assert_eq!(config.sheet.sheet_id, "4583173393803140");
    assert_eq!(config.columns.id, "Tag");
    assert_eq!(config.columns.manufacturer, "Manufacturer");
    assert_eq!(
        config.reconcile.content_key,
        ContentKey::Parameter("Asset ID".to_string())
    );
    assert_eq!(config.batch.target_version, 2021);
}

#[test]
fn zero_page_size_is_rejected() {
    let error = Config::from_toml("[content]\npage_size = 0\n").expect_err("invalid page size");
    assert!(matches!(error, SyncError::Config(_)));
}

#[test]
fn unknown_keys_are_rejected() {
    let error = Config::from_toml("[content]\npagesize = 10\n").expect_err("typo rejected");
    assert!(matches!(error, SyncError::Toml(_)));
}

#[test]
fn missing_file_is_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    let error = Config::load(&temp_dir.path().join("absent.toml")).expect_err("no file");
    assert!(matches!(error, SyncError::MissingInput(_)));
}

#[test]
fn manager_rejects_unknown_reconcile_field() {
    let config = Config::from_toml("[reconcile]\nfields = [\"colour\"]\n").expect("parsed");
    let service = Box::new(FakeContentService::default());

    let error = Manager::new(config, service).err().expect("manager rejected");

    assert!(matches!(error, SyncError::Config(_)));
}
