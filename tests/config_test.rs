use std::fs;

use docsect::config::{local_config_path, Settings};
use docsect::util::testing::init_test_setup;
use tempfile::TempDir;

#[test]
fn given_local_config_when_loading_then_values_applied() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
author = "Local Reviewer"
track_changes = true

[formatting]
bold = true
size = 9.5
font_family = "Georgia"
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).unwrap();

    assert_eq!(settings.author, "Local Reviewer");
    assert!(settings.track_changes);
    assert!(settings.formatting.bold);
    assert_eq!(settings.formatting.size, Some(9.5));
    assert_eq!(settings.formatting.font_family.as_deref(), Some("Georgia"));
    assert!(!settings.formatting.italic);
}

#[test]
fn given_invalid_local_config_when_loading_then_config_error() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "track_changes = \"sometimes\"").unwrap();

    let err = Settings::load(Some(dir.path())).unwrap_err();

    assert!(err.to_string().starts_with("config error"));
}

#[test]
fn given_local_config_path_when_resolved_then_hidden_toml_in_project() {
    let dir = TempDir::new().unwrap();
    assert_eq!(local_config_path(dir.path()), dir.path().join(".docsect.toml"));
}
