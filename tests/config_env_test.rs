//! Runs in its own process: sets DOCSECT_* variables.

use std::fs;

use docsect::config::{local_config_path, Settings};
use docsect::util::testing::init_test_setup;
use tempfile::TempDir;

#[test]
fn given_env_vars_when_loading_then_override_local_file() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "author = \"file\"\n[formatting]\nitalic = false\n",
    )
    .unwrap();
    std::env::set_var("DOCSECT_AUTHOR", "env-author");
    std::env::set_var("DOCSECT_FORMATTING__ITALIC", "true");

    let settings = Settings::load(Some(dir.path())).unwrap();

    std::env::remove_var("DOCSECT_AUTHOR");
    std::env::remove_var("DOCSECT_FORMATTING__ITALIC");
    assert_eq!(settings.author, "env-author");
    assert!(settings.formatting.italic);
}
