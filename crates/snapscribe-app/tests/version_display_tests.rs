//! Integration tests for the version shown by the CLI.

use std::path::Path;

use snapscribe_app::{APP_VERSION, app_version};

#[test]
fn version_display_tests_embeds_workspace_version_file() {
    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("crate lives two levels below the workspace root");
    let recorded = std::fs::read_to_string(workspace_root.join("VERSION"))
        .expect("VERSION should be readable");

    assert_eq!(app_version(), APP_VERSION);
    assert_eq!(app_version(), recorded.trim());
}

#[test]
fn version_display_tests_version_is_plain_semver_triple() {
    let parts: Vec<&str> = app_version().split('.').collect();

    assert_eq!(parts.len(), 3, "unexpected version {}", app_version());
    assert!(
        parts.iter().all(|part| part.parse::<u32>().is_ok()),
        "non-numeric component in {}",
        app_version()
    );
}
