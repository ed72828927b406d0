use std::path::PathBuf;

use docqa_core::config::{expand_path, resolve_with_base};
use tempfile::TempDir;

#[test]
fn env_vars_expand_inside_paths() {
    std::env::set_var("DOCQA_TEST_DATA_DIR", "/srv/data");
    assert_eq!(
        expand_path("${DOCQA_TEST_DATA_DIR}/index.json"),
        PathBuf::from("/srv/data/index.json")
    );
}

#[test]
fn relative_paths_resolve_against_the_base() {
    let dir = TempDir::new().expect("tempdir");
    let p = resolve_with_base(dir.path(), "data/index.json");
    assert_eq!(p, dir.path().join("data/index.json"));
}

#[test]
fn absolute_paths_ignore_the_base() {
    let dir = TempDir::new().expect("tempdir");
    assert_eq!(
        resolve_with_base(dir.path(), "/etc/docqa/index.json"),
        PathBuf::from("/etc/docqa/index.json")
    );
}
