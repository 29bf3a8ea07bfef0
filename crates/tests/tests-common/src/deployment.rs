//! Deployment functions used across test cases.

use std::path::PathBuf;

/// Find the project root via the crate root provided by `cargo test`, and resolve
/// `path` against it. This depends on the convention that this crate lives in
/// `/crates/tests/tests-common`.
pub fn get_path_from_project_root(path: &str) -> PathBuf {
    let mut d = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    d.push("../../../");
    d.push(path);
    d
}

/// The configuration directory checked into the repository.
pub fn static_configuration_dir() -> PathBuf {
    get_path_from_project_root("static")
}
