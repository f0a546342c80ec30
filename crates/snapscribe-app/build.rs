//! Embeds the workspace `VERSION` file as `SNAPSCRIBE_VERSION`.

use std::fs;
use std::path::Path;

fn main() {
    let version_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("crate lives two levels below the workspace root")
        .join("VERSION");
    println!("cargo:rerun-if-changed={}", version_path.display());

    let version = fs::read_to_string(&version_path)
        .unwrap_or_else(|error| panic!("cannot read {}: {error}", version_path.display()));
    let version = version.trim();
    assert!(!version.is_empty(), "VERSION must not be blank");

    println!("cargo:rustc-env=SNAPSCRIBE_VERSION={version}");
}
