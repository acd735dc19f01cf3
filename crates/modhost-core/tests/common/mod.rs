//! Builds unit libraries from workspace crates for native loader tests.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Build the cdylib of `package` and return the path of the library.
///
/// Each feature set gets its own target directory so builds with different
/// features do not overwrite each other's output.
pub fn unit_library(package: &str, features: &[&str]) -> PathBuf {
    let workspace = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let label = if features.is_empty() {
        package.to_string()
    } else {
        format!("{package}-{}", features.join("-"))
    };
    let target_dir = workspace.join("target").join("unit-fixtures").join(label);

    let cargo = std::env::var_os("CARGO").unwrap_or_else(|| "cargo".into());
    let mut command = Command::new(cargo);
    command
        .current_dir(&workspace)
        .args(["build", "--quiet", "-p", package])
        .arg("--target-dir")
        .arg(&target_dir);
    if !features.is_empty() {
        command.args(["--features", &features.join(",")]);
    }

    let status = command.status().expect("failed to run cargo");
    assert!(status.success(), "building {package} failed");

    let file_name = format!(
        "{}{}{}",
        std::env::consts::DLL_PREFIX,
        package.replace('-', "_"),
        std::env::consts::DLL_SUFFIX
    );
    let library = target_dir.join("debug").join(file_name);
    assert!(library.is_file(), "missing {}", library.display());
    library
}

/// Copy `library` into `dir` as `<stem>.<platform extension>`.
pub fn install(library: &Path, dir: &Path, stem: &str) -> PathBuf {
    let dest = dir.join(format!("{stem}.{}", std::env::consts::DLL_EXTENSION));
    std::fs::copy(library, &dest).unwrap();
    dest
}
