//! CLI entry point for the repo-local architecture lint.
//!
//! `architecture-lint [ADMIN_DIR]` lints `ADMIN_DIR/src`, defaulting to the
//! `admin/` directory of the enclosing workspace.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use thiserror::Error;

fn main() -> ExitCode {
    let admin_dir = match std::env::args_os().nth(1) {
        Some(explicit) => PathBuf::from(explicit),
        None => match workspace_root() {
            Ok(root) => root.join("admin"),
            Err(err) => return report(&err),
        },
    };
    match architecture_lint::lint_admin_sources(&admin_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn report(err: &dyn fmt::Display) -> ExitCode {
    let _ = writeln!(io::stderr().lock(), "{err}");
    ExitCode::FAILURE
}

#[derive(Debug, Clone, Copy, Error)]
#[error("no enclosing directory holds a workspace Cargo.toml")]
struct WorkspaceRootError;

fn workspace_root() -> Result<PathBuf, WorkspaceRootError> {
    let candidates = [
        std::env::var_os("CARGO_WORKSPACE_DIR").map(PathBuf::from),
        std::env::current_dir().ok(),
        Some(PathBuf::from(env!("CARGO_MANIFEST_DIR"))),
    ];
    candidates
        .iter()
        .flatten()
        .find_map(|start| find_workspace_root(start))
        .ok_or(WorkspaceRootError)
}

fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| declares_workspace(&dir.join("Cargo.toml")))
        .map(Path::to_path_buf)
}

fn declares_workspace(manifest: &Path) -> bool {
    fs::read_to_string(manifest).is_ok_and(|contents| contents.contains("[workspace]"))
}
