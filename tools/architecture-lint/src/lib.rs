//! Boundary lint for the `user-admin` crate.
//!
//! Every source under `admin/src/{domain,inbound,outbound}` is parsed with
//! `syn`. The paths a file names outside `#[cfg(test)]` items are resolved
//! against the file's own module and checked against each [`Rule`] in
//! [`RULES`] whose scope contains the file. Files named `tests.rs` only hold
//! test modules and are not read.
//!
//! Run it with `cargo run -p architecture-lint`.

mod paths;

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use paths::{LAYERS, ModulePath, named_paths};

/// Something a [`Rule`] refuses to let its scope name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Deny {
    /// The path itself or anything below it, e.g. `crate::outbound` or
    /// `reqwest`.
    Under(&'static str),
    /// Any crate-internal path ending in this item, whichever module
    /// re-exports it.
    Item(&'static str),
}

impl Deny {
    fn matches(self, path: &[String]) -> bool {
        match self {
            Self::Under(prefix) => {
                let expected: Vec<&str> = prefix.split("::").collect();
                path.len() >= expected.len()
                    && path
                        .iter()
                        .zip(&expected)
                        .all(|(segment, wanted)| segment.as_str() == *wanted)
            }
            Self::Item(name) => {
                path.first().is_some_and(|root| root == "crate")
                    && path.last().is_some_and(|last| last == name)
            }
        }
    }
}

impl fmt::Display for Deny {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Under(path) => write!(f, "`{path}`"),
            Self::Item(name) => write!(f, "`{name}`"),
        }
    }
}

/// Deny list applied to every module below `scope`.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Module prefix relative to `admin/src`, written `inbound/views`.
    pub scope: &'static str,
    pub denies: &'static [Deny],
}

/// Boundaries of the admin crate.
///
/// The domain never names adapters or their crates. Inbound code never
/// builds HTTP calls, and views only render the snapshots they are handed.
/// Outbound code knows nothing of the command line or configuration.
pub const RULES: &[Rule] = &[
    Rule {
        scope: "domain",
        denies: &[
            Deny::Under("crate::inbound"),
            Deny::Under("crate::outbound"),
            Deny::Under("crate::settings"),
            Deny::Under("reqwest"),
            Deny::Under("url"),
            Deny::Under("clap"),
            Deny::Under("ortho_config"),
            Deny::Under("color_eyre"),
            Deny::Under("tracing_subscriber"),
            Deny::Under("actix_web"),
        ],
    },
    Rule {
        scope: "inbound",
        denies: &[
            Deny::Under("crate::outbound"),
            Deny::Under("reqwest"),
            Deny::Under("actix_web"),
        ],
    },
    Rule {
        scope: "inbound/views",
        denies: &[
            Deny::Under("crate::domain::ports"),
            Deny::Under("crate::inbound::cli"),
            Deny::Item("PagedListLoader"),
            Deny::Item("EditSession"),
            Deny::Item("RecordDetailFetcher"),
            Deny::Under("tokio"),
        ],
    },
    Rule {
        scope: "outbound",
        denies: &[
            Deny::Under("crate::inbound"),
            Deny::Under("crate::settings"),
            Deny::Under("clap"),
            Deny::Under("ortho_config"),
            Deny::Under("color_eyre"),
        ],
    },
];

/// One denied path named by one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `admin/src`.
    pub file: PathBuf,
    /// Scope of the rule that refused it.
    pub scope: &'static str,
    pub denied: Deny,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} code must not name {}",
            self.file.display(),
            self.scope,
            self.denied
        )
    }
}

/// Why a lint run failed.
#[derive(Debug, Error)]
pub enum LintError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {message}", .file.display())]
    Parse { file: PathBuf, message: String },
    #[error("{} is not below domain/, inbound/ or outbound/", .file.display())]
    OutsideLayers { file: PathBuf },
    #[error("architecture boundary violations:\n{}", bulleted(.0))]
    Violations(Vec<Violation>),
}

fn bulleted(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|violation| format!("- {violation}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `admin/src`.
    pub file: PathBuf,
    pub contents: String,
}

/// Lint the admin crate found at `admin_dir`.
///
/// # Errors
///
/// Returns [`LintError`] when a source cannot be read or parsed, or when
/// any rule is broken.
pub fn lint_admin_sources(admin_dir: &Path) -> Result<(), LintError> {
    let sources = read_layer_sources(&admin_dir.join("src"))?;
    lint_sources(&sources)
}

/// Lint sources already in memory.
///
/// # Errors
///
/// Returns [`LintError`] when a file lies outside the layers, fails to
/// parse, or breaks a rule.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), LintError> {
    let mut violations = Vec::new();
    for source in sources {
        violations.extend(lint_source(source)?);
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(LintError::Violations(violations))
    }
}

fn lint_source(source: &LintSource) -> Result<Vec<Violation>, LintError> {
    let module = ModulePath::from_file(&source.file).ok_or_else(|| LintError::OutsideLayers {
        file: source.file.clone(),
    })?;
    let syntax = syn::parse_file(&source.contents).map_err(|err| LintError::Parse {
        file: source.file.clone(),
        message: err.to_string(),
    })?;
    let named = named_paths(&syntax, &module);

    let mut broken = BTreeSet::new();
    for rule in RULES.iter().filter(|rule| module.is_within(rule.scope)) {
        for deny in rule.denies {
            if named.iter().any(|path| deny.matches(path)) {
                broken.insert((rule.scope, *deny));
            }
        }
    }
    Ok(broken
        .into_iter()
        .map(|(scope, denied)| Violation {
            file: source.file.clone(),
            scope,
            denied,
        })
        .collect())
}

fn read_layer_sources(src: &Path) -> Result<Vec<LintSource>, LintError> {
    let mut pending: Vec<PathBuf> = LAYERS
        .iter()
        .map(|layer| src.join(layer))
        .filter(|dir| dir.is_dir())
        .collect();
    let mut sources = Vec::new();

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).map_err(read_failure(&dir))? {
            let path = entry.map_err(read_failure(&dir))?.path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            let is_rust = path.extension().is_some_and(|ext| ext == "rs");
            let is_test_module = path.file_name().is_some_and(|name| name == "tests.rs");
            if !is_rust || is_test_module {
                continue;
            }
            let contents = fs::read_to_string(&path).map_err(read_failure(&path))?;
            let file = path
                .strip_prefix(src)
                .map_err(|_| LintError::OutsideLayers { file: path.clone() })?
                .to_path_buf();
            sources.push(LintSource { file, contents });
        }
    }

    sources.sort_by(|left, right| left.file.cmp(&right.file));
    Ok(sources)
}

fn read_failure(path: &Path) -> impl FnOnce(io::Error) -> LintError + '_ {
    move |source| LintError::Read {
        path: path.to_path_buf(),
        source,
    }
}
