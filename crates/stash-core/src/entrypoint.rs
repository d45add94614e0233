//! Entrypoint detection for attached tools

use std::fmt;

use stash_fs::NormalizedPath;

/// Entry reference used when nothing is detected and none was given.
pub const DEFAULT_ENTRYPOINT: &str = "src/main.py";

const MODULE_PREFIX: &str = "-m ";

/// Candidates tried in order; the first that exists wins.
pub const CANDIDATES: [&str; 6] = [
    "src/main.py",
    "main.py",
    "-m src.main",
    "-m main",
    "src/__main__.py",
    "__main__.py",
];

/// How a tool is started: a script path or a module run with `-m`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryReference {
    /// Path relative to the tool root
    File(String),
    /// Dotted module name, run as `-m <module>`
    Module(String),
}

impl EntryReference {
    /// Parse the on-disk form.
    pub fn parse(value: &str) -> Self {
        match value.strip_prefix(MODULE_PREFIX) {
            Some(module) => Self::Module(module.trim().to_string()),
            None => Self::File(value.to_string()),
        }
    }

    /// File that must exist under `tool_root` for this reference to work.
    ///
    /// `-m a.b` maps to `a/b.py`.
    pub fn target(&self, tool_root: &NormalizedPath) -> NormalizedPath {
        match self {
            Self::File(path) => tool_root.join(path),
            Self::Module(module) => tool_root.join(format!("{}.py", module.replace('.', "/"))),
        }
    }

    pub fn exists_under(&self, tool_root: &NormalizedPath) -> bool {
        self.target(tool_root).is_file()
    }

    pub fn is_module(&self) -> bool {
        matches!(self, Self::Module(_))
    }
}

impl fmt::Display for EntryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{path}"),
            Self::Module(module) => write!(f, "{MODULE_PREFIX}{module}"),
        }
    }
}

/// Detect the entry reference of the tool at `tool_root`.
pub fn resolve(tool_root: &NormalizedPath) -> Option<EntryReference> {
    let found = CANDIDATES
        .iter()
        .map(|candidate| EntryReference::parse(candidate))
        .find(|candidate| candidate.exists_under(tool_root));
    tracing::debug!(root = %tool_root, entrypoint = ?found, "entrypoint detection");
    found
}

/// Detected reference, else the caller's, else [`DEFAULT_ENTRYPOINT`].
pub fn resolve_or(tool_root: &NormalizedPath, supplied: Option<&str>) -> EntryReference {
    resolve(tool_root)
        .or_else(|| supplied.map(EntryReference::parse))
        .unwrap_or_else(|| EntryReference::parse(DEFAULT_ENTRYPOINT))
}
