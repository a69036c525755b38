use std::fmt;
use std::path::Path;

use thiserror::Error;

/// What kind of thing a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Section,
    Parent,
    Class,
    Method,
}

impl Missing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Missing::Section => "section",
            Missing::Parent => "parent section",
            Missing::Class => "class",
            Missing::Method => "method",
        }
    }
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while loading or querying the documentation corpus.
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `NotFound` | A section path, parent path, class or method does not exist |
/// | `Startup` | The documentation source is missing, unreadable or empty |
///
/// `NotFound` is an ordinary answer and is reported back to the caller.
/// `Startup` stops the process before it serves anything.
#[derive(Debug, Error)]
pub enum DocsError {
    #[error("{kind} not found: {name}")]
    NotFound {
        kind: Missing,
        name: String,
        /// Close matches the caller may have meant.
        suggestions: Vec<String>,
    },

    #[error("failed to load documentation from {path}: {cause}")]
    Startup { path: String, cause: String },
}

impl DocsError {
    pub fn startup(path: impl AsRef<Path>, cause: impl fmt::Display) -> Self {
        DocsError::Startup {
            path: path.as_ref().display().to_string(),
            cause: cause.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DocsError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, DocsError>;
