//! Error types for dotconf
//!
//! A single structured error type is returned by every fallible operation.
//! It carries the category, the attribute path or file involved, an
//! actionable help message and the underlying cause, which stays reachable
//! through [`std::error::Error::source`].

use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Result type alias for dotconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Name used when talking about the error from the caller's side
pub type ConfigurationError = Error;

/// Main error type for dotconf operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Attribute path where the error occurred (e.g., "database.port")
    pub path: Option<String>,
    /// Source file if the error came from loading one
    pub source_location: Option<SourceLocation>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause
    pub cause: Option<Cause>,
}

/// Location in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl SourceLocation {
    /// Location pointing at a whole file
    pub fn file(path: &Path) -> Self {
        Self {
            file: path.display().to_string(),
            line: None,
            column: None,
        }
    }
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O error (file not found, unreadable, ...)
    Io,
    /// Error parsing JSON/YAML
    Parse,
    /// The file extension does not name a supported format
    UnsupportedFormat { extension: Option<String> },
    /// The loaded document is not a key-value mapping at the top level
    NotAMapping { found: &'static str },
    /// Attribute navigation went through a value that has no attributes
    NotAHolder { found: &'static str },
    /// A dotted attribute path with no segments
    InvalidPath,
}

/// Underlying failure wrapped by an [`Error`]
///
/// Errors are shared behind `Arc` so that [`Error`] stays `Clone`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Cause {
    #[error("{0}")]
    Io(#[source] Arc<std::io::Error>),
    #[error("{0}")]
    Json(#[source] Arc<serde_json::Error>),
    #[error("{0}")]
    Yaml(#[source] Arc<serde_yaml::Error>),
}

impl From<std::io::Error> for Cause {
    fn from(e: std::io::Error) -> Self {
        Cause::Io(Arc::new(e))
    }
}

impl From<serde_json::Error> for Cause {
    fn from(e: serde_json::Error) -> Self {
        Cause::Json(Arc::new(e))
    }
}

impl From<serde_yaml::Error> for Cause {
    fn from(e: serde_yaml::Error) -> Self {
        Cause::Yaml(Arc::new(e))
    }
}

impl Error {
    /// Create an I/O error for a file that could not be read
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        let help = if err.kind() == std::io::ErrorKind::NotFound {
            format!("Check that '{}' exists", path.display())
        } else {
            format!("Check that '{}' is a readable file", path.display())
        };
        Self {
            kind: ErrorKind::Io,
            path: None,
            source_location: Some(SourceLocation::file(path)),
            help: Some(help),
            cause: Some(err.into()),
        }
    }

    /// Create a parse error
    pub fn parse(cause: impl Into<Cause>) -> Self {
        Self {
            kind: ErrorKind::Parse,
            path: None,
            source_location: None,
            help: None,
            cause: Some(cause.into()),
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_string);
        Self {
            kind: ErrorKind::UnsupportedFormat { extension },
            path: None,
            source_location: Some(SourceLocation::file(path)),
            help: Some("Use a file ending in .json, .yaml or .yml".into()),
            cause: None,
        }
    }

    /// Create an error for a document that is not a mapping
    pub fn not_a_mapping(found: &'static str) -> Self {
        Self {
            kind: ErrorKind::NotAMapping { found },
            path: None,
            source_location: None,
            help: Some("The top level of a configuration must be key-value pairs".into()),
            cause: None,
        }
    }

    /// Create an error for navigating into a value without attributes
    pub fn not_a_holder(found: &'static str) -> Self {
        Self {
            kind: ErrorKind::NotAHolder { found },
            path: None,
            source_location: None,
            help: Some("Replace the value with set() before adding attributes under it".into()),
            cause: None,
        }
    }

    /// Create an error for an empty attribute path
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidPath,
            path: Some(path.into()),
            source_location: None,
            help: Some("Use a dotted attribute path such as 'database.host'".into()),
            cause: None,
        }
    }

    /// Add path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add source location to the error
    pub fn with_source_location(mut self, loc: SourceLocation) -> Self {
        self.source_location = Some(loc);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Io => write!(f, "I/O error")?,
            ErrorKind::Parse => write!(f, "Parse error")?,
            ErrorKind::UnsupportedFormat { extension } => match extension {
                Some(ext) => write!(f, "Unsupported configuration format: .{}", ext)?,
                None => write!(f, "Unsupported configuration format: no file extension")?,
            },
            ErrorKind::NotAMapping { found } => {
                write!(f, "Configuration must be a mapping, found {}", found)?
            }
            ErrorKind::NotAHolder { found } => {
                write!(f, "Cannot access attributes of a {} value", found)?
            }
            ErrorKind::InvalidPath => write!(f, "Invalid attribute path")?,
        }

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(loc) = &self.source_location {
            write!(f, "\n  File: {}", loc.file)?;
            if let Some(line) = loc.line {
                write!(f, ":{}", line)?;
            }
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.cause.as_ref()? {
            Cause::Io(e) => Some(e.as_ref()),
            Cause::Json(e) => Some(e.as_ref()),
            Cause::Yaml(e) => Some(e.as_ref()),
        }
    }
}
