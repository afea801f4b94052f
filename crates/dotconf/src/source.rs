//! Configuration sources
//!
//! A [`Source`] names where the initial key-value data comes from: nothing,
//! an in-memory mapping, or a JSON/YAML file. Files are read with blocking
//! I/O and their format is picked from the file extension alone.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result, SourceLocation};
use crate::value::{Mapping, Value};

/// Where initial configuration data comes from
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Source {
    /// No data; resolves to an empty mapping
    #[default]
    None,
    /// An in-memory mapping, used as is
    Mapping(Mapping),
    /// A JSON or YAML file
    File(PathBuf),
}

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Pick the format from a path's extension (`json`, `yaml` or `yml`)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }

    /// Parse a document in this format
    ///
    /// Parse errors point at `<input>`; callers loading a file replace that
    /// with the file name.
    pub fn parse(self, content: &str) -> Result<Value> {
        match self {
            Format::Json => serde_json::from_str(content).map_err(|e| {
                let line = Some(e.line()).filter(|l| *l > 0);
                let column = Some(e.column()).filter(|c| *c > 0);
                Error::parse(e).with_source_location(input_location(line, column))
            }),
            Format::Yaml => parse_yaml(content).map_err(|e| {
                let loc = e.location();
                let line = loc.as_ref().map(|l| l.line());
                let column = loc.as_ref().map(|l| l.column());
                Error::parse(e).with_source_location(input_location(line, column))
            }),
        }
    }
}

/// Parse YAML with `<<` merge keys applied
fn parse_yaml(content: &str) -> std::result::Result<Value, serde_yaml::Error> {
    let mut doc: serde_yaml::Value = serde_yaml::from_str(content)?;
    doc.apply_merge()?;
    serde_yaml::from_value(doc)
}

fn input_location(line: Option<usize>, column: Option<usize>) -> SourceLocation {
    SourceLocation {
        file: "<input>".into(),
        line,
        column,
    }
}

impl Source {
    /// Resolve the source into a flat mapping
    ///
    /// Files must exist, carry a recognized extension, parse, and hold a
    /// mapping at the top level.
    pub fn resolve(self) -> Result<Mapping> {
        match self {
            Source::None => Ok(Mapping::new()),
            Source::Mapping(map) => Ok(map),
            Source::File(path) => load_file(&path),
        }
    }
}

fn load_file(path: &Path) -> Result<Mapping> {
    let metadata = std::fs::metadata(path).map_err(|e| Error::io(path, e))?;
    if !metadata.is_file() {
        let err = io::Error::new(io::ErrorKind::InvalidInput, "not a regular file");
        return Err(Error::io(path, err));
    }
    let format = Format::from_path(path).ok_or_else(|| Error::unsupported_format(path))?;

    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    log::trace!("Loading {:?} configuration from {}", format, path.display());

    let value = format.parse(&content).map_err(|mut e| {
        if let Some(loc) = e.source_location.as_mut() {
            loc.file = path.display().to_string();
        }
        e
    })?;

    let found = value.type_name();
    value.into_mapping().ok_or_else(|| {
        Error::not_a_mapping(found).with_source_location(SourceLocation::file(path))
    })
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        if path.is_empty() {
            Source::None
        } else {
            Source::File(PathBuf::from(path))
        }
    }
}

impl From<String> for Source {
    fn from(path: String) -> Self {
        Source::from(path.as_str())
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::from(path.to_path_buf())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        if path.as_os_str().is_empty() {
            Source::None
        } else {
            Source::File(path)
        }
    }
}

impl From<&PathBuf> for Source {
    fn from(path: &PathBuf) -> Self {
        Source::from(path.clone())
    }
}

impl From<Mapping> for Source {
    fn from(map: Mapping) -> Self {
        Source::Mapping(map)
    }
}

impl<S: Into<Source>> From<Option<S>> for Source {
    fn from(source: Option<S>) -> Self {
        source.map(Into::into).unwrap_or_default()
    }
}
