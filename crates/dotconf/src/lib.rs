//! dotconf: configuration as an attribute tree
//!
//! Loads key-value data from a mapping, a JSON file or a YAML file, applies
//! top-level overrides, and exposes the result as a tree of [`Holder`]s
//! navigated by attribute name. Unassigned attributes auto-vivify on mutable
//! access, so deep paths can be assigned directly.
//!
//! # Example
//!
//! ```rust
//! use dotconf::{Configuration, Mapping};
//!
//! let source: Mapping = serde_json::from_str(
//!     r#"{"name": "Ann", "age": 5, "langs": {"perl": "Elite"}}"#,
//! )
//! .unwrap();
//!
//! let mut config = Configuration::new();
//! config.initialize(source, [("age", 6)]).unwrap();
//!
//! assert_eq!(config["name"], "Ann");
//! assert_eq!(config["age"], 6);
//! assert_eq!(config["langs"]["perl"], "Elite");
//!
//! config["server"]["tls"]["enabled"] = true.into();
//! assert_eq!(config.get_path("server.tls.enabled").and_then(|n| n.as_bool()), Some(true));
//! ```

pub mod error;
pub mod holder;
pub mod source;
pub mod value;

mod config;

pub use config::{configuration, Configuration};
pub use error::{ConfigurationError, Error, ErrorKind, Result};
pub use holder::{Holder, Node};
pub use source::{Format, Source};
pub use value::{Mapping, Value};
