//! The Configuration root
//!
//! [`Configuration`] is the root [`Holder`] of a loaded configuration. It
//! adds loading (`initialize`), clearing (`reset`) and a human-readable
//! dump (`Display`). Everything else is the holder API, reached through
//! `Deref`.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{LazyLock, RwLock};

use crate::error::Result;
use crate::holder::{Holder, Node};
use crate::source::Source;
use crate::value::Value;

/// Root of a configuration tree
///
/// Each `initialize` builds the tree purely from its own arguments:
///
/// ```rust
/// use dotconf::{Configuration, Mapping, Value};
///
/// let mut source = Mapping::new();
/// source.insert("a".into(), Value::from(1));
///
/// let mut config = Configuration::new();
/// config.initialize(source, Mapping::new()).unwrap();
/// assert_eq!(config["a"], 1);
///
/// config.initialize(None::<&str>, [("b", 2)]).unwrap();
/// assert!(!config.contains("a"));
/// assert_eq!(config["b"], 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    root: Holder,
}

static GLOBAL: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::new()));

/// The process-wide configuration, created empty on first use
///
/// The lock only makes the shared instance sound. Callers are expected to
/// initialize it from one place (typically at startup) and read it
/// afterwards; interleaving `initialize`/`reset` from several threads is
/// not coordinated beyond that.
pub fn configuration() -> &'static RwLock<Configuration> {
    &GLOBAL
}

impl Configuration {
    /// Create an empty configuration
    ///
    /// Most programs use the shared instance from [`configuration()`]; a
    /// standalone instance is useful when passing configuration around
    /// explicitly, and in tests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every attribute
    pub fn reset(&mut self) {
        self.root.clear();
    }

    /// Load `source`, apply `overrides` on top of it and rebuild the tree
    ///
    /// The tree is reset first. Overrides replace same-named top-level keys
    /// of the source; nothing is merged below the top level. On error the
    /// tree is left empty.
    pub fn initialize<S, I, K, V>(&mut self, source: S, overrides: I) -> Result<()>
    where
        S: Into<Source>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.reset();

        let source = source.into();
        let mut merged = match source.resolve() {
            Ok(map) => map,
            Err(e) => {
                log::error!("Failed to initialize configuration: {}", e);
                return Err(e);
            }
        };

        for (key, value) in overrides {
            merged.insert(key.into(), value.into());
        }

        for (key, value) in merged {
            self.root.set(key, Node::from(value));
        }

        log::debug!(
            "Configuration initialized with {} top-level attributes",
            self.root.len()
        );
        Ok(())
    }
}

impl Deref for Configuration {
    type Target = Holder;

    fn deref(&self) -> &Holder {
        &self.root
    }
}

impl DerefMut for Configuration {
    fn deref_mut(&mut self) -> &mut Holder {
        &mut self.root
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration\n{}", self.root.to_formatted_string(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::value::Mapping;
    use pretty_assertions::assert_eq;
    use std::error::Error as _;
    use std::path::{Path, PathBuf};

    fn testdata(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("testdata")
            .join(name)
    }

    fn no_overrides() -> Mapping {
        Mapping::new()
    }

    fn mapping(json: &str) -> Mapping {
        serde_json::from_str(json).unwrap()
    }

    fn assert_sample(config: &Configuration) {
        assert_eq!(config["name"], "Martin D'vloper");
        assert_eq!(config["job"], "Developer");
        assert_eq!(config["skill"], "Elite");
        assert_eq!(config["employed"], true);
        assert_eq!(config["age"], 24);
        assert_eq!(
            config["foods"],
            Node::from(vec![Node::from("Apple"), Node::from("Mango"), Node::from(1234)])
        );
        assert_eq!(config["languages"]["perl"], "Elite");
        assert_eq!(
            config["languages"]["object_oriented"]["best"],
            Node::from(vec!["C++", "C#"])
        );
        assert_eq!(config["languages"]["object_oriented"]["great"], "Java");
    }

    #[test]
    fn test_yaml_initialization() {
        let mut config = Configuration::new();
        config
            .initialize(testdata("sample.yaml"), no_overrides())
            .unwrap();

        assert_sample(&config);
    }

    #[test]
    fn test_json_initialization() {
        let mut config = Configuration::new();
        config
            .initialize(testdata("sample.json"), no_overrides())
            .unwrap();

        assert_sample(&config);
        assert_eq!(config["mysql"]["host"], "localhost");
    }

    #[test]
    fn test_dict_initialization() {
        let source = mapping(&std::fs::read_to_string(testdata("sample.json")).unwrap());

        let mut config = Configuration::new();
        config.initialize(source, no_overrides()).unwrap();

        assert_sample(&config);
    }

    #[test]
    fn test_direct_initialization() {
        let languages = mapping(
            r#"{"perl": "Elite", "object_oriented": {"best": ["C++", "C#"], "great": "Java"}}"#,
        );

        let mut config = Configuration::new();
        config
            .initialize(
                Source::None,
                [
                    ("name", Value::from("Martin D'vloper")),
                    ("employed", Value::from(true)),
                    ("foods", Value::from(vec![Value::from("Apple"), Value::from(1234)])),
                    ("languages", Value::from(languages)),
                ],
            )
            .unwrap();

        assert_eq!(config["name"], "Martin D'vloper");
        assert_eq!(config["employed"], true);
        assert_eq!(
            config["foods"],
            Node::from(vec![Node::from("Apple"), Node::from(1234)])
        );
        assert_eq!(
            config["languages"]["object_oriented"]["best"],
            Node::from(vec!["C++", "C#"])
        );
    }

    #[test]
    fn test_mixed_json_initialization() {
        let mut config = Configuration::new();
        config
            .initialize(testdata("sample.json"), [("junk", "some junk")])
            .unwrap();

        assert_sample(&config);
        assert_eq!(config["junk"], "some junk");
    }

    #[test]
    fn test_mixed_yaml_initialization() {
        let mut config = Configuration::new();
        config
            .initialize(testdata("sample.yaml"), [("junk", "some junk")])
            .unwrap();

        assert_sample(&config);
        assert_eq!(config["junk"], "some junk");
    }

    #[test]
    fn test_override_wins_shallow() {
        let source = mapping(r#"{"a": 1, "db": {"host": "localhost", "port": 5432}, "c": [1, 2]}"#);
        let overrides = mapping(r#"{"a": "one", "db": {"host": "prod"}}"#);

        let mut config = Configuration::new();
        config.initialize(source, overrides).unwrap();

        assert_eq!(config["a"], "one");
        assert_eq!(config["db"]["host"], "prod");
        // Top-level replacement: the source's nested keys do not survive
        assert!(config["db"].as_holder().unwrap().get("port").is_none());
        assert_eq!(config["c"], Node::from(vec![1, 2]));
    }

    #[test]
    fn test_concrete_json_scenario() {
        let dir = std::env::temp_dir().join("dotconf_test_concrete_json");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("person.json");
        std::fs::write(
            &path,
            r#"{"name": "Ann", "age": 5, "langs": {"perl": "Elite"}}"#,
        )
        .unwrap();

        let mut config = Configuration::new();
        config.initialize(&path, no_overrides()).unwrap();

        assert_eq!(config["name"], "Ann");
        assert_eq!(config["age"], 5);
        assert_eq!(config["langs"]["perl"], "Elite");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_initialize_replaces_previous_state() {
        let mut config = Configuration::new();
        config.initialize(mapping(r#"{"a": 1}"#), no_overrides()).unwrap();
        assert_eq!(config["a"], 1);

        config.initialize(Source::None, [("b", 2)]).unwrap();

        assert!(!config.contains("a"));
        assert!(config["a"].is_holder());
        assert_eq!(config["b"], 2);
        assert_eq!(config.active_attribute_names().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_missing_file_leaves_tree_empty() {
        let mut config = Configuration::new();
        config
            .initialize(testdata("sample.yaml"), no_overrides())
            .unwrap();

        let err = config
            .initialize("missing.json", no_overrides())
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Io);
        assert!(config.is_empty());
    }

    #[test]
    fn test_non_existing_filename() {
        let mut config = Configuration::new();

        let err = config
            .initialize("invalid.nonexisting", [("kept", 1)])
            .unwrap_err();

        assert!(err.source().unwrap().is::<std::io::Error>());
        assert!(config.is_empty());
    }

    #[test]
    fn test_bad_json() {
        let mut config = Configuration::new();
        config.set("stale", 1);

        let err = config
            .initialize(testdata("bad.json"), no_overrides())
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Parse);
        assert!(config.is_empty());
    }

    #[test]
    fn test_bad_yaml() {
        let mut config = Configuration::new();

        let err = config
            .initialize(testdata("invalid.yaml"), no_overrides())
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Parse);
        assert!(config.is_empty());
    }

    #[test]
    fn test_integers_beyond_i64() {
        let dir = std::env::temp_dir().join("dotconf_test_wide_integers");
        std::fs::create_dir_all(&dir).unwrap();
        let yaml = dir.join("ids.yaml");
        std::fs::write(&yaml, "id: 18446744073709551615\nmin: -9223372036854775808\n").unwrap();
        let json = dir.join("ids.json");
        std::fs::write(&json, r#"{"id": 18446744073709551615}"#).unwrap();

        let mut config = Configuration::new();
        config.initialize(&yaml, no_overrides()).unwrap();
        assert_eq!(config["id"], u64::MAX);
        assert_eq!(config["min"], i64::MIN);
        assert_eq!(
            config.to_string(),
            "Configuration\n\tid: 18446744073709551615\n\tmin: -9223372036854775808"
        );

        config.initialize(&json, no_overrides()).unwrap();
        assert_eq!(config["id"].to_string(), "18446744073709551615");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_yaml_anchors_and_merge_keys() {
        let mut config = Configuration::new();
        config
            .initialize(testdata("anchors.yaml"), no_overrides())
            .unwrap();

        assert_eq!(config["derived"]["x"], 1);
        assert_eq!(config["derived"]["y"], 2);
        assert!(!config["derived"].as_holder().unwrap().contains("<<"));
        assert_eq!(config["alias"], config["base"]);
        assert_eq!(config["base"]["y"], 0);
    }

    #[test]
    fn test_non_string_yaml_keys() {
        let dir = std::env::temp_dir().join("dotconf_test_non_string_keys");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ports.yaml");
        std::fs::write(&path, "80: http\n443: https\n").unwrap();

        let mut config = Configuration::new();
        config.set("stale", 1);
        let err = config.initialize(&path, no_overrides()).unwrap_err();

        assert_eq!(err.kind, ErrorKind::Parse);
        assert!(config.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unsupported_extension_leaves_tree_empty() {
        let dir = std::env::temp_dir().join("dotconf_test_config_png");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("foo.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G', 0xff]).unwrap();

        let mut config = Configuration::new();
        let err = config.initialize(&path, no_overrides()).unwrap_err();

        assert_eq!(
            err.kind,
            ErrorKind::UnsupportedFormat {
                extension: Some("png".into())
            }
        );
        assert!(config.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_source_with_no_overrides() {
        let mut config = Configuration::new();
        config.set("stale", 1);

        config.initialize("", no_overrides()).unwrap();

        assert!(config.is_empty());
    }

    #[test]
    fn test_reset() {
        let mut config = Configuration::new();
        config.reset();
        assert_eq!(config.active_attribute_names().count(), 0);

        config
            .initialize(testdata("sample.json"), no_overrides())
            .unwrap();
        config.reset();

        assert_eq!(config.active_attribute_names().count(), 0);
        assert_eq!(config, Configuration::new());
    }

    #[test]
    fn test_assignments() {
        let mut config = Configuration::new();
        config.set("host", "localhost");
        assert!(config["host"].is_string());

        config.reset();
        config["host"] = "localhost".into();
        assert_eq!(config["host"], "localhost");
    }

    #[test]
    fn test_auto_vivification_on_root() {
        let mut config = Configuration::new();

        assert!(config.get_or_create_child("junk").is_holder());
        config["j1"]["j2"]["j3"]["j4"]["j5"] = "junk".into();

        assert_eq!(config["j1"]["j2"]["j3"]["j4"]["j5"], "junk");
        assert_eq!(
            config.active_attribute_names().collect::<Vec<_>>(),
            vec!["junk", "j1"]
        );
    }

    #[test]
    fn test_display() {
        let mut config = Configuration::new();
        assert_eq!(config.to_string(), "Configuration\n");

        config
            .initialize(mapping(r#"{"a": "test", "b": {"c": [1, 2]}}"#), no_overrides())
            .unwrap();

        assert_eq!(config.to_string(), "Configuration\n\ta: test\n\tb:\n\t\tc: [1, 2]");
    }

    #[test]
    fn test_global_instance() {
        {
            let mut config = configuration().write().unwrap();
            config.initialize(Source::None, [("name", "unknown")]).unwrap();
        }

        assert_eq!(configuration().read().unwrap()["name"], "unknown");

        configuration().write().unwrap().reset();
        assert!(configuration().read().unwrap().is_empty());
    }
}
