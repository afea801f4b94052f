//! The attribute tree
//!
//! A [`Holder`] is an open-ended set of named attributes. Each attribute
//! stores a [`Node`]: a scalar, a sequence of nodes, or a nested `Holder`.
//!
//! Mutable reads auto-vivify. Asking a `Holder` for an attribute that was
//! never assigned stores an empty `Holder` under that name and returns it,
//! so deep paths can be assigned without declaring the levels above them:
//!
//! ```rust
//! use dotconf::Holder;
//!
//! let mut root = Holder::new();
//! root["a"]["b"]["c"] = 5.into();
//! assert_eq!(root["a"]["b"]["c"], 5);
//! ```
//!
//! Shared reads (`get`, `get_path`, `Index`) never modify the tree. They are
//! what formatting, debugging and tests use to look at a tree without
//! creating attributes as a side effect.

use indexmap::IndexMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::value::{Mapping, Value};

/// A value stored under a [`Holder`] attribute
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Integer above `i64::MAX`
    UInt(u64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Ordered sequence of nodes
    Sequence(Vec<Node>),
    /// Nested attribute holder
    Holder(Holder),
}

/// A node of the configuration tree with attribute-style access
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Holder {
    attributes: IndexMap<String, Node>,
}

/// Returned by shared reads of attributes that were never assigned
fn empty_holder() -> &'static Node {
    static EMPTY: OnceLock<Node> = OnceLock::new();
    EMPTY.get_or_init(|| Node::Holder(Holder::new()))
}

/// Returned by shared reads of attributes of a non-holder node
fn null_node() -> &'static Node {
    static NULL: OnceLock<Node> = OnceLock::new();
    NULL.get_or_init(|| Node::Null)
}

impl Holder {
    /// Create an empty holder
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the node stored under `name` without creating it
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.attributes.get(name)
    }

    /// Get the node stored under `name`, creating an empty holder there if
    /// the attribute was never assigned
    pub fn get_or_create_child(&mut self, name: &str) -> &mut Node {
        self.attributes
            .entry(name.to_string())
            .or_insert_with(|| Node::Holder(Holder::new()))
    }

    /// Store `value` under `name`, replacing any previous value and its type
    ///
    /// Returns the node that was replaced, if any.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Node>) -> Option<Node> {
        self.attributes.insert(name.into(), value.into())
    }

    /// Remove an attribute, returning its node
    pub fn remove(&mut self, name: &str) -> Option<Node> {
        self.attributes.shift_remove(name)
    }

    /// Check whether an attribute has been assigned
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Number of assigned attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check whether no attribute is assigned
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Remove every attribute
    pub fn clear(&mut self) {
        self.attributes.clear();
    }

    /// Names of all assigned attributes, in assignment order
    pub fn active_attribute_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.attributes.keys().map(String::as_str)
    }

    /// Iterate over attribute names and their nodes
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> + '_ {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get a node by dotted path (e.g., "languages.object_oriented.best")
    /// without creating anything
    pub fn get_path(&self, path: &str) -> Option<&Node> {
        let mut segments = split_path(path);
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_holder()?.get(segment)?;
        }
        Some(current)
    }

    /// Get a node by dotted path, creating empty holders for every level
    /// that was never assigned
    pub fn get_path_mut(&mut self, path: &str) -> Result<&mut Node> {
        let segments: Vec<&str> = split_path(path).collect();
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| Error::invalid_path(path))?;
        let parent = holder_at_mut(self, parents)?;
        Ok(parent.get_or_create_child(last))
    }

    /// Assign a value by dotted path, creating intermediate holders as needed
    pub fn set_path(&mut self, path: &str, value: impl Into<Node>) -> Result<()> {
        let segments: Vec<&str> = split_path(path).collect();
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| Error::invalid_path(path))?;
        holder_at_mut(self, parents)?.set(*last, value);
        Ok(())
    }

    /// Render the subtree as indented, human-readable lines
    ///
    /// Each line is prefixed by `indent_level` tabs. A nested holder renders
    /// as a `name:` header followed by its own attributes one level deeper;
    /// everything else renders as `name: value`.
    pub fn to_formatted_string(&self, indent_level: usize) -> String {
        let prefix = "\t".repeat(indent_level);
        let mut lines = Vec::with_capacity(self.attributes.len());

        for (name, node) in &self.attributes {
            match node {
                Node::Holder(child) if child.is_empty() => {
                    lines.push(format!("{}{}:", prefix, name));
                }
                Node::Holder(child) => {
                    lines.push(format!(
                        "{}{}:\n{}",
                        prefix,
                        name,
                        child.to_formatted_string(indent_level + 1)
                    ));
                }
                other => lines.push(format!("{}{}: {}", prefix, name, other)),
            }
        }

        lines.join("\n")
    }
}

/// Split a dotted path, ignoring empty segments
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|s| !s.is_empty())
}

/// Walk down `segments`, vivifying missing levels, and return the holder
/// found at the end
fn holder_at_mut<'a>(mut holder: &'a mut Holder, segments: &[&str]) -> Result<&'a mut Holder> {
    for (i, segment) in segments.iter().enumerate() {
        holder = holder
            .get_or_create_child(segment)
            .holder_mut_or_vivify()
            .map_err(|e| e.with_path(segments[..=i].join(".")))?;
    }
    Ok(holder)
}

impl Node {
    /// Check if this node is null
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Check if this node is a boolean
    pub fn is_bool(&self) -> bool {
        matches!(self, Node::Bool(_))
    }

    /// Check if this node is an integer of either width
    pub fn is_integer(&self) -> bool {
        matches!(self, Node::Integer(_) | Node::UInt(_))
    }

    /// Check if this node is a float
    pub fn is_float(&self) -> bool {
        matches!(self, Node::Float(_))
    }

    /// Check if this node is a string
    pub fn is_string(&self) -> bool {
        matches!(self, Node::String(_))
    }

    /// Check if this node is a sequence
    pub fn is_sequence(&self) -> bool {
        matches!(self, Node::Sequence(_))
    }

    /// Check if this node is a holder
    pub fn is_holder(&self) -> bool {
        matches!(self, Node::Holder(_))
    }

    /// Get as boolean if this is a Bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an integer that fits
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Integer(i) => Some(*i),
            Node::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Get as u64 if this is a non-negative integer
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Node::Integer(i) => u64::try_from(*i).ok(),
            Node::UInt(u) => Some(*u),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float or an integer
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Float(f) => Some(*f),
            Node::Integer(i) => Some(*i as f64),
            Node::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }

    /// Get as str if this is a String
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as slice if this is a Sequence
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Get as holder if this is a Holder
    pub fn as_holder(&self) -> Option<&Holder> {
        match self {
            Node::Holder(h) => Some(h),
            _ => None,
        }
    }

    /// Get as mutable holder if this is a Holder
    pub fn as_holder_mut(&mut self) -> Option<&mut Holder> {
        match self {
            Node::Holder(h) => Some(h),
            _ => None,
        }
    }

    /// Returns the type name of this node
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Integer(_) | Node::UInt(_) => "integer",
            Node::Float(_) => "float",
            Node::String(_) => "string",
            Node::Sequence(_) => "sequence",
            Node::Holder(_) => "holder",
        }
    }

    /// Get the attribute `name` of this node, creating it if needed
    ///
    /// A null node is turned into an empty holder first. Any other
    /// non-holder node has no attributes and yields an error.
    pub fn attr(&mut self, name: &str) -> Result<&mut Node> {
        Ok(self.holder_mut_or_vivify()?.get_or_create_child(name))
    }

    fn holder_mut_or_vivify(&mut self) -> Result<&mut Holder> {
        if self.is_null() {
            *self = Node::Holder(Holder::new());
        }
        match self {
            Node::Holder(h) => Ok(h),
            other => Err(Error::not_a_holder(other.type_name())),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Null => write!(f, "null"),
            Node::Bool(b) => write!(f, "{}", b),
            Node::Integer(i) => write!(f, "{}", i),
            Node::UInt(u) => write!(f, "{}", u),
            Node::Float(n) => write!(f, "{}", n),
            Node::String(s) => write!(f, "{}", s),
            Node::Sequence(seq) => {
                write!(f, "[")?;
                for (i, v) in seq.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Node::Holder(holder) => write!(f, "{}", holder),
        }
    }
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.attributes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

// Conversion from loaded data: mappings become holders, sequences are
// converted element by element, scalars pass through.

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Integer(i) => Node::Integer(i),
            Value::UInt(u) => Node::from(u),
            Value::Float(f) => Node::Float(f),
            Value::String(s) => Node::String(s),
            Value::Sequence(seq) => Node::Sequence(seq.into_iter().map(Node::from).collect()),
            Value::Mapping(map) => Node::Holder(Holder::from(map)),
        }
    }
}

impl From<Mapping> for Holder {
    fn from(map: Mapping) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Node>> FromIterator<(K, V)> for Holder {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attributes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<Holder> for Node {
    fn from(h: Holder) -> Self {
        Node::Holder(h)
    }
}

macro_rules! node_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Node {
                fn from(v: $ty) -> Self {
                    Node::$variant(v.into())
                }
            }
        )*
    };
}

node_from! {
    bool => Bool,
    i32 => Integer,
    i64 => Integer,
    f64 => Float,
    String => String,
    &str => String,
}

/// Values that fit in an `i64` are stored as `Integer`, so equal numbers
/// compare equal whichever way they were built.
impl From<u64> for Node {
    fn from(u: u64) -> Self {
        i64::try_from(u).map_or(Node::UInt(u), Node::Integer)
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(v: Vec<T>) -> Self {
        Node::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(v: Option<T>) -> Self {
        v.map_or(Node::Null, Into::into)
    }
}

impl Index<&str> for Holder {
    type Output = Node;

    /// Unassigned attributes read as an empty holder; nothing is stored.
    fn index(&self, name: &str) -> &Node {
        self.get(name).unwrap_or_else(|| empty_holder())
    }
}

impl IndexMut<&str> for Holder {
    fn index_mut(&mut self, name: &str) -> &mut Node {
        self.get_or_create_child(name)
    }
}

impl Index<&str> for Node {
    type Output = Node;

    /// Attributes of a holder read as with [`Holder`]'s index; attributes of
    /// any other node read as null.
    fn index(&self, name: &str) -> &Node {
        match self {
            Node::Holder(h) => &h[name],
            _ => null_node(),
        }
    }
}

impl IndexMut<&str> for Node {
    /// # Panics
    ///
    /// Panics if the node is neither a holder nor null. Use [`Node::attr`]
    /// to get an error instead.
    fn index_mut(&mut self, name: &str) -> &mut Node {
        let type_name = self.type_name();
        match self.attr(name) {
            Ok(node) => node,
            Err(_) => panic!("cannot access attribute `{}` of a {} value", name, type_name),
        }
    }
}

impl PartialEq<str> for Node {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Node {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<String> for Node {
    fn eq(&self, other: &String) -> bool {
        self.as_str() == Some(other.as_str())
    }
}

impl PartialEq<i64> for Node {
    fn eq(&self, other: &i64) -> bool {
        self.as_i64() == Some(*other)
    }
}

impl PartialEq<u64> for Node {
    fn eq(&self, other: &u64) -> bool {
        self.as_u64() == Some(*other)
    }
}

impl PartialEq<i32> for Node {
    fn eq(&self, other: &i32) -> bool {
        self.as_i64() == Some(*other as i64)
    }
}

impl PartialEq<f64> for Node {
    fn eq(&self, other: &f64) -> bool {
        self.as_f64() == Some(*other)
    }
}

impl PartialEq<bool> for Node {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}
