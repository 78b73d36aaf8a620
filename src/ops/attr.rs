use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum AttributeError {
    #[error("attribute '{}' is missing", .0)]
    Missing(String),

    #[error("'{}' is not a valid value for attribute '{}'", .value, .name)]
    InvalidValue { name: String, value: String },

    #[error("{} does not accept {}={}", .node, .name, .value)]
    Unexpected {
        node: &'static str,
        name: String,
        value: String,
    },

    #[error("node type {} cannot be built from attributes", .0)]
    UnsupportedType(String),
}

/// Textual access to a single attribute value.
pub trait AttributeAdapter {
    fn get(&self) -> String;

    // Returns false if `value` is not a valid spelling.
    fn set(&mut self, value: &str) -> bool;
}

/// Enumerations exposed as attributes, spelled by a fixed name table.
pub trait EnumNames: Copy + PartialEq + 'static {
    fn names() -> &'static [(&'static str, Self)];

    fn as_name(&self) -> &'static str {
        Self::names()
            .iter()
            .find(|(_, v)| v == self)
            .map(|(name, _)| *name)
            .unwrap_or("")
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::names()
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }
}

impl<T> AttributeAdapter for T
where
    T: EnumNames,
{
    fn get(&self) -> String {
        self.as_name().to_string()
    }

    fn set(&mut self, value: &str) -> bool {
        match T::from_name(value) {
            Some(v) => {
                *self = v;
                true
            }
            None => false,
        }
    }
}

/// Walks over the structural attributes of a node. Shapes are never visited.
pub trait AttributeVisitor {
    fn on_attribute(&mut self, name: &str, value: &mut dyn AttributeAdapter) -> bool;
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap(BTreeMap<String, String>);

impl AttributeMap {
    pub fn new() -> Self {
        AttributeMap::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert<N, V>(&mut self, name: N, value: V)
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// Collects visited attributes
#[derive(Default)]
pub struct AttributeWriter {
    attrs: AttributeMap,
}

impl AttributeWriter {
    pub fn new() -> Self {
        AttributeWriter::default()
    }

    pub fn into_inner(self) -> AttributeMap {
        self.attrs
    }
}

impl AttributeVisitor for AttributeWriter {
    fn on_attribute(&mut self, name: &str, value: &mut dyn AttributeAdapter) -> bool {
        self.attrs.insert(name, value.get());
        true
    }
}

// Feeds attributes back into a node. Keeps the first failure.
pub struct AttributeReader<'a> {
    attrs: &'a AttributeMap,
    error: Option<AttributeError>,
}

impl<'a> AttributeReader<'a> {
    pub fn new(attrs: &'a AttributeMap) -> Self {
        AttributeReader { attrs, error: None }
    }

    pub fn finish(self) -> Result<(), AttributeError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn fail(&mut self, e: AttributeError) -> bool {
        if self.error.is_none() {
            self.error = Some(e);
        }
        false
    }
}

impl<'a> AttributeVisitor for AttributeReader<'a> {
    fn on_attribute(&mut self, name: &str, value: &mut dyn AttributeAdapter) -> bool {
        match self.attrs.get(name) {
            None => self.fail(AttributeError::Missing(name.to_string())),
            Some(v) if !value.set(v) => self.fail(AttributeError::InvalidValue {
                name: name.to_string(),
                value: v.to_string(),
            }),
            Some(_) => true,
        }
    }
}
