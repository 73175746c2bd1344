//! Tabular feed data: property names plus tagged rows

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::Error;
use crate::error::Result;

/// Identity of an external data source inside a [`FeedCache`](super::FeedCache)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceKey(String);

impl SourceKey {
    /// The key as a string slice
    pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for SourceKey {
    fn from(key: &str) -> Self { Self(key.to_string()) }
}

impl From<String> for SourceKey {
    fn from(key: String) -> Self { Self(key) }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// One record; values line up with [`Rows`] properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Optional label used to filter rows
    pub tag:    Option<String>,
    /// One value per property
    pub values: Vec<JsonValue>,
}

/// Rows loaded from one source, with named properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rows {
    properties: Vec<String>,
    rows:       Vec<Row>,
}

impl Rows {
    /// Empty rows with these property names
    pub fn new<S: Into<String>>(properties: impl IntoIterator<Item = S>) -> Self {
        Self {
            properties: properties.into_iter().map(Into::into).collect(),
            rows:       Vec::new(),
        }
    }

    /// Append a row; the number of values must match the number of properties
    pub fn push_row(&mut self, tag: Option<&str>, values: Vec<JsonValue>) -> Result<()> {
        if values.len() != self.properties.len() {
            return Err(Error::invalid(
                "row",
                format!(
                    "expected {} value(s), found {}",
                    self.properties.len(),
                    values.len()
                ),
            )
            .into());
        }
        self.rows.push(Row {
            tag: tag.map(ToString::to_string),
            values,
        });
        Ok(())
    }

    /// Builder form of [`Rows::push_row`]
    pub fn with_row(mut self, tag: Option<&str>, values: Vec<JsonValue>) -> Result<Self> {
        self.push_row(tag, values)?;
        Ok(self)
    }

    /// Property names in column order
    pub fn properties(&self) -> &[String] { &self.properties }

    /// Column of a property, by name
    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|property| property == name)
    }

    /// Rows carrying `tag`; every row when `tag` is `None`
    pub fn rows_for_tag<'a>(&'a self, tag: Option<&'a str>) -> impl Iterator<Item = &'a Row> {
        self.rows
            .iter()
            .filter(move |row| tag.is_none_or(|tag| row.tag.as_deref() == Some(tag)))
    }

    /// Number of rows
    pub fn len(&self) -> usize { self.rows.len() }

    /// Whether there is nothing
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}
