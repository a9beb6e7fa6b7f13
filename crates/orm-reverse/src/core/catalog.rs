//! Catalog query results and the connection seam the parsers read through.
//!
//! Drivers return every catalog row as a [`CatalogRow`]: ordered, named
//! values that may still be raw bytes in the server's code page. Parsers call
//! [`CatalogRow::normalize`] to transcode and trim them before use.

use std::collections::HashMap;

use async_trait::async_trait;
use encoding_rs::Encoding;
use tracing::debug;

use crate::error::{ReverseError, Result};

/// A single catalog value.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogValue {
    Null,
    Text(String),
    /// Undecoded bytes, transcoded by [`CatalogRow::normalize`].
    Raw(Vec<u8>),
}

impl CatalogValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CatalogValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CatalogValue::Null)
    }
}

impl From<&str> for CatalogValue {
    fn from(s: &str) -> Self {
        CatalogValue::Text(s.to_string())
    }
}

impl From<String> for CatalogValue {
    fn from(s: String) -> Self {
        CatalogValue::Text(s)
    }
}

impl From<i64> for CatalogValue {
    fn from(v: i64) -> Self {
        CatalogValue::Text(v.to_string())
    }
}

impl<T: Into<CatalogValue>> From<Option<T>> for CatalogValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CatalogValue::Null)
    }
}

/// Encoding hints keyed by field name (lower-case), 0-based field index, or
/// `*` for every field.
#[derive(Debug, Clone, Default)]
pub struct EncodingHints {
    hints: HashMap<String, &'static Encoding>,
}

impl EncodingHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build hints from configured labels such as `windows-1252`.
    pub fn from_labels<'a, I>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut hints = Self::new();
        for (key, label) in labels {
            hints.insert(key, label)?;
        }
        Ok(hints)
    }

    pub fn insert(&mut self, key: &str, label: &str) -> Result<()> {
        let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
            ReverseError::Config(format!("Unknown encoding '{}' for field '{}'", label, key))
        })?;
        self.hints.insert(key.to_ascii_lowercase(), encoding);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    fn lookup(&self, name: &str, index: usize) -> Option<&'static Encoding> {
        self.hints
            .get(&name.to_ascii_lowercase())
            .or_else(|| self.hints.get(&index.to_string()))
            .or_else(|| self.hints.get("*"))
            .copied()
    }
}

/// One row of a catalog query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRow {
    fields: Vec<(String, CatalogValue)>,
}

impl CatalogRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by drivers and tests.
    pub fn with(mut self, name: &str, value: impl Into<CatalogValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: &str, value: impl Into<CatalogValue>) {
        self.fields.push((name.to_string(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogValue> {
        self.fields.get(index).map(|(_, v)| v)
    }

    /// Field by name, case-insensitive.
    pub fn field(&self, name: &str) -> Option<&CatalogValue> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(CatalogValue::as_str)
    }

    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(CatalogValue::as_str)
    }

    /// Text field that must be present and non-empty.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.text_field(name)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ReverseError::integrity(format!("Catalog row is missing field {}", name))
            })
    }

    /// Integer field; `None` for NULL or non-numeric text.
    pub fn int_field(&self, name: &str) -> Option<i64> {
        self.text_field(name).and_then(|s| s.trim().parse::<i64>().ok())
    }

    /// Transcode raw values using `hints` and trim fixed-width padding.
    ///
    /// Raw values without a hint are decoded as UTF-8, replacing invalid
    /// sequences.
    pub fn normalize(self, hints: &EncodingHints) -> Self {
        let fields = self
            .fields
            .into_iter()
            .enumerate()
            .map(|(index, (name, value))| {
                let value = match value {
                    CatalogValue::Null => CatalogValue::Null,
                    CatalogValue::Text(text) => CatalogValue::Text(trim_padding(&text)),
                    CatalogValue::Raw(bytes) => {
                        let decoded = match hints.lookup(&name, index) {
                            Some(encoding) => encoding.decode(&bytes).0.into_owned(),
                            None => String::from_utf8_lossy(&bytes).into_owned(),
                        };
                        CatalogValue::Text(trim_padding(&decoded))
                    }
                };
                (name, value)
            })
            .collect();
        Self { fields }
    }
}

fn trim_padding(text: &str) -> String {
    text.trim_end_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string()
}

/// A live catalog connection.
///
/// Each call is one round trip; callers await it before issuing the next.
#[async_trait]
pub trait CatalogSource: Send {
    /// Run a catalog query and return all rows.
    async fn query(&mut self, sql: &str) -> Result<Vec<CatalogRow>>;

    /// Backend identifier (e.g., "mssql", "pervasive").
    fn backend(&self) -> &str;
}

#[async_trait]
impl<S: CatalogSource + ?Sized> CatalogSource for Box<S> {
    async fn query(&mut self, sql: &str) -> Result<Vec<CatalogRow>> {
        (**self).query(sql).await
    }

    fn backend(&self) -> &str {
        (**self).backend()
    }
}

/// In-memory catalog that answers queries from canned rows.
///
/// A query is answered by the first registered response whose key is
/// contained in the SQL text. Unmatched queries return no rows.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    backend: String,
    responses: Vec<(String, Vec<CatalogRow>)>,
    failures: Vec<String>,
    log: Vec<String>,
}

impl StaticCatalog {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            ..Default::default()
        }
    }

    pub fn respond(mut self, key: impl Into<String>, rows: Vec<CatalogRow>) -> Self {
        self.responses.push((key.into(), rows));
        self
    }

    /// Make every query containing `key` fail.
    pub fn fail_on(mut self, key: impl Into<String>) -> Self {
        self.failures.push(key.into());
        self
    }

    /// Queries served so far, in order.
    pub fn queries(&self) -> &[String] {
        &self.log
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn query(&mut self, sql: &str) -> Result<Vec<CatalogRow>> {
        self.log.push(sql.to_string());
        if let Some(key) = self.failures.iter().find(|k| sql.contains(k.as_str())) {
            return Err(ReverseError::catalog(sql, format!("injected failure ({})", key)));
        }
        let rows = self
            .responses
            .iter()
            .find(|(key, _)| sql.contains(key.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default();
        debug!("static catalog returned {} rows", rows.len());
        Ok(rows)
    }

    fn backend(&self) -> &str {
        &self.backend
    }
}
