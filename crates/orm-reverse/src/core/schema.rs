//! In-memory schema model populated by the reverse-engineering parsers.
//!
//! A [`Database`] owns its tables in discovery order; each [`Table`] owns its
//! columns, indexes and foreign keys. Names are unique within their scope and
//! every mutator that could break that rule returns
//! [`ReverseError::SchemaIntegrity`].

use serde::{Deserialize, Serialize};

use crate::core::types::LogicalType;
use crate::dialect::FromLogical;
use crate::error::{ReverseError, Result};

/// How primary key values are generated for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdMethod {
    /// Identity / auto-increment handled by the database.
    #[default]
    Native,
    /// Keys are supplied by the application.
    None,
}

/// Root of the schema graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Database {
    /// Database (catalog) name.
    pub name: String,

    /// Id method assigned to every discovered table.
    #[serde(default)]
    pub default_id_method: IdMethod,

    /// Tables in discovery order.
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Register a table. Table names are unique within a database.
    pub fn add_table(&mut self, table: Table) -> Result<&mut Table> {
        if self.has_table(&table.name) {
            return Err(ReverseError::integrity(format!(
                "Table {} is already defined in database {}",
                table.name, self.name
            )));
        }
        self.tables.push(table);
        let last = self.tables.len() - 1;
        Ok(&mut self.tables[last])
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    /// Look up a table that a later parse phase depends on.
    pub fn require_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        let db = self.name.clone();
        self.table_mut(name).ok_or_else(|| {
            ReverseError::integrity(format!(
                "Table {} has not been discovered in database {}",
                name, db
            ))
        })
    }

    /// Tables in the order DDL should create them.
    pub fn tables_for_sql(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    /// Find the column a bound parameter refers to.
    pub fn column(&self, table: &str, column: &str) -> Option<&Column> {
        self.table(table).and_then(|t| t.column(column))
    }
}

/// Table metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Raw catalog name.
    pub name: String,

    /// Sanitized identifier used by generated code.
    pub logical_name: String,

    /// Schema / owner qualifier, when the backend reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub id_method: IdMethod,

    #[serde(default)]
    pub columns: Vec<Column>,

    #[serde(default)]
    pub indexes: Vec<Index>,

    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn new(name: impl Into<String>, logical_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            logical_name: logical_name.into(),
            schema: None,
            id_method: IdMethod::default(),
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Fully qualified name: `schema.table` or just `table`.
    pub fn full_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    pub fn add_column(&mut self, column: Column) -> Result<&mut Column> {
        if self.column(&column.name).is_some() {
            return Err(ReverseError::integrity(format!(
                "Column {}.{} is already defined",
                self.name, column.name
            )));
        }
        self.columns.push(column);
        let last = self.columns.len() - 1;
        Ok(&mut self.columns[last])
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Flag an existing column as part of the primary key.
    ///
    /// Never creates a column: an unknown name is an integrity error.
    pub fn set_primary_key(&mut self, column: &str) -> Result<()> {
        let table = self.name.clone();
        let col = self.column_mut(column).ok_or_else(|| {
            ReverseError::integrity(format!(
                "Primary key column {}.{} does not exist",
                table, column
            ))
        })?;
        col.primary_key = true;
        Ok(())
    }

    /// Primary key columns in column order.
    pub fn primary_key(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|c| c.primary_key)
    }

    pub fn add_index(&mut self, index: Index) -> Result<&mut Index> {
        if self.index(&index.name).is_some() {
            return Err(ReverseError::integrity(format!(
                "Index {} is already defined on table {}",
                index.name, self.name
            )));
        }
        for column in &index.columns {
            self.ensure_column(column, "index", &index.name)?;
        }
        self.indexes.push(index);
        let last = self.indexes.len() - 1;
        Ok(&mut self.indexes[last])
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Append a column to an index that is already registered.
    pub fn add_index_column(&mut self, index: &str, column: &str) -> Result<()> {
        self.ensure_column(column, "index", index)?;
        let table = self.name.clone();
        let idx = self
            .indexes
            .iter_mut()
            .find(|i| i.name == index)
            .ok_or_else(|| {
                ReverseError::integrity(format!("Index {} not found on table {}", index, table))
            })?;
        idx.columns.push(column.to_string());
        Ok(())
    }

    /// Non-unique indexes.
    pub fn indices(&self) -> impl Iterator<Item = &Index> {
        self.indexes.iter().filter(|i| i.kind == IndexKind::Index)
    }

    /// Unique constraints.
    pub fn unices(&self) -> impl Iterator<Item = &Index> {
        self.indexes.iter().filter(|i| i.kind == IndexKind::Unique)
    }

    pub fn add_foreign_key(&mut self, fk: ForeignKey) -> Result<&mut ForeignKey> {
        if self.foreign_key(&fk.name).is_some() {
            return Err(ReverseError::integrity(format!(
                "Foreign key {} is already defined on table {}",
                fk.name, self.name
            )));
        }
        for (local, _) in &fk.references {
            self.ensure_column(local, "foreign key", &fk.name)?;
        }
        self.foreign_keys.push(fk);
        let last = self.foreign_keys.len() - 1;
        Ok(&mut self.foreign_keys[last])
    }

    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|f| f.name == name)
    }

    /// Append a (local, foreign) column pair to a registered foreign key.
    pub fn add_foreign_key_reference(&mut self, fk: &str, local: &str, foreign: &str) -> Result<()> {
        self.ensure_column(local, "foreign key", fk)?;
        let table = self.name.clone();
        let entry = self
            .foreign_keys
            .iter_mut()
            .find(|f| f.name == fk)
            .ok_or_else(|| {
                ReverseError::integrity(format!(
                    "Foreign key {} not found on table {}",
                    fk, table
                ))
            })?;
        entry.add_reference(local, foreign);
        Ok(())
    }

    fn ensure_column(&self, column: &str, kind: &str, owner: &str) -> Result<()> {
        if self.column(column).is_none() {
            return Err(ReverseError::integrity(format!(
                "{} {} references column {}.{} which has not been loaded",
                kind, owner, self.name, column
            )));
        }
        Ok(())
    }
}

/// Column metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Raw catalog name.
    pub name: String,

    /// Sanitized identifier used by generated code.
    pub logical_name: String,

    pub domain: Domain,

    #[serde(default)]
    pub not_null: bool,

    #[serde(default)]
    pub primary_key: bool,

    #[serde(default)]
    pub auto_increment: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, logical_name: impl Into<String>, domain: Domain) -> Self {
        Self {
            name: name.into(),
            logical_name: logical_name.into(),
            domain,
            not_null: false,
            primary_key: false,
            auto_increment: false,
        }
    }

    pub fn logical_type(&self) -> LogicalType {
        self.domain.logical_type
    }

    pub fn is_lob(&self) -> bool {
        self.domain.logical_type.is_lob()
    }

    /// True when the native type is the one the platform would pick for the
    /// logical type on its own.
    pub fn is_default_sql_type(&self, types: &dyn FromLogical) -> bool {
        types.native_type(self.domain.logical_type) == self.domain.sql_type
    }
}

/// Full type descriptor of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub logical_type: LogicalType,

    /// Native SQL type as the platform renders it.
    pub sql_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ColumnDefault>,
}

impl Domain {
    pub fn new(logical_type: LogicalType, sql_type: impl Into<String>) -> Self {
        Self {
            logical_type,
            sql_type: sql_type.into(),
            size: None,
            scale: None,
            default_value: None,
        }
    }

    /// The platform's default domain for a logical type. Size, scale and
    /// default are refined afterwards.
    pub fn for_type(logical_type: LogicalType, types: &dyn FromLogical) -> Self {
        Self::new(logical_type, types.native_type(logical_type))
    }

    /// Replace the size when the catalog reports a positive one.
    pub fn replace_size(&mut self, size: Option<i32>) {
        if let Some(size) = size.filter(|s| *s > 0) {
            self.size = Some(size);
        }
    }

    pub fn replace_scale(&mut self, scale: Option<i32>) {
        if let Some(scale) = scale.filter(|s| *s >= 0) {
            self.scale = Some(scale);
        }
    }

    /// Normalize a raw catalog default against the logical type already
    /// assigned to this domain.
    pub fn set_default_value(&mut self, raw: Option<&str>) {
        self.default_value = raw.and_then(|r| ColumnDefault::parse(r, self.logical_type));
    }

    /// `(size)` or `(size,scale)`, empty when no size is known.
    pub fn print_size(&self) -> String {
        match (self.size, self.scale) {
            (Some(size), Some(scale)) if self.logical_type.is_numeric() => {
                format!("({},{})", size, scale)
            }
            (Some(size), _) => format!("({})", size),
            _ => String::new(),
        }
    }
}

/// Whether a default is a literal value or an SQL expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultKind {
    Value,
    Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefault {
    pub value: String,
    pub kind: DefaultKind,
}

impl ColumnDefault {
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: DefaultKind::Value,
        }
    }

    pub fn expression(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: DefaultKind::Expression,
        }
    }

    /// Parse a catalog default such as `((0))`, `(N'abc')` or `(getdate())`.
    ///
    /// Returns `None` for an empty or `NULL` default.
    pub fn parse(raw: &str, logical_type: LogicalType) -> Option<Self> {
        let mut text = raw.trim();
        while is_parenthesized(text) {
            text = text[1..text.len() - 1].trim();
        }
        if text.is_empty() || text.eq_ignore_ascii_case("null") {
            return None;
        }

        let unquoted = text
            .strip_prefix("N'")
            .or_else(|| text.strip_prefix('\''))
            .and_then(|t| t.strip_suffix('\''));
        if let Some(inner) = unquoted {
            return Some(Self::value(inner.replace("''", "'")));
        }

        if logical_type == LogicalType::Boolean {
            match text.to_ascii_lowercase().as_str() {
                "1" | "true" | "y" | "yes" => return Some(Self::value("true")),
                "0" | "false" | "n" | "no" => return Some(Self::value("false")),
                _ => {}
            }
        }

        if text.parse::<f64>().is_ok() {
            return Some(Self::value(text));
        }

        let looks_like_expression = text.contains('(')
            || text
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '_');
        if looks_like_expression {
            Some(Self::expression(text))
        } else {
            Some(Self::value(text))
        }
    }
}

/// True when the whole text is one parenthesized group: `(a)` but not `(a)+(b)`.
fn is_parenthesized(text: &str) -> bool {
    if !(text.starts_with('(') && text.ends_with(')')) {
        return false;
    }
    let mut depth = 0i32;
    for (pos, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return pos == text.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// Referential action of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FkAction {
    Restrict,
    Cascade,
    SetNull,
    NoAction,
    #[default]
    Unknown,
}

impl FkAction {
    /// Map a catalog rule name (`"NO ACTION"`, `"SET_NULL"`, ...) to an action.
    pub fn from_catalog(rule: &str) -> Self {
        let normalized = rule.trim().to_ascii_uppercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "RESTRICT" => FkAction::Restrict,
            "CASCADE" => FkAction::Cascade,
            "SET NULL" | "SETNULL" => FkAction::SetNull,
            "NO ACTION" | "NOACTION" => FkAction::NoAction,
            _ => FkAction::Unknown,
        }
    }

    /// SQL clause text, `None` when the action is unknown.
    pub fn as_sql(&self) -> Option<&'static str> {
        match self {
            FkAction::Restrict => Some("RESTRICT"),
            FkAction::Cascade => Some("CASCADE"),
            FkAction::SetNull => Some("SET NULL"),
            FkAction::NoAction => Some("NO ACTION"),
            FkAction::Unknown => None,
        }
    }
}

/// Foreign key constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,

    /// Referenced table.
    pub foreign_table: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_schema: Option<String>,

    /// (local column, foreign column) pairs in catalog order.
    #[serde(default)]
    pub references: Vec<(String, String)>,

    #[serde(default)]
    pub on_delete: FkAction,

    #[serde(default)]
    pub on_update: FkAction,
}

impl ForeignKey {
    pub fn new(name: impl Into<String>, foreign_table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            foreign_table: foreign_table.into(),
            foreign_schema: None,
            references: Vec::new(),
            on_delete: FkAction::Unknown,
            on_update: FkAction::Unknown,
        }
    }

    pub fn add_reference(&mut self, local: impl Into<String>, foreign: impl Into<String>) {
        self.references.push((local.into(), foreign.into()));
    }

    pub fn local_columns(&self) -> Vec<&str> {
        self.references.iter().map(|(l, _)| l.as_str()).collect()
    }

    pub fn foreign_columns(&self) -> Vec<&str> {
        self.references.iter().map(|(_, f)| f.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Index,
    Unique,
}

/// Index or unique constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub kind: IndexKind,
    /// Participating columns in key order.
    pub columns: Vec<String>,
}

impl Index {
    pub fn new(name: impl Into<String>, kind: IndexKind) -> Self {
        Self {
            name: name.into(),
            kind,
            columns: Vec::new(),
        }
    }

    pub fn is_unique(&self) -> bool {
        self.kind == IndexKind::Unique
    }
}
