//! Core traits for reverse engineering and SQL rendering.
//!
//! - [`SchemaParser`]: populates a [`Database`] from a live catalog
//! - [`Platform`]: renders DDL and rewrites statements for one backend
//!
//! Both follow the same shape: backends implement a handful of required
//! hooks and inherit default (template method) implementations for the
//! algorithm skeleton.

use std::fmt::Debug;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::ReverseOptions;
use crate::core::identifier::IdentifierScope;
use crate::core::params::BoundParam;
use crate::core::schema::{
    Column, Database, DefaultKind, FkAction, ForeignKey, Index, Table,
};
use crate::core::types::LogicalType;
use crate::dialect::FromLogical;
use crate::error::{ReverseError, Result};

/// A base table reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredTable {
    pub name: String,
    pub schema: Option<String>,
}

impl DiscoveredTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
        }
    }
}

/// Reverse-engineers a catalog into a [`Database`].
///
/// [`parse`](SchemaParser::parse) runs three strict phases: tables, then
/// columns for every table, then foreign keys, indexes and the primary key
/// for every table. Later phases look up entities created by earlier ones,
/// so implementations only provide the per-phase catalog queries.
#[async_trait]
pub trait SchemaParser: Send {
    /// Backend identifier (e.g., "mssql").
    fn dialect(&self) -> &str;

    fn options(&self) -> &ReverseOptions;

    /// Sanitize a raw catalog name into a logical identifier.
    fn clean_name(&self, raw: &str) -> String;

    /// Non-fatal problems collected so far (unsupported column types).
    fn warnings(&self) -> &[String];

    /// List base tables in a deterministic order.
    async fn discover_tables(&mut self) -> Result<Vec<DiscoveredTable>>;

    async fn add_columns(&mut self, database: &mut Database, table: &str) -> Result<()>;

    async fn add_foreign_keys(&mut self, database: &mut Database, table: &str) -> Result<()>;

    async fn add_indexes(&mut self, database: &mut Database, table: &str) -> Result<()>;

    /// Flag existing columns as primary key; never creates columns.
    async fn add_primary_key(&mut self, database: &mut Database, table: &str) -> Result<()>;

    /// Populate `database` and return the number of tables discovered.
    async fn parse(&mut self, database: &mut Database) -> Result<usize> {
        let discovered = self.discover_tables().await?;
        let migration_table = self.options().migration_table.clone();

        let mut scope = IdentifierScope::new();
        let mut names = Vec::with_capacity(discovered.len());
        for found in discovered {
            if found.name == migration_table {
                debug!("Skipping migration table {}", found.name);
                continue;
            }
            let logical_name = scope.claim(&self.clean_name(&found.name));
            let mut table = Table::new(found.name.clone(), logical_name);
            table.schema = found.schema;
            table.id_method = database.default_id_method;
            database.add_table(table)?;
            names.push(found.name);
        }
        debug!("Discovered {} tables", names.len());

        for name in &names {
            self.add_columns(database, name).await?;
        }
        debug!("Loaded columns for {} tables", names.len());

        for name in &names {
            self.add_foreign_keys(database, name).await?;
            self.add_indexes(database, name).await?;
            self.add_primary_key(database, name).await?;
        }

        info!(
            "Reverse engineered {} tables from {} catalog ({} warnings)",
            names.len(),
            self.dialect(),
            self.warnings().len()
        );
        Ok(names.len())
    }
}

/// Per-backend SQL rendering and statement rewriting.
///
/// Default methods produce portable DDL; backends override quoting, type
/// tables, identity handling and the two execution-time rewrites.
pub trait Platform: Send + Sync + Debug {
    /// Platform identifier (e.g., "mssql", "pervasive").
    fn name(&self) -> &str;

    /// Logical → native type table.
    fn types(&self) -> &dyn FromLogical;

    /// Quote a single identifier.
    fn quote_identifier(&self, name: &str) -> String;

    /// Rewrite a SELECT to return at most `limit` rows after skipping `offset`.
    fn apply_limit(&self, sql: &mut String, offset: i64, limit: i64) -> Result<()>;

    /// Inline streamed LOB parameters and renumber the remaining placeholders.
    ///
    /// On error `sql` and `params` are out of step and must be discarded.
    fn cleanup_sql(
        &self,
        sql: &mut String,
        params: &mut Vec<BoundParam>,
        database: &Database,
    ) -> Result<()>;

    // ===== Capabilities =====

    fn max_column_name_length(&self) -> usize {
        64
    }

    fn supports_schemas(&self) -> bool {
        false
    }

    fn supports_native_delete_trigger(&self) -> bool {
        false
    }

    fn supports_insert_null_pk(&self) -> bool {
        true
    }

    // ===== Identifiers =====

    /// Quote a possibly qualified, possibly aliased table reference:
    /// `db.table alias` → `Q(db).Q(table) Q(alias)`.
    fn quote_identifier_table(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 8);
        let mut segment = String::new();
        for c in name.chars() {
            if c == '.' || c == ' ' {
                out.push_str(&self.quote_identifier(&segment));
                out.push(c);
                segment.clear();
            } else {
                segment.push(c);
            }
        }
        out.push_str(&self.quote_identifier(&segment));
        out
    }

    // ===== SQL function helpers =====

    fn ignore_case(&self, expr: &str) -> String {
        format!("UPPER({})", expr)
    }

    fn to_upper_case(&self, expr: &str) -> String {
        format!("UPPER({})", expr)
    }

    fn concat_string(&self, left: &str, right: &str) -> String {
        format!("({} + {})", left, right)
    }

    fn sub_string(&self, expr: &str, pos: i64, len: i64) -> String {
        format!("SUBSTRING({}, {}, {})", expr, pos, len)
    }

    fn str_length(&self, expr: &str) -> String {
        format!("LENGTH({})", expr)
    }

    fn random(&self, seed: Option<i64>) -> String {
        match seed {
            Some(seed) => format!("RAND({})", seed),
            None => "RAND()".to_string(),
        }
    }

    // ===== Column DDL =====

    fn null_string(&self, not_null: bool) -> &'static str {
        if not_null {
            "NOT NULL"
        } else {
            "NULL"
        }
    }

    /// Identity clause for an auto-increment column.
    fn auto_increment_string(&self, _column: &Column) -> Option<String> {
        None
    }

    /// Whether a size suffix may be appended to `sql_type`.
    fn has_size(&self, sql_type: &str) -> bool {
        if sql_type.contains('(') {
            return false;
        }
        !matches!(
            sql_type.to_ascii_uppercase().as_str(),
            "INT" | "INTEGER" | "BIGINT" | "SMALLINT" | "TINYINT" | "BIT" | "TEXT" | "NTEXT"
                | "IMAGE" | "DATE" | "TIME" | "DATETIME" | "TIMESTAMP" | "REAL" | "MONEY"
        )
    }

    /// Native type with its size when the type is the platform default.
    fn column_type_ddl(&self, column: &Column) -> String {
        let domain = &column.domain;
        if self.has_size(&domain.sql_type) && column.is_default_sql_type(self.types()) {
            format!("{}{}", domain.sql_type, domain.print_size())
        } else {
            domain.sql_type.clone()
        }
    }

    /// `DEFAULT ...` clause, if the column has a default.
    fn column_default_ddl(&self, column: &Column) -> Option<String> {
        let default = column.domain.default_value.as_ref()?;
        let value = match default.kind {
            DefaultKind::Expression => default.value.clone(),
            DefaultKind::Value => match column.logical_type() {
                LogicalType::Boolean => match default.value.as_str() {
                    "true" => "1".to_string(),
                    "false" => "0".to_string(),
                    other => other.to_string(),
                },
                t if t.is_numeric() && default.value.parse::<f64>().is_ok() => {
                    default.value.clone()
                }
                _ => format!("'{}'", default.value.replace('\'', "''")),
            },
        };
        Some(format!("DEFAULT {}", value))
    }

    /// One column definition: type, then default, then nullability.
    ///
    /// An auto-increment column must be NOT NULL.
    fn column_ddl(&self, table: &Table, column: &Column) -> Result<String> {
        if column.auto_increment && !column.not_null {
            return Err(nullable_identity(table, column));
        }
        let mut parts = vec![self.quote_identifier(&column.name), self.column_type_ddl(column)];
        if let Some(default) = self.column_default_ddl(column) {
            parts.push(default);
        }
        let null = self.null_string(column.not_null);
        if !null.is_empty() {
            parts.push(null.to_string());
        }
        if column.auto_increment {
            if let Some(identity) = self.auto_increment_string(column) {
                parts.push(identity);
            }
        }
        Ok(parts.join(" "))
    }

    // ===== Table DDL =====

    fn begin_ddl(&self) -> String {
        String::new()
    }

    fn end_ddl(&self) -> String {
        String::new()
    }

    fn comment_block_ddl(&self, comment: &str) -> String {
        format!(
            "\n-----------------------------------------------------------------------\n-- {}\n-----------------------------------------------------------------------\n",
            comment
        )
    }

    fn quoted_columns(&self, columns: &[&str]) -> String {
        columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn primary_key_ddl(&self, table: &Table) -> Option<String> {
        let pk: Vec<&str> = table.primary_key().iter().map(|c| c.name.as_str()).collect();
        if pk.is_empty() {
            None
        } else {
            Some(format!("PRIMARY KEY ({})", self.quoted_columns(&pk)))
        }
    }

    fn unique_ddl(&self, index: &Index) -> String {
        let columns: Vec<&str> = index.columns.iter().map(String::as_str).collect();
        format!(
            "CONSTRAINT {} UNIQUE ({})",
            self.quote_identifier(&index.name),
            self.quoted_columns(&columns)
        )
    }

    fn drop_table_ddl(&self, table: &Table) -> String {
        format!("\nDROP TABLE {};\n", self.quote_identifier(&table.name))
    }

    fn add_table_ddl(&self, table: &Table) -> Result<String> {
        let mut lines = Vec::with_capacity(table.columns.len() + 2);
        for column in &table.columns {
            lines.push(self.column_ddl(table, column)?);
        }
        if let Some(pk) = self.primary_key_ddl(table) {
            lines.push(pk);
        }
        for unique in table.unices() {
            lines.push(self.unique_ddl(unique));
        }
        Ok(format!(
            "\nCREATE TABLE {}\n(\n    {}\n);\n",
            self.quote_identifier(&table.name),
            lines.join(",\n    ")
        ))
    }

    fn index_ddl(&self, table: &Table, index: &Index) -> String {
        let columns: Vec<&str> = index.columns.iter().map(String::as_str).collect();
        format!(
            "\nCREATE {}INDEX {} ON {} ({});\n",
            if index.is_unique() { "UNIQUE " } else { "" },
            self.quote_identifier(&index.name),
            self.quote_identifier(&table.name),
            self.quoted_columns(&columns)
        )
    }

    /// Non-unique indexes; unique ones are declared inside CREATE TABLE.
    fn add_indices_ddl(&self, table: &Table) -> String {
        table.indices().map(|i| self.index_ddl(table, i)).collect()
    }

    // ===== Foreign keys =====

    fn fk_action_sql(&self, action: FkAction) -> Option<&'static str> {
        action.as_sql()
    }

    fn foreign_table_ddl(&self, fk: &ForeignKey) -> String {
        match (&fk.foreign_schema, self.supports_schemas()) {
            (Some(schema), true) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(&fk.foreign_table)
            ),
            _ => self.quote_identifier(&fk.foreign_table),
        }
    }

    fn foreign_key_ddl(&self, fk: &ForeignKey) -> String {
        let mut ddl = format!(
            "CONSTRAINT {}\n    FOREIGN KEY ({})\n    REFERENCES {} ({})",
            self.quote_identifier(&fk.name),
            self.quoted_columns(&fk.local_columns()),
            self.foreign_table_ddl(fk),
            self.quoted_columns(&fk.foreign_columns())
        );
        if let Some(action) = self.fk_action_sql(fk.on_update) {
            ddl.push_str("\n    ON UPDATE ");
            ddl.push_str(action);
        }
        if let Some(action) = self.fk_action_sql(fk.on_delete) {
            ddl.push_str("\n    ON DELETE ");
            ddl.push_str(action);
        }
        ddl
    }

    fn add_foreign_key_ddl(&self, table: &Table, fk: &ForeignKey) -> String {
        format!(
            "\nALTER TABLE {} ADD {};\n",
            self.quote_identifier(&table.name),
            self.foreign_key_ddl(fk)
        )
    }

    fn add_foreign_keys_ddl(&self, table: &Table) -> String {
        table
            .foreign_keys
            .iter()
            .map(|fk| self.add_foreign_key_ddl(table, fk))
            .collect()
    }

    fn drop_foreign_key_ddl(&self, table: &Table, fk: &ForeignKey) -> String {
        format!(
            "\nALTER TABLE {} DROP CONSTRAINT {};\n",
            self.quote_identifier(&table.name),
            self.quote_identifier(&fk.name)
        )
    }

    /// DDL for a whole database in three passes: drop every foreign key,
    /// drop and recreate every table with its indexes, re-add every foreign
    /// key.
    fn add_tables_ddl(&self, database: &Database) -> Result<String> {
        let mut ddl = self.begin_ddl();

        for table in database.tables_for_sql() {
            let drops: String = table
                .foreign_keys
                .iter()
                .map(|fk| self.drop_foreign_key_ddl(table, fk))
                .collect();
            if !drops.is_empty() {
                ddl.push_str(&self.comment_block_ddl(&table.name));
                ddl.push_str(&drops);
            }
        }

        for table in database.tables_for_sql() {
            ddl.push_str(&self.comment_block_ddl(&table.name));
            ddl.push_str(&self.drop_table_ddl(table));
            ddl.push_str(&self.add_table_ddl(table)?);
            ddl.push_str(&self.add_indices_ddl(table));
        }

        for table in database.tables_for_sql() {
            let adds = self.add_foreign_keys_ddl(table);
            if !adds.is_empty() {
                ddl.push_str(&self.comment_block_ddl(&table.name));
                ddl.push_str(&adds);
            }
        }

        ddl.push_str(&self.end_ddl());
        Ok(ddl)
    }
}

/// Error for an identity column that allows NULL.
pub fn nullable_identity(table: &Table, column: &Column) -> ReverseError {
    ReverseError::Config(format!(
        "You have specified autoIncrement for column \"{}\" from table \"{}\", but this column is nullable.",
        column.name, table.name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReverseOptions;
    use crate::core::catalog::{CatalogRow, CatalogSource, StaticCatalog};
    use crate::core::schema::{Domain, IndexKind};
    use crate::dialect::PervasiveTypes;

    /// Minimal platform exercising only the default methods.
    #[derive(Debug)]
    struct AnsiPlatform;

    impl Platform for AnsiPlatform {
        fn name(&self) -> &str {
            "ansi"
        }

        fn types(&self) -> &dyn FromLogical {
            &PervasiveTypes
        }

        fn quote_identifier(&self, name: &str) -> String {
            format!("\"{}\"", name)
        }

        fn apply_limit(&self, _sql: &mut String, _offset: i64, _limit: i64) -> Result<()> {
            Ok(())
        }

        fn cleanup_sql(&self, _: &mut String, _: &mut Vec<BoundParam>, _: &Database) -> Result<()> {
            Ok(())
        }
    }

    fn shop() -> Database {
        let mut db = Database::new("shop");
        let mut customers = Table::new("customers", "customers");
        let mut id = Column::new("id", "id", Domain::new(LogicalType::Integer, "INT"));
        id.not_null = true;
        id.primary_key = true;
        customers.add_column(id).unwrap();
        db.add_table(customers).unwrap();

        let mut orders = Table::new("orders", "orders");
        let mut code = Column::new("code", "code", Domain::new(LogicalType::Varchar, "VARCHAR"));
        code.domain.size = Some(20);
        orders.add_column(code).unwrap();
        orders
            .add_column(Column::new("customer_id", "customer_Id", Domain::new(LogicalType::Integer, "INT")))
            .unwrap();
        let mut ix = Index::new("ix_code", IndexKind::Index);
        ix.columns.push("code".into());
        orders.add_index(ix).unwrap();
        let mut fk = ForeignKey::new("fk_customer", "customers");
        fk.add_reference("customer_id", "id");
        fk.on_delete = FkAction::Cascade;
        orders.add_foreign_key(fk).unwrap();
        db.add_table(orders).unwrap();
        db
    }

    #[test]
    fn test_quote_identifier_table() {
        assert_eq!(
            AnsiPlatform.quote_identifier_table("db.orders o"),
            "\"db\".\"orders\" \"o\""
        );
        assert_eq!(AnsiPlatform.quote_identifier_table("orders"), "\"orders\"");
    }

    #[test]
    fn test_column_ddl_clause_order() {
        let mut col = Column::new("qty", "qty", Domain::new(LogicalType::Integer, "INT"));
        col.domain.set_default_value(Some("((0))"));
        col.not_null = true;
        let table = Table::new("t", "t");
        assert_eq!(
            AnsiPlatform.column_ddl(&table, &col).unwrap(),
            "\"qty\" INT DEFAULT 0 NOT NULL"
        );
    }

    #[test]
    fn test_nullable_column_says_null() {
        let col = Column::new("note", "note", Domain::new(LogicalType::Integer, "INT"));
        let table = Table::new("t", "t");
        assert_eq!(AnsiPlatform.column_ddl(&table, &col).unwrap(), "\"note\" INT NULL");
    }

    #[test]
    fn test_nullable_identity_is_rejected() {
        let mut col = Column::new("id", "id", Domain::new(LogicalType::Integer, "INT"));
        col.auto_increment = true;
        let table = Table::new("orders", "orders");
        let err = AnsiPlatform.column_ddl(&table, &col).unwrap_err();
        assert!(matches!(err, ReverseError::Config(_)));
        assert!(err.to_string().contains("\"id\" from table \"orders\""));
    }

    #[test]
    fn test_size_only_for_default_sql_type() {
        let mut col = Column::new("name", "name", Domain::new(LogicalType::Varchar, "VARCHAR"));
        col.domain.size = Some(40);
        assert_eq!(AnsiPlatform.column_type_ddl(&col), "VARCHAR(40)");

        col.domain.sql_type = "NVARCHAR".into();
        assert_eq!(AnsiPlatform.column_type_ddl(&col), "NVARCHAR");
    }

    #[test]
    fn test_string_default_is_quoted() {
        let mut col = Column::new("state", "state", Domain::new(LogicalType::Char, "CHAR"));
        col.domain.set_default_value(Some("('it''s')"));
        assert_eq!(
            AnsiPlatform.column_default_ddl(&col).as_deref(),
            Some("DEFAULT 'it''s'")
        );
    }

    #[test]
    fn test_add_tables_ddl_three_passes() {
        let ddl = AnsiPlatform.add_tables_ddl(&shop()).unwrap();
        let drop_fk = ddl.find("DROP CONSTRAINT \"fk_customer\"").unwrap();
        let drop_customers = ddl.find("DROP TABLE \"customers\"").unwrap();
        let create_orders = ddl.find("CREATE TABLE \"orders\"").unwrap();
        let add_fk = ddl.find("ADD CONSTRAINT \"fk_customer\"").unwrap();
        assert!(drop_fk < drop_customers);
        assert!(drop_customers < create_orders);
        assert!(create_orders < add_fk);
        assert!(ddl.contains("PRIMARY KEY (\"id\")"));
        assert!(ddl.contains("CREATE INDEX \"ix_code\" ON \"orders\" (\"code\");"));
        assert!(ddl.contains("ON DELETE CASCADE"));
        assert!(!ddl.contains("ON UPDATE"));
    }

    struct FixtureParser {
        source: StaticCatalog,
        options: ReverseOptions,
        warnings: Vec<String>,
        calls: Vec<String>,
    }

    #[async_trait]
    impl SchemaParser for FixtureParser {
        fn dialect(&self) -> &str {
            "fixture"
        }

        fn options(&self) -> &ReverseOptions {
            &self.options
        }

        fn clean_name(&self, raw: &str) -> String {
            raw.to_ascii_lowercase()
        }

        fn warnings(&self) -> &[String] {
            &self.warnings
        }

        async fn discover_tables(&mut self) -> Result<Vec<DiscoveredTable>> {
            let rows = self.source.query("TABLES").await?;
            Ok(rows
                .iter()
                .filter_map(|r| r.text(0))
                .map(DiscoveredTable::new)
                .collect())
        }

        async fn add_columns(&mut self, db: &mut Database, table: &str) -> Result<()> {
            self.calls.push(format!("columns:{}", table));
            let t = db.require_table_mut(table)?;
            t.add_column(Column::new("id", "id", Domain::new(LogicalType::Integer, "INT")))?;
            Ok(())
        }

        async fn add_foreign_keys(&mut self, _db: &mut Database, table: &str) -> Result<()> {
            self.calls.push(format!("fks:{}", table));
            Ok(())
        }

        async fn add_indexes(&mut self, _db: &mut Database, table: &str) -> Result<()> {
            self.calls.push(format!("indexes:{}", table));
            Ok(())
        }

        async fn add_primary_key(&mut self, db: &mut Database, table: &str) -> Result<()> {
            self.calls.push(format!("pk:{}", table));
            db.require_table_mut(table)?.set_primary_key("id")
        }
    }

    fn fixture(names: &[&str]) -> FixtureParser {
        let rows = names.iter().map(|n| CatalogRow::new().with("NAME", *n)).collect();
        FixtureParser {
            source: StaticCatalog::new("fixture").respond("TABLES", rows),
            options: ReverseOptions::default(),
            warnings: Vec::new(),
            calls: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_parse_runs_phases_in_order() {
        let mut parser = fixture(&["a", "b"]);
        let mut db = Database::new("db");
        assert_eq!(parser.parse(&mut db).await.unwrap(), 2);
        assert_eq!(
            parser.calls,
            vec![
                "columns:a", "columns:b", "fks:a", "indexes:a", "pk:a", "fks:b", "indexes:b",
                "pk:b"
            ]
        );
        assert!(db.table("b").unwrap().column("id").unwrap().primary_key);
    }

    #[tokio::test]
    async fn test_parse_skips_migration_table_and_dedups_logical_names() {
        let mut parser = fixture(&["Orders", "ORDERS", "schema_migration"]);
        parser.options.migration_table = "schema_migration".into();
        let mut db = Database::new("db");
        assert_eq!(parser.parse(&mut db).await.unwrap(), 2);
        assert_eq!(db.tables[0].logical_name, "orders");
        assert_eq!(db.tables[1].logical_name, "orders_2");
        assert!(!db.has_table("schema_migration"));
    }

    #[tokio::test]
    async fn test_catalog_failure_aborts_parse() {
        let mut parser = fixture(&["a"]);
        parser.source = StaticCatalog::new("fixture").fail_on("TABLES");
        let mut db = Database::new("db");
        let err = parser.parse(&mut db).await.unwrap_err();
        assert!(matches!(err, ReverseError::Catalog { .. }));
    }
}
