//! SQL Server schema parser.
//!
//! Reads `INFORMATION_SCHEMA` views and the `sp_columns` /
//! `sp_indexes_rowset` catalog procedures.

use async_trait::async_trait;
use tracing::debug;

use crate::config::ReverseOptions;
use crate::core::catalog::CatalogSource;
use crate::core::identifier::{
    clean_delimited_identifier, escape_literal, validate_identifier, IdentifierScope,
    SanitizeStyle,
};
use crate::core::schema::{Column, Database, Domain, FkAction, ForeignKey, Index, IndexKind};
use crate::core::traits::{DiscoveredTable, SchemaParser};
use crate::dialect::MssqlTypes;
use crate::drivers::common::context::require_foreign_column;
use crate::drivers::common::{KeyedAccumulator, ParserContext};
use crate::error::Result;

const TABLES_QUERY: &str = "SELECT TABLE_SCHEMA, TABLE_NAME FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_TYPE = 'BASE TABLE' AND TABLE_NAME <> 'dtproperties' ORDER BY TABLE_NAME";

/// Schema parser for Microsoft SQL Server.
#[derive(Debug)]
pub struct MssqlSchemaParser<S> {
    source: S,
    context: ParserContext,
    types: MssqlTypes,
}

impl<S: CatalogSource> MssqlSchemaParser<S> {
    pub fn new(source: S, options: ReverseOptions) -> Result<Self> {
        Ok(Self {
            source,
            context: ParserContext::new(options, SanitizeStyle::Camel)?,
            types: MssqlTypes,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn table_literal(table: &str) -> Result<String> {
        validate_identifier(table)?;
        Ok(escape_literal(table))
    }
}

#[async_trait]
impl<S: CatalogSource> SchemaParser for MssqlSchemaParser<S> {
    fn dialect(&self) -> &str {
        "mssql"
    }

    fn options(&self) -> &ReverseOptions {
        self.context.options()
    }

    fn clean_name(&self, raw: &str) -> String {
        self.context.clean(raw)
    }

    fn warnings(&self) -> &[String] {
        self.context.warnings()
    }

    async fn discover_tables(&mut self) -> Result<Vec<DiscoveredTable>> {
        let rows = self.source.query(TABLES_QUERY).await?;
        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            let name = clean_delimited_identifier(row.require("TABLE_NAME")?).to_string();
            let schema = row
                .text_field("TABLE_SCHEMA")
                .filter(|s| !s.is_empty())
                .map(|s| clean_delimited_identifier(s).to_string());
            tables.push(DiscoveredTable { name, schema });
        }
        Ok(tables)
    }

    async fn add_columns(&mut self, database: &mut Database, table: &str) -> Result<()> {
        let sql = format!("sp_columns '{}'", Self::table_literal(table)?);
        let rows = self.source.query(&sql).await?;

        let mut scope = IdentifierScope::new();
        let mut count = 0;
        for row in rows {
            let name = clean_delimited_identifier(row.require("COLUMN_NAME")?).to_string();
            let native = row.text_field("TYPE_NAME").unwrap_or_default().to_string();
            let auto_increment = native.to_ascii_lowercase().ends_with("int identity");

            let logical = self
                .context
                .resolve_type(&self.types, &native, table, &name);
            let mut domain = Domain::for_type(logical, &self.types);
            domain.replace_size(row.int_field("LENGTH").and_then(|v| i32::try_from(v).ok()));
            domain.replace_scale(row.int_field("SCALE").and_then(|v| i32::try_from(v).ok()));
            domain.set_default_value(row.text_field("COLUMN_DEF"));

            let logical_name = self.context.claim(&mut scope, &name);
            let mut column = Column::new(name, logical_name, domain);
            column.auto_increment = auto_increment;
            column.not_null = row.int_field("NULLABLE") == Some(0);

            database.require_table_mut(table)?.add_column(column)?;
            count += 1;
        }
        debug!("Loaded {} columns for {}", count, table);
        Ok(())
    }

    async fn add_foreign_keys(&mut self, database: &mut Database, table: &str) -> Result<()> {
        let sql = format!(
            r#"SELECT DISTINCT
        tc.TABLE_NAME,
        kcu.COLUMN_NAME,
        kcu.ORDINAL_POSITION,
        ccu.TABLE_NAME     AS FK_TABLE_NAME,
        ccu.COLUMN_NAME    AS FK_COLUMN_NAME,
        tc.CONSTRAINT_NAME AS FK_NAME,
        rc.UPDATE_RULE,
        rc.DELETE_RULE
   FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
   LEFT JOIN INFORMATION_SCHEMA.REFERENTIAL_CONSTRAINTS rc
     ON tc.constraint_catalog = rc.constraint_catalog
    AND tc.constraint_schema  = rc.constraint_schema
    AND tc.constraint_name    = rc.constraint_name
   LEFT JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
     ON tc.constraint_catalog = kcu.constraint_catalog
    AND tc.constraint_schema  = kcu.constraint_schema
    AND tc.constraint_name    = kcu.constraint_name
  INNER JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE ccu
     ON rc.unique_constraint_catalog = ccu.constraint_catalog
    AND rc.unique_constraint_schema  = ccu.constraint_schema
    AND rc.unique_constraint_name    = ccu.constraint_name
    AND kcu.ordinal_position         = ccu.ordinal_position
  WHERE tc.constraint_type           = 'FOREIGN KEY'
    AND tc.table_name = '{}'
  ORDER BY FK_NAME, kcu.ORDINAL_POSITION"#,
            Self::table_literal(table)?
        );
        let rows = self.source.query(&sql).await?;

        let mut foreign_keys = KeyedAccumulator::new();
        for row in rows {
            let local = clean_delimited_identifier(row.require("COLUMN_NAME")?).to_string();
            let foreign_table =
                clean_delimited_identifier(row.require("FK_TABLE_NAME")?).to_string();
            let foreign_column =
                clean_delimited_identifier(row.require("FK_COLUMN_NAME")?).to_string();
            let name = clean_delimited_identifier(row.require("FK_NAME")?).to_string();

            require_foreign_column(database, &foreign_table, &foreign_column)?;
            let foreign_schema = database
                .table(&foreign_table)
                .and_then(|t| t.schema.clone());
            let on_update = FkAction::from_catalog(row.text_field("UPDATE_RULE").unwrap_or(""));
            let on_delete = FkAction::from_catalog(row.text_field("DELETE_RULE").unwrap_or(""));

            let target = database.require_table_mut(table)?;
            let fk_name = foreign_keys.resolve(&name, || {
                let mut fk = ForeignKey::new(name.clone(), foreign_table.clone());
                fk.foreign_schema = foreign_schema;
                fk.on_update = on_update;
                fk.on_delete = on_delete;
                Ok(target.add_foreign_key(fk)?.name.clone())
            })?;
            target.add_foreign_key_reference(&fk_name, &local, &foreign_column)?;
        }
        debug!("Loaded {} foreign keys for {}", foreign_keys.len(), table);
        Ok(())
    }

    async fn add_indexes(&mut self, database: &mut Database, table: &str) -> Result<()> {
        let sql = format!("sp_indexes_rowset '{}'", Self::table_literal(table)?);
        let rows = self.source.query(&sql).await?;

        let mut indexes = KeyedAccumulator::new();
        for row in rows {
            let column = clean_delimited_identifier(row.require("COLUMN_NAME")?).to_string();
            let name = clean_delimited_identifier(row.require("INDEX_NAME")?).to_string();
            let unique = matches!(row.text_field("UNIQUE"), Some("1") | Some("true"));

            let target = database.require_table_mut(table)?;
            let index_name = indexes.resolve(&name, || {
                let kind = if unique {
                    IndexKind::Unique
                } else {
                    IndexKind::Index
                };
                Ok(target.add_index(Index::new(name.clone(), kind))?.name.clone())
            })?;
            target.add_index_column(&index_name, &column)?;
        }
        debug!("Loaded {} indexes for {}", indexes.len(), table);
        Ok(())
    }

    async fn add_primary_key(&mut self, database: &mut Database, table: &str) -> Result<()> {
        let sql = format!(
            "SELECT COLUMN_NAME
   FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS
  INNER JOIN INFORMATION_SCHEMA.CONSTRAINT_COLUMN_USAGE
     ON INFORMATION_SCHEMA.TABLE_CONSTRAINTS.CONSTRAINT_NAME = INFORMATION_SCHEMA.CONSTRAINT_COLUMN_USAGE.CONSTRAINT_NAME
  WHERE (INFORMATION_SCHEMA.TABLE_CONSTRAINTS.CONSTRAINT_TYPE = 'PRIMARY KEY')
    AND (INFORMATION_SCHEMA.TABLE_CONSTRAINTS.TABLE_NAME = '{}')",
            Self::table_literal(table)?
        );
        let rows = self.source.query(&sql).await?;

        let target = database.require_table_mut(table)?;
        for row in rows {
            let column = row.text(0).unwrap_or_default();
            target.set_primary_key(clean_delimited_identifier(column))?;
        }
        Ok(())
    }
}
