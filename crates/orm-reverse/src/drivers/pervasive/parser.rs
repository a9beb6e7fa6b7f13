//! Pervasive.SQL schema parser.
//!
//! Reads the DDF dictionary tables (`X$FILE`, `X$FIELD`, `X$INDEX`,
//! `X$RELATE`, `X$ATTRIB`). Values come back padded and possibly in a
//! legacy code page, so every row is normalized before use.
//!
//! Index names live in `X$FIELD` as pseudo-fields of type 227/255 whose
//! offset is the index number; indexes without such an entry get a
//! synthesized name.

use async_trait::async_trait;
use tracing::debug;

use crate::config::ReverseOptions;
use crate::core::catalog::{CatalogRow, CatalogSource};
use crate::core::identifier::{
    escape_index_name, escape_literal, unnamed_index_name, validate_identifier, IdentifierScope,
    SanitizeStyle,
};
use crate::core::schema::{
    Column, ColumnDefault, Database, Domain, FkAction, ForeignKey, Index, IndexKind,
};
use crate::core::traits::{DiscoveredTable, SchemaParser};
use crate::dialect::{pervasive_type_key, PervasiveTypes};
use crate::drivers::common::context::require_foreign_column;
use crate::drivers::common::{KeyedAccumulator, ParserContext};
use crate::error::Result;

const TABLES_QUERY: &str = "SELECT DISTINCT XF$NAME FROM X$FILE, X$FIELD WHERE XF$ID = XE$FILE AND XF$FLAGS & 16 <> 16 AND XE$DATATYPE NOT IN (227, 255) ORDER BY XF$NAME";

/// Schema parser for Pervasive.SQL.
#[derive(Debug)]
pub struct PervasiveSchemaParser<S> {
    source: S,
    context: ParserContext,
    types: PervasiveTypes,
}

impl<S: CatalogSource> PervasiveSchemaParser<S> {
    pub fn new(source: S, options: ReverseOptions) -> Result<Self> {
        Ok(Self {
            source,
            context: ParserContext::new(options, SanitizeStyle::Joined)?,
            types: PervasiveTypes,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    async fn fetch(&mut self, sql: &str) -> Result<Vec<CatalogRow>> {
        let rows = self.source.query(sql).await?;
        Ok(self.context.normalize(rows))
    }
}

fn table_literal(table: &str) -> Result<String> {
    validate_identifier(table)?;
    Ok(escape_literal(table))
}

fn columns_query(table: &str) -> Result<String> {
    Ok(format!(
        r#"SELECT TAB.XF$NAME TABLE_NAME
     , COL.XE$NAME COLUMN_NAME
     , COL.XE$DATATYPE DATATYPE
     , COL.XE$SIZE COL_SIZE
     , COL.XE$SIZE CHAR_LEN
     , COL.XE$SIZE PRECISION
     , COL.XE$DEC SCALE
     , COL.XE$OFFSET OFFSET
     , CASE WHEN COL.XE$FLAGS & 4096 = 4096 THEN 'YES' ELSE 'NO' END IS_BINARY
     , CASE WHEN COL.XE$FLAGS & 4 = 4 THEN 'YES' ELSE 'NO' END NULLABLE
     , CASE WHEN ATT.XA$ID IS NOT NULL AND ATT.XA$TYPE = 'D' THEN 'YES' ELSE 'NO' END HAS_DEF_VAL
     , ATT.XA$ATTRS DEFAULT_VALUE
  FROM X$FILE AS TAB
 INNER JOIN X$FIELD AS COL
    ON COL.XE$FILE = TAB.XF$ID
  LEFT JOIN X$ATTRIB AS ATT
    ON ATT.XA$ID = COL.XE$ID
   AND ATT.XA$TYPE = 'D'
 WHERE TAB.XF$FLAGS & 16 <> 16
   AND COL.XE$DATATYPE NOT IN (227, 255)
   AND TAB.XF$NAME = '{}'
 ORDER BY COL.XE$OFFSET, COL.XE$NAME"#,
        table_literal(table)?
    ))
}

fn foreign_keys_query(table: &str) -> Result<String> {
    Ok(format!(
        r#"SELECT REL.XR$NAME RULE_NAME
     , SRC.XF$NAME FOREIGN_TABLE
     , SRCIDX.XI$PART FOREIGN_PART
     , SRCFLD.XE$NAME FOREIGN_COLUMN
     , DEST.XF$NAME LOCAL_TABLE
     , DESTIDX.XI$PART LOCAL_PART
     , DESTFLD.XE$NAME LOCAL_COLUMN
     , CASE WHEN REL.XR$UPDATERULE = 1 THEN 'RESTRICT' ELSE 'UNKNOWN' END UPDATE_RULE
     , CASE
          WHEN REL.XR$DELETERULE = 1 THEN 'RESTRICT'
          WHEN REL.XR$DELETERULE = 2 THEN 'CASCADE'
          ELSE 'UNKNOWN'
       END DELETE_RULE
  FROM X$RELATE REL
     , X$FILE SRC
     , X$INDEX SRCIDX
     , X$FIELD SRCFLD
     , X$FILE DEST
     , X$INDEX DESTIDX
     , X$FIELD DESTFLD
 WHERE SRC.XF$ID = REL.XR$PID
   AND SRCIDX.XI$FILE = SRC.XF$ID
   AND SRCIDX.XI$NUMBER = REL.XR$INDEX
   AND SRCFLD.XE$ID = SRCIDX.XI$FIELD
   AND SRCFLD.XE$FILE = SRC.XF$ID
   AND DEST.XF$ID = REL.XR$FID
   AND DESTIDX.XI$FILE = DEST.XF$ID
   AND DESTIDX.XI$NUMBER = REL.XR$FINDEX
   AND DESTIDX.XI$FLAGS & POWER(2,13) <> 0
   AND DESTFLD.XE$ID = DESTIDX.XI$FIELD
   AND DESTFLD.XE$FILE = DEST.XF$ID
   AND DESTIDX.XI$PART = SRCIDX.XI$PART
   AND DEST.XF$FLAGS & 16 <> 16
   AND DEST.XF$NAME = '{}'
 ORDER BY REL.XR$NAME, DESTIDX.XI$PART, SRCIDX.XI$PART"#,
        table_literal(table)?
    ))
}

fn indexes_query(table: &str) -> Result<String> {
    Ok(format!(
        r#"SELECT DISTINCT
       COLIDX.XE$NAME INDEX_NAME
     , COL.XE$NAME COLUMN_NAME
     , CASE WHEN IDX.XI$FLAGS & 1 = 0 THEN 'YES' ELSE 'NO' END IS_UNIQUE
     , TAB.XF$NAME TABLE_NAME
     , IDX.XI$NUMBER INDEX_NUMBER
     , IDX.XI$PART INDEX_PART
  FROM X$FILE AS TAB
     , X$INDEX AS IDX
     , X$FIELD AS COL
     , X$FIELD AS COLIDX
 WHERE TAB.XF$FLAGS & 16 <> 16
   AND TAB.XF$NAME = '{}'
   AND IDX.XI$FILE = TAB.XF$ID
   AND IDX.XI$FLAGS & POWER(2,13) = 0
   AND COL.XE$ID = IDX.XI$FIELD
   AND COLIDX.XE$FILE = TAB.XF$ID
   AND COLIDX.XE$DATATYPE IN (227, 255)
   AND COLIDX.XE$OFFSET = IDX.XI$NUMBER
 ORDER BY IDX.XI$NUMBER, IDX.XI$PART"#,
        table_literal(table)?
    ))
}

fn primary_key_query(table: &str) -> Result<String> {
    Ok(format!(
        r#"SELECT COL.XE$NAME
  FROM X$FILE AS TAB
     , X$INDEX AS IDX
     , X$FIELD AS COL
 WHERE TAB.XF$FLAGS & 16 <> 16
   AND TAB.XF$NAME = '{}'
   AND IDX.XI$FILE = TAB.XF$ID
   AND IDX.XI$FLAGS & POWER(2,13) = 0
   AND COL.XE$ID = IDX.XI$FIELD
   AND EXISTS(
       SELECT 1
         FROM X$FIELD AS COLIDX
        WHERE COLIDX.XE$FILE = TAB.XF$ID
          AND COLIDX.XE$DATATYPE IN (227, 255)
          AND COLIDX.XE$OFFSET = IDX.XI$NUMBER
       )
   AND IDX.XI$FLAGS & 1 = 0
 ORDER BY IDX.XI$NUMBER, IDX.XI$PART"#,
        table_literal(table)?
    ))
}

fn is_yes(row: &CatalogRow, field: &str) -> bool {
    row.text_field(field) == Some("YES")
}

#[async_trait]
impl<S: CatalogSource> SchemaParser for PervasiveSchemaParser<S> {
    fn dialect(&self) -> &str {
        "pervasive"
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
        let rows = self.fetch(TABLES_QUERY).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.text(0))
            .filter(|name| !name.is_empty())
            .map(DiscoveredTable::new)
            .collect())
    }

    async fn add_columns(&mut self, database: &mut Database, table: &str) -> Result<()> {
        let sql = columns_query(table)?;
        let rows = self.fetch(&sql).await?;

        let mut scope = IdentifierScope::new();
        let mut count = 0;
        for row in rows {
            let name = row.require("COLUMN_NAME")?.to_string();
            let key = pervasive_type_key(
                row.int_field("DATATYPE").unwrap_or(-1),
                row.int_field("COL_SIZE").unwrap_or(0),
                is_yes(&row, "IS_BINARY"),
            );

            let logical = self.context.resolve_type(&self.types, &key, table, &name);
            let mut domain = Domain::for_type(logical, &self.types);
            domain.replace_size(row.int_field("CHAR_LEN").and_then(|v| i32::try_from(v).ok()));
            domain.replace_scale(row.int_field("SCALE").and_then(|v| i32::try_from(v).ok()));
            if is_yes(&row, "HAS_DEF_VAL") {
                let value = row.text_field("DEFAULT_VALUE").unwrap_or_default();
                domain.default_value = Some(ColumnDefault::value(value));
            }

            let logical_name = self.context.claim(&mut scope, &name);
            let mut column = Column::new(name, logical_name, domain);
            column.auto_increment = key.contains("AUTOINC");
            column.not_null = !is_yes(&row, "NULLABLE");

            database.require_table_mut(table)?.add_column(column)?;
            count += 1;
        }
        debug!("Loaded {} columns for {}", count, table);
        Ok(())
    }

    /// Relations are stored on the referenced side, so the table being
    /// parsed is the destination of `X$RELATE` and the source file is the
    /// one the constraint points at.
    async fn add_foreign_keys(&mut self, database: &mut Database, table: &str) -> Result<()> {
        let sql = foreign_keys_query(table)?;
        let rows = self.fetch(&sql).await?;

        let mut foreign_keys = KeyedAccumulator::new();
        for row in rows {
            let name = row.require("RULE_NAME")?.to_string();
            let local = row.require("LOCAL_COLUMN")?.to_string();
            let foreign_table = row.require("FOREIGN_TABLE")?.to_string();
            let foreign_column = row.require("FOREIGN_COLUMN")?.to_string();

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
        let sql = indexes_query(table)?;
        let rows = self.fetch(&sql).await?;

        let mut indexes = KeyedAccumulator::new();
        let mut scope = IdentifierScope::new();
        for row in rows {
            let column = row.require("COLUMN_NAME")?.to_string();
            let raw_name = row.text_field("INDEX_NAME").unwrap_or_default();
            let key = if raw_name.is_empty() {
                let number = row.text_field("INDEX_NUMBER").unwrap_or_default();
                unnamed_index_name(table, number)
            } else {
                escape_index_name(raw_name)
            };
            let unique = is_yes(&row, "IS_UNIQUE");

            // Claimed once per index; sanitized names can collide.
            let context = &self.context;
            let target = database.require_table_mut(table)?;
            let index_name = indexes.resolve(&key, || {
                let kind = if unique {
                    IndexKind::Unique
                } else {
                    IndexKind::Index
                };
                let name = context.claim(&mut scope, &key);
                Ok(target.add_index(Index::new(name, kind))?.name.clone())
            })?;
            target.add_index_column(&index_name, &column)?;
        }
        debug!("Loaded {} indexes for {}", indexes.len(), table);
        Ok(())
    }

    /// Every unique, named index contributes its columns to the primary key.
    async fn add_primary_key(&mut self, database: &mut Database, table: &str) -> Result<()> {
        let sql = primary_key_query(table)?;
        let rows = self.fetch(&sql).await?;

        let target = database.require_table_mut(table)?;
        for row in rows {
            target.set_primary_key(row.text(0).unwrap_or_default())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{CatalogValue, StaticCatalog};
    use crate::core::schema::DefaultKind;
    use crate::core::types::LogicalType;
    use crate::error::ReverseError;

    /// Padded raw bytes, as the ODBC driver returns CHAR columns.
    fn raw(text: &str) -> CatalogValue {
        CatalogValue::Raw(format!("{:<20}", text).into_bytes())
    }

    fn field(name: &str, datatype: i64, size: i64, nullable: bool) -> CatalogRow {
        CatalogRow::new()
            .with("COLUMN_NAME", raw(name))
            .with("DATATYPE", datatype)
            .with("COL_SIZE", size)
            .with("CHAR_LEN", size)
            .with("SCALE", 0i64)
            .with("IS_BINARY", "NO")
            .with("NULLABLE", if nullable { "YES" } else { "NO" })
            .with("HAS_DEF_VAL", "NO")
            .with("DEFAULT_VALUE", Option::<String>::None)
    }

    fn index_row(name: &str, column: &str, unique: bool, number: i64) -> CatalogRow {
        CatalogRow::new()
            .with("INDEX_NAME", raw(name))
            .with("COLUMN_NAME", raw(column))
            .with("IS_UNIQUE", if unique { "YES" } else { "NO" })
            .with("TABLE_NAME", raw("Person"))
            .with("INDEX_NUMBER", number)
    }

    fn tables(names: &[&str]) -> Vec<CatalogRow> {
        names
            .iter()
            .map(|n| CatalogRow::new().with("XF$NAME", raw(n)))
            .collect()
    }

    fn demodata() -> StaticCatalog {
        StaticCatalog::new("pervasive")
            .respond(TABLES_QUERY, tables(&["Dept", "Person"]))
            .respond(
                columns_query("Dept").unwrap(),
                vec![field("Name", 0, 20, false), field("Budget", 6, 8, true)],
            )
            .respond(
                columns_query("Person").unwrap(),
                vec![
                    field("ID", 15, 4, false),
                    field("First_Name", 11, 16, true),
                    field("Dept_Name", 0, 20, true),
                    field("Note", 25, 40, true),
                    field("Active", 16, 1, false),
                ],
            )
            .respond(
                foreign_keys_query("Person").unwrap(),
                vec![CatalogRow::new()
                    .with("RULE_NAME", raw("fk_person_dept"))
                    .with("FOREIGN_TABLE", raw("Dept"))
                    .with("FOREIGN_COLUMN", raw("Name"))
                    .with("LOCAL_TABLE", raw("Person"))
                    .with("LOCAL_COLUMN", raw("Dept_Name"))
                    .with("UPDATE_RULE", "RESTRICT")
                    .with("DELETE_RULE", "CASCADE")],
            )
            .respond(
                indexes_query("Person").unwrap(),
                vec![
                    index_row("Person ID", "ID", true, 0),
                    index_row("", "First_Name", false, 3),
                    index_row("", "Dept_Name", false, 3),
                ],
            )
            .respond(
                primary_key_query("Person").unwrap(),
                vec![CatalogRow::new().with("XE$NAME", raw("ID"))],
            )
            .respond(
                primary_key_query("Dept").unwrap(),
                vec![CatalogRow::new().with("XE$NAME", raw("Name"))],
            )
    }

    async fn parse(catalog: StaticCatalog) -> Result<Database> {
        let mut parser = PervasiveSchemaParser::new(catalog, ReverseOptions::default())?;
        let mut db = Database::new("DEMODATA");
        parser.parse(&mut db).await?;
        Ok(db)
    }

    #[tokio::test]
    async fn test_padded_names_are_trimmed() {
        let db = parse(demodata()).await.unwrap();
        let names: Vec<_> = db.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Dept", "Person"]);
        assert_eq!(db.column("Person", "First_Name").unwrap().logical_name, "First_Name");
    }

    #[tokio::test]
    async fn test_column_types_and_flags() {
        let db = parse(demodata()).await.unwrap();
        let person = db.table("Person").unwrap();

        let id = person.column("ID").unwrap();
        assert!(id.auto_increment);
        assert!(id.not_null);
        assert!(id.primary_key);
        assert_eq!(id.logical_type(), LogicalType::Integer);

        let first = person.column("First_Name").unwrap();
        assert_eq!(first.logical_type(), LogicalType::Varchar);
        assert_eq!(first.domain.size, Some(16));
        assert!(!first.not_null);
        assert!(!first.auto_increment);

        assert_eq!(person.column("Active").unwrap().logical_type(), LogicalType::Boolean);
        assert_eq!(
            db.column("Dept", "Budget").unwrap().logical_type(),
            LogicalType::Decimal
        );
        assert!(db.column("Dept", "Name").unwrap().primary_key);
    }

    #[tokio::test]
    async fn test_wide_string_falls_back_with_warning() {
        let mut parser = PervasiveSchemaParser::new(demodata(), ReverseOptions::default()).unwrap();
        let mut db = Database::new("DEMODATA");
        parser.parse(&mut db).await.unwrap();

        let note = db.column("Person", "Note").unwrap();
        assert_eq!(note.logical_type(), LogicalType::Varchar);
        assert_eq!(parser.warnings().len(), 1);
        assert!(parser.warnings()[0].contains("Person.Note"));
    }

    #[tokio::test]
    async fn test_default_value_is_literal() {
        let row = CatalogRow::new()
            .with("COLUMN_NAME", raw("Status"))
            .with("DATATYPE", 0i64)
            .with("COL_SIZE", 1i64)
            .with("CHAR_LEN", 1i64)
            .with("IS_BINARY", "NO")
            .with("NULLABLE", "NO")
            .with("HAS_DEF_VAL", "YES")
            .with("DEFAULT_VALUE", raw("A"));
        let catalog = StaticCatalog::new("pervasive")
            .respond(TABLES_QUERY, tables(&["T"]))
            .respond(columns_query("T").unwrap(), vec![row]);
        let db = parse(catalog).await.unwrap();

        let status = db.column("T", "Status").unwrap();
        let default = status.domain.default_value.as_ref().unwrap();
        assert_eq!(default.value, "A");
        assert_eq!(default.kind, DefaultKind::Value);
    }

    #[tokio::test]
    async fn test_foreign_key_direction() {
        let db = parse(demodata()).await.unwrap();
        let fk = db.table("Person").unwrap().foreign_key("fk_person_dept").unwrap();
        assert_eq!(fk.foreign_table, "Dept");
        assert_eq!(
            fk.references,
            vec![("Dept_Name".to_string(), "Name".to_string())]
        );
        assert_eq!(fk.on_update, FkAction::Restrict);
        assert_eq!(fk.on_delete, FkAction::Cascade);
    }

    #[tokio::test]
    async fn test_indexes_named_and_unnamed() {
        let db = parse(demodata()).await.unwrap();
        let person = db.table("Person").unwrap();

        let named = person.index("Person_ID").unwrap();
        assert!(named.is_unique());
        assert_eq!(named.columns, vec!["ID"]);

        let unnamed = person.index("unnamed_Index_Person_3").unwrap();
        assert!(!unnamed.is_unique());
        assert_eq!(unnamed.columns, vec!["First_Name", "Dept_Name"]);
    }

    #[tokio::test]
    async fn test_colliding_index_names_are_suffixed() {
        let catalog = StaticCatalog::new("pervasive")
            .respond(TABLES_QUERY, tables(&["Person"]))
            .respond(columns_query("Person").unwrap(), vec![field("ID", 1, 4, false)])
            .respond(
                indexes_query("Person").unwrap(),
                vec![
                    index_row("Person ID", "ID", true, 0),
                    index_row("Person-ID", "ID", false, 1),
                ],
            );
        let db = parse(catalog).await.unwrap();
        let person = db.table("Person").unwrap();

        let names: Vec<_> = person.indexes.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Person_ID", "Person_ID_2"]);
        assert!(person.index("Person_ID").unwrap().is_unique());
        assert!(!person.index("Person_ID_2").unwrap().is_unique());
    }

    #[tokio::test]
    async fn test_composite_foreign_key_keeps_pair_order() {
        let reference = |local: &str, foreign: &str| {
            CatalogRow::new()
                .with("RULE_NAME", raw("fk_assignment"))
                .with("FOREIGN_TABLE", raw("Room"))
                .with("FOREIGN_COLUMN", raw(foreign))
                .with("LOCAL_TABLE", raw("Assignment"))
                .with("LOCAL_COLUMN", raw(local))
        };
        let catalog = StaticCatalog::new("pervasive")
            .respond(TABLES_QUERY, tables(&["Assignment", "Room"]))
            .respond(
                columns_query("Room").unwrap(),
                vec![field("Building", 0, 10, false), field("Number", 1, 4, false)],
            )
            .respond(
                columns_query("Assignment").unwrap(),
                vec![field("Room_Building", 0, 10, false), field("Room_Number", 1, 4, false)],
            )
            .respond(
                foreign_keys_query("Assignment").unwrap(),
                vec![
                    reference("Room_Building", "Building"),
                    reference("Room_Number", "Number"),
                ],
            );
        let db = parse(catalog).await.unwrap();
        let assignment = db.table("Assignment").unwrap();

        assert_eq!(assignment.foreign_keys.len(), 1);
        let fk = assignment.foreign_key("fk_assignment").unwrap();
        assert_eq!(fk.foreign_table, "Room");
        assert_eq!(
            fk.references,
            vec![
                ("Room_Building".to_string(), "Building".to_string()),
                ("Room_Number".to_string(), "Number".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_foreign_table_is_integrity_error() {
        let catalog = StaticCatalog::new("pervasive")
            .respond(TABLES_QUERY, tables(&["T"]))
            .respond(columns_query("T").unwrap(), vec![field("Ref", 1, 4, false)])
            .respond(
                foreign_keys_query("T").unwrap(),
                vec![CatalogRow::new()
                    .with("RULE_NAME", "fk_t")
                    .with("FOREIGN_TABLE", "Gone")
                    .with("FOREIGN_COLUMN", "ID")
                    .with("LOCAL_COLUMN", "Ref")],
            );
        let err = parse(catalog).await.unwrap_err();
        assert!(matches!(err, ReverseError::SchemaIntegrity(_)));
    }

    #[tokio::test]
    async fn test_transcodes_with_hints() {
        let mut options = ReverseOptions::default();
        options.encodings.insert("0".into(), "windows-1252".into());
        let catalog = StaticCatalog::new("pervasive").respond(
            TABLES_QUERY,
            vec![CatalogRow::new().with("XF$NAME", CatalogValue::Raw(b"Caf\xe9  ".to_vec()))],
        );
        let mut parser = PervasiveSchemaParser::new(catalog, options).unwrap();
        let mut db = Database::new("DEMODATA");
        parser.parse(&mut db).await.unwrap();
        assert_eq!(db.tables[0].name, "Café");
        assert!(parser
            .source()
            .queries()
            .iter()
            .any(|q| q.contains("TAB.XF$NAME = 'Café'")));
    }
}
