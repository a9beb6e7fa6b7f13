//! SQL Server platform (Strategy pattern).
//!
//! Renders DDL with bracket quoting and `IDENTITY` columns, and emulates
//! LIMIT/OFFSET with `TOP` or a `ROW_NUMBER()` window.

use crate::core::params::BoundParam;
use crate::core::schema::{Column, Database, FkAction, ForeignKey, Table};
use crate::core::traits::Platform;
use crate::dialect::{FromLogical, MssqlTypes};
use crate::drivers::common::sqltext::{
    check_limit_args, inline_lob_params, split_order_by, split_select, top_n,
    unqualified_order_items,
};
use crate::error::{ReverseError, Result};

/// Microsoft SQL Server platform implementation.
#[derive(Debug, Clone, Default)]
pub struct MssqlPlatform {
    types: MssqlTypes,
}

impl MssqlPlatform {
    /// Create a new MSSQL platform instance.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Platform for MssqlPlatform {
    fn name(&self) -> &str {
        "mssql"
    }

    fn types(&self) -> &dyn FromLogical {
        &self.types
    }

    fn quote_identifier(&self, name: &str) -> String {
        // Handle names that contain closing brackets by doubling them
        format!("[{}]", name.replace(']', "]]"))
    }

    fn max_column_name_length(&self) -> usize {
        128
    }

    fn supports_schemas(&self) -> bool {
        true
    }

    fn supports_native_delete_trigger(&self) -> bool {
        true
    }

    fn supports_insert_null_pk(&self) -> bool {
        false
    }

    fn str_length(&self, expr: &str) -> String {
        format!("LEN({})", expr)
    }

    fn auto_increment_string(&self, _column: &Column) -> Option<String> {
        Some("IDENTITY".to_string())
    }

    fn fk_action_sql(&self, action: FkAction) -> Option<&'static str> {
        match action {
            // SQL Server has no RESTRICT; NO ACTION is the equivalent.
            FkAction::Restrict => Some("NO ACTION"),
            other => other.as_sql(),
        }
    }

    fn drop_table_ddl(&self, table: &Table) -> String {
        format!(
            "\nIF EXISTS (SELECT 1 FROM sysobjects WHERE type = 'U' AND name = '{}')\n    DROP TABLE {};\n",
            table.name.replace('\'', "''"),
            self.quote_identifier(&table.name)
        )
    }

    fn drop_foreign_key_ddl(&self, table: &Table, fk: &ForeignKey) -> String {
        format!(
            "\nIF EXISTS (SELECT 1 FROM sysobjects WHERE type = 'F' AND name = '{}')\n    ALTER TABLE {} DROP CONSTRAINT {};\n",
            fk.name.replace('\'', "''"),
            self.quote_identifier(&table.name),
            self.quote_identifier(&fk.name)
        )
    }

    /// Zero offset uses `TOP`; a positive offset numbers the rows with
    /// `ROW_NUMBER()` over the statement's trailing ORDER BY and filters on
    /// that number. The row number stays in the result as `__rn`.
    ///
    /// The number is computed next to the select list, so the ORDER BY keeps
    /// its qualifiers and may name columns that are not selected. A DISTINCT
    /// statement is numbered after deduplication instead, over a derived
    /// table, which needs plain column references.
    fn apply_limit(&self, sql: &mut String, offset: i64, limit: i64) -> Result<()> {
        check_limit_args(offset, limit)?;
        let parts = split_select(sql)?;

        if offset == 0 {
            *sql = top_n(&parts, limit);
            return Ok(());
        }

        let end = offset.checked_add(limit).ok_or_else(|| {
            ReverseError::Config(format!("offset {} + limit {} overflows", offset, limit))
        })?;
        let (from, order_by) = split_order_by(&parts.from);

        let numbered = if parts.distinct {
            let window_order = match order_by {
                Some(clause) => unqualified_order_items(clause)?,
                None => "(SELECT NULL)".to_string(),
            };
            format!(
                "SELECT *, ROW_NUMBER() OVER (ORDER BY {}) AS __rn\n    FROM ({}) AS __inner",
                window_order,
                parts.render("", from)
            )
        } else {
            format!(
                "SELECT {}, ROW_NUMBER() OVER (ORDER BY {}) AS __rn\n    FROM {}",
                parts.select,
                order_by.unwrap_or("(SELECT NULL)"),
                from
            )
        };

        *sql = format!(
            "WITH numbered AS (\n    {}\n)\nSELECT * FROM numbered WHERE __rn > {} AND __rn <= {} ORDER BY __rn",
            numbered, offset, end
        );
        Ok(())
    }

    fn cleanup_sql(
        &self,
        sql: &mut String,
        params: &mut Vec<BoundParam>,
        database: &Database,
    ) -> Result<()> {
        inline_lob_params(sql, params, database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{Domain, Index, IndexKind};
    use crate::core::types::LogicalType;

    fn platform() -> MssqlPlatform {
        MssqlPlatform::new()
    }

    #[test]
    fn test_quote_identifier() {
        let p = platform();
        assert_eq!(p.quote_identifier("users"), "[users]");
        assert_eq!(p.quote_identifier("table]name"), "[table]]name]");
    }

    #[test]
    fn test_quote_identifier_table() {
        assert_eq!(
            platform().quote_identifier_table("shop.orders o"),
            "[shop].[orders] [o]"
        );
    }

    #[test]
    fn test_identity_column_ddl() {
        let mut col = Column::new("id", "Id", Domain::new(LogicalType::Integer, "INT"));
        col.not_null = true;
        col.auto_increment = true;
        let table = Table::new("orders", "Orders");
        assert_eq!(
            platform().column_ddl(&table, &col).unwrap(),
            "[id] INT NOT NULL IDENTITY"
        );
    }

    #[test]
    fn test_create_table_with_unique() {
        let mut table = Table::new("customers", "Customers");
        let mut id = Column::new("id", "Id", Domain::new(LogicalType::Integer, "INT"));
        id.not_null = true;
        id.primary_key = true;
        table.add_column(id).unwrap();
        let mut email = Column::new("email", "Email", Domain::new(LogicalType::Varchar, "VARCHAR"));
        email.domain.size = Some(255);
        table.add_column(email).unwrap();
        let mut unique = Index::new("uq_email", IndexKind::Unique);
        unique.columns.push("email".into());
        table.add_index(unique).unwrap();

        let ddl = platform().add_table_ddl(&table).unwrap();
        assert_eq!(
            ddl,
            "\nCREATE TABLE [customers]\n(\n    [id] INT NOT NULL,\n    [email] VARCHAR(255) NULL,\n    PRIMARY KEY ([id]),\n    CONSTRAINT [uq_email] UNIQUE ([email])\n);\n"
        );
    }

    #[test]
    fn test_drop_table_is_guarded() {
        let ddl = platform().drop_table_ddl(&Table::new("orders", "Orders"));
        assert!(ddl.contains("type = 'U' AND name = 'orders'"));
        assert!(ddl.contains("DROP TABLE [orders];"));
    }

    #[test]
    fn test_restrict_renders_as_no_action() {
        let mut fk = ForeignKey::new("fk_cust", "customers");
        fk.add_reference("customer_id", "id");
        fk.on_delete = FkAction::Restrict;
        fk.on_update = FkAction::Cascade;
        let ddl = platform().foreign_key_ddl(&fk);
        assert!(ddl.contains("ON DELETE NO ACTION"));
        assert!(ddl.contains("ON UPDATE CASCADE"));
    }

    #[test]
    fn test_limit_zero_offset_uses_top() {
        let mut sql = "SELECT a, b FROM t".to_string();
        platform().apply_limit(&mut sql, 0, 5).unwrap();
        assert_eq!(sql, "SELECT TOP 5 a, b FROM t");
    }

    #[test]
    fn test_limit_keeps_distinct_in_front_of_top() {
        let mut sql = "SELECT DISTINCT a FROM t".to_string();
        platform().apply_limit(&mut sql, 0, 3).unwrap();
        assert_eq!(sql, "SELECT DISTINCT TOP 3 a FROM t");
    }

    #[test]
    fn test_limit_with_offset_uses_window() {
        let mut sql = "SELECT o.id, o.total FROM orders o WHERE o.total > 10 ORDER BY o.id DESC".to_string();
        platform().apply_limit(&mut sql, 20, 10).unwrap();
        assert_eq!(
            sql,
            "WITH numbered AS (\n    SELECT o.id, o.total, ROW_NUMBER() OVER (ORDER BY o.id DESC) AS __rn\n    FROM orders o WHERE o.total > 10\n)\nSELECT * FROM numbered WHERE __rn > 20 AND __rn <= 30 ORDER BY __rn"
        );
    }

    #[test]
    fn test_limit_with_offset_orders_by_unselected_column() {
        let mut sql = "SELECT c.name FROM customers c ORDER BY c.id".to_string();
        platform().apply_limit(&mut sql, 5, 5).unwrap();
        assert!(sql.contains("SELECT c.name, ROW_NUMBER() OVER (ORDER BY c.id) AS __rn"));
        assert!(sql.contains("FROM customers c\n)"));
        assert!(!sql.contains("__inner"));
    }

    #[test]
    fn test_limit_with_offset_keeps_expression_order() {
        let mut sql = "SELECT a FROM t ORDER BY LEN(a)".to_string();
        platform().apply_limit(&mut sql, 5, 5).unwrap();
        assert!(sql.contains("ROW_NUMBER() OVER (ORDER BY LEN(a)) AS __rn"));
    }

    #[test]
    fn test_limit_with_offset_without_order_by() {
        let mut sql = "SELECT a FROM t".to_string();
        platform().apply_limit(&mut sql, 1, 1).unwrap();
        assert!(sql.contains("ORDER BY (SELECT NULL)"));
        assert!(sql.contains("__rn > 1 AND __rn <= 2"));
    }

    #[test]
    fn test_limit_with_offset_numbers_distinct_rows_after_dedup() {
        let mut sql = "SELECT DISTINCT c.city FROM customers c ORDER BY c.city".to_string();
        platform().apply_limit(&mut sql, 2, 2).unwrap();
        assert!(sql.contains("SELECT *, ROW_NUMBER() OVER (ORDER BY city) AS __rn"));
        assert!(sql.contains("FROM (SELECT DISTINCT c.city FROM customers c) AS __inner"));
    }

    #[test]
    fn test_limit_with_offset_rejects_distinct_expression_order() {
        let mut sql = "SELECT DISTINCT a FROM t ORDER BY LEN(a)".to_string();
        let err = platform().apply_limit(&mut sql, 5, 5).unwrap_err();
        assert!(matches!(err, ReverseError::Unsupported(_)));
        assert_eq!(sql, "SELECT DISTINCT a FROM t ORDER BY LEN(a)");
    }

    #[test]
    fn test_limit_overflow_and_negative() {
        let mut sql = "SELECT a FROM t".to_string();
        assert!(platform().apply_limit(&mut sql, i64::MAX, 1).is_err());
        assert!(platform().apply_limit(&mut sql, -1, 1).is_err());
        assert_eq!(sql, "SELECT a FROM t");
    }

    #[test]
    fn test_limit_rejects_non_select() {
        let mut sql = "DELETE FROM t".to_string();
        assert!(matches!(
            platform().apply_limit(&mut sql, 0, 1),
            Err(ReverseError::Rewrite(_))
        ));
    }

    #[test]
    fn test_sql_helpers() {
        let p = platform();
        assert_eq!(p.str_length("name"), "LEN(name)");
        assert_eq!(p.concat_string("a", "b"), "(a + b)");
        assert_eq!(p.ignore_case("name"), "UPPER(name)");
        assert_eq!(p.max_column_name_length(), 128);
    }
}
