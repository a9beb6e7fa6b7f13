//! State shared by the backend schema parsers.

use tracing::warn;

use crate::config::ReverseOptions;
use crate::core::catalog::{CatalogRow, EncodingHints};
use crate::core::identifier::{IdentifierScope, SanitizeStyle, Sanitizer};
use crate::core::schema::Database;
use crate::core::types::LogicalType;
use crate::dialect::ToLogical;
use crate::error::{ReverseError, Result};

/// Options, naming policy, encoding hints and collected warnings of one parse.
#[derive(Debug)]
pub struct ParserContext {
    options: ReverseOptions,
    sanitizer: Sanitizer,
    hints: EncodingHints,
    warnings: Vec<String>,
}

impl ParserContext {
    pub fn new(options: ReverseOptions, style: SanitizeStyle) -> Result<Self> {
        let hints = EncodingHints::from_labels(&options.encodings)?;
        let sanitizer =
            Sanitizer::new(style, options.separator.clone()).with_same_name(options.same_name);
        Ok(Self {
            options,
            sanitizer,
            hints,
            warnings: Vec::new(),
        })
    }

    pub fn options(&self) -> &ReverseOptions {
        &self.options
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Sanitize a raw catalog name.
    pub fn clean(&self, raw: &str) -> String {
        self.sanitizer.clean(raw)
    }

    /// Sanitize a column name and make it unique among the table's columns.
    pub fn claim(&self, scope: &mut IdentifierScope, raw: &str) -> String {
        scope.claim(&self.clean(raw))
    }

    /// Transcode and trim every row with the configured encoding hints.
    pub fn normalize(&self, rows: Vec<CatalogRow>) -> Vec<CatalogRow> {
        rows.into_iter().map(|r| r.normalize(&self.hints)).collect()
    }

    /// Map a native type, falling back to the default logical type with a
    /// warning when the backend type is not supported.
    pub fn resolve_type(
        &mut self,
        types: &dyn ToLogical,
        native: &str,
        table: &str,
        column: &str,
    ) -> LogicalType {
        match types.map_native(native) {
            Some(logical) => logical,
            None => {
                let message = format!(
                    "Column [{}.{}] has a column type ({}) that is not supported.",
                    table, column, native
                );
                warn!("{}", message);
                self.warnings.push(message);
                LogicalType::DEFAULT
            }
        }
    }
}

/// Check that a foreign key target was discovered in an earlier phase.
pub fn require_foreign_column(database: &Database, table: &str, column: &str) -> Result<()> {
    let foreign = database.table(table).ok_or_else(|| {
        ReverseError::integrity(format!(
            "Foreign key references table {} which was not discovered",
            table
        ))
    })?;
    if foreign.column(column).is_none() {
        return Err(ReverseError::integrity(format!(
            "Foreign key references column {}.{} which was not discovered",
            table, column
        )));
    }
    Ok(())
}
