//! Statement preparation: the fixed pipeline a statement goes through
//! before it is handed to a driver for execution.

use tracing::debug;

use crate::core::params::BoundParam;
use crate::core::schema::Database;
use crate::core::traits::Platform;
use crate::drivers::PlatformImpl;
use crate::error::Result;
use crate::rewrite::{self, RewriteHook};

/// A statement ready for execution.
#[derive(Debug)]
pub struct PreparedStatement {
    pub sql: String,
    pub params: Vec<BoundParam>,
}

/// Applies limit emulation, platform cleanup and the rewrite hook, in
/// that order.
#[derive(Debug, Clone)]
pub struct StatementPreparer {
    platform: PlatformImpl,
    hook: RewriteHook,
}

impl StatementPreparer {
    /// Preparer that falls back to the process-wide rewriter.
    pub fn new(platform: PlatformImpl) -> Self {
        Self {
            platform,
            hook: RewriteHook::new(),
        }
    }

    /// Preparer with its own rewriter; the process-wide one is ignored.
    pub fn with_hook(platform: PlatformImpl, hook: RewriteHook) -> Self {
        Self { platform, hook }
    }

    pub fn platform(&self) -> &PlatformImpl {
        &self.platform
    }

    pub fn hook_mut(&mut self) -> &mut RewriteHook {
        &mut self.hook
    }

    /// Prepare `sql` with its positional `:pN` parameters.
    ///
    /// `limit` is `(offset, limit)`. On error nothing is returned; the
    /// parameters have been consumed.
    pub fn prepare(
        &self,
        sql: &str,
        params: Vec<BoundParam>,
        database: &Database,
        limit: Option<(i64, i64)>,
    ) -> Result<PreparedStatement> {
        let mut sql = sql.to_string();
        let mut params = params;

        if let Some((offset, limit)) = limit {
            self.platform.apply_limit(&mut sql, offset, limit)?;
        }
        self.platform.cleanup_sql(&mut sql, &mut params, database)?;
        if !self.hook.apply(&mut sql) {
            rewrite::apply_global(&mut sql);
        }

        debug!("Prepared {} statement: {}", self.platform.name(), sql);
        Ok(PreparedStatement { sql, params })
    }
}
