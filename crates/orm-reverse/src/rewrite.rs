//! SQL rewrite hook applied to statements after platform cleanup.
//!
//! A [`RewriteHook`] is the preferred form: owned by whoever prepares
//! statements and passed in explicitly. The process-wide slot exists for
//! callers that cannot thread a hook through; it has a single owner that
//! installs a rewriter at startup and removes it at shutdown.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

/// Rewrites a finished SQL statement in place.
pub trait SqlRewriter: Send + Sync {
    fn rewrite(&self, sql: &mut String);
}

impl<F> SqlRewriter for F
where
    F: Fn(&mut String) + Send + Sync,
{
    fn rewrite(&self, sql: &mut String) {
        self(sql)
    }
}

/// A single optional rewriter. Installing replaces the previous one.
#[derive(Clone, Default)]
pub struct RewriteHook {
    rewriter: Option<Arc<dyn SqlRewriter>>,
}

impl RewriteHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&mut self, rewriter: impl SqlRewriter + 'static) {
        self.rewriter = Some(Arc::new(rewriter));
    }

    pub fn install_shared(&mut self, rewriter: Arc<dyn SqlRewriter>) {
        self.rewriter = Some(rewriter);
    }

    pub fn remove(&mut self) {
        self.rewriter = None;
    }

    pub fn is_installed(&self) -> bool {
        self.rewriter.is_some()
    }

    /// Run the rewriter, if any. Returns whether one ran.
    pub fn apply(&self, sql: &mut String) -> bool {
        match &self.rewriter {
            Some(rewriter) => {
                rewriter.rewrite(sql);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for RewriteHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewriteHook")
            .field("installed", &self.is_installed())
            .finish()
    }
}

static GLOBAL: RwLock<Option<Arc<dyn SqlRewriter>>> = parking_lot::const_rwlock(None);

/// Install the process-wide rewriter, replacing any previous one.
pub fn set_sql_rewriter(rewriter: impl SqlRewriter + 'static) {
    debug!("Installing global SQL rewriter");
    *GLOBAL.write() = Some(Arc::new(rewriter));
}

/// Remove the process-wide rewriter; statements pass through unchanged.
pub fn remove_sql_rewriter() {
    debug!("Removing global SQL rewriter");
    *GLOBAL.write() = None;
}

/// The currently installed process-wide rewriter.
pub fn global_sql_rewriter() -> Option<Arc<dyn SqlRewriter>> {
    GLOBAL.read().clone()
}

/// Apply the process-wide rewriter, if any. Returns whether one ran.
///
/// The lock is released before the rewriter runs, so a rewriter may
/// itself replace the global slot.
pub fn apply_global(sql: &mut String) -> bool {
    match global_sql_rewriter() {
        Some(rewriter) => {
            rewriter.rewrite(sql);
            true
        }
        None => false,
    }
}
