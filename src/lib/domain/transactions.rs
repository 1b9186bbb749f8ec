//! Units of work and their after-commit hooks

use std::{fmt, mem, sync::Arc};

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tracing::debug;

/// An operation run once the enclosing unit of work commits
pub type AfterCommitHook = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Registers operations to run only if the current unit of work commits
pub trait TransactionHooks: Send + Sync + 'static {
    /// Joins `hook` to the current unit of work.
    ///
    /// The hook runs at most once, after a successful commit, and never if the unit of
    /// work is aborted.
    fn join(&self, hook: AfterCommitHook);
}

/// An in-process unit of work collecting after-commit hooks
///
/// Clones share the same hooks. Dropping every clone without committing aborts.
#[derive(Clone, Default)]
pub struct UnitOfWork {
    hooks: Arc<Mutex<Vec<AfterCommitHook>>>,
}

impl UnitOfWork {
    /// Starts a new unit of work
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of hooks waiting for the commit
    pub fn pending(&self) -> usize {
        self.hooks.lock().len()
    }

    /// Commits, running the joined hooks in the order they were joined.
    ///
    /// Returns how many hooks ran.
    pub async fn commit(&self) -> usize {
        let hooks = mem::take(&mut *self.hooks.lock());
        let count = hooks.len();

        debug!(hooks = count, "committing unit of work");

        for hook in hooks {
            hook().await;
        }

        count
    }

    /// Aborts, dropping the joined hooks without running them.
    pub fn abort(&self) {
        let hooks = mem::take(&mut *self.hooks.lock());

        debug!(hooks = hooks.len(), "aborting unit of work");
    }
}

impl TransactionHooks for UnitOfWork {
    fn join(&self, hook: AfterCommitHook) {
        self.hooks.lock().push(hook);
    }
}

impl fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;

    use super::*;

    fn recording_hook(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> AfterCommitHook {
        let log = log.clone();

        Box::new(move || async move { log.lock().push(name) }.boxed())
    }

    #[tokio::test]
    async fn test_commit_runs_hooks_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let unit_of_work = UnitOfWork::new();

        unit_of_work.join(recording_hook(&log, "first"));
        unit_of_work.join(recording_hook(&log, "second"));

        assert!(log.lock().is_empty(), "hooks must not run before commit");

        let ran = unit_of_work.commit().await;

        assert_eq!(ran, 2);
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_commit_runs_each_hook_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let unit_of_work = UnitOfWork::new();

        unit_of_work.join(recording_hook(&log, "only"));

        assert_eq!(unit_of_work.commit().await, 1);
        assert_eq!(unit_of_work.commit().await, 0);
        assert_eq!(*log.lock(), vec!["only"]);
    }

    #[tokio::test]
    async fn test_abort_drops_hooks() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let unit_of_work = UnitOfWork::new();

        unit_of_work.join(recording_hook(&log, "never"));
        unit_of_work.abort();

        assert_eq!(unit_of_work.pending(), 0);
        assert_eq!(unit_of_work.commit().await, 0);
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_hooks() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let unit_of_work = UnitOfWork::new();
        let joined = unit_of_work.clone();

        joined.join(recording_hook(&log, "shared"));

        assert_eq!(unit_of_work.pending(), 1);
        assert_eq!(unit_of_work.commit().await, 1);
        assert_eq!(*log.lock(), vec!["shared"]);
    }
}
