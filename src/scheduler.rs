//! Keyed delayed tasks on the tokio runtime.
//!
//! Every task is a `JoinHandle`, so it can be aborted, but while a page lives nothing cancels one:
//! scheduling the same key twice keeps both tasks. Pending tasks are aborted only by `shutdown`
//! (page unload).

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, instrument};

/// Identity of a deferred task: what it acts on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskKey {
    /// Navigation assist towards a question card.
    Scroll(String),
    /// Entry animation of a results element.
    Reveal(String),
}

#[derive(Default)]
pub struct Scheduler {
    tasks: HashMap<TaskKey, Vec<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` after `delay`. Must be called from within a tokio runtime.
    #[instrument(level = "debug", skip(self, work))]
    pub fn schedule<F>(&mut self, key: TaskKey, delay: Duration, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.prune();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        });
        let entry = self.tasks.entry(key).or_default();
        entry.push(handle);
        debug!(target: "questionnaire", same_key = entry.len(), "Task scheduled");
    }

    /// Tasks that have not finished yet.
    pub fn pending(&self) -> usize {
        self.tasks.values().flatten().filter(|h| !h.is_finished()).count()
    }

    /// Wait until every task scheduled so far has run.
    pub async fn settle(&mut self) {
        for (_, handles) in self.tasks.drain() {
            for h in handles {
                let _ = h.await;
            }
        }
    }

    /// Abort everything still pending.
    pub fn shutdown(&mut self) {
        let mut aborted = 0usize;
        for (_, handles) in self.tasks.drain() {
            for h in handles {
                if !h.is_finished() {
                    h.abort();
                    aborted += 1;
                }
            }
        }
        debug!(target: "questionnaire", aborted, "Scheduler shut down");
    }

    fn prune(&mut self) {
        self.tasks.retain(|_, handles| {
            handles.retain(|h| !h.is_finished());
            !handles.is_empty()
        });
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn task_runs_after_its_delay() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut s = Scheduler::new();
        let h = hits.clone();
        s.schedule(TaskKey::Scroll("q".into()), Duration::from_millis(300), async move {
            h.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(s.pending(), 1);

        s.settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(s.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn same_key_keeps_both_tasks() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut s = Scheduler::new();
        for _ in 0..2 {
            let h = hits.clone();
            s.schedule(TaskKey::Scroll("q".into()), Duration::from_millis(300), async move {
                h.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(s.pending(), 2);
        s.settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_aborts_pending_work() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut s = Scheduler::new();
        let h = hits.clone();
        s.schedule(TaskKey::Reveal("summary".into()), Duration::from_millis(100), async move {
            h.fetch_add(1, Ordering::SeqCst);
        });
        s.shutdown();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(s.pending(), 0);
    }
}
