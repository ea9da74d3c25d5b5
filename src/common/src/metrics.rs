use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;

pub type CounterHook = Arc<dyn Fn(usize) + Send + Sync>;

/// Optional observability callbacks, fired after terminal send outcomes and
/// on queue depth changes. Hooks are fire-and-forget: a panicking hook is
/// caught and logged, it never reaches SDK callers or alters control flow.
#[derive(Clone, Default)]
pub struct MetricsHooks {
    pub on_ingest_success: Option<CounterHook>,
    pub on_ingest_failure: Option<CounterHook>,
    pub on_queue_depth: Option<CounterHook>,
}

impl MetricsHooks {
    pub fn ingest_success(&self, count: usize) {
        fire("on_ingest_success", self.on_ingest_success.as_ref(), count);
    }

    pub fn ingest_failure(&self, count: usize) {
        fire("on_ingest_failure", self.on_ingest_failure.as_ref(), count);
    }

    pub fn queue_depth(&self, depth: usize) {
        fire("on_queue_depth", self.on_queue_depth.as_ref(), depth);
    }
}

fn fire(name: &str, hook: Option<&CounterHook>, count: usize) {
    if let Some(hook) = hook {
        let hook = Arc::clone(hook);
        if catch_unwind(AssertUnwindSafe(|| hook(count))).is_err() {
            warn!(hook = name, "metrics hook panicked; ignoring");
        }
    }
}

impl fmt::Debug for MetricsHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsHooks")
            .field("on_ingest_success", &self.on_ingest_success.is_some())
            .field("on_ingest_failure", &self.on_ingest_failure.is_some())
            .field("on_queue_depth", &self.on_queue_depth.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn hooks_receive_counts() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        let hooks = MetricsHooks {
            on_ingest_success: Some(Arc::new(move |n| {
                seen_clone.fetch_add(n, Ordering::SeqCst);
            })),
            ..Default::default()
        };
        hooks.ingest_success(2);
        hooks.ingest_success(1);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn unset_hooks_are_noops() {
        let hooks = MetricsHooks::default();
        hooks.ingest_success(1);
        hooks.ingest_failure(1);
        hooks.queue_depth(10);
    }

    #[test]
    fn panicking_hook_is_contained() {
        let hooks = MetricsHooks {
            on_ingest_failure: Some(Arc::new(|_| panic!("boom"))),
            ..Default::default()
        };
        hooks.ingest_failure(1);
    }
}
