// Run context - the accumulators of one test campaign

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, PoisonError};

use indexmap::IndexMap;
use tracing::debug;

use crate::report::model::Clazz;
use crate::state::{SuiteAccumulator, SuiteSnapshot, Totals};

type Suites = IndexMap<String, Arc<SuiteAccumulator>>;

/// Accumulators keyed by fully-qualified class name, in first-seen order.
///
/// One context lives for one campaign and is passed to whoever records into
/// it; `reset` is the only way to start over.
#[derive(Debug, Default)]
pub struct RunContext {
    suites: RwLock<Suites>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Suites> {
        self.suites.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Suites> {
        self.suites.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accumulator for `clazz`, created on first use
    pub fn accumulator(&self, clazz: &Clazz) -> Arc<SuiteAccumulator> {
        if let Some(existing) = self.read().get(&clazz.fully_qualified_name) {
            return Arc::clone(existing);
        }

        let mut suites = self.write();
        let entry = suites
            .entry(clazz.fully_qualified_name.clone())
            .or_insert_with(|| {
                debug!(class = %clazz.fully_qualified_name, "new suite accumulator");
                Arc::new(SuiteAccumulator::new(clazz.clone()))
            });
        Arc::clone(entry)
    }

    pub fn get(&self, fully_qualified_name: &str) -> Option<Arc<SuiteAccumulator>> {
        self.read().get(fully_qualified_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Class names in first-seen order
    pub fn class_names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Snapshot of every suite, in first-seen order
    pub fn snapshots(&self) -> Vec<SuiteSnapshot> {
        self.read().values().map(|acc| acc.snapshot()).collect()
    }

    /// Sum of all suite totals
    pub fn totals(&self) -> Totals {
        self.read()
            .values()
            .map(|acc| acc.totals())
            .fold(Totals::default(), |mut sum, t| {
                sum.count += t.count;
                sum.passed += t.passed;
                sum.failed += t.failed;
                sum.skipped += t.skipped;
                sum.aborted += t.aborted;
                sum
            })
    }

    /// Reset every accumulator and forget all suites
    pub fn reset(&self) {
        let mut suites = self.write();
        for acc in suites.values() {
            acc.reset();
        }
        suites.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TestCaseResult;

    #[test]
    fn test_accumulator_is_shared_per_class() {
        let ctx = RunContext::new();
        let clazz = Clazz::from_fully_qualified("com.example.Dev");
        let a = ctx.accumulator(&clazz);
        let b = ctx.accumulator(&clazz);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_first_seen_order() {
        let ctx = RunContext::new();
        for name in ["b.Second", "a.First", "b.Second", "c.Third"] {
            ctx.accumulator(&Clazz::from_fully_qualified(name));
        }
        assert_eq!(ctx.class_names(), vec!["b.Second", "a.First", "c.Third"]);
    }

    #[test]
    fn test_reset_detaches_old_accumulators() {
        let ctx = RunContext::new();
        let clazz = Clazz::from_fully_qualified("com.example.Dev");
        let old = ctx.accumulator(&clazz);
        old.record(TestCaseResult::passed(clazz.clone(), "a"));

        ctx.reset();

        assert!(ctx.is_empty());
        assert!(old.is_empty());
        assert_eq!(ctx.totals(), Totals::default());
    }
}
