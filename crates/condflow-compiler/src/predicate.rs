//! Compiled predicates

use std::fmt;
use std::sync::Arc;

/// Boolean test compiled from a condition tree
pub(crate) type Test<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A reusable, thread-safe boolean evaluator over `T`.
///
/// Cloning is cheap; clones share the compiled closure tree.
pub struct Predicate<T> {
    test: Test<T>,
    source: Arc<str>,
}

impl<T> Predicate<T> {
    pub(crate) fn new(source: impl Into<Arc<str>>, test: Test<T>) -> Self {
        Self {
            test,
            source: source.into(),
        }
    }

    /// Build a predicate from a plain closure
    pub fn from_fn<F>(source: &str, f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::new(source, Arc::new(f))
    }

    pub fn evaluate(&self, item: &T) -> bool {
        (self.test)(item)
    }

    /// Expression text this predicate was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            test: Arc::clone(&self.test),
            source: Arc::clone(&self.source),
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.source).finish()
    }
}

impl<T> fmt::Display for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
