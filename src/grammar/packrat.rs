//! Packrat Memoization
//!
//! Ordered-choice productions (statement-keyword dispatch, trailer
//! disambiguation) try several alternatives at the same token
//! position. Memoizing by `(production, position)` keeps a failed or
//! shared sub-attempt from being retried, mirroring `pyparsing`'s
//! packrat cache that upstream enables via `packrat_cache`
//! (`coconut/compiler/util.py`).

use std::collections::HashMap;

/// Identifies a grammar production for memoization purposes. Plain
/// `u32` tags rather than an enum so new productions in `expr`/`stmt`
/// don't need a central registry -- each module just picks its own
/// unused tag range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductionId(pub u32);

#[derive(Default)]
pub struct Packrat<T: Clone> {
    cache: HashMap<(u32, usize), Option<T>>,
}

impl<T: Clone> Packrat<T> {
    pub fn new() -> Self {
        Self { cache: HashMap::new() }
    }

    /// Return the memoized result for `(production, pos)`, if any.
    /// `None` outer means "not attempted yet"; `Some(None)` means
    /// "attempted and failed here".
    pub fn get(&self, production: ProductionId, pos: usize) -> Option<Option<T>> {
        self.cache.get(&(production.0, pos)).cloned()
    }

    pub fn record(&mut self, production: ProductionId, pos: usize, result: Option<T>) {
        self.cache.insert((production.0, pos), result);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
