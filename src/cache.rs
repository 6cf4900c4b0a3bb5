//! Bounded memoization for derivative and regex-set operations.
//!
//! Results are keyed by operation kind plus up to three argument term ids.
//! When the table reaches its capacity it is cleared wholesale; partial
//! eviction would make replay order observable.

use rustc_hash::FxHashMap;

use crate::ast::TermId;

/// Operation discriminant for cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheOp {
    /// Antimirov derivative `D(e, r, path)`.
    Derivative,
    /// Nullability formula of a regex.
    Nullable,
    /// Normal-form union.
    DerUnion,
    /// Normal-form intersection.
    DerInter,
    /// Normal-form concatenation.
    DerConcat,
    /// Normal-form Antimirov union.
    DerAntimirovUnion,
    /// Normal-form complement.
    DerComplement,
}

/// Cache key: operation plus argument identities.
pub type CacheKey = (CacheOp, TermId, Option<TermId>, Option<TermId>);

/// Default capacity before a full reset.
pub const MAX_CACHE_SIZE: usize = 100_000;

/// Bounded operation cache with a clear-all overflow policy.
#[derive(Debug)]
pub struct OpCache {
    table: FxHashMap<CacheKey, TermId>,
    max_size: usize,
    resets: u64,
}

impl Default for OpCache {
    fn default() -> Self {
        Self::new(MAX_CACHE_SIZE)
    }
}

impl OpCache {
    /// Cache with the given capacity.
    pub fn new(max_size: usize) -> Self {
        OpCache { table: FxHashMap::default(), max_size, resets: 0 }
    }

    /// Cached result for `(op, a, b, c)`, if any.
    pub fn find(&self, op: CacheOp, a: TermId, b: Option<TermId>, c: Option<TermId>) -> Option<TermId> {
        self.table.get(&(op, a, b, c)).copied()
    }

    /// Record a result, clearing the table first if it is at capacity.
    pub fn insert(&mut self, op: CacheOp, a: TermId, b: Option<TermId>, c: Option<TermId>, r: TermId) {
        if self.table.len() >= self.max_size {
            self.table.clear();
            self.resets += 1;
            tracing::debug!(resets = self.resets, "op cache reset");
        }
        self.table.insert((op, a, b, c), r);
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True iff the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of overflow resets so far.
    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.table.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_after_insert() {
        let mut cache = OpCache::new(4);
        let a = TermId::new(1);
        let r = TermId::new(2);
        assert_eq!(cache.find(CacheOp::Nullable, a, None, None), None);
        cache.insert(CacheOp::Nullable, a, None, None, r);
        assert_eq!(cache.find(CacheOp::Nullable, a, None, None), Some(r));
    }

    #[test]
    fn test_overflow_clears_everything() {
        let mut cache = OpCache::new(2);
        for i in 0..2 {
            cache.insert(CacheOp::Nullable, TermId::new(i), None, None, TermId::new(100 + i));
        }
        assert_eq!(cache.len(), 2);
        // Third insert trips the reset, leaving only the new entry.
        cache.insert(CacheOp::Nullable, TermId::new(7), None, None, TermId::new(107));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.resets(), 1);
        assert_eq!(cache.find(CacheOp::Nullable, TermId::new(0), None, None), None);
    }
}
