//! Memoization of rendered diffs.
//!
//! The diff pipeline is a pure function of `(left, right, side)`, so its
//! results can be cached on the argument tuple. The TUI rebuilds on every
//! text change and side switch; the cache makes switching sides and undoing
//! scroll-triggered rebuilds free.

use lru::LruCache;

use crate::diff::{diff_for_side, RenderLine, Side};

/// Key for the rendered-diff cache
#[derive(Hash, Eq, PartialEq, Clone)]
struct DiffCacheKey {
    left_hash: u64,
    right_hash: u64,
    side: Side,
}

/// LRU cache over rendered diffs, keyed by content hashes of both sides.
pub struct DiffCache {
    cache: LruCache<DiffCacheKey, Vec<RenderLine>>,
}

impl DiffCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(std::num::NonZeroUsize::new(capacity).unwrap()),
        }
    }

    /// Get the rendering for one side, building and caching it on a miss.
    pub fn get_or_build(&mut self, left: &str, right: &str, side: Side) -> Vec<RenderLine> {
        let key = DiffCacheKey {
            left_hash: content_hash(left),
            right_hash: content_hash(right),
            side,
        };

        if let Some(lines) = self.cache.get(&key) {
            return lines.clone();
        }

        let lines = diff_for_side(left, right, side);
        self.cache.put(key, lines.clone());
        lines
    }

    /// Drop every cached rendering.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> (usize, usize) {
        (self.cache.len(), self.cache.cap().get())
    }
}

fn content_hash(content: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_matches_direct_build() {
        let mut cache = DiffCache::new(8);
        let left = "(* Input 1 *)\na";
        let right = "(* Input 1 *)\nb";

        let cached = cache.get_or_build(left, right, Side::Left);
        assert_eq!(cached, diff_for_side(left, right, Side::Left));

        // Second call is served from the cache and must be identical.
        assert_eq!(cache.get_or_build(left, right, Side::Left), cached);
        assert_eq!(cache.stats().0, 1);
    }

    #[test]
    fn test_sides_cached_separately() {
        let mut cache = DiffCache::new(8);
        let left = "a\nb";
        let right = "a\nc";

        let l = cache.get_or_build(left, right, Side::Left);
        let r = cache.get_or_build(left, right, Side::Right);
        assert_ne!(l, r);
        assert_eq!(cache.stats().0, 2);
    }

    #[test]
    fn test_clear() {
        let mut cache = DiffCache::new(8);
        cache.get_or_build("a", "b", Side::Left);
        cache.clear();
        assert_eq!(cache.stats().0, 0);
    }
}
