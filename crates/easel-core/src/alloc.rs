//! Hash collections used across Easel.
//!
//! Lookup tables that never need a stable iteration order (factory
//! constructors, callback tables) use AHash. Ordered maps use `indexmap`
//! in the crates that need them.

// Re-export optimized hash collections
pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_ahash() {
        let mut map = HashMap::new();
        map.insert("button", 1);
        map.insert("button", 2);
        assert_eq!(map.get("button"), Some(&2));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_hashset_ahash() {
        let mut set = HashSet::new();
        set.insert("slider_float");
        assert!(set.contains("slider_float"));
        assert!(!set.contains("slider_int"));
    }
}
