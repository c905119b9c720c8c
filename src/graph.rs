//! Dependency graph traversal.
//!
//! The "depends on" relation over lifecycle records forms a directed graph
//! whose edges are flag-id lists, never in-memory references. Cycle
//! prevention is an explicit reachability search run before an edge is
//! admitted: the visited set bounds the walk by the number of distinct
//! flags, so it terminates even if a defect elsewhere already let a cycle
//! into the stored graph.

use std::collections::{HashSet, VecDeque};

use crate::store::LifecycleStore;

/// Returns true if adding the edge `record_flag_id -> candidate_flag_id`
/// would close a cycle, i.e. if `record_flag_id` is already reachable from
/// `candidate_flag_id` along existing dependency edges. A self-dependency
/// is trivially a cycle.
pub fn would_create_cycle<L: LifecycleStore + ?Sized>(
    store: &L,
    record_flag_id: &str,
    candidate_flag_id: &str,
) -> bool {
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(candidate_flag_id.to_string());

    while let Some(flag_id) = queue.pop_front() {
        if flag_id == record_flag_id {
            return true;
        }
        if !visited.insert(flag_id.clone()) {
            continue;
        }
        if let Some(record) = store.find_by_flag_id(&flag_id) {
            for dep in record.dependencies {
                if !visited.contains(&dep) {
                    queue.push_back(dep);
                }
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LifecycleRecord;
    use crate::store::InMemoryLifecycleStore;
    use chrono::Utc;

    fn record_with_deps(id: &str, flag_id: &str, deps: &[&str]) -> LifecycleRecord {
        let mut record = LifecycleRecord::new(id, flag_id, Utc::now());
        record.dependencies = deps.iter().map(|d| d.to_string()).collect();
        record
    }

    #[test]
    fn test_no_cycle_in_a_chain() {
        let store = InMemoryLifecycleStore::new();
        store.save(record_with_deps("lc-a", "a", &["b"]));
        store.save(record_with_deps("lc-b", "b", &["c"]));
        store.save(record_with_deps("lc-c", "c", &[]));

        // a -> b -> c; adding d -> a is fine
        assert!(!would_create_cycle(&store, "d", "a"));
        // and so is a -> c
        assert!(!would_create_cycle(&store, "a", "c"));
    }

    #[test]
    fn test_direct_cycle_is_detected() {
        let store = InMemoryLifecycleStore::new();
        store.save(record_with_deps("lc-a", "a", &["b"]));
        store.save(record_with_deps("lc-b", "b", &[]));

        // a depends on b, so b -> a closes the loop
        assert!(would_create_cycle(&store, "b", "a"));
    }

    #[test]
    fn test_transitive_cycle_is_detected() {
        let store = InMemoryLifecycleStore::new();
        store.save(record_with_deps("lc-a", "a", &["b"]));
        store.save(record_with_deps("lc-b", "b", &["c"]));
        store.save(record_with_deps("lc-c", "c", &[]));

        // c -> a would close a three-node loop
        assert!(would_create_cycle(&store, "c", "a"));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let store = InMemoryLifecycleStore::new();
        store.save(record_with_deps("lc-a", "a", &[]));
        assert!(would_create_cycle(&store, "a", "a"));
    }

    #[test]
    fn test_terminates_on_pre_existing_cycle() {
        // a corrupted store already containing a cycle must not hang the walk
        let store = InMemoryLifecycleStore::new();
        store.save(record_with_deps("lc-a", "a", &["b"]));
        store.save(record_with_deps("lc-b", "b", &["a"]));

        assert!(!would_create_cycle(&store, "x", "a"));
        assert!(would_create_cycle(&store, "a", "b"));
    }

    #[test]
    fn test_missing_records_are_leaves() {
        let store = InMemoryLifecycleStore::new();
        store.save(record_with_deps("lc-a", "a", &["ghost"]));
        // "ghost" has no record, the walk just stops there
        assert!(!would_create_cycle(&store, "b", "a"));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let store = InMemoryLifecycleStore::new();
        store.save(record_with_deps("lc-a", "a", &["b", "c"]));
        store.save(record_with_deps("lc-b", "b", &["d"]));
        store.save(record_with_deps("lc-c", "c", &["d"]));
        store.save(record_with_deps("lc-d", "d", &[]));

        // shared dependency d is reachable twice but closes no loop
        assert!(!would_create_cycle(&store, "e", "a"));
        assert!(would_create_cycle(&store, "d", "a"));
    }
}
