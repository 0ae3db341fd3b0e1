//! The node cache value type.
//!
//! [`NodeCache`] is an immutable value: every operation borrows the current
//! cache and returns a new one. Nodes are held behind `Arc`, so producing the
//! next value copies the index maps but never the nodes themselves.
//!
//! Recency is tracked with a logical clock (`tick`). Every hit and every
//! insert advances the clock, and eviction always removes the entry with the
//! lowest tick. Entries seeded in bulk share tick 0; ties are broken by
//! [`NodeId`] ordering.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use mdag_types::{Node, NodeId};

use crate::config::CacheConfig;

/// Recency and size bookkeeping for one cached node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryStat {
    /// Clock value at the last hit or insert.
    pub tick: u64,
    /// Encoded size of the node.
    pub size: u64,
}

/// Size-bounded, least-recently-used node cache.
///
/// Invariants, held after every operation:
/// - `entries` and `stats` have the same key set.
/// - `total_size` is the sum of the sizes of all entries.
/// - every inserted entry fits under `node_size_limit`, when set.
/// - `tick` never decreases and advances on every hit and insert.
#[derive(Clone, Debug)]
pub struct NodeCache {
    entries: HashMap<NodeId, Arc<Node>>,
    stats: HashMap<NodeId, EntryStat>,
    order: BTreeSet<(u64, NodeId)>,
    tick: u64,
    total_size: u64,
    total_size_limit: u64,
    node_size_limit: Option<u64>,
}

impl NodeCache {
    /// An empty cache with the given limits.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            stats: HashMap::new(),
            order: BTreeSet::new(),
            tick: 0,
            total_size: 0,
            total_size_limit: config.total_size_limit,
            node_size_limit: config.node_size_limit,
        }
    }

    /// A cache pre-populated from `base`.
    ///
    /// Every entry starts at tick 0. The total budget is not enforced here;
    /// the next insert reaps back under it.
    pub fn seeded<I>(config: CacheConfig, base: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, Node)>,
    {
        Self::new(config).seed(base)
    }

    /// The limits this cache was built with.
    pub fn config(&self) -> CacheConfig {
        CacheConfig {
            total_size_limit: self.total_size_limit,
            node_size_limit: self.node_size_limit,
        }
    }

    /// Returns `true` if `node` is present and small enough to be cached.
    pub fn cacheable(&self, node: Option<&Node>) -> bool {
        match node {
            Some(node) => {
                node.size <= self.total_size_limit
                    && self.node_size_limit.map_or(true, |limit| node.size <= limit)
            }
            None => false,
        }
    }

    /// Cached node for `id`. Does not count as a use.
    pub fn lookup(&self, id: &NodeId) -> Option<&Node> {
        self.entries.get(id).map(Arc::as_ref)
    }

    /// Shared handle to the cached node for `id`.
    pub fn lookup_shared(&self, id: &NodeId) -> Option<Arc<Node>> {
        self.entries.get(id).cloned()
    }

    /// Returns `true` if `id` is cached.
    pub fn has(&self, id: &NodeId) -> bool {
        self.entries.contains_key(id)
    }

    /// Record a use of `id`.
    ///
    /// The clock advances even when `id` is not cached.
    #[must_use]
    pub fn hit(&self, id: &NodeId) -> Self {
        let mut next = self.clone();
        next.touch(id);
        next
    }

    /// Insert a node fetched after a cache miss.
    ///
    /// Nodes that are not [`cacheable`](Self::cacheable) leave the cache
    /// unchanged. Otherwise least-recently-used entries are reaped until
    /// `node.size` bytes are free, then the node is inserted at the new tick.
    /// Re-inserting a cached id replaces the old entry.
    #[must_use]
    pub fn miss(&self, id: &NodeId, node: &Node) -> Self {
        if !self.cacheable(Some(node)) {
            return self.clone();
        }
        let mut next = self.clone();
        next.remove(id);
        next.reap_in_place(node.size);
        next.insert(*id, Arc::new(node.clone()));
        next
    }

    /// Drop `id` from the cache. The clock does not advance.
    #[must_use]
    pub fn evict(&self, id: &NodeId) -> Self {
        let mut next = self.clone();
        next.remove(id);
        next
    }

    /// Evict least-recently-used entries until at least `target_free` bytes of
    /// the budget are unused, or the cache is empty.
    #[must_use]
    pub fn reap(&self, target_free: u64) -> Self {
        let mut next = self.clone();
        next.reap_in_place(target_free);
        next
    }

    /// Replace all contents with `base`, keeping the configured limits.
    ///
    /// Every entry starts at tick 0, older than anything touched afterwards.
    /// The clock itself is carried over.
    #[must_use]
    pub fn seed<I>(&self, base: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, Node)>,
    {
        let mut next = Self::new(self.config());
        next.tick = self.tick;
        for (id, node) in base {
            next.remove(&id);
            next.total_size += node.size;
            next.stats.insert(
                id,
                EntryStat {
                    tick: 0,
                    size: node.size,
                },
            );
            next.order.insert((0, id));
            next.entries.insert(id, Arc::new(node));
        }
        next
    }

    /// Current value of the logical clock.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Sum of the sizes of all cached nodes.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Byte budget across all cached nodes.
    pub fn total_size_limit(&self) -> u64 {
        self.total_size_limit
    }

    /// Largest node the cache accepts, if limited.
    pub fn node_size_limit(&self) -> Option<u64> {
        self.node_size_limit
    }

    /// Recency bookkeeping for `id`.
    pub fn stat(&self, id: &NodeId) -> Option<EntryStat> {
        self.stats.get(id).copied()
    }

    /// Number of cached nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached ids, least recently used first.
    pub fn ids_by_recency(&self) -> Vec<NodeId> {
        self.order.iter().map(|(_, id)| *id).collect()
    }

    // -----------------------------------------------------------------------
    // In-place transitions. Only ever applied to a freshly cloned value.
    // -----------------------------------------------------------------------

    fn touch(&mut self, id: &NodeId) {
        self.tick += 1;
        let tick = self.tick;
        if let Some(stat) = self.stats.get_mut(id) {
            self.order.remove(&(stat.tick, *id));
            stat.tick = tick;
            self.order.insert((tick, *id));
        }
    }

    fn insert(&mut self, id: NodeId, node: Arc<Node>) {
        self.tick += 1;
        let stat = EntryStat {
            tick: self.tick,
            size: node.size,
        };
        self.total_size += stat.size;
        self.stats.insert(id, stat);
        self.order.insert((stat.tick, id));
        self.entries.insert(id, node);
    }

    fn remove(&mut self, id: &NodeId) -> bool {
        match self.stats.remove(id) {
            Some(stat) => {
                self.order.remove(&(stat.tick, *id));
                self.entries.remove(id);
                self.total_size -= stat.size;
                true
            }
            None => false,
        }
    }

    fn evict_least(&mut self) -> Option<NodeId> {
        let (_, id) = self.order.pop_first()?;
        if let Some(stat) = self.stats.remove(&id) {
            self.total_size -= stat.size;
        }
        self.entries.remove(&id);
        Some(id)
    }

    fn reap_in_place(&mut self, target_free: u64) {
        // Same as `limit - total < target`, without going negative when a
        // seeded cache starts out over budget.
        while self.total_size.saturating_add(target_free) > self.total_size_limit
            && !self.stats.is_empty()
        {
            if self.evict_least().is_none() {
                break;
            }
        }
    }
}

impl Default for NodeCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn node(name: &str, size: u64) -> (NodeId, Node) {
        let id = NodeId::from_bytes(name.as_bytes());
        (id, Node::raw(id, size))
    }

    fn cache(total: u64, per_node: Option<u64>) -> NodeCache {
        NodeCache::new(CacheConfig {
            total_size_limit: total,
            node_size_limit: per_node,
        })
    }

    fn assert_invariants(c: &NodeCache) {
        let mut entry_keys: Vec<_> = c.entries.keys().copied().collect();
        let mut stat_keys: Vec<_> = c.stats.keys().copied().collect();
        entry_keys.sort();
        stat_keys.sort();
        assert_eq!(entry_keys, stat_keys);
        assert_eq!(c.order.len(), c.stats.len());
        for (tick, id) in &c.order {
            assert_eq!(c.stats[id].tick, *tick);
        }
        let sum: u64 = c.entries.values().map(|n| n.size).sum();
        assert_eq!(c.total_size, sum);
    }

    // -----------------------------------------------------------------------
    // Eligibility
    // -----------------------------------------------------------------------

    #[test]
    fn cacheable_rules() {
        let c = cache(100, Some(10));
        assert!(!c.cacheable(None));
        assert!(c.cacheable(Some(&node("a", 10).1)));
        assert!(!c.cacheable(Some(&node("b", 11).1)));

        let c = cache(100, None);
        assert!(c.cacheable(Some(&node("c", 100).1)));
        assert!(!c.cacheable(Some(&node("d", 101).1)));
    }

    #[test]
    fn oversized_node_is_never_cached() {
        let c = cache(100, Some(5));
        let (d, dn) = node("D", 6);
        let next = c.miss(&d, &dn);
        assert!(next.lookup(&d).is_none());
        assert!(next.is_empty());
        assert_eq!(next.tick(), c.tick());
        assert_eq!(next.total_size(), 0);
    }

    // -----------------------------------------------------------------------
    // Hit / miss / evict
    // -----------------------------------------------------------------------

    #[test]
    fn miss_inserts_and_lookup_finds() {
        let (a, an) = node("A", 40);
        let c = cache(100, None).miss(&a, &an);
        assert_eq!(c.lookup(&a), Some(&an));
        assert!(c.has(&a));
        assert_eq!(c.total_size(), 40);
        assert_eq!(c.stat(&a), Some(EntryStat { tick: 1, size: 40 }));
        assert_invariants(&c);
    }

    #[test]
    fn operations_leave_the_original_untouched() {
        let (a, an) = node("A", 40);
        let empty = cache(100, None);
        let one = empty.miss(&a, &an);
        let gone = one.evict(&a);
        assert!(empty.is_empty());
        assert!(one.has(&a));
        assert!(!gone.has(&a));
    }

    #[test]
    fn hit_bumps_recency() {
        let (a, an) = node("A", 10);
        let (b, bn) = node("B", 10);
        let c = cache(100, None).miss(&a, &an).miss(&b, &bn);
        assert_eq!(c.ids_by_recency(), vec![a, b]);

        let c = c.hit(&a);
        assert_eq!(c.tick(), 3);
        assert_eq!(c.stat(&a).map(|s| s.tick), Some(3));
        assert_eq!(c.ids_by_recency(), vec![b, a]);
        assert_invariants(&c);
    }

    #[test]
    fn hit_on_absent_id_still_advances_clock() {
        let (a, an) = node("A", 10);
        let c = cache(100, None).miss(&a, &an);
        let missing = NodeId::from_bytes(b"missing");
        let next = c.hit(&missing);
        assert_eq!(next.tick(), c.tick() + 1);
        assert_eq!(next.stat(&a), c.stat(&a));
        assert!(!next.has(&missing));
    }

    #[test]
    fn evict_subtracts_size_without_ticking() {
        let (a, an) = node("A", 40);
        let (b, bn) = node("B", 20);
        let c = cache(100, None).miss(&a, &an).miss(&b, &bn);
        let next = c.evict(&a);
        assert_eq!(next.total_size(), 20);
        assert_eq!(next.tick(), c.tick());
        assert!(!next.has(&a));
        assert_invariants(&next);

        let same = next.evict(&a);
        assert_eq!(same.total_size(), 20);
    }

    #[test]
    fn reinserting_replaces_the_entry() {
        let (a, an) = node("A", 40);
        let c = cache(100, None).miss(&a, &an).miss(&a, &an);
        assert_eq!(c.len(), 1);
        assert_eq!(c.total_size(), 40);
        assert_invariants(&c);
    }

    // -----------------------------------------------------------------------
    // Reaping
    // -----------------------------------------------------------------------

    #[test]
    fn full_cache_evicts_least_recent_on_insert() {
        let (a, an) = node("A", 40);
        let (b, bn) = node("B", 60);
        let (cid, cn) = node("C", 10);

        let c = cache(100, None).miss(&a, &an).miss(&b, &bn);
        assert!(c.has(&a) && c.has(&b));
        assert_eq!(c.total_size(), 100);

        let c = c.miss(&cid, &cn);
        assert!(c.lookup(&a).is_none());
        assert!(c.has(&b) && c.has(&cid));
        assert_eq!(c.total_size(), 70);
        assert_invariants(&c);
    }

    #[test]
    fn reap_larger_than_budget_drains_everything() {
        let (a, an) = node("A", 40);
        let (b, bn) = node("B", 30);
        let c = cache(100, None).miss(&a, &an).miss(&b, &bn);
        let drained = c.reap(101);
        assert!(drained.is_empty());
        assert_eq!(drained.total_size(), 0);
    }

    #[test]
    fn reap_stops_once_enough_is_free() {
        let (a, an) = node("A", 30);
        let (b, bn) = node("B", 30);
        let (d, dn) = node("D", 30);
        let c = cache(100, None).miss(&a, &an).miss(&b, &bn).miss(&d, &dn);
        let next = c.reap(40);
        assert!(!next.has(&a));
        assert!(next.has(&b) && next.has(&d));
        assert_eq!(next.total_size(), 60);
    }

    // -----------------------------------------------------------------------
    // Seeding
    // -----------------------------------------------------------------------

    #[test]
    fn seed_rebuilds_without_enforcing_budget() {
        let (a, an) = node("A", 80);
        let (b, bn) = node("B", 80);
        let (x, xn) = node("X", 5);
        let c = cache(100, Some(90)).miss(&x, &xn).seed(vec![(a, an), (b, bn)]);

        assert!(!c.has(&x));
        assert_eq!(c.total_size(), 160);
        assert_eq!(c.tick(), 1);
        assert_eq!(c.stat(&a).map(|s| s.tick), Some(0));
        assert_eq!(c.config().node_size_limit, Some(90));
        assert_invariants(&c);

        // The next insert brings the cache back under budget.
        let (d, dn) = node("D", 10);
        let c = c.miss(&d, &dn);
        assert!(c.total_size() <= 100);
        assert!(c.has(&d));
        assert_invariants(&c);
    }

    #[test]
    fn seed_never_winds_the_clock_back() {
        let (a, an) = node("A", 10);
        let (b, bn) = node("B", 10);
        let (c_id, cn) = node("C", 10);
        let before = cache(100, None).miss(&a, &an).hit(&a).hit(&a);
        assert_eq!(before.tick(), 3);

        let c = before.seed(vec![(b, bn)]);
        assert_eq!(c.tick(), 3);

        let c = c.miss(&c_id, &cn);
        assert_eq!(c.tick(), 4);
        assert_eq!(c.ids_by_recency(), vec![b, c_id]);
    }

    #[test]
    fn seeded_ties_break_by_id() {
        let (a, an) = node("A", 1);
        let (b, bn) = node("B", 1);
        let c = NodeCache::seeded(CacheConfig::with_total_limit(2), vec![(a, an), (b, bn)]);
        let survivor = c.reap(1);
        let expected_victim = a.min(b);
        assert!(!survivor.has(&expected_victim));
        assert_eq!(survivor.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    #[derive(Clone, Debug)]
    enum Op {
        Hit(u8),
        Miss(u8, u64),
        Evict(u8),
        Reap(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..12).prop_map(Op::Hit),
            (0u8..12, 1u64..80).prop_map(|(k, s)| Op::Miss(k, s)),
            (0u8..12).prop_map(Op::Evict),
            (0u64..150).prop_map(Op::Reap),
        ]
    }

    fn key(k: u8) -> NodeId {
        NodeId::from_bytes(&[k])
    }

    proptest! {
        #[test]
        fn invariants_hold_under_any_sequence(
            ops in proptest::collection::vec(op(), 0..64),
            per_node in proptest::option::of(1u64..80),
        ) {
            let mut c = cache(100, per_node);
            for op in ops {
                let before = c.clone();
                c = match op {
                    Op::Hit(k) => {
                        let next = c.hit(&key(k));
                        prop_assert_eq!(next.tick(), before.tick() + 1);
                        next
                    }
                    Op::Miss(k, size) => {
                        let n = Node::raw(key(k), size);
                        let next = c.miss(&key(k), &n);
                        if before.cacheable(Some(&n)) {
                            prop_assert_eq!(next.lookup(&key(k)), Some(&n));
                            prop_assert!(next.tick() > before.tick());
                        } else {
                            prop_assert_eq!(next.len(), before.len());
                            prop_assert_eq!(next.tick(), before.tick());
                        }
                        next
                    }
                    Op::Evict(k) => {
                        let next = c.evict(&key(k));
                        let removed = before.stat(&key(k)).map_or(0, |s| s.size);
                        prop_assert_eq!(next.total_size(), before.total_size() - removed);
                        prop_assert_eq!(next.tick(), before.tick());
                        next
                    }
                    Op::Reap(target) => {
                        let next = c.reap(target);
                        prop_assert!(next.total_size() <= before.total_size());
                        prop_assert!(next.is_empty() || 100 - next.total_size() >= target);
                        next
                    }
                };
                assert_invariants(&c);
                prop_assert!(c.total_size() <= 100);
                if let Some(limit) = per_node {
                    for id in c.ids_by_recency() {
                        prop_assert!(c.stat(&id).map_or(0, |s| s.size) <= limit);
                    }
                }
            }
        }

        #[test]
        fn seed_matches_base(sizes in proptest::collection::vec(1u64..500, 0..20)) {
            let base: Vec<(NodeId, Node)> = sizes
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let id = NodeId::from_bytes(&(i as u32).to_le_bytes());
                    (id, Node::raw(id, *s))
                })
                .collect();
            let c = cache(100, None).seed(base.clone());
            prop_assert_eq!(c.total_size(), sizes.iter().sum::<u64>());
            prop_assert_eq!(c.len(), base.len());
            for (id, _) in &base {
                prop_assert!(c.has(id));
            }
        }
    }
}
