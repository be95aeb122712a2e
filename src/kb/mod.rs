//! KB Facade (C8): the in-memory knowledge base of hyperedges (spec §4.8).
//!
//! `Kb` wraps a [`parking_lot::RwLock`] around its inner indices, giving the
//! single-writer/multi-reader discipline spec §5 requires: readers observe a
//! consistent snapshot, writers serialize on the KB-level lock. Hyperedge
//! identity is a content hash blended with insertion sequence (spec §3
//! clarification), giving `insert` its idempotence (P7) and the rule
//! engine's binding order its determinism.

use hypergraph_ast::Hyperedge;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::pattern::{match_pattern, Pattern};

/// A stable identifier for a hyperedge within one [`Kb`]. Ordered by
/// insertion sequence, giving the rule engine a total order on hyperedge
/// IDs to process bindings deterministically (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId {
    content_hash: u64,
    sequence: u64,
}

impl EdgeId {
    /// A content hash stable for the lifetime of this process; two
    /// independent `Kb` instances must not be assumed to share IDs (spec
    /// §9 "multiple independent KBs must not share hyperedge identities").
    #[must_use]
    pub fn content_hash(self) -> u64 {
        self.content_hash
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.sequence)
    }
}

type SubscriptionCallback = Box<dyn Fn(&Hyperedge) + Send + Sync>;

struct KbInner {
    by_id: IndexMap<EdgeId, Hyperedge>,
    dedup: HashMap<u64, EdgeId>,
    /// outer edge id -> set of ids directly contained one level down.
    containment: HashMap<EdgeId, HashSet<EdgeId>>,
    /// reverse of `containment`: child id -> set of outer ids directly
    /// containing it, giving `degree` an O(degree) lookup instead of a
    /// full KB scan.
    contained_in: HashMap<EdgeId, HashSet<EdgeId>>,
    next_sequence: u64,
    subscriptions: Vec<(Pattern, SubscriptionCallback)>,
}

impl KbInner {
    fn new() -> Self {
        KbInner {
            by_id: IndexMap::new(),
            dedup: HashMap::new(),
            containment: HashMap::new(),
            contained_in: HashMap::new(),
            next_sequence: 0,
            subscriptions: Vec::new(),
        }
    }
}

/// The in-memory knowledge base: insert/query/iterate hyperedges, with
/// `O(1)` degree/deep-degree metrics and pattern-triggered subscriptions
/// (spec §4.8). Persistence is out of scope — see [`KbSink`].
pub struct Kb {
    inner: Arc<RwLock<KbInner>>,
}

impl Default for Kb {
    fn default() -> Self {
        Self::new()
    }
}

impl Kb {
    #[must_use]
    pub fn new() -> Self {
        Kb {
            inner: Arc::new(RwLock::new(KbInner::new())),
        }
    }

    /// Insert a hyperedge, idempotent up to structural equality (P7): a
    /// structurally equal insert returns the same ID and leaves the KB
    /// state unchanged.
    pub fn insert(&self, hyperedge: Hyperedge) -> EdgeId {
        let hash = hyperedge.structural_hash();
        let mut inner = self.inner.write();
        if let Some(&existing) = inner.dedup.get(&hash) {
            return existing;
        }
        let id = EdgeId {
            content_hash: hash,
            sequence: inner.next_sequence,
        };
        inner.next_sequence += 1;
        inner.dedup.insert(hash, id);
        index_containment(&mut inner, id, &hyperedge);
        inner.by_id.insert(id, hyperedge.clone());
        notify_subscribers(&inner, &hyperedge);
        id
    }

    #[must_use]
    pub fn get(&self, id: EdgeId) -> Option<Hyperedge> {
        self.inner.read().by_id.get(&id).cloned()
    }

    #[must_use]
    pub fn id_of(&self, hyperedge: &Hyperedge) -> Option<EdgeId> {
        self.inner.read().dedup.get(&hyperedge.structural_hash()).copied()
    }

    /// Replace `old` with `new` in place: the ID is preserved and every
    /// container that referenced `old` is rewired to reference `new`'s
    /// content at the same slot.
    pub fn replace(&self, old: EdgeId, new: Hyperedge) {
        let mut inner = self.inner.write();
        let Some(slot) = inner.by_id.get_mut(&old) else {
            return;
        };
        let old_hash = slot.structural_hash();
        let new_hash = new.structural_hash();
        *slot = new.clone();
        inner.dedup.remove(&old_hash);
        inner.dedup.insert(new_hash, old);
        deindex_containment(&mut inner, old);
        index_containment(&mut inner, old, &new);
        notify_subscribers(&inner, &new);
    }

    /// Remove a hyperedge from the KB entirely.
    pub fn retract(&self, id: EdgeId) {
        let mut inner = self.inner.write();
        if let Some(edge) = inner.by_id.shift_remove(&id) {
            inner.dedup.remove(&edge.structural_hash());
            deindex_containment(&mut inner, id);
            inner.contained_in.remove(&id);
        }
    }

    /// Iterate every hyperedge in insertion order, optionally filtered.
    pub fn iter(&self, filter: Option<&dyn Fn(&Hyperedge) -> bool>) -> Vec<(EdgeId, Hyperedge)> {
        self.inner
            .read()
            .by_id
            .iter()
            .filter(|(_, h)| filter.is_none_or(|f| f(h)))
            .map(|(id, h)| (*id, h.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `Σ over outer edges containing h of (|outer_edge| − 1)` (spec §4.2),
    /// counting only *immediate* containment.
    #[must_use]
    pub fn degree(&self, id: EdgeId) -> usize {
        let inner = self.inner.read();
        let Some(outers) = inner.contained_in.get(&id) else {
            return 0;
        };
        outers
            .iter()
            .filter_map(|outer_id| inner.by_id.get(outer_id))
            .map(|outer| outer.arguments().len())
            .sum()
    }

    /// Degree counting containment at *every* nesting depth, not only
    /// immediate containment (spec §4.2). Always `>= degree` (P6).
    #[must_use]
    pub fn deep_degree(&self, id: EdgeId) -> usize {
        let target = match self.get(id) {
            Some(t) => t,
            None => return 0,
        };
        let inner = self.inner.read();
        inner
            .by_id
            .values()
            .filter(|outer| !std::ptr::eq(*outer, &target) && outer.contains(&target))
            .map(|outer| count_occurrences(outer, &target))
            .sum()
    }

    /// Register a callback fired synchronously on every future insert or
    /// replace whose resulting hyperedge matches `pattern`. Not part of the
    /// rule engine's inference loop — an ambient observer list for
    /// downstream applications (spec §4.8).
    pub fn subscribe(
        &self,
        pattern: Pattern,
        callback: impl Fn(&Hyperedge) + Send + Sync + 'static,
    ) {
        self.inner
            .write()
            .subscriptions
            .push((pattern, Box::new(callback)));
    }
}

fn count_occurrences(haystack: &Hyperedge, needle: &Hyperedge) -> usize {
    match haystack {
        Hyperedge::Atom(_) => 0,
        Hyperedge::Edge { elements, .. } => {
            let mut total = elements.iter().filter(|e| *e == needle).count();
            for e in elements {
                total += count_occurrences(e, needle);
            }
            total
        }
    }
}

fn index_containment(inner: &mut KbInner, id: EdgeId, hyperedge: &Hyperedge) {
    if let Hyperedge::Edge { elements, .. } = hyperedge {
        let mut children = HashSet::new();
        for element in elements {
            if let Some(&child_id) = inner.dedup.get(&element.structural_hash()) {
                children.insert(child_id);
                inner.contained_in.entry(child_id).or_default().insert(id);
            }
        }
        inner.containment.insert(id, children);
    }

    // Back-fill the reverse direction: an edge already in the KB may contain
    // `hyperedge` as a direct child that had no id of its own until now.
    // Degree must not depend on whether the container or the contained piece
    // was inserted first (spec §4.2, P6), so every existing edge is checked
    // here rather than relying solely on the forward scan above.
    let new_hash = hyperedge.structural_hash();
    let outer_ids: Vec<EdgeId> = inner
        .by_id
        .iter()
        .filter_map(|(&outer_id, outer_edge)| match outer_edge {
            Hyperedge::Edge { elements, .. }
                if elements.iter().any(|e| e.structural_hash() == new_hash) =>
            {
                Some(outer_id)
            }
            _ => None,
        })
        .collect();
    for outer_id in outer_ids {
        inner.containment.entry(outer_id).or_default().insert(id);
        inner.contained_in.entry(id).or_default().insert(outer_id);
    }
}

fn deindex_containment(inner: &mut KbInner, id: EdgeId) {
    if let Some(children) = inner.containment.remove(&id) {
        for child in children {
            if let Some(parents) = inner.contained_in.get_mut(&child) {
                parents.remove(&id);
            }
        }
    }
}

fn notify_subscribers(inner: &KbInner, hyperedge: &Hyperedge) {
    for (pattern, callback) in &inner.subscriptions {
        if !match_pattern(pattern, hyperedge).is_empty() {
            callback(hyperedge);
        }
    }
}

/// A serializable point-in-time copy of a KB's contents, as canonical SH
/// strings — the default, swappable persistence payload (spec §4.8
/// "Persistence is out of scope").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbSnapshot {
    pub edges: Vec<String>,
}

/// The persistence collaborator the core leaves pluggable (spec §4.8):
/// implementers back it with any store (a file, a graph database, …).
pub trait KbSink {
    fn snapshot(&self, kb: &Kb) -> KbSnapshot {
        KbSnapshot {
            edges: kb
                .iter(None)
                .into_iter()
                .map(|(_, h)| crate::notation::print(&h))
                .collect(),
        }
    }

    /// Restore a KB from a snapshot, inserting every edge in order. Edges
    /// that fail to parse are skipped (callers needing strict restore
    /// should pre-validate before calling this).
    fn restore(&self, kb: &Kb, snapshot: &KbSnapshot) {
        for text in &snapshot.edges {
            if let Ok(h) = crate::notation::parse(text) {
                kb.insert(h);
            }
        }
    }
}

/// The default in-process `KbSink`: round-trips through [`KbSnapshot`]
/// without touching any external store.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemorySink;

impl KbSink for InMemorySink {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation;

    #[test]
    fn insert_is_idempotent() {
        let kb = Kb::new();
        let id1 = kb.insert(notation::parse("alice/C").unwrap());
        let id2 = kb.insert(notation::parse("alice/C").unwrap());
        assert_eq!(id1, id2);
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn degree_counts_immediate_containment() {
        let kb = Kb::new();
        let inner_id = kb.insert(notation::parse("alice/C").unwrap());
        kb.insert(notation::parse("(likes/P alice/C bananas/C)").unwrap());
        assert_eq!(kb.degree(inner_id), 2);
    }

    #[test]
    fn degree_is_independent_of_insertion_order() {
        let kb = Kb::new();
        let outer_id = kb.insert(notation::parse("(likes/P alice/C bananas/C)").unwrap());
        let inner_id = kb.insert(notation::parse("alice/C").unwrap());
        assert_eq!(kb.degree(inner_id), 2);
        assert_eq!(kb.degree(outer_id), 0);
    }

    #[test]
    fn deep_degree_is_at_least_degree() {
        let kb = Kb::new();
        let inner_id = kb.insert(notation::parse("alice/C").unwrap());
        kb.insert(notation::parse("(likes/P alice/C bananas/C)").unwrap());
        kb.insert(
            notation::parse("(claim/P carol/C (likes/P alice/C bananas/C))").unwrap(),
        );
        assert!(kb.deep_degree(inner_id) >= kb.degree(inner_id));
    }

    #[test]
    fn snapshot_round_trips_through_sink() {
        let kb = Kb::new();
        kb.insert(notation::parse("(likes/P alice/C bananas/C)").unwrap());
        let sink = InMemorySink;
        let snapshot = sink.snapshot(&kb);
        let restored = Kb::new();
        sink.restore(&restored, &snapshot);
        assert_eq!(restored.len(), kb.len());
    }

    #[test]
    fn subscribe_fires_on_matching_insert() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let kb = Kb::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        kb.subscribe(Pattern::parse("(likes/P ...)").unwrap(), move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        kb.insert(notation::parse("(likes/P alice/C bananas/C)").unwrap());
        kb.insert(notation::parse("alice/C").unwrap());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
