//! The Fibonacci heap.
//!
//! A mergeable min-priority queue following the CLRS presentation: a ring of
//! heap-ordered trees, a pointer to the minimum root, lazy linking deferred
//! to `extract_min`'s consolidation pass, and the mark/cut discipline that
//! keeps `decrease_key` at amortized O(1). Node pointers are wrapped in safe
//! `Rc<RefCell<_>>` handles; clients address individual items through the
//! [`ItemHandle`]s returned by `insert`.

use std::rc::Rc;

use indexmap::IndexMap;

use super::item::{HeapKey, HeapNode, Item, ItemHandle, NodeRef};
use super::CircularList;

/// Fibonacci heap over totally ordered keys with opaque payloads.
///
/// # Example
/// ```
/// use ordkit::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// heap.insert(5, "five");
/// heap.insert(2, "two");
/// assert_eq!(heap.minimum(), Some((2, "two")));
/// assert_eq!(heap.extract_min().map(|item| item.key), Some(2));
/// ```
pub struct FibonacciHeap<K: Ord + Clone, V> {
    roots: CircularList<K, V>,
    min: Option<NodeRef<K, V>>,
    n: usize,
}

impl<K: Ord + Clone, V> FibonacciHeap<K, V> {
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self {
            roots: CircularList::new(),
            min: None,
            n: 0,
        }
    }

    /// Returns `true` if the heap has no items.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Returns the number of items currently in the heap.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Inserts a key and payload as a fresh root and returns a handle for
    /// later `decrease_key`/`delete` calls.
    ///
    /// # Complexity
    /// - Time: O(1)
    pub fn insert(&mut self, key: K, payload: V) -> ItemHandle<K, V> {
        let node = HeapNode::new(HeapKey::Value(key), payload);
        self.roots.insert(node.clone());
        self.n += 1;
        self.maybe_adopt_min(node.clone());
        HeapNode::handle(&node)
    }

    /// Returns a handle to the item with the minimum key, without removing
    /// it. O(1).
    pub fn first(&self) -> Option<ItemHandle<K, V>> {
        self.min.as_ref().map(HeapNode::handle)
    }

    /// Returns the minimum key and a copy of its payload, without removing
    /// the item. O(1).
    pub fn minimum(&self) -> Option<(K, V)>
    where
        V: Clone,
    {
        self.min.as_ref().map(|node| {
            let node_ref = node.borrow();
            let key = match &node_ref.key {
                HeapKey::Value(key) => key.clone(),
                HeapKey::NegInf => unreachable!("sentinel key visible outside delete"),
            };
            let payload = node_ref
                .payload
                .as_ref()
                .expect("live node holds a payload")
                .clone();
            (key, payload)
        })
    }

    /// Melds `other` into this heap in O(1), draining it. Either side may be
    /// empty.
    pub fn merge(&mut self, mut other: Self) {
        let other_roots = std::mem::take(&mut other.roots);
        let other_min = other.min.take();
        let other_n = other.n;
        other.n = 0;

        self.roots.merge(other_roots);
        self.n += other_n;
        self.min = match (self.min.take(), other_min) {
            (Some(mine), Some(theirs)) => {
                if theirs.borrow().key < mine.borrow().key {
                    Some(theirs)
                } else {
                    Some(mine)
                }
            }
            (Some(mine), None) => Some(mine),
            (None, theirs) => theirs,
        };
    }

    /// Removes and returns the item with the minimum key, or `None` if the
    /// heap is empty.
    ///
    /// # Complexity
    /// - Time: O(log n) amortized
    pub fn extract_min(&mut self) -> Option<Item<K, V>> {
        let node = self.extract_min_node()?;
        let mut node_mut = node.borrow_mut();
        let key = match node_mut.key.clone() {
            HeapKey::Value(key) => key,
            HeapKey::NegInf => unreachable!("sentinel key visible outside delete"),
        };
        let payload = node_mut
            .payload
            .take()
            .expect("extracted node still holds its payload");
        Some(Item::new(key, payload))
    }

    /// Lowers the key of the item behind `handle` to `new_key`.
    ///
    /// # Panics
    /// Panics if `new_key` is greater than the current key, or if the handle
    /// no longer refers to an item in the heap.
    ///
    /// # Complexity
    /// - Time: O(1) amortized
    pub fn decrease_key(&mut self, handle: &ItemHandle<K, V>, new_key: K) {
        self.decrease_key_to(handle, HeapKey::Value(new_key));
    }

    /// Removes the item behind `handle` from the heap and returns it under
    /// its original key.
    ///
    /// Internally the key is lowered to the sentinel below every real key,
    /// after which one `extract_min` surfaces exactly this node.
    ///
    /// # Panics
    /// Panics if the handle no longer refers to an item in the heap.
    ///
    /// # Complexity
    /// - Time: O(log n) amortized
    pub fn delete(&mut self, handle: &ItemHandle<K, V>) -> Item<K, V> {
        let node = handle
            .upgrade()
            .expect("cannot delete through a dangling handle");
        let key = match &node.borrow().key {
            HeapKey::Value(key) => key.clone(),
            HeapKey::NegInf => unreachable!("sentinel key visible outside delete"),
        };

        self.decrease_key_to(handle, HeapKey::NegInf);
        let extracted = self
            .extract_min_node()
            .expect("heap cannot be empty while deleting a member");
        debug_assert!(Rc::ptr_eq(&extracted, &node));

        let payload = extracted
            .borrow_mut()
            .payload
            .take()
            .expect("extracted node still holds its payload");
        Item::new(key, payload)
    }

    fn decrease_key_to(&mut self, handle: &ItemHandle<K, V>, new_key: HeapKey<K>) {
        let node = handle
            .upgrade()
            .expect("cannot decrease the key behind a dangling handle");
        {
            let mut node_mut = node.borrow_mut();
            if new_key > node_mut.key {
                panic!("new key is greater than the current key");
            }
            node_mut.key = new_key;
        }

        let parent = node
            .borrow()
            .parent
            .as_ref()
            .and_then(|weak| weak.upgrade());
        if let Some(parent) = parent {
            if node.borrow().key < parent.borrow().key {
                self.cut(&node, &parent);
                self.cascading_cut(parent);
            }
        }

        self.maybe_adopt_min(node);
    }

    /// Detaches the minimum node from the heap: its children become roots
    /// (keeping their marks; the next link or root rebuild clears them), the
    /// node leaves the root ring, and the survivors are consolidated.
    fn extract_min_node(&mut self) -> Option<NodeRef<K, V>> {
        let min_node = self.min.take()?;

        let children = {
            let mut min_mut = min_node.borrow_mut();
            min_mut.degree = 0;
            std::mem::take(&mut min_mut.children)
        };
        for child in children.items() {
            child.borrow_mut().parent = None;
        }
        self.roots.merge(children);
        self.roots.delete(&min_node);
        self.n -= 1;

        if !self.roots.is_empty() {
            self.consolidate();
        }
        Some(min_node)
    }

    /// Pairwise-links equal-degree roots until all root degrees are
    /// distinct, then rebuilds the root ring from the surviving trees and
    /// repoints `min`.
    ///
    /// The scratch map is keyed by degree; insertion order keeps the rebuild
    /// deterministic. The root ring is rewritten while the roots are being
    /// processed, so the loop walks a snapshot.
    fn consolidate(&mut self) {
        let mut by_degree: IndexMap<usize, NodeRef<K, V>> = IndexMap::new();

        for root in self.roots.items() {
            let mut node = root;
            let mut degree = node.borrow().degree;
            while let Some(other) = by_degree.shift_remove(&degree) {
                // The smaller key becomes the parent; on a tie the root
                // currently being processed stays up.
                let (parent, child) = if other.borrow().key < node.borrow().key {
                    (other, node)
                } else {
                    (node, other)
                };
                Self::link(&parent, child);
                node = parent;
                degree = node.borrow().degree;
            }
            by_degree.insert(degree, node);
        }

        self.roots = CircularList::new();
        self.min = None;
        for (_, node) in by_degree {
            {
                let mut node_mut = node.borrow_mut();
                node_mut.parent = None;
                node_mut.marked = false;
            }
            self.roots.insert(node.clone());
            self.maybe_adopt_min(node);
        }
    }

    /// Makes `child` a child of `parent`: out of its current ring, into the
    /// parent's child ring, unmarked, degree bumped.
    fn link(parent: &NodeRef<K, V>, child: NodeRef<K, V>) {
        {
            let left = child.borrow().left.as_ref().unwrap().clone();
            let right = child.borrow().right.as_ref().unwrap().clone();
            left.borrow_mut().right = Some(right.clone());
            right.borrow_mut().left = Some(left);
        }
        {
            let mut child_mut = child.borrow_mut();
            child_mut.parent = Some(Rc::downgrade(parent));
            child_mut.marked = false;
        }
        let mut parent_mut = parent.borrow_mut();
        parent_mut.children.insert(child);
        parent_mut.degree += 1;
    }

    /// Detaches `node` from `parent` and promotes it to the root ring,
    /// unmarked.
    fn cut(&mut self, node: &NodeRef<K, V>, parent: &NodeRef<K, V>) {
        {
            let mut parent_mut = parent.borrow_mut();
            parent_mut.children.delete(node);
            parent_mut.degree -= 1;
        }
        {
            let mut node_mut = node.borrow_mut();
            node_mut.parent = None;
            node_mut.marked = false;
        }
        self.roots.insert(node.clone());
    }

    /// Walks up from a node that just lost a child: an unmarked non-root
    /// gets marked, a marked one is cut and the walk continues from its
    /// parent.
    fn cascading_cut(&mut self, node: NodeRef<K, V>) {
        let mut current = node;
        loop {
            let parent = current
                .borrow()
                .parent
                .as_ref()
                .and_then(|weak| weak.upgrade());
            let parent = match parent {
                Some(parent) => parent,
                None => break,
            };
            if !current.borrow().marked {
                current.borrow_mut().marked = true;
                break;
            }
            self.cut(&current, &parent);
            current = parent;
        }
    }

    /// Points `min` at `node` if its key is smaller than the current
    /// minimum's (or if there is no current minimum).
    fn maybe_adopt_min(&mut self, node: NodeRef<K, V>) {
        let adopt = match &self.min {
            Some(min) => node.borrow().key < min.borrow().key,
            None => true,
        };
        if adopt {
            self.min = Some(node);
        }
    }
}

impl<K: Ord + Clone, V> Default for FibonacciHeap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone + std::fmt::Debug, V> std::fmt::Debug for FibonacciHeap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The rings are cyclic, so a derived Debug would never terminate.
        f.debug_struct("FibonacciHeap")
            .field("len", &self.n)
            .field("min", &self.min.as_ref().map(|node| node.borrow().key.clone()))
            .finish()
    }
}

impl<K: Ord + Clone, V> Drop for FibonacciHeap<K, V> {
    fn drop(&mut self) {
        // The intrusive rings are strong-Rc cycles; sever every node's links
        // so the whole forest is actually freed.
        let mut pending = self.roots.items();
        self.roots = CircularList::new();
        self.min = None;
        while let Some(node) = pending.pop() {
            let children = {
                let mut node_mut = node.borrow_mut();
                node_mut.left = None;
                node_mut.right = None;
                node_mut.parent = None;
                std::mem::take(&mut node_mut.children)
            };
            pending.extend(children.items());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<K: Ord + Clone, V>(heap: &mut FibonacciHeap<K, V>) -> Vec<K> {
        let mut keys = Vec::new();
        while let Some(item) = heap.extract_min() {
            keys.push(item.key);
        }
        keys
    }

    /// Walks the whole forest checking every structural invariant: ring
    /// symmetry, heap order between parents and children, degree counts,
    /// unmarked roots, and min/n bookkeeping. Returns nothing; panics on the
    /// first violation.
    fn audit<K: Ord + Clone, V>(heap: &FibonacciHeap<K, V>) {
        fn check_ring<K: Ord + Clone, V>(members: &[NodeRef<K, V>]) {
            for member in members {
                let left = member.borrow().left.as_ref().unwrap().clone();
                let right = member.borrow().right.as_ref().unwrap().clone();
                assert!(Rc::ptr_eq(left.borrow().right.as_ref().unwrap(), member));
                assert!(Rc::ptr_eq(right.borrow().left.as_ref().unwrap(), member));
            }
        }

        fn check_subtree<K: Ord + Clone, V>(node: &NodeRef<K, V>, degree_bound: usize) -> usize {
            let children = node.borrow().children.items();
            assert_eq!(children.len(), node.borrow().degree);
            assert!(node.borrow().degree <= degree_bound);
            check_ring(&children);
            let mut count = 1;
            for child in &children {
                assert!(child.borrow().key >= node.borrow().key);
                let parent = child.borrow().parent.as_ref().unwrap().upgrade().unwrap();
                assert!(Rc::ptr_eq(&parent, node));
                count += check_subtree(child, degree_bound);
            }
            count
        }

        let roots = heap.roots.items();
        check_ring(&roots);
        match &heap.min {
            Some(min) => {
                assert!(roots.iter().any(|root| Rc::ptr_eq(root, min)));
                for root in &roots {
                    assert!(min.borrow().key <= root.borrow().key);
                }
            }
            None => assert!(roots.is_empty()),
        }

        // Degree bound: no node's degree exceeds log_phi(n).
        let phi = (1.0 + 5f64.sqrt()) / 2.0;
        let degree_bound = ((heap.n.max(1) as f64).ln() / phi.ln()).floor() as usize;

        let mut total = 0;
        for root in &roots {
            assert!(root.borrow().parent.is_none());
            assert!(!root.borrow().marked);
            total += check_subtree(root, degree_bound);
        }
        assert_eq!(total, heap.n);
    }

    #[test]
    fn draining_yields_sorted_keys() {
        let mut heap = FibonacciHeap::new();
        for key in [5, 2, 8, 1, 9, 3, 7, 4, 6, 0] {
            heap.insert(key, key * 10);
        }
        assert_eq!(heap.len(), 10);

        assert_eq!(drain(&mut heap), vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert!(heap.is_empty());
        assert!(heap.extract_min().is_none());
    }

    #[test]
    fn minimum_and_first_do_not_remove() {
        let mut heap = FibonacciHeap::new();
        heap.insert(7, "seven");
        heap.insert(3, "three");
        heap.insert(5, "five");

        assert_eq!(heap.minimum(), Some((3, "three")));
        assert_eq!(heap.first().unwrap().key(), Some(3));
        assert_eq!(heap.len(), 3);
    }

    #[test]
    fn decrease_key_triggers_cascading_cut() {
        let mut heap = FibonacciHeap::new();
        let handles: Vec<_> = (1..=7).map(|key| heap.insert(key, ())).collect();
        heap.extract_min();
        audit(&heap);

        let handle_to_seven = &handles[6];
        assert_eq!(handle_to_seven.key(), Some(7));
        heap.decrease_key(handle_to_seven, 0);

        assert_eq!(heap.first().unwrap().key(), Some(0));
        audit(&heap);
        assert_eq!(drain(&mut heap), vec![0, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn deep_cascade_keeps_invariants() {
        let mut heap = FibonacciHeap::new();
        let handles: Vec<_> = (0..32).map(|key| heap.insert(key, ())).collect();
        heap.extract_min();
        audit(&heap);

        // Cut leaves out of the consolidated trees until cascades reach the
        // upper levels.
        for handle in handles.iter().rev() {
            if let Some(key) = handle.key() {
                if key % 3 == 0 && key > 0 {
                    heap.decrease_key(handle, -key);
                    audit(&heap);
                }
            }
        }

        let drained = drain(&mut heap);
        let mut expected: Vec<i32> = (1..32)
            .map(|key| if key % 3 == 0 { -key } else { key })
            .collect();
        expected.sort();
        assert_eq!(drained, expected);
    }

    #[test]
    fn merge_interleaves_both_heaps() {
        let mut heap_a = FibonacciHeap::new();
        for key in [10, 20, 30] {
            heap_a.insert(key, ());
        }
        let mut heap_b = FibonacciHeap::new();
        for key in [5, 25, 35] {
            heap_b.insert(key, ());
        }

        heap_a.merge(heap_b);
        assert_eq!(heap_a.len(), 6);
        audit(&heap_a);
        assert_eq!(drain(&mut heap_a), vec![5, 10, 20, 25, 30, 35]);
    }

    #[test]
    fn merge_with_empty_sides() {
        let mut empty = FibonacciHeap::new();
        let mut full = FibonacciHeap::new();
        full.insert(1, ());
        full.insert(2, ());

        empty.merge(full);
        assert_eq!(empty.len(), 2);

        empty.merge(FibonacciHeap::new());
        assert_eq!(empty.len(), 2);
        assert_eq!(drain(&mut empty), vec![1, 2]);

        let mut both_empty = FibonacciHeap::<i32, ()>::new();
        both_empty.merge(FibonacciHeap::new());
        assert!(both_empty.is_empty());
    }

    #[test]
    fn delete_an_arbitrary_member() {
        let mut heap = FibonacciHeap::new();
        let handles: Vec<_> = [2, 4, 6, 8].iter().map(|&key| heap.insert(key, key)).collect();

        let removed = heap.delete(&handles[2]);
        assert_eq!(removed.key, 6);
        assert_eq!(removed.payload, 6);
        assert_eq!(heap.len(), 3);
        audit(&heap);
        assert_eq!(drain(&mut heap), vec![2, 4, 8]);
    }

    #[test]
    fn delete_after_consolidation() {
        let mut heap = FibonacciHeap::new();
        let handles: Vec<_> = (1..=10).map(|key| heap.insert(key, ())).collect();
        heap.extract_min();

        let removed = heap.delete(&handles[5]);
        assert_eq!(removed.key, 6);
        audit(&heap);
        assert_eq!(drain(&mut heap), vec![2, 3, 4, 5, 7, 8, 9, 10]);
    }

    #[test]
    fn extracted_handles_dangle() {
        let mut heap = FibonacciHeap::new();
        let handle = heap.insert(1, ());
        heap.insert(2, ());

        assert_eq!(handle.key(), Some(1));
        heap.extract_min();
        assert_eq!(handle.key(), None);
    }

    #[test]
    fn root_degrees_are_distinct_after_extract() {
        let mut heap = FibonacciHeap::new();
        for key in 0..40 {
            heap.insert(key, ());
        }
        heap.extract_min();

        let mut seen = std::collections::HashSet::new();
        for root in heap.roots.items() {
            assert!(seen.insert(root.borrow().degree));
        }
        audit(&heap);
    }

    #[test]
    #[should_panic(expected = "greater than the current key")]
    fn decrease_key_rejects_an_increase() {
        let mut heap = FibonacciHeap::new();
        let handle = heap.insert(3, ());
        heap.decrease_key(&handle, 4);
    }

    #[test]
    #[should_panic(expected = "dangling handle")]
    fn delete_rejects_a_dangling_handle() {
        let mut heap = FibonacciHeap::new();
        let handle = heap.insert(1, ());
        heap.extract_min();
        heap.delete(&handle);
    }

    #[test]
    fn randomized_against_a_sorted_oracle() {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        let mut heap = FibonacciHeap::new();
        let mut handles = Vec::new();
        let mut oracle = Vec::new();

        for _ in 0..400 {
            let key: i32 = rng.gen_range(0..10_000);
            handles.push(heap.insert(key, ()));
            oracle.push(key);
        }

        // Interleave some decreases and deletions.
        for _ in 0..120 {
            let pick = rng.gen_range(0..handles.len());
            let handle = &handles[pick];
            let current = match handle.key() {
                Some(key) => key,
                None => continue,
            };
            if rng.gen_bool(0.3) {
                let removed = heap.delete(handle);
                let position = oracle.iter().position(|&key| key == current).unwrap();
                oracle.swap_remove(position);
                assert_eq!(removed.key, current);
            } else {
                let lower = current - rng.gen_range(0..500);
                heap.decrease_key(handle, lower);
                let position = oracle.iter().position(|&key| key == current).unwrap();
                oracle[position] = lower;
            }
        }

        audit(&heap);
        oracle.sort();
        assert_eq!(drain(&mut heap), oracle);
    }

    #[test]
    fn reinserting_extracted_items() {
        let mut heap = FibonacciHeap::new();
        for key in [4, 1, 3] {
            heap.insert(key, key.to_string());
        }

        let item = heap.extract_min().unwrap();
        assert_eq!(item.key, 1);
        heap.insert(item.key + 10, item.payload);

        assert_eq!(drain(&mut heap), vec![3, 4, 11]);
    }
}
