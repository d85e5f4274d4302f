//! The intrusive circular doubly-linked ring behind the heap's root list and
//! every node's child list.
//!
//! The ring is threaded through the `left`/`right` fields of the nodes
//! themselves, so membership moves nodes between rings without reallocating
//! and every operation here is O(1) (except the `items` snapshot). The list
//! keeps one `start` anchor into the ring; an empty ring has no anchor.

use std::rc::Rc;

use super::item::NodeRef;

pub(crate) struct CircularList<K: Ord + Clone, V> {
    start: Option<NodeRef<K, V>>,
    len: usize,
}

impl<K: Ord + Clone, V> CircularList<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            start: None,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.start.is_none()
    }

    /// Inserts `node` immediately before the anchor. The anchor itself never
    /// moves on insertion, so repeated inserts append in arrival order when
    /// the ring is walked from the anchor.
    ///
    /// `node` must not currently be a member of any ring; its old links are
    /// overwritten.
    pub(crate) fn insert(&mut self, node: NodeRef<K, V>) {
        match &self.start {
            None => {
                let mut node_mut = node.borrow_mut();
                node_mut.left = Some(node.clone());
                node_mut.right = Some(node.clone());
                drop(node_mut);
                self.start = Some(node);
            }
            Some(start) => {
                let right_neighbour = start.clone();
                let left_neighbour = start.borrow().left.as_ref().unwrap().clone();
                {
                    let mut node_mut = node.borrow_mut();
                    node_mut.left = Some(left_neighbour.clone());
                    node_mut.right = Some(right_neighbour.clone());
                }
                left_neighbour.borrow_mut().right = Some(node.clone());
                right_neighbour.borrow_mut().left = Some(node);
            }
        }
        self.len += 1;
    }

    /// Unlinks `node` from this ring. If it was the anchor, the anchor
    /// advances to its right neighbour (or away entirely for a singleton).
    /// The node leaves with both links cleared.
    ///
    /// The caller must hold a handle to a node that is actually a member of
    /// this list; deleting a non-member is undefined.
    pub(crate) fn delete(&mut self, node: &NodeRef<K, V>) {
        let singleton = {
            let node_ref = node.borrow();
            let right = node_ref.right.as_ref().expect("node is not in a ring");
            Rc::ptr_eq(right, node)
        };

        if singleton {
            self.start = None;
        } else {
            let left = node.borrow().left.as_ref().unwrap().clone();
            let right = node.borrow().right.as_ref().unwrap().clone();
            left.borrow_mut().right = Some(right.clone());
            right.borrow_mut().left = Some(left);
            let was_anchor = self
                .start
                .as_ref()
                .map_or(false, |start| Rc::ptr_eq(start, node));
            if was_anchor {
                self.start = Some(right);
            }
        }

        {
            let mut node_mut = node.borrow_mut();
            node_mut.left = None;
            node_mut.right = None;
        }
        self.len -= 1;
    }

    /// Splices `other` into this ring in O(1), draining it. Either side may
    /// be empty; the two rings are cut open before their anchors and sewn
    /// end to end.
    pub(crate) fn merge(&mut self, mut other: CircularList<K, V>) {
        let other_start = match other.start.take() {
            Some(start) => start,
            None => return,
        };
        let other_len = other.len;
        other.len = 0;

        match &self.start {
            None => {
                self.start = Some(other_start);
            }
            Some(start) => {
                let first = start.clone();
                let last = first.borrow().left.as_ref().unwrap().clone();
                let other_last = other_start.borrow().left.as_ref().unwrap().clone();
                last.borrow_mut().right = Some(other_start.clone());
                other_start.borrow_mut().left = Some(last);
                other_last.borrow_mut().right = Some(first.clone());
                first.borrow_mut().left = Some(other_last);
            }
        }
        self.len += other_len;
    }

    /// Snapshots the ring into a `Vec`, walking `right` from the anchor until
    /// it comes back around. Callers that rewrite the ring while processing
    /// its members (consolidation does) iterate the snapshot, not the ring.
    pub(crate) fn items(&self) -> Vec<NodeRef<K, V>> {
        let mut result = Vec::with_capacity(self.len);
        if let Some(start) = &self.start {
            let mut current = start.clone();
            loop {
                let next = current.borrow().right.as_ref().unwrap().clone();
                result.push(current);
                if Rc::ptr_eq(&next, start) {
                    break;
                }
                current = next;
            }
        }
        result
    }
}

impl<K: Ord + Clone, V> Default for CircularList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
