//! Heap items, their keys, and the handles clients keep to them.

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use super::CircularList;

pub(crate) type NodeRef<K, V> = Rc<RefCell<HeapNode<K, V>>>;

/// A key as the heap stores it. `NegInf` orders strictly below every real
/// key; `delete` plants it so that the doomed node surfaces as the minimum.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum HeapKey<K: Ord> {
    NegInf,
    Value(K),
}

/// A key paired with its payload, as handed back by `extract_min` and
/// `delete`. Once returned, the pair is entirely the caller's again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item<K, V> {
    pub key: K,
    pub payload: V,
}

impl<K, V> Item<K, V> {
    pub fn new(key: K, payload: V) -> Self {
        Self { key, payload }
    }
}

/// A node owned by the heap for as long as its item is a member. `left` and
/// `right` thread the node into whichever ring it currently lives in; they
/// are `None` exactly when the node is in no ring at all.
pub(crate) struct HeapNode<K: Ord + Clone, V> {
    pub(crate) key: HeapKey<K>,
    pub(crate) payload: Option<V>,
    pub(crate) degree: usize,
    pub(crate) marked: bool,
    pub(crate) parent: Option<Weak<RefCell<HeapNode<K, V>>>>,
    pub(crate) children: CircularList<K, V>,
    pub(crate) left: Option<NodeRef<K, V>>,
    pub(crate) right: Option<NodeRef<K, V>>,
}

impl<K: Ord + Clone, V> HeapNode<K, V> {
    pub(crate) fn new(key: HeapKey<K>, payload: V) -> NodeRef<K, V> {
        Rc::new(RefCell::new(Self {
            key,
            payload: Some(payload),
            degree: 0,
            marked: false,
            parent: None,
            children: CircularList::new(),
            left: None,
            right: None,
        }))
    }

    pub(crate) fn handle(node: &NodeRef<K, V>) -> ItemHandle<K, V> {
        ItemHandle {
            node: Rc::downgrade(node),
        }
    }
}

/// A lightweight reference to an inserted item, returned by
/// [`FibonacciHeap::insert`](super::FibonacciHeap::insert) and accepted by
/// `decrease_key` and `delete`. Handles stay valid across the heap's
/// internal restructuring; a handle to an already-extracted item dangles.
#[derive(Clone)]
pub struct ItemHandle<K: Ord + Clone, V> {
    node: Weak<RefCell<HeapNode<K, V>>>,
}

impl<K: Ord + Clone, V> ItemHandle<K, V> {
    pub(crate) fn upgrade(&self) -> Option<NodeRef<K, V>> {
        self.node.upgrade()
    }

    /// The item's current key, or `None` once the item has left its heap.
    pub fn key(&self) -> Option<K> {
        self.upgrade().and_then(|node| match &node.borrow().key {
            HeapKey::Value(key) => Some(key.clone()),
            HeapKey::NegInf => None,
        })
    }
}

impl<K: Ord + Clone + Debug, V> Debug for ItemHandle<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.upgrade() {
            Some(node) => {
                let node_ref = node.borrow();
                f.debug_struct("ItemHandle")
                    .field("key", &node_ref.key)
                    .field("degree", &node_ref.degree)
                    .field("marked", &node_ref.marked)
                    .finish()
            }
            None => write!(f, "ItemHandle(dangling)"),
        }
    }
}
