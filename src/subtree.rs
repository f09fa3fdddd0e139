//! One binary search tree per key category.
//!
//! Nodes live in an arena and refer to each other by index. Child links own
//! top-down; the parent link is a plain index, and the root is its own parent.
//!
//! No rebalancing is performed: the shape is determined entirely by insertion
//! order, so height is O(n) in the worst case.
//!
//! Shape invariant: every non-root node is occupied. The root is an empty
//! placeholder exactly when the subtree is empty, and then it has no children.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use crate::config::{Config, DuplicatePolicy};
use crate::{Error, KeyOrd, Traversal};

// =============================================================================
// Node arena
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Side {
    Left,
    Right,
}

#[derive(Clone)]
struct Node<K, V> {
    /// `None` for the empty placeholder.
    entry: Option<(K, V)>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: NodeId,
}

impl<K, V> Node<K, V> {
    #[inline]
    fn placeholder(parent: NodeId) -> Self {
        Self {
            entry: None,
            left: None,
            right: None,
            parent,
        }
    }

    #[inline]
    fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

/// Node storage with a free list of released slots.
#[derive(Clone)]
struct NodeArena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
}

impl<K, V> NodeArena<K, V> {
    /// `capacity` is a hint: if it cannot be reserved the arena starts small
    /// and grows on demand.
    fn with_root(capacity: usize) -> (Self, NodeId) {
        let root = NodeId(0);
        let mut slots = Vec::new();
        if slots.try_reserve_exact(capacity.max(1)).is_err() {
            tracing::warn!(capacity, "ignoring unreservable node capacity hint");
        }
        slots.push(Some(Node::placeholder(root)));
        let arena = Self {
            slots,
            free: Vec::new(),
        };
        (arena, root)
    }

    #[cfg(test)]
    fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn alloc(&mut self, node: Node<K, V>) -> Result<NodeId, Error> {
        if let Some(id) = self.free.pop() {
            debug_assert!(self.slots[id.index()].is_none());
            self.slots[id.index()] = Some(node);
            return Ok(id);
        }

        let id = Self::next_id(self.slots.len())?;
        self.slots
            .try_reserve(1)
            .map_err(|_| Error::AllocationFailure { what: "node" })?;
        self.slots.push(Some(node));
        Ok(id)
    }

    /// Id for a fresh slot appended at `len`; ids are 32-bit.
    #[inline]
    fn next_id(len: usize) -> Result<NodeId, Error> {
        u32::try_from(len)
            .map(NodeId)
            .map_err(|_| Error::AllocationFailure { what: "node" })
    }

    fn release(&mut self, id: NodeId) -> Node<K, V> {
        let node = self.slots[id.index()]
            .take()
            .expect("released node must be live");
        self.free.push(id);
        node
    }

    #[inline]
    fn get(&self, id: NodeId) -> &Node<K, V> {
        self.slots[id.index()]
            .as_ref()
            .expect("node id must refer to a live node")
    }

    #[inline]
    fn get_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.slots[id.index()]
            .as_mut()
            .expect("node id must refer to a live node")
    }

    /// Drops every node and leaves a single empty root behind.
    fn reset(&mut self) -> NodeId {
        let root = NodeId(0);
        self.slots.clear();
        self.free.clear();
        self.slots.push(Some(Node::placeholder(root)));
        root
    }
}

// =============================================================================
// Subtree
// =============================================================================

/// An unbalanced binary search tree holding the keys of one category.
///
/// Keys are owned by the tree. Payloads are moved in on insert and handed back
/// on removal; whatever is still stored when the tree is cleared or dropped is
/// released children-first.
pub struct Subtree<K, V> {
    nodes: NodeArena<K, V>,
    root: NodeId,
    len: usize,
    duplicates: DuplicatePolicy,
}

impl<K, V> Subtree<K, V> {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        let (nodes, root) = NodeArena::with_root(config.initial_capacity);
        Self {
            nodes,
            root,
            len: 0,
            duplicates: config.duplicates,
        }
    }

    /// Number of occupied nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn duplicates(&self) -> DuplicatePolicy {
        self.duplicates
    }

    /// Number of occupied levels; `0` for an empty subtree.
    pub fn height(&self) -> usize {
        if self.is_empty() {
            return 0;
        }

        let mut height = 0;
        let mut stack = vec![(self.root, 1usize)];
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            let node = self.nodes.get(id);
            for child in [node.left, node.right].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        height
    }

    /// Walks occupied nodes: left subtree, right subtree, then the node.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut stack = Vec::new();
        if !self.is_empty() {
            stack.push((self.root, false));
        }
        Iter {
            tree: self,
            stack,
            remaining: self.len,
        }
    }

    /// Collects every `(key, payload)` reference in walk order.
    pub fn traverse(&self) -> Result<Traversal<&K, &V>, Error> {
        self.traverse_map(|key| key)
    }

    /// Like [`Subtree::traverse`], projecting each key reference through `f`.
    pub fn traverse_map<'a, T>(
        &'a self,
        mut f: impl FnMut(&'a K) -> T,
    ) -> Result<Traversal<T, &'a V>, Error> {
        let mut out = Traversal::with_capacity(self.len)?;
        for (key, payload) in self.iter() {
            out.push(f(key), payload);
        }
        Ok(out)
    }

    /// Releases every entry, children before parents, and returns how many
    /// there were. The subtree is left with a single empty root.
    pub fn clear(&mut self) -> usize {
        let released = self.len;
        if released > 0 {
            let mut stack = vec![(self.root, false)];
            while let Some((id, expanded)) = stack.pop() {
                if expanded {
                    self.nodes.get_mut(id).entry = None;
                    continue;
                }
                stack.push((id, true));
                let node = self.nodes.get(id);
                if let Some(right) = node.right {
                    stack.push((right, false));
                }
                if let Some(left) = node.left {
                    stack.push((left, false));
                }
            }
        }
        self.root = self.nodes.reset();
        self.len = 0;
        released
    }

    fn side_of(&self, parent: NodeId, child: NodeId) -> Side {
        if self.nodes.get(parent).left == Some(child) {
            Side::Left
        } else {
            debug_assert_eq!(self.nodes.get(parent).right, Some(child));
            Side::Right
        }
    }

    /// Materializes an empty child of `parent` on `side`.
    fn grow_child(&mut self, parent: NodeId, side: Side) -> Result<NodeId, Error> {
        let child = self.nodes.alloc(Node::placeholder(parent)).map_err(|err| {
            tracing::warn!(len = self.len, "failed to allocate node");
            err
        })?;
        self.nodes.get_mut(parent).set_child(side, Some(child));
        Ok(child)
    }

    /// Detaches `id`, whose entry has already been taken, keeping the search
    /// order of everything else.
    fn unlink(&mut self, id: NodeId) {
        let (left, right, parent) = {
            let node = self.nodes.get(id);
            (node.left, node.right, node.parent)
        };

        match (left, right) {
            (Some(left), Some(_)) => {
                // Promote the in-order predecessor into `id`, which keeps its
                // position; the predecessor's own left child takes its slot.
                let mut pred = left;
                while let Some(next) = self.nodes.get(pred).right {
                    pred = next;
                }
                let side = self.side_of(self.nodes.get(pred).parent, pred);
                let pred_node = self.nodes.release(pred);
                self.nodes
                    .get_mut(pred_node.parent)
                    .set_child(side, pred_node.left);
                if let Some(orphan) = pred_node.left {
                    self.nodes.get_mut(orphan).parent = pred_node.parent;
                }
                self.nodes.get_mut(id).entry = pred_node.entry;
            }
            (None, None) => {
                if parent == id {
                    // Root stays behind as the empty placeholder.
                    return;
                }
                let side = self.side_of(parent, id);
                self.nodes.get_mut(parent).set_child(side, None);
                self.nodes.release(id);
            }
            (Some(child), None) | (None, Some(child)) => {
                if parent == id {
                    self.nodes.get_mut(child).parent = child;
                    self.root = child;
                } else {
                    let side = self.side_of(parent, id);
                    self.nodes.get_mut(parent).set_child(side, Some(child));
                    self.nodes.get_mut(child).parent = parent;
                }
                self.nodes.release(id);
            }
        }
    }
}

impl<K: KeyOrd, V> Subtree<K, V> {
    /// Stores `payload` under `key`.
    ///
    /// Descends right while `key` is greater than the node key and left
    /// otherwise, so under [`DuplicatePolicy::Shadow`] an equal key lands on
    /// the lesser side of the existing one and stays hidden behind it.
    /// Returns the replaced payload under [`DuplicatePolicy::Overwrite`].
    pub fn insert(&mut self, key: K, payload: V) -> Result<Option<V>, Error> {
        if !key.is_orderable() {
            tracing::warn!("rejected unordered key");
            return Err(Error::UnorderedKey);
        }

        let mut current = self.root;
        loop {
            let node = self.nodes.get(current);
            let ord = match &node.entry {
                Some((node_key, _)) => key.key_cmp(node_key),
                None => break,
            };
            let side = if ord == Ordering::Greater {
                Side::Right
            } else {
                Side::Left
            };
            let next = node.child(side);

            if ord == Ordering::Equal {
                match self.duplicates {
                    DuplicatePolicy::Shadow => {}
                    DuplicatePolicy::Overwrite => {
                        let (_, stored) = self
                            .nodes
                            .get_mut(current)
                            .entry
                            .as_mut()
                            .expect("compared node is occupied");
                        return Ok(Some(std::mem::replace(stored, payload)));
                    }
                    DuplicatePolicy::Reject => {
                        tracing::warn!("rejected duplicate key");
                        return Err(Error::DuplicateKey);
                    }
                }
            }

            current = match next {
                Some(child) => child,
                None => self.grow_child(current, side)?,
            };
        }

        self.nodes.get_mut(current).entry = Some((key, payload));
        self.len += 1;
        Ok(None)
    }

    /// First node on the top-down path whose key equals `key`.
    fn locate<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: KeyOrd + ?Sized,
    {
        if !key.is_orderable() {
            return None;
        }

        let mut current = Some(self.root);
        while let Some(id) = current {
            let node = self.nodes.get(id);
            let (node_key, _) = node.entry.as_ref()?;
            current = match key.key_cmp(node_key.borrow()) {
                Ordering::Greater => node.right,
                Ordering::Less => node.left,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: KeyOrd + ?Sized,
    {
        let id = self.locate(key)?;
        self.nodes.get(id).entry.as_ref().map(|(_, payload)| payload)
    }

    pub fn search_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: KeyOrd + ?Sized,
    {
        let id = self.locate(key)?;
        self.nodes
            .get_mut(id)
            .entry
            .as_mut()
            .map(|(_, payload)| payload)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: KeyOrd + ?Sized,
    {
        self.locate(key).is_some()
    }

    /// Removes the first node on the search path for `key` and returns its
    /// payload. The stored key is dropped before the tree is relinked.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: KeyOrd + ?Sized,
    {
        let target = self.locate(key)?;
        let (_, payload) = self.nodes.get_mut(target).entry.take()?;
        self.len -= 1;
        self.unlink(target);
        Some(payload)
    }
}

#[cfg(test)]
impl<K: KeyOrd, V> Subtree<K, V> {
    /// Asserts the structural invariants: consistent parent links, a single
    /// connected acyclic tree, no empty non-root node, search order in an
    /// in-order walk, and a node count matching `len`.
    pub(crate) fn validate(&self) {
        let root = self.nodes.get(self.root);
        assert_eq!(root.parent, self.root, "root must be its own parent");
        if root.entry.is_none() {
            assert!(
                root.left.is_none() && root.right.is_none(),
                "empty root must have no children"
            );
            assert_eq!(self.len, 0, "empty root implies an empty subtree");
        }

        let mut seen = vec![false; self.nodes.slots.len()];
        let mut stack = vec![self.root];
        let mut reachable = 0usize;
        while let Some(id) = stack.pop() {
            assert!(!seen[id.index()], "node reachable twice");
            seen[id.index()] = true;
            reachable += 1;

            let node = self.nodes.get(id);
            if id != self.root {
                assert!(node.entry.is_some(), "non-root node must be occupied");
            }
            for child in [node.left, node.right].into_iter().flatten() {
                assert_eq!(self.nodes.get(child).parent, id, "broken parent link");
                stack.push(child);
            }
        }
        assert_eq!(reachable, self.nodes.live(), "unreachable live nodes");

        // In-order walk must be non-decreasing.
        let mut prev: Option<&K> = None;
        let mut occupied = 0usize;
        let mut stack: Vec<NodeId> = Vec::new();
        let mut current = Some(self.root);
        while current.is_some() || !stack.is_empty() {
            while let Some(id) = current {
                stack.push(id);
                current = self.nodes.get(id).left;
            }
            let id = stack.pop().expect("stack non-empty");
            let node = self.nodes.get(id);
            if let Some((key, _)) = &node.entry {
                if let Some(prev) = prev {
                    assert_ne!(
                        prev.key_cmp(key),
                        Ordering::Greater,
                        "in-order walk out of order"
                    );
                }
                prev = Some(key);
                occupied += 1;
            }
            current = node.right;
        }
        assert_eq!(occupied, self.len, "occupied node count must match len");
    }
}

impl<K, V> Drop for Subtree<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V> Default for Subtree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for Subtree<K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            len: self.len,
            duplicates: self.duplicates,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Subtree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

pub struct Iter<'a, K, V> {
    tree: &'a Subtree<K, V>,
    /// `(node, children already pushed)`.
    stack: Vec<(NodeId, bool)>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, expanded)) = self.stack.pop() {
            let node = self.tree.nodes.get(id);
            if expanded {
                if let Some((key, payload)) = &node.entry {
                    self.remaining -= 1;
                    return Some((key, payload));
                }
                continue;
            }

            self.stack.push((id, true));
            if let Some(right) = node.right {
                self.stack.push((right, false));
            }
            if let Some(left) = node.left {
                self.stack.push((left, false));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a Subtree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
