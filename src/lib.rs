//! # category-tree
//!
//! An in-memory store that keeps payloads under keys of four families
//! (signed integers, unsigned integers, floats, strings) in one container.
//! Each family has its own binary search subtree, and every operation is
//! routed to the right one by the key's category.
//!
//! The subtrees are plain, unbalanced binary search trees: shape follows
//! insertion order, and removal of a node with two children promotes its
//! in-order predecessor into its place.
//!
//! ## Example
//!
//! ```rust
//! use category_tree::{Category, CategoryTree};
//!
//! let mut tree: CategoryTree<&str> = CategoryTree::new();
//! tree.insert(5i32, "five").unwrap();
//! tree.insert(5u8, "unsigned five").unwrap();
//! tree.insert("scarf", "string key").unwrap();
//! tree.insert(2.5f64, "float key").unwrap();
//!
//! assert_eq!(tree.search(5i64), Some(&"five"));
//! assert_eq!(tree.search(5u64), Some(&"unsigned five"));
//! assert_eq!(tree.search("hat"), None);
//! assert_eq!(tree.traverse(Category::String).unwrap().len(), 1);
//!
//! assert_eq!(tree.remove("scarf"), Some("string key"));
//! assert_eq!(tree.len(), 3);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

use std::any::Any;
use std::fmt;

mod config;
mod error;
mod key;
mod subtree;
mod traversal;

pub use config::{Config, DuplicatePolicy};
pub use error::Error;
pub use key::{Category, KeyOrd, KeyRef};
pub use subtree::{Iter, Subtree};
pub use traversal::Traversal;

/// Bulk export of one category: borrowed keys and payloads in walk order.
pub type CategoryTraversal<'a, V> = Traversal<KeyRef<'a>, &'a V>;

// =============================================================================
// Router
// =============================================================================

/// The subtree serving one category, as selected by [`CategoryTree::route`].
pub enum SubtreeRef<'a, V> {
    Signed(&'a Subtree<i64, V>),
    Unsigned(&'a Subtree<u64, V>),
    Float(&'a Subtree<f64, V>),
    String(&'a Subtree<Box<str>, V>),
}

impl<V> Clone for SubtreeRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for SubtreeRef<'_, V> {}

impl<'a, V> SubtreeRef<'a, V> {
    pub fn category(self) -> Category {
        match self {
            Self::Signed(_) => Category::Signed,
            Self::Unsigned(_) => Category::Unsigned,
            Self::Float(_) => Category::Float,
            Self::String(_) => Category::String,
        }
    }

    pub fn len(self) -> usize {
        match self {
            Self::Signed(t) => t.len(),
            Self::Unsigned(t) => t.len(),
            Self::Float(t) => t.len(),
            Self::String(t) => t.len(),
        }
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    pub fn height(self) -> usize {
        match self {
            Self::Signed(t) => t.height(),
            Self::Unsigned(t) => t.height(),
            Self::Float(t) => t.height(),
            Self::String(t) => t.height(),
        }
    }

    /// Collects every `(key, payload)` reference of this subtree in walk order.
    pub fn traverse(self) -> Result<CategoryTraversal<'a, V>, Error> {
        match self {
            Self::Signed(t) => t.traverse_map(|k| KeyRef::Signed(*k)),
            Self::Unsigned(t) => t.traverse_map(|k| KeyRef::Unsigned(*k)),
            Self::Float(t) => t.traverse_map(|k| KeyRef::Float(*k)),
            Self::String(t) => t.traverse_map(|k| KeyRef::Str(k)),
        }
    }
}

// =============================================================================
// CategoryTree
// =============================================================================

/// Four independent subtrees, one per key category.
///
/// No operation ever touches more than one subtree, and nothing is shared
/// between them. The container is single-threaded; callers needing shared
/// access must serialize it themselves.
pub struct CategoryTree<V> {
    signed: Subtree<i64, V>,
    unsigned: Subtree<u64, V>,
    float: Subtree<f64, V>,
    string: Subtree<Box<str>, V>,
}

/// Owned copy of a string key, failing instead of aborting on exhaustion.
fn copy_str_key(key: &str) -> Result<Box<str>, Error> {
    let mut owned = String::new();
    owned.try_reserve_exact(key.len()).map_err(|_| {
        tracing::warn!(len = key.len(), "failed to copy string key");
        Error::AllocationFailure { what: "key copy" }
    })?;
    owned.push_str(key);
    Ok(owned.into_boxed_str())
}

impl<V> CategoryTree<V> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            signed: Subtree::with_config(&config),
            unsigned: Subtree::with_config(&config),
            float: Subtree::with_config(&config),
            string: Subtree::with_config(&config),
        }
    }

    /// Selects the subtree serving `category`.
    pub fn route(&self, category: Category) -> SubtreeRef<'_, V> {
        match category {
            Category::Signed => SubtreeRef::Signed(&self.signed),
            Category::Unsigned => SubtreeRef::Unsigned(&self.unsigned),
            Category::Float => SubtreeRef::Float(&self.float),
            Category::String => SubtreeRef::String(&self.string),
        }
    }

    /// Selects the subtree for a dynamically typed key.
    pub fn route_any(&self, key: &dyn Any) -> Result<SubtreeRef<'_, V>, Error> {
        KeyRef::from_any(key).map(|key| self.route(key.category()))
    }

    pub fn signed(&self) -> &Subtree<i64, V> {
        &self.signed
    }

    pub fn unsigned(&self) -> &Subtree<u64, V> {
        &self.unsigned
    }

    pub fn float(&self) -> &Subtree<f64, V> {
        &self.float
    }

    pub fn string(&self) -> &Subtree<Box<str>, V> {
        &self.string
    }

    /// Total number of entries across all categories.
    pub fn len(&self) -> usize {
        self.signed.len() + self.unsigned.len() + self.float.len() + self.string.len()
    }

    pub fn len_of(&self, category: Category) -> usize {
        self.route(category).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores `payload` under `key` in the subtree of the key's category.
    ///
    /// String keys are copied; the container never borrows caller memory.
    /// Behavior on an equal key follows the configured [`DuplicatePolicy`].
    pub fn insert<'k>(
        &mut self,
        key: impl Into<KeyRef<'k>>,
        payload: V,
    ) -> Result<Option<V>, Error> {
        let key = key.into();
        tracing::trace!(category = %key.category(), %key, "insert");
        let result = match key {
            KeyRef::Signed(k) => self.signed.insert(k, payload),
            KeyRef::Unsigned(k) => self.unsigned.insert(k, payload),
            KeyRef::Float(k) => self.float.insert(k, payload),
            KeyRef::Str(s) => copy_str_key(s).and_then(|k| self.string.insert(k, payload)),
        };
        if let Err(err) = &result {
            tracing::warn!(category = %key.category(), %err, "insert failed");
        }
        result
    }

    /// Payload stored under the first node matching `key` top-down.
    pub fn search<'k>(&self, key: impl Into<KeyRef<'k>>) -> Option<&V> {
        match key.into() {
            KeyRef::Signed(k) => self.signed.search(&k),
            KeyRef::Unsigned(k) => self.unsigned.search(&k),
            KeyRef::Float(k) => self.float.search(&k),
            KeyRef::Str(s) => self.string.search(s),
        }
    }

    pub fn search_mut<'k>(&mut self, key: impl Into<KeyRef<'k>>) -> Option<&mut V> {
        match key.into() {
            KeyRef::Signed(k) => self.signed.search_mut(&k),
            KeyRef::Unsigned(k) => self.unsigned.search_mut(&k),
            KeyRef::Float(k) => self.float.search_mut(&k),
            KeyRef::Str(s) => self.string.search_mut(s),
        }
    }

    pub fn contains_key<'k>(&self, key: impl Into<KeyRef<'k>>) -> bool {
        self.search(key).is_some()
    }

    /// Removes the entry found by [`CategoryTree::search`] and returns its
    /// payload, or `None` if the key is absent.
    pub fn remove<'k>(&mut self, key: impl Into<KeyRef<'k>>) -> Option<V> {
        let key = key.into();
        let removed = match key {
            KeyRef::Signed(k) => self.signed.remove(&k),
            KeyRef::Unsigned(k) => self.unsigned.remove(&k),
            KeyRef::Float(k) => self.float.remove(&k),
            KeyRef::Str(s) => self.string.remove(s),
        };
        tracing::trace!(category = %key.category(), %key, found = removed.is_some(), "remove");
        removed
    }

    pub fn insert_any(&mut self, key: &dyn Any, payload: V) -> Result<Option<V>, Error> {
        let key = KeyRef::from_any(key).map_err(|err| {
            tracing::warn!("insert with unsupported key category");
            err
        })?;
        self.insert(key, payload)
    }

    pub fn search_any(&self, key: &dyn Any) -> Result<Option<&V>, Error> {
        KeyRef::from_any(key).map(|key| self.search(key))
    }

    pub fn remove_any(&mut self, key: &dyn Any) -> Result<Option<V>, Error> {
        KeyRef::from_any(key).map(|key| self.remove(key))
    }

    /// Every `(key, payload)` reference stored under `category`, in walk order.
    pub fn traverse(&self, category: Category) -> Result<CategoryTraversal<'_, V>, Error> {
        self.route(category).traverse()
    }

    /// Walks all categories in turn: signed, unsigned, float, string.
    pub fn iter(&self) -> impl Iterator<Item = (KeyRef<'_>, &V)> + '_ {
        let signed = self.signed.iter().map(|(k, v)| (KeyRef::Signed(*k), v));
        let unsigned = self.unsigned.iter().map(|(k, v)| (KeyRef::Unsigned(*k), v));
        let float = self.float.iter().map(|(k, v)| (KeyRef::Float(*k), v));
        let string = self.string.iter().map(|(k, v)| (KeyRef::Str(k), v));
        signed.chain(unsigned).chain(float).chain(string)
    }

    fn release_all(&mut self) -> usize {
        self.signed.clear() + self.unsigned.clear() + self.float.clear() + self.string.clear()
    }

    /// Releases every entry of every category. Returns the number released.
    pub fn clear(&mut self) -> usize {
        let released = self.release_all();
        tracing::debug!(released, "cleared category tree");
        released
    }

    /// Releases everything and consumes the container.
    pub fn destroy(mut self) -> usize {
        let released = self.release_all();
        tracing::debug!(released, "destroyed category tree");
        released
    }
}

impl<V> Default for CategoryTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for CategoryTree<V> {
    fn clone(&self) -> Self {
        Self {
            signed: self.signed.clone(),
            unsigned: self.unsigned.clone(),
            float: self.float.clone(),
            string: self.string.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for CategoryTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}


#[cfg(test)]
mod proptests;
