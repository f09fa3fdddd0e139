use crate::Error;

/// Bulk export of one subtree: parallel sequences of keys and payloads.
///
/// Entries reference the tree's own storage; nothing is copied. Order is the
/// walk order (left subtree, right subtree, then the node itself), not key
/// order.
#[derive(Debug, Clone)]
pub struct Traversal<K, V> {
    keys: Vec<K>,
    payloads: Vec<V>,
}

impl<K, V> Traversal<K, V> {
    /// Reserves both sequences up front so the walk never grows them.
    pub(crate) fn with_capacity(capacity: usize) -> Result<Self, Error> {
        let mut keys = Vec::new();
        let mut payloads = Vec::new();
        keys.try_reserve_exact(capacity)
            .and_then(|()| payloads.try_reserve_exact(capacity))
            .map_err(|_| {
                tracing::warn!(capacity, "failed to reserve traversal frame");
                Error::AllocationFailure {
                    what: "traversal frame",
                }
            })?;
        Ok(Self { keys, payloads })
    }

    #[inline]
    pub(crate) fn push(&mut self, key: K, payload: V) {
        self.keys.push(key);
        self.payloads.push(payload);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn payloads(&self) -> &[V] {
        &self.payloads
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.keys.iter().zip(self.payloads.iter())
    }

    pub fn into_parts(self) -> (Vec<K>, Vec<V>) {
        (self.keys, self.payloads)
    }
}

impl<K, V> IntoIterator for Traversal<K, V> {
    type Item = (K, V);
    type IntoIter = std::iter::Zip<std::vec::IntoIter<K>, std::vec::IntoIter<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter().zip(self.payloads)
    }
}
