/// What insertion does when an equal key is already on the search path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Insert a new node on the lesser side of the equal one. Searches keep
    /// finding the first equal node top-down, so the older entry shadows the
    /// newer one until it is removed.
    #[default]
    Shadow,
    /// Replace the payload of the first equal node and hand back the old one.
    Overwrite,
    /// Refuse the insertion with [`Error::DuplicateKey`](crate::Error::DuplicateKey).
    Reject,
}

/// Configuration for a [`CategoryTree`](crate::CategoryTree) or a single
/// [`Subtree`](crate::Subtree).
#[derive(Debug, Clone)]
pub struct Config {
    /// Handling of keys equal to one already stored.
    pub duplicates: DuplicatePolicy,
    /// Node arena capacity hint, per subtree.
    pub initial_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duplicates: DuplicatePolicy::Shadow,
            initial_capacity: 16,
        }
    }
}

impl Config {
    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }
}
