/// Errors reported by container and subtree operations.
///
/// A missing key is not an error: lookups return `None`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A dynamically routed key is not a signed integer, unsigned integer,
    /// float or string.
    #[error("unsupported key category")]
    UnsupportedCategory,

    /// Storage for a node, key copy or traversal frame could not be reserved.
    #[error("allocation failed for {what}")]
    AllocationFailure { what: &'static str },

    /// A NaN float key was offered for insertion.
    #[error("key has no position in the ordering (NaN)")]
    UnorderedKey,

    /// An equal key is already stored and the tree rejects duplicates.
    #[error("an equal key is already stored")]
    DuplicateKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::AllocationFailure { what: "node" }.to_string(),
            "allocation failed for node"
        );
        assert_eq!(Error::UnsupportedCategory.to_string(), "unsupported key category");

        let err: Box<dyn std::error::Error> = Box::new(Error::DuplicateKey);
        assert_eq!(err.to_string(), "an equal key is already stored");
    }
}
