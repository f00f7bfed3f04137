//! Pre-commit validation for relationship edges.
//!
//! Every follow/like mutation proposes one or more edges and runs this
//! check before anything touches storage. Because the check is pure, a
//! bulk proposal that contains a self-referencing edge is rejected as a
//! whole: no partial edge set can be left committed.

use thiserror::Error;

/// A proposed edge links an identity to itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("self-referencing edge for '{0}'")]
pub struct SelfReference(pub String);

/// Validate a proposed edge set: no target may equal the source.
///
/// The caller translates a failure into its domain error (self-follow,
/// self-like) before it surfaces.
pub fn ensure_distinct<S: AsRef<str>>(source: &str, targets: &[S]) -> Result<(), SelfReference> {
    for target in targets {
        if target.as_ref() == source {
            return Err(SelfReference(source.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_pair_passes() {
        assert!(ensure_distinct("a", &["b"]).is_ok());
    }

    #[test]
    fn test_self_pair_fails() {
        assert_eq!(ensure_distinct("a", &["a"]), Err(SelfReference("a".into())));
    }

    #[test]
    fn test_bulk_with_self_anywhere_fails() {
        assert!(ensure_distinct("a", &["b", "c", "a", "d"]).is_err());
        assert!(ensure_distinct("a", &["a", "b"]).is_err());
    }

    #[test]
    fn test_empty_proposal_passes() {
        assert!(ensure_distinct::<&str>("a", &[]).is_ok());
    }
}
