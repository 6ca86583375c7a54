use super::CacheError;

/// Result of a best-effort cache write (set or delete).
///
/// A degraded write never fails the surrounding repository operation. It is
/// only reported through logging and [`CacheStats`](super::CacheStats).
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum CacheWrite {
    /// Every cache command succeeded.
    Applied,
    /// At least one cache command failed; holds the first error.
    Degraded(CacheError),
}

impl CacheWrite {
    pub fn is_applied(&self) -> bool {
        matches!(self, CacheWrite::Applied)
    }

    /// Folds another outcome into this one, keeping the first failure.
    pub fn and(self, other: CacheWrite) -> CacheWrite {
        match self {
            CacheWrite::Applied => other,
            degraded => degraded,
        }
    }
}

impl From<super::Result<()>> for CacheWrite {
    fn from(result: super::Result<()>) -> Self {
        match result {
            Ok(()) => CacheWrite::Applied,
            Err(err) => CacheWrite::Degraded(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_keeps_first_failure() {
        let first = CacheWrite::Degraded(CacheError::OperationFailed("a".into()));
        let second = CacheWrite::Degraded(CacheError::OperationFailed("b".into()));

        assert_eq!(first.clone().and(second), first);
        assert_eq!(CacheWrite::Applied.and(first.clone()), first);
        assert!(CacheWrite::Applied.and(CacheWrite::Applied).is_applied());
    }

    #[test]
    fn test_from_result() {
        assert!(CacheWrite::from(Ok(())).is_applied());
        let degraded = CacheWrite::from(Err(CacheError::ConnectionFailed("down".into())));
        assert!(!degraded.is_applied());
    }
}
