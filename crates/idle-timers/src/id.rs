use serde::Serialize;

/// Handle to a logical timer registration.
///
/// Ids are allocated monotonically and never reused by the same manager,
/// not even across [`reset`](crate::TimerManager::reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TimerId(u64);

impl TimerId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value of this id.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_prefixed() {
        assert_eq!(TimerId::new(7).to_string(), "timer-7");
    }

    #[test]
    fn serializes_as_number() {
        let json = serde_json::to_string(&TimerId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
