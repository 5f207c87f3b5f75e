//! Publish status lifecycle.

use serde::{Deserialize, Serialize};

/// Lifecycle state of one publishing attempt.
///
/// `Preparing` is the only non-terminal state. Terminal states are final;
/// the store rejects any further transition out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Preparing,
    Completed,
    Failed,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Preparing => "preparing",
            PublishStatus::Completed => "completed",
            PublishStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PublishStatus::Completed | PublishStatus::Failed)
    }

    pub fn can_transition_to(&self, next: PublishStatus) -> bool {
        matches!(
            (self, next),
            (
                PublishStatus::Preparing,
                PublishStatus::Completed | PublishStatus::Failed
            )
        )
    }
}

impl std::fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PublishStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preparing" => Ok(PublishStatus::Preparing),
            "completed" => Ok(PublishStatus::Completed),
            "failed" => Ok(PublishStatus::Failed),
            _ => Err(format!("unknown publish status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert!(PublishStatus::Preparing.can_transition_to(PublishStatus::Completed));
        assert!(PublishStatus::Preparing.can_transition_to(PublishStatus::Failed));
        assert!(!PublishStatus::Completed.can_transition_to(PublishStatus::Failed));
        assert!(!PublishStatus::Failed.can_transition_to(PublishStatus::Completed));
        assert!(!PublishStatus::Preparing.can_transition_to(PublishStatus::Preparing));
    }

    #[test]
    fn test_terminal() {
        assert!(!PublishStatus::Preparing.is_terminal());
        assert!(PublishStatus::Completed.is_terminal());
        assert!(PublishStatus::Failed.is_terminal());
    }

    #[test]
    fn test_round_trip() {
        for status in [
            PublishStatus::Preparing,
            PublishStatus::Completed,
            PublishStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<PublishStatus>(), Ok(status));
        }
        assert!("running".parse::<PublishStatus>().is_err());
    }
}
