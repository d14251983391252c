use serde::{Deserialize, Serialize};

/// Result of adding a subscriber to a key's set at the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddOutcome {
    Added,
    AlreadyMember,
}

impl AddOutcome {
    /// Maps the `SADD` reply (number of members actually added).
    #[must_use]
    pub const fn from_added_count(count: i64) -> Self {
        if count > 0 {
            Self::Added
        } else {
            Self::AlreadyMember
        }
    }
}

/// Result of removing a subscriber from a key's set at the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoveOutcome {
    Removed,
    NotMember,
}

impl RemoveOutcome {
    /// Maps the `SREM` reply (number of members actually removed).
    #[must_use]
    pub const fn from_removed_count(count: i64) -> Self {
        if count > 0 {
            Self::Removed
        } else {
            Self::NotMember
        }
    }
}

/// User-visible result of a watch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchOutcome {
    NewlyWatched,
    AlreadySubscribed,
    Invalid,
    TransientFailure,
}

impl WatchOutcome {
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::NewlyWatched | Self::AlreadySubscribed)
    }
}

impl From<AddOutcome> for WatchOutcome {
    fn from(outcome: AddOutcome) -> Self {
        match outcome {
            AddOutcome::Added => Self::NewlyWatched,
            AddOutcome::AlreadyMember => Self::AlreadySubscribed,
        }
    }
}

impl std::fmt::Display for WatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewlyWatched => write!(f, "newly watched"),
            Self::AlreadySubscribed => write!(f, "already subscribed"),
            Self::Invalid => write!(f, "invalid"),
            Self::TransientFailure => write!(f, "transient failure"),
        }
    }
}

/// User-visible result of an unwatch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnwatchOutcome {
    Unwatched,
    NotSubscribed,
}

impl From<RemoveOutcome> for UnwatchOutcome {
    fn from(outcome: RemoveOutcome) -> Self {
        match outcome {
            RemoveOutcome::Removed => Self::Unwatched,
            RemoveOutcome::NotMember => Self::NotSubscribed,
        }
    }
}

impl std::fmt::Display for UnwatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unwatched => write!(f, "unwatched"),
            Self::NotSubscribed => write!(f, "not subscribed"),
        }
    }
}
