use crate::domain::entities::keys::TrackedKey;

/// Position in a cursor-based traversal of the key space.
///
/// Traversal starts at `0` and is complete when the store hands `0` back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ScanCursor(u64);

impl ScanCursor {
    pub const START: Self = Self(0);

    #[must_use]
    pub const fn new(position: u64) -> Self {
        Self(position)
    }

    #[must_use]
    pub const fn position(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for ScanCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One `SCAN` reply: the cursor to continue from and the keys in this batch.
/// A batch may repeat keys returned by earlier batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPage {
    pub next: ScanCursor,
    pub keys: Vec<TrackedKey>,
}
