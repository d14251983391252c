pub mod outcome;
pub mod scan_cursor;

pub use outcome::{AddOutcome, RemoveOutcome, UnwatchOutcome, WatchOutcome};
pub use scan_cursor::{ScanCursor, ScanPage};
