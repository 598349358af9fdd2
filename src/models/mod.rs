pub mod entry;
pub mod journal;
pub mod tag;

pub use entry::{DEFAULT_CONTENT_TYPE, Entry, EntryPatch, EntryState, MatchedEntry};
pub use journal::Journal;
pub use tag::{Tag, TagUsage};
