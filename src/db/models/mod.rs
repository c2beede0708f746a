pub mod profile;
pub mod session;

pub use profile::ProfileRecord;
pub use session::{sort_newest_first, SessionRecord, MAX_TOP_CORRECTION_AREAS};
