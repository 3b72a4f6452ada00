//! History record management — holds reconstructed bonds in an editable
//! session, tracks unsaved changes, and hands the aggregate to a store.

pub mod session;
pub mod store;

pub use session::{ExtractionOutcome, HistorySession, SessionView, NO_BONDS_MESSAGE};
pub use store::{MemoryProfileStore, ProfileStore};
