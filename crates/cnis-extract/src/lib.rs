//! CNIS Extract — token classification, bond reconstruction and duration
//! arithmetic for contribution statements.

pub mod classify;
pub mod duration;
pub mod reconstruct;
pub mod source;
pub mod types;

pub use classify::{should_ignore, Classifier, TokenKind};
pub use duration::{calculate_date_diff, format_duration, sum_durations};
pub use reconstruct::{extract_bonds, extract_bonds_at, BondReconstructor};
pub use source::{clean_fragments, JsonFragmentsSource, PlainTextSource, TextSource};
pub use types::{Bond, BondCandidate, BondEnd, Duration, EmploymentHistory, ONGOING_LABEL};
