//! Calendar-query evaluation: filter matching, collations and recurrence.

pub mod matcher;
pub mod recurrence;
pub mod text_match;

pub use matcher::{MatchContext, matches};
