//! iCalendar serialization.

mod fold;
mod serializer;

pub use fold::fold_line;
pub use serializer::serialize_icalendar;
