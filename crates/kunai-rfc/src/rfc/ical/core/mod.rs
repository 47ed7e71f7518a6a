//! iCalendar core models (RFC 5545).

mod component;
mod datetime;
mod property;

pub use component::{Component, ComponentKind};
pub use datetime::{ICalDateTime, parse_duration, parse_utc_timestamp};
pub use property::{Parameter, Property};
