//! `CalDAV` calendar-query filter model (RFC 4791 §9.7).
//!
//! A filter is a tree rooted at a component filter. Nodes are plain owned
//! values; a tree is built once per request and only read afterwards.

use chrono::{DateTime, Utc};

/// How a node combines its nested filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterTest {
    AnyOf,
    #[default]
    AllOf,
}

impl FilterTest {
    /// Parses the `test` attribute; anything unrecognised falls back to the default.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("anyof") => Self::AnyOf,
            _ => Self::AllOf,
        }
    }

    /// ## Summary
    /// Combines the outcomes of a node's nested filters.
    ///
    /// A node without nested filters is satisfied regardless of mode.
    pub fn combine(self, mut outcomes: impl Iterator<Item = bool>) -> bool {
        match self {
            Self::AllOf => outcomes.all(|ok| ok),
            Self::AnyOf => {
                let mut seen = false;
                for ok in outcomes {
                    if ok {
                        return true;
                    }
                    seen = true;
                }
                !seen
            }
        }
    }
}

/// Text comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchType {
    Equals,
    #[default]
    Contains,
    StartsWith,
    EndsWith,
}

impl MatchType {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "equals" => Some(Self::Equals),
            "contains" => Some(Self::Contains),
            "starts-with" => Some(Self::StartsWith),
            "ends-with" => Some(Self::EndsWith),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::Contains => "contains",
            Self::StartsWith => "starts-with",
            Self::EndsWith => "ends-with",
        }
    }
}

/// String comparison algorithm (RFC 4790).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Collation {
    /// `i;unicode-casemap`: full Unicode case folding.
    #[default]
    UnicodeCasemap,
    /// `i;ascii-casemap`: ASCII letters compared case-insensitively.
    AsciiCasemap,
    /// `i;octet`: exact byte comparison.
    Octet,
}

impl Collation {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "i;unicode-casemap" => Some(Self::UnicodeCasemap),
            "i;ascii-casemap" => Some(Self::AsciiCasemap),
            "i;octet" => Some(Self::Octet),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnicodeCasemap => "i;unicode-casemap",
            Self::AsciiCasemap => "i;ascii-casemap",
            Self::Octet => "i;octet",
        }
    }
}

/// `<text-match>` constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextMatch {
    pub collation: Collation,
    pub match_type: MatchType,
    /// `negate-condition="yes"`.
    pub negate: bool,
    pub value: String,
}

/// `<time-range>` constraint; a missing side is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    #[must_use]
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// ## Summary
    /// Returns whether the half-open interval `[start, end)` overlaps this range.
    ///
    /// A zero-length interval at `start` overlaps when `start` lies inside the
    /// range, matching RFC 4791's treatment of instantaneous events.
    #[must_use]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let before_end = self.end.is_none_or(|range_end| start < range_end);
        let after_start = self.start.is_none_or(|range_start| {
            if end > start {
                end > range_start
            } else {
                start >= range_start
            }
        });
        before_end && after_start
    }

    /// Returns whether a single instant falls inside the range.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.is_none_or(|s| instant >= s) && self.end.is_none_or(|e| instant < e)
    }
}

/// `<comp-filter>`. The root of every filter tree is one of these.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompFilter {
    /// Component name, upper-cased (`VCALENDAR`, `VEVENT`, ...).
    pub name: String,
    pub test: FilterTest,
    /// When set, every other constraint on this node is empty.
    pub is_not_defined: bool,
    pub time_range: Option<TimeRange>,
    pub prop_filters: Vec<PropFilter>,
    pub comp_filters: Vec<CompFilter>,
}

impl CompFilter {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    #[must_use]
    pub fn with_comp_filter(mut self, child: CompFilter) -> Self {
        self.comp_filters.push(child);
        self
    }

    #[must_use]
    pub fn with_prop_filter(mut self, prop: PropFilter) -> Self {
        self.prop_filters.push(prop);
        self
    }

    /// Marks the node `is-not-defined`, clearing every other constraint.
    #[must_use]
    pub fn not_defined(mut self) -> Self {
        self.is_not_defined = true;
        self.time_range = None;
        self.prop_filters.clear();
        self.comp_filters.clear();
        self
    }
}

/// `<prop-filter>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropFilter {
    /// Property name, upper-cased.
    pub name: String,
    pub test: FilterTest,
    pub is_not_defined: bool,
    pub time_range: Option<TimeRange>,
    pub text_match: Option<TextMatch>,
    pub param_filters: Vec<ParamFilter>,
}

impl PropFilter {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_text_match(mut self, text_match: TextMatch) -> Self {
        self.text_match = Some(text_match);
        self
    }

    #[must_use]
    pub fn with_param_filter(mut self, param: ParamFilter) -> Self {
        self.param_filters.push(param);
        self
    }

    #[must_use]
    pub fn not_defined(mut self) -> Self {
        self.is_not_defined = true;
        self.time_range = None;
        self.text_match = None;
        self.param_filters.clear();
        self
    }
}

/// `<param-filter>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParamFilter {
    /// Parameter name, upper-cased.
    pub name: String,
    pub is_not_defined: bool,
    pub text_match: Option<TextMatch>,
}

impl ParamFilter {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            ..Self::default()
        }
    }
}
