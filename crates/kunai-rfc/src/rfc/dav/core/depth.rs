//! Depth header values.

use std::fmt;

/// `WebDAV` Depth header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    /// The resource itself only.
    Zero,
    /// The resource and its immediate children.
    One,
    /// The resource and all descendants.
    #[default]
    Infinity,
}

impl Depth {
    /// Parses from header value.
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "0" => Some(Self::Zero),
            "1" => Some(Self::One),
            "infinity" => Some(Self::Infinity),
            _ => None,
        }
    }

    /// Returns the header value string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
            Self::Infinity => "infinity",
        }
    }

    /// ## Summary
    /// Returns how many levels below the target resource a walk may descend.
    ///
    /// `infinity` is effectively unbounded; the resource tree itself is at
    /// most three levels deep below a principal.
    #[must_use]
    pub const fn levels(self) -> u32 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::Infinity => u32::MAX,
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
