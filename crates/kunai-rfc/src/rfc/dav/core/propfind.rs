//! Property selection shared by PROPFIND and REPORT bodies.

use super::namespace::QName;

/// Which properties a request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropfindRequest {
    /// `<allprop/>`, optionally with `<include>` names.
    AllProp { include: Vec<QName> },
    /// `<propname/>`: names only, no values.
    PropName,
    /// `<prop>` with explicit names.
    Prop(Vec<QName>),
}

impl PropfindRequest {
    #[must_use]
    pub fn allprop() -> Self {
        Self::AllProp {
            include: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_allprop(&self) -> bool {
        matches!(self, Self::AllProp { .. })
    }
}

impl Default for PropfindRequest {
    fn default() -> Self {
        Self::allprop()
    }
}
