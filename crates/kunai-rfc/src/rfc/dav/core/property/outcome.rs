use thiserror::Error;

use super::{PropertyName, PropertyValue};
use crate::rfc::dav::core::namespace::QName;
use crate::rfc::dav::core::status::Status;

/// Why a single property could not be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum PropertyError {
    #[error("property not found")]
    NotFound,
    #[error("property access forbidden")]
    Forbidden,
    #[error("property could not be resolved")]
    Internal,
    #[error("property request is malformed")]
    BadRequest,
}

impl PropertyError {
    /// Status of the propstat group this failure is reported under.
    #[must_use]
    pub const fn status(self) -> Status {
        match self {
            Self::NotFound => Status::NotFound,
            Self::Forbidden => Status::Forbidden,
            Self::Internal => Status::InternalServerError,
            Self::BadRequest => Status::BadRequest,
        }
    }
}

/// Outcome of resolving one property.
pub type PropertyResult = Result<PropertyValue, PropertyError>;

/// A requested property together with its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProperty {
    /// Name to render for this entry. Cataloged properties use their canonical
    /// name; anything else echoes the request.
    pub name: QName,
    pub outcome: PropertyResult,
}

impl ResolvedProperty {
    #[must_use]
    pub fn status(&self) -> Status {
        match &self.outcome {
            Ok(_) => Status::Ok,
            Err(e) => e.status(),
        }
    }
}

/// ## Summary
/// Resolved properties for one resource, keyed by lower-cased local name.
///
/// Insertion order is kept so responses list properties the way they were
/// requested. Inserting a key twice replaces the earlier outcome in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    entries: Vec<(String, ResolvedProperty)>,
}

impl PropertyMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: QName, outcome: PropertyResult) {
        let key = name.local_name().to_ascii_lowercase();
        let entry = ResolvedProperty { name, outcome };
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = entry;
        } else {
            self.entries.push((key, entry));
        }
    }

    /// Records an outcome for a cataloged property under its canonical name.
    pub fn insert_cataloged(&mut self, name: PropertyName, outcome: PropertyResult) {
        self.insert(name.qname(), outcome);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyResult> {
        let key = name.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, entry)| &entry.outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedProperty> {
        self.entries.iter().map(|(_, entry)| entry)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
