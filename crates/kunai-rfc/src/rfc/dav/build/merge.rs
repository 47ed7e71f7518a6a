use thiserror::Error;

use crate::rfc::xml::Element;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MergeError {
    #[error("no documents to merge")]
    Empty,
}

/// ## Summary
/// Concatenates the `<d:response>` elements of several multistatus documents.
///
/// `None` entries are skipped. A single remaining document is returned as is;
/// otherwise the first document receives the responses of the rest, in order,
/// along with any namespace declarations it lacks.
///
/// ## Errors
/// Returns [`MergeError::Empty`] if no document remains.
pub fn merge_multistatus(docs: Vec<Option<Element>>) -> Result<Element, MergeError> {
    let mut docs = docs.into_iter().flatten();
    let mut merged = docs.next().ok_or(MergeError::Empty)?;

    for doc in docs {
        let missing: Vec<(String, String)> = doc
            .namespace_declarations()
            .into_iter()
            .filter(|(prefix, _)| {
                !merged
                    .namespace_declarations()
                    .iter()
                    .any(|(existing, _)| existing == prefix)
            })
            .map(|(prefix, uri)| {
                let key = if prefix.is_empty() {
                    "xmlns".to_string()
                } else {
                    format!("xmlns:{prefix}")
                };
                (key, uri.to_string())
            })
            .collect();
        for (key, uri) in missing {
            merged.set_attr(key, uri);
        }

        for response in doc.children_named("response") {
            merged.push(response.clone());
        }
    }

    Ok(merged)
}
