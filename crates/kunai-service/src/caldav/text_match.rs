//! `<text-match>` evaluation (RFC 4791 §9.7.5, RFC 4790 collations).

use std::borrow::Cow;

use icu::casemap::CaseMapper;

use kunai_rfc::rfc::dav::core::{Collation, MatchType, TextMatch};

/// ## Summary
/// Normalizes text for comparison under a collation.
///
/// `i;unicode-casemap` applies ICU full case folding, so `ß` matches `SS`.
/// `i;ascii-casemap` folds only ASCII letters. `i;octet` leaves text as is.
#[must_use]
pub fn normalize(text: &str, collation: Collation) -> Cow<'_, str> {
    match collation {
        Collation::UnicodeCasemap => CaseMapper::new().fold_string(text),
        Collation::AsciiCasemap => Cow::Owned(text.to_ascii_lowercase()),
        Collation::Octet => Cow::Borrowed(text),
    }
}

/// ## Summary
/// Tests `text` against a `<text-match>`, applying `negate-condition` last.
#[must_use]
pub fn text_matches(text_match: &TextMatch, text: &str) -> bool {
    let haystack = normalize(text, text_match.collation);
    let needle = normalize(&text_match.value, text_match.collation);

    let matched = match text_match.match_type {
        MatchType::Equals => haystack == needle,
        MatchType::Contains => haystack.contains(needle.as_ref()),
        MatchType::StartsWith => haystack.starts_with(needle.as_ref()),
        MatchType::EndsWith => haystack.ends_with(needle.as_ref()),
    };

    matched != text_match.negate
}
