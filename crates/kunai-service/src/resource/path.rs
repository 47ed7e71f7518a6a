use thiserror::Error;

use kunai_core::config::DavConfig;
use kunai_core::constants::CALDAV_ROUTE_COMPONENT;

use super::{Resource, ResourceType};

/// A path that does not address a resource. Reported as 404.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path {0:?} is outside the DAV prefix")]
    OutsidePrefix(String),
    #[error("path segment is not valid percent-encoded UTF-8: {0}")]
    InvalidEncoding(String),
    #[error("expected {CALDAV_ROUTE_COMPONENT:?} as second segment, found {0:?}")]
    NotCalendarHome(String),
    #[error("path has {0} segments, at most 4 are allowed")]
    TooManySegments(usize),
    #[error("{kind:?} resource requires {field}")]
    MissingField {
        kind: ResourceType,
        field: &'static str,
    },
    #[error("{kind:?} resource must not carry {field}")]
    UnexpectedField {
        kind: ResourceType,
        field: &'static str,
    },
    #[error("unknown resources have no path")]
    UnknownResource,
}

/// ## Summary
/// Maps request paths to [`Resource`]s and back under a fixed prefix.
///
/// ```text
/// {prefix}/                         ServiceRoot
/// {prefix}/{user}/                  Principal
/// {prefix}/{user}/cal/              HomeSet
/// {prefix}/{user}/cal/{calendar}/   Collection
/// {prefix}/{user}/cal/{calendar}/{object}   Object
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathCodec {
    prefix: String,
}

impl PathCodec {
    /// Creates a codec for `prefix`. Leading and trailing slashes are normalized.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        let trimmed = prefix.trim().trim_matches('/');
        Self {
            prefix: if trimmed.is_empty() {
                String::new()
            } else {
                format!("/{trimmed}")
            },
        }
    }

    #[must_use]
    pub fn from_config(dav: &DavConfig) -> Self {
        Self {
            prefix: dav.normalized_prefix(),
        }
    }

    /// Returns the normalized prefix, empty or starting with `/`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// ## Summary
    /// Classifies a request path or href.
    ///
    /// Scheme and authority, query and fragment are ignored. Segments are
    /// percent-decoded and empty segments skipped, so trailing slashes do not
    /// matter. The returned resource carries its canonical encoded path.
    ///
    /// ## Errors
    /// Returns an error if the path is outside the prefix, has more than four
    /// segments, or its second segment is not `cal`.
    pub fn parse_path(&self, path: &str) -> Result<Resource, PathError> {
        let rest = self.strip_prefix(path)?;

        let segments = rest
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                urlencoding::decode(s)
                    .map(std::borrow::Cow::into_owned)
                    .map_err(|err| PathError::InvalidEncoding(format!("{s}: {err}")))
            })
            .collect::<Result<Vec<String>, PathError>>()?;

        let resource = match segments.as_slice() {
            [] => Resource::service_root(),
            [user] => Resource::principal(user),
            [user, home, rest @ ..] => {
                if home != CALDAV_ROUTE_COMPONENT {
                    return Err(PathError::NotCalendarHome(home.clone()));
                }
                match rest {
                    [] => Resource::home_set(user),
                    [calendar] => Resource::collection(user, calendar),
                    [calendar, object] => Resource::object(user, calendar, object),
                    _ => return Err(PathError::TooManySegments(segments.len())),
                }
            }
        };

        let uri = self.encode_path(&resource)?;
        Ok(resource.with_uri(uri))
    }

    /// ## Summary
    /// Encodes a resource as an absolute path under the prefix.
    ///
    /// Containers end in `/`, objects do not.
    ///
    /// ## Errors
    /// Returns an error if the resource lacks an id its kind requires, carries
    /// one it must not, or is `Unknown`.
    pub fn encode_path(&self, resource: &Resource) -> Result<String, PathError> {
        let kind = resource.kind;
        let need = |value: Option<&str>, field: &'static str| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| urlencoding::encode(v).into_owned())
                .ok_or(PathError::MissingField { kind, field })
        };
        let forbid = |value: Option<&str>, field: &'static str| match value {
            Some(_) => Err(PathError::UnexpectedField { kind, field }),
            None => Ok(()),
        };

        let tail = match kind {
            ResourceType::ServiceRoot => {
                forbid(resource.user_id(), "user_id")?;
                forbid(resource.calendar_id(), "calendar_id")?;
                forbid(resource.object_id(), "object_id")?;
                String::new()
            }
            ResourceType::Principal => {
                forbid(resource.calendar_id(), "calendar_id")?;
                forbid(resource.object_id(), "object_id")?;
                format!("{}/", need(resource.user_id(), "user_id")?)
            }
            ResourceType::HomeSet => {
                forbid(resource.calendar_id(), "calendar_id")?;
                forbid(resource.object_id(), "object_id")?;
                format!(
                    "{}/{CALDAV_ROUTE_COMPONENT}/",
                    need(resource.user_id(), "user_id")?
                )
            }
            ResourceType::Collection => {
                forbid(resource.object_id(), "object_id")?;
                format!(
                    "{}/{CALDAV_ROUTE_COMPONENT}/{}/",
                    need(resource.user_id(), "user_id")?,
                    need(resource.calendar_id(), "calendar_id")?
                )
            }
            ResourceType::Object => format!(
                "{}/{CALDAV_ROUTE_COMPONENT}/{}/{}",
                need(resource.user_id(), "user_id")?,
                need(resource.calendar_id(), "calendar_id")?,
                need(resource.object_id(), "object_id")?
            ),
            ResourceType::Unknown => return Err(PathError::UnknownResource),
        };

        Ok(format!("{}/{tail}", self.prefix))
    }

    /// Returns the resource's cached URI, encoding it if none is attached.
    ///
    /// ## Errors
    /// Returns an error if the resource cannot be encoded.
    pub fn href(&self, resource: &Resource) -> Result<String, PathError> {
        match resource.uri() {
            Some(uri) => Ok(uri.to_string()),
            None => self.encode_path(resource),
        }
    }

    fn strip_prefix<'a>(&self, path: &'a str) -> Result<&'a str, PathError> {
        let mut path = path.trim();
        for scheme in ["http://", "https://"] {
            if let Some(rest) = path.strip_prefix(scheme) {
                path = rest.find('/').map_or("", |i| &rest[i..]);
            }
        }
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_start_matches('/');

        let prefix = self.prefix.trim_start_matches('/');
        if prefix.is_empty() {
            return Ok(path);
        }

        match path.strip_prefix(prefix) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => Ok(rest),
            _ => Err(PathError::OutsidePrefix(path.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dav() -> PathCodec {
        PathCodec::new("/dav")
    }

    #[test]
    fn parses_object_without_prefix() {
        let resource = PathCodec::new("")
            .parse_path("alice/cal/personal/event1.ics")
            .expect("object path");
        assert_eq!(
            resource,
            Resource::object("alice", "personal", "event1.ics")
        );
        assert_eq!(resource.uri(), Some("/alice/cal/personal/event1.ics"));
    }

    #[test]
    fn classifies_by_segment_count() {
        let codec = dav();
        assert_eq!(codec.parse_path("/dav"), Ok(Resource::service_root()));
        assert_eq!(codec.parse_path("/dav/"), Ok(Resource::service_root()));
        assert_eq!(codec.parse_path("/dav/alice"), Ok(Resource::principal("alice")));
        assert_eq!(codec.parse_path("/dav/alice/cal/"), Ok(Resource::home_set("alice")));
        assert_eq!(
            codec.parse_path("/dav/alice/cal/work/"),
            Ok(Resource::collection("alice", "work"))
        );
    }

    #[test]
    fn rejects_malformed_paths() {
        let codec = dav();
        assert_eq!(
            codec.parse_path("/dav/alice/card/"),
            Err(PathError::NotCalendarHome("card".into()))
        );
        assert_eq!(
            codec.parse_path("/dav/alice/x/work/"),
            Err(PathError::NotCalendarHome("x".into()))
        );
        assert_eq!(
            codec.parse_path("/dav/alice/cal/work/a.ics/extra"),
            Err(PathError::TooManySegments(5))
        );
        assert!(matches!(
            codec.parse_path("/other/alice/"),
            Err(PathError::OutsidePrefix(_))
        ));
        assert!(matches!(
            codec.parse_path("/davx/alice/"),
            Err(PathError::OutsidePrefix(_))
        ));
    }

    #[test]
    fn accepts_absolute_urls_and_ignores_query() {
        assert_eq!(
            dav().parse_path("https://cal.example.com/dav/alice/cal/work/a.ics?x=1"),
            Ok(Resource::object("alice", "work", "a.ics"))
        );
    }

    #[test]
    fn round_trips_well_formed_resources() {
        let codec = dav();
        let resources = [
            Resource::service_root(),
            Resource::principal("alice"),
            Resource::home_set("alice"),
            Resource::collection("alice", "work"),
            Resource::object("alice", "work", "meeting 1@example.com.ics"),
        ];
        for resource in resources {
            let encoded = codec.encode_path(&resource).expect("encode");
            assert_eq!(codec.parse_path(&encoded), Ok(resource));
        }
    }

    #[test]
    fn encode_requires_exact_shape() {
        let codec = dav();
        assert_eq!(
            codec.encode_path(&Resource::new(ResourceType::Object, Some("a".into()), None, None)),
            Err(PathError::MissingField {
                kind: ResourceType::Object,
                field: "calendar_id"
            })
        );
        assert_eq!(
            codec.encode_path(&Resource::new(
                ResourceType::Principal,
                Some("a".into()),
                Some("c".into()),
                None
            )),
            Err(PathError::UnexpectedField {
                kind: ResourceType::Principal,
                field: "calendar_id"
            })
        );
        assert_eq!(
            codec.encode_path(&Resource::new(ResourceType::Unknown, None, None, None)),
            Err(PathError::UnknownResource)
        );
        assert_eq!(
            codec.encode_path(&Resource::collection("alice", "work")),
            Ok("/dav/alice/cal/work/".to_string())
        );
    }
}
