//! Href parsing and canonical href construction
//!
//! Every resource in the API is addressed by an href. Clients send hrefs in
//! several shapes, and all of them reduce to the same [`ResourceLocator`]:
//!
//! - `http://localhost:3000/api/vms/123` - absolute URL
//! - `http://localhost:3000/api/v1.2.3/vms/123` - absolute URL with version
//! - `/api/vms/123` - path only
//! - `/api/v1.2.3/vms/123` - path only with version
//! - `vms/123` - bare collection and id
//!
//! ## Example
//!
//! ```rust
//! use resource_api::href::{parse_href, ResourceLocator};
//!
//! let locator = parse_href("http://localhost:3000/api/v1.2.3/vms/123").unwrap();
//! assert_eq!(locator, ResourceLocator::member("vms", 123));
//! assert_eq!(parse_href("vms/123").unwrap(), locator);
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Regex for the API version segment (e.g. `v1`, `v1.2.3`)
static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+(?:\.\d+)*$").expect("version regex is valid"));

/// Default path prefix under which the API is mounted
pub const DEFAULT_PREFIX: &str = "api";

/// Href parsing error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HrefError {
    /// No collection segment left after stripping host, prefix and version
    #[error("Malformed href '{0}': no collection segment")]
    Malformed(String),
}

/// Canonical address of a collection or a single resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceLocator {
    /// Collection name (e.g. "vms"), never empty
    pub collection: String,
    /// Resource id, present only when the href names a single resource
    pub id: Option<i64>,
}

impl ResourceLocator {
    /// Locator for a whole collection
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: None,
        }
    }

    /// Locator for a single resource within a collection
    pub fn member(collection: impl Into<String>, id: i64) -> Self {
        Self {
            collection: collection.into(),
            id: Some(id),
        }
    }

    /// Check if this locator names a single resource
    pub fn is_member(&self) -> bool {
        self.id.is_some()
    }

    /// Build the canonical href below `base` (e.g. `http://localhost:3000/api`)
    pub fn href(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self)
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}/{}", self.collection, id),
            None => write!(f, "{}", self.collection),
        }
    }
}

impl FromStr for ResourceLocator {
    type Err = HrefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_href(s)
    }
}

/// Result of parsing an href, keeping the version segment when one was given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHref {
    /// The resource the href points at
    pub locator: ResourceLocator,
    /// Version segment as written (e.g. "v1.2.3"), not validated
    pub version: Option<String>,
}

/// Href parser with a configurable API prefix
#[derive(Debug, Clone)]
pub struct HrefParser {
    prefix: Vec<String>,
}

impl Default for HrefParser {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl HrefParser {
    /// Create a parser for an API mounted under `prefix` ("api", "/api/" and
    /// "/api" are equivalent; nested prefixes such as "/manageiq/api" work too)
    pub fn new(prefix: impl AsRef<str>) -> Self {
        Self {
            prefix: prefix
                .as_ref()
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Parse an href into a locator, discarding any version segment
    pub fn parse(&self, raw: &str) -> Result<ResourceLocator, HrefError> {
        self.parse_versioned(raw).map(|parsed| parsed.locator)
    }

    /// Parse an href into a locator and the version segment it carried
    pub fn parse_versioned(&self, raw: &str) -> Result<ParsedHref, HrefError> {
        // Query and fragment go first so a URL inside them is never taken as the host
        let path = raw.trim().split(['?', '#']).next().unwrap_or_default();
        let path = strip_scheme_and_host(path);

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let rest = self.strip_prefix(&segments);
        let mut segments = rest.iter().copied().peekable();

        let version = segments
            .next_if(|s| VERSION_REGEX.is_match(s))
            .map(str::to_string);

        let collection = segments
            .next()
            .ok_or_else(|| HrefError::Malformed(raw.to_string()))?;

        // Non-numeric id segments leave the id absent
        let id = segments.next().and_then(parse_id);

        tracing::trace!(href = raw, collection, ?id, ?version, "Parsed href");

        Ok(ParsedHref {
            locator: ResourceLocator {
                collection: collection.to_string(),
                id,
            },
            version,
        })
    }

    /// The prefix is stripped only when every one of its segments matches
    fn strip_prefix<'a, 'b>(&self, segments: &'b [&'a str]) -> &'b [&'a str] {
        let matches = segments.len() >= self.prefix.len()
            && self.prefix.iter().zip(segments).all(|(p, s)| p == s);
        if matches {
            &segments[self.prefix.len()..]
        } else {
            segments
        }
    }
}

/// Parse an href using the default `/api` prefix
pub fn parse_href(raw: &str) -> Result<ResourceLocator, HrefError> {
    HrefParser::default().parse(raw)
}

/// Parse an href using the default `/api` prefix, keeping the version segment
pub fn parse_href_versioned(raw: &str) -> Result<ParsedHref, HrefError> {
    HrefParser::default().parse_versioned(raw)
}

fn strip_scheme_and_host(raw: &str) -> &str {
    // A scheme only counts when it comes before the first path separator
    let scheme_end = raw.find("://").filter(|pos| !raw[..*pos].contains('/'));

    match scheme_end {
        Some(pos) => {
            let after_scheme = &raw[pos + 3..];
            match after_scheme.find('/') {
                Some(path_start) => &after_scheme[path_start..],
                None => "",
            }
        }
        None => raw,
    }
}

fn parse_id(segment: &str) -> Option<i64> {
    if segment.bytes().all(|b| b.is_ascii_digit()) {
        segment.parse().ok()
    } else {
        None
    }
}
