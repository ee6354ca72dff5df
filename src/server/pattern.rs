//! Route path patterns.
//!
//! A pattern is a `/`-separated list of segments. Each segment is a literal
//! (`users`) or a capture (`:id`), optionally followed by a suffix capture
//! separated by a dot: `.:format` (required) or `[.:format]` (optional).
//!
//! ```
//! use microhttp_rest::server::PathPattern;
//!
//! let pattern: PathPattern = "/user/:id[.:format]".parse().unwrap();
//! let params = pattern.matches("/user/42.json").unwrap();
//! assert_eq!(params["id"], "42");
//! assert_eq!(params["format"], "json");
//! assert!(pattern.matches("/user/42").is_some());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::server::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Head {
    Literal(String),
    Capture(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Suffix {
    name: String,
    optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    head: Head,
    suffix: Option<Suffix>,
}

type Captures = Vec<(String, String)>;

impl Segment {
    fn match_head(&self, text: &str, captures: &mut Captures) -> bool {
        match &self.head {
            Head::Literal(literal) => literal == text,
            Head::Capture(name) => {
                if text.is_empty() {
                    return false;
                }
                captures.push((name.clone(), text.to_string()));
                true
            }
        }
    }

    fn matches(&self, text: &str) -> Option<Captures> {
        let Some(suffix) = &self.suffix else {
            let mut captures = Vec::new();
            return self.match_head(text, &mut captures).then_some(captures);
        };

        // Prefer reading the text after the last dot as the suffix
        if let Some((head, ext)) = text.rsplit_once('.') {
            let mut captures = Vec::new();
            if !ext.is_empty() && self.match_head(head, &mut captures) {
                captures.push((suffix.name.clone(), ext.to_string()));
                return Some(captures);
            }
        }

        if suffix.optional {
            let mut captures = Vec::new();
            return self.match_head(text, &mut captures).then_some(captures);
        }
        None
    }
}

/// A parsed route pattern such as `/user/:id[.:format]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern. It must start with `/` and capture names must be unique.
    pub fn parse(source: &str) -> Result<Self, Error> {
        let invalid = |reason: &str| Error::InvalidPattern(source.to_string(), reason.to_string());

        let rest = source
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;

        let mut segments = Vec::new();
        let mut names: Vec<&str> = Vec::new();

        for raw in rest.split('/') {
            let (head, suffix) = if let Some(body) = raw.strip_suffix(']') {
                let start = body.rfind("[.:").ok_or_else(|| invalid("unbalanced ']'"))?;
                (&body[..start], Some((&body[start + 3..], true)))
            } else if let Some(pos) = raw.find(".:") {
                (&raw[..pos], Some((&raw[pos + 2..], false)))
            } else {
                (raw, None)
            };

            let head = match head.strip_prefix(':') {
                Some(name) => {
                    if !is_valid_name(name) {
                        return Err(invalid("invalid capture name"));
                    }
                    names.push(name);
                    Head::Capture(name.to_string())
                }
                None if head.is_empty() && suffix.is_some() => {
                    return Err(invalid("suffix needs a segment to attach to"));
                }
                None => Head::Literal(head.to_string()),
            };

            let suffix = match suffix {
                Some((name, optional)) => {
                    if !is_valid_name(name) {
                        return Err(invalid("invalid suffix name"));
                    }
                    names.push(name);
                    Some(Suffix {
                        name: name.to_string(),
                        optional,
                    })
                }
                None => None,
            };

            segments.push(Segment { head, suffix });
        }

        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != names.len() {
            return Err(invalid("duplicate capture name"));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The pattern as it was written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match a request path (without query string) against this pattern.
    ///
    /// Returns the captured values keyed by name, or `None` when the path
    /// does not fit the pattern.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            params.extend(segment.matches(part)?);
        }
        Some(params)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FromStr for PathPattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
