//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::str::FromStr;
use serde::de::DeserializeOwned;

use crate::parser::error::Error;
use crate::parser::line::{HttpVersion, Method};

/// Represents an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target, including any query string
    pub path: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The HTTP headers
    pub headers: HashMap<String, String>,
    /// The request body
    pub body: Vec<u8>,
    /// Query parameters parsed from the path
    pub query_params: HashMap<String, String>,
    /// Values captured by the matched route pattern, filled in by the router
    pub params: HashMap<String, String>,
}

impl HttpRequest {
    /// Create a new HTTP request with an empty body.
    ///
    /// Query parameters are split out of `path`; route params start empty.
    pub fn new(method: Method, path: String, version: HttpVersion, headers: HashMap<String, String>) -> Self {
        let query_params = path
            .split_once('?')
            .map(|(_, query)| parse_query(query))
            .unwrap_or_default();

        Self {
            method,
            path,
            version,
            headers,
            body: Vec::new(),
            query_params,
            params: HashMap::new(),
        }
    }

    /// Create a new HTTP request with a body.
    pub fn with_body(method: Method, path: String, version: HttpVersion, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        let mut request = Self::new(method, path, version, headers);
        request.body = body;
        request
    }

    /// The request path with the query string removed.
    pub fn path_without_query(&self) -> &str {
        match self.path.split_once('?') {
            Some((path, _)) => path,
            None => &self.path,
        }
    }

    /// Get a header value. Header names are matched case-insensitively.
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                Some(v)
            } else {
                None
            }
        })
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    /// Look up a request parameter.
    ///
    /// Route captures take precedence over query parameters of the same name.
    ///
    /// # Arguments
    ///
    /// * `name` - The parameter name
    ///
    /// # Returns
    ///
    /// The parameter value, if either source carries it
    pub fn param(&self, name: &str) -> Option<&String> {
        self.params.get(name).or_else(|| self.query_params.get(name))
    }

    /// Parse the request body as JSON.
    ///
    /// # Returns
    ///
    /// The parsed JSON value, or an error if the body is not valid JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        if !self.is_json() {
            return Err(Error::MissingHeader("Content-Type: application/json".to_string()));
        }

        let json = serde_json::from_slice(&self.body)?;
        Ok(json)
    }

    /// Check if the request has a JSON body.
    pub fn is_json(&self) -> bool {
        if let Some(content_type) = self.get_header("Content-Type") {
            content_type.starts_with("application/json")
        } else {
            false
        }
    }

    /// Get a query parameter value.
    pub fn get_query_param(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    /// Check if a query parameter exists.
    pub fn has_query_param(&self, name: &str) -> bool {
        self.query_params.contains_key(name)
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| {
            if let Some((k, v)) = pair.split_once('=') {
                (k.to_string(), v.to_string())
            } else {
                (pair.to_string(), String::new())
            }
        })
        .collect()
}

/// Locate the end of the header block.
///
/// Returns the length of the head and the length of the separator that
/// terminated it, accepting bare `\n\n` as well as `\r\n\r\n`.
fn split_head(input: &[u8]) -> Option<(usize, usize)> {
    if let Some(pos) = input.windows(4).position(|w| w == b"\r\n\r\n") {
        return Some((pos, 4));
    }
    input.windows(2).position(|w| w == b"\n\n").map(|pos| (pos, 2))
}

fn content_length(headers: &HashMap<String, String>) -> Result<Option<usize>, Error> {
    let value = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("Content-Length"))
        .map(|(_, v)| v);

    match value {
        Some(v) => v
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| Error::InvalidContentLength(v.clone())),
        None => Ok(None),
    }
}

/// Total byte length of the request in `input`, once the head is complete.
///
/// Returns `None` while the header block has not fully arrived. Used by the
/// server to decide when to stop reading from the socket. An announced length
/// too large to represent saturates at `usize::MAX`.
pub fn request_len(input: &[u8]) -> Option<usize> {
    let (head_len, sep_len) = split_head(input)?;
    let head = std::str::from_utf8(&input[..head_len]).ok()?;

    let body_len = head
        .lines()
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("Content-Length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    Some((head_len + sep_len).saturating_add(body_len))
}

/// Parse an HTTP request from a byte slice.
///
/// # Arguments
///
/// * `input` - A byte slice containing the HTTP request to parse
///
/// # Returns
///
/// The parsed HTTP request, or an error if the request is invalid
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    if input.is_empty() {
        return Err(Error::EmptyRequest);
    }

    let (head, rest) = match split_head(input) {
        Some((head_len, sep_len)) => (&input[..head_len], &input[head_len + sep_len..]),
        None => (input, &input[input.len()..]),
    };

    let head = std::str::from_utf8(head)
        .map_err(|_| Error::MalformedRequestLine("Invalid UTF-8".to_string()))?;

    let mut lines = head.lines();

    let request_line = match lines.next() {
        Some(line) if !line.trim().is_empty() => line,
        _ => return Err(Error::EmptyRequest),
    };

    // Split the request line into method, path, and version
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    }

    let method = Method::from_str(parts[0])?;

    let path = parts[1].to_string();
    if !path.starts_with('/') {
        return Err(Error::InvalidPath);
    }

    let version = HttpVersion::from_str(parts[2])?;

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }

        let (name, value) = line.split_once(':').ok_or(Error::InvalidHeaderFormat)?;
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }

    if version.requires_host() && !headers.keys().any(|k| k.eq_ignore_ascii_case("Host")) {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    let body = match content_length(&headers)? {
        Some(expected) if rest.len() < expected => {
            return Err(Error::IncompleteBody { expected, actual: rest.len() });
        }
        Some(expected) => rest[..expected].to_vec(),
        None => rest.to_vec(),
    };

    Ok(HttpRequest::with_body(method, path, version, headers, body))
}
