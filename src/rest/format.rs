//! Format-suffix resolution.
//!
//! A request for `/user/1.yml` carries the format token `yml`. The table
//! maps each token to a content type and a serializer; the before hook built
//! by [`format_hook`] applies that choice to the response.

use std::collections::HashMap;
use std::sync::Arc;
use log::{debug, warn};

use crate::parser::HttpRequest;
use crate::rest::config::RestConfig;
use crate::rest::error::RestError;
use crate::server::{HookFn, HttpResponse, ResponseParts, SerializerKind, StatusCode};

/// Tokens understood without any configuration.
pub const DEFAULT_FORMATS: &[(&str, SerializerKind)] = &[
    ("json", SerializerKind::Json),
    ("yml", SerializerKind::Yaml),
    ("dump", SerializerKind::Dumper),
];

/// What a format token selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatEntry {
    pub content_type: String,
    pub serializer: SerializerKind,
}

impl FormatEntry {
    fn for_serializer(serializer: SerializerKind) -> Self {
        Self {
            content_type: serializer.content_type().to_string(),
            serializer,
        }
    }
}

/// Read-only mapping from format token to [`FormatEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTable {
    entries: HashMap<String, FormatEntry>,
}

impl Default for FormatTable {
    fn default() -> Self {
        let entries = DEFAULT_FORMATS
            .iter()
            .map(|(token, serializer)| (token.to_string(), FormatEntry::for_serializer(*serializer)))
            .collect();
        Self { entries }
    }
}

impl FormatTable {
    /// Build the table from the defaults with `config` merged on top.
    ///
    /// Serializer overrides are applied first, so a new token may appear in
    /// both maps. A new token that only has a content type is rejected.
    pub fn from_config(config: &RestConfig) -> Result<Self, RestError> {
        let mut table = Self::default();

        for (token, id) in &config.serializers {
            let serializer = id.parse::<SerializerKind>().map_err(|_| RestError::UnknownSerializer {
                format: token.clone(),
                serializer: id.clone(),
            })?;

            table
                .entries
                .entry(token.clone())
                .and_modify(|entry| entry.serializer = serializer)
                .or_insert_with(|| FormatEntry::for_serializer(serializer));
        }

        for (token, content_type) in &config.content_types {
            let entry = table
                .entries
                .get_mut(token)
                .ok_or_else(|| RestError::MissingSerializer(token.clone()))?;
            entry.content_type = content_type.clone();
        }

        Ok(table)
    }

    /// Look up a token. Matching is exact, so `JSON` is not `json`.
    pub fn resolve(&self, token: &str) -> Option<&FormatEntry> {
        self.entries.get(token)
    }

    /// Known tokens, sorted.
    pub fn tokens(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        tokens.sort_unstable();
        tokens
    }
}

/// Build the before hook that applies the request's `format` parameter.
///
/// No `format` leaves the server default in place. An unknown token halts the
/// request with `unsupported` before the handler runs.
pub fn format_hook(table: Arc<FormatTable>, unsupported: StatusCode) -> HookFn {
    Arc::new(move |request: &HttpRequest, parts: &mut ResponseParts| {
        let Some(token) = request.param("format") else {
            return Ok(());
        };

        match table.resolve(token) {
            Some(entry) => {
                debug!(
                    "{path}: format {token} selects {serializer} as {content_type}",
                    path = request.path_without_query(),
                    serializer = entry.serializer,
                    content_type = entry.content_type,
                );
                parts.set_content_type(entry.content_type.as_str());
                parts.set_serializer(entry.serializer);
                Ok(())
            }
            None => {
                warn!("{path}: unsupported format {token}", path = request.path_without_query());
                Err(HttpResponse::new(unsupported)
                    .with_content_type("text/plain")
                    .with_body_string(format!("unsupported format requested: {token}")))
            }
        }
    })
}
