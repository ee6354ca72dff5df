//! Serializer engines for entity replies.
//!
//! Engines are addressed by identifier (`JSON`, `YAML`, `Dumper`) so that
//! configuration can name them as plain strings.

use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;
use serde_json::Value;

use crate::server::error::Error;

/// The serializers the server knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerializerKind {
    Json,
    Yaml,
    /// Perl `Data::Dumper` style output. Encode only.
    Dumper,
}

impl SerializerKind {
    /// The identifier used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            SerializerKind::Json => "JSON",
            SerializerKind::Yaml => "YAML",
            SerializerKind::Dumper => "Dumper",
        }
    }

    /// The content type this serializer produces unless overridden.
    pub fn content_type(&self) -> &'static str {
        match self {
            SerializerKind::Json => "application/json",
            SerializerKind::Yaml => "text/x-yaml",
            SerializerKind::Dumper => "text/x-data-dumper",
        }
    }

    /// Encode a value into response body bytes.
    pub fn serialize(&self, value: &Value) -> Result<Vec<u8>, Error> {
        match self {
            SerializerKind::Json => Ok(serde_json::to_vec(value)?),
            SerializerKind::Yaml => Ok(serde_yaml::to_string(value)?.into_bytes()),
            SerializerKind::Dumper => Ok(dump(value).into_bytes()),
        }
    }

    /// Decode request body bytes into a value.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Value, Error> {
        match self {
            SerializerKind::Json => Ok(serde_json::from_slice(bytes)?),
            SerializerKind::Yaml => Ok(serde_yaml::from_slice(bytes)?),
            SerializerKind::Dumper => Err(Error::DeserializeUnsupported(self.name())),
        }
    }
}

impl FromStr for SerializerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(SerializerKind::Json),
            "yaml" => Ok(SerializerKind::Yaml),
            "dumper" => Ok(SerializerKind::Dumper),
            _ => Err(Error::UnknownSerializer(s.to_string())),
        }
    }
}

impl fmt::Display for SerializerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Render a value the way `Data::Dumper` does with `Indent = 1` and sorted keys.
fn dump(value: &Value) -> String {
    let mut out = String::from("$VAR1 = ");
    write_dumped(&mut out, value, 1);
    out.push_str(";\n");
    out
}

fn write_dumped(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("undef"),
        Value::Bool(true) => out.push('1'),
        Value::Bool(false) => out.push_str("''"),
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            let _ = write!(out, "{n}");
        }
        Value::Number(n) => push_quoted(out, &n.to_string()),
        Value::String(s) => push_quoted(out, s),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                push_indent(out, depth);
                write_dumped(out, item, depth + 1);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth - 1);
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push_str("{\n");
            for (i, key) in keys.iter().enumerate() {
                push_indent(out, depth);
                push_quoted(out, key);
                out.push_str(" => ");
                write_dumped(out, &map[key.as_str()], depth + 1);
                if i + 1 < keys.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth - 1);
            out.push('}');
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn push_quoted(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
}
