//! Ordered multi-valued metadata for gRPC-Web trailers.

use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};

use crate::error::CodecError;
use crate::trailer::{self, LINE_SEPARATOR, NAME_SEPARATOR};

/// An ordered multi-map from header names to header values.
///
/// Names are case-sensitive and keep their first-insertion order; values keep
/// the order they were appended in. Linear lookup is fine here: trailers
/// rarely carry more than a handful of names.
///
/// # Example
///
/// ```
/// use grpc_web_codec::Metadata;
///
/// let mut metadata = Metadata::new();
/// metadata.append("x-status", "ok");
/// metadata.append("x-status", "retry");
///
/// assert_eq!(metadata.get("x-status"), Some("ok"));
/// assert_eq!(metadata.get_all("x-status"), ["ok", "retry"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, Vec<String>)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the line-based trailer text format.
    ///
    /// The text is split on `"\r\n"`, then each line on its first `": "`.
    /// Name and value are trimmed. Lines without the separator, lines with a
    /// blank name, and blank values are skipped.
    pub fn parse(raw: &str) -> Self {
        let mut metadata = Metadata::new();
        for line in raw.split(LINE_SEPARATOR) {
            let Some((name, value)) = line.split_once(NAME_SEPARATOR) else {
                continue;
            };
            let (name, value) = (trailer::trim(name), trailer::trim(value));
            if name.is_empty() || value.is_empty() {
                continue;
            }
            metadata.append(name, value);
        }
        metadata
    }

    /// Add a value under `name`, after any existing values.
    pub fn append<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Replace every value under `name` with `value`.
    ///
    /// A new name goes to the end; an existing one keeps its position.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1 = vec![value],
            None => self.entries.push((name, vec![value])),
        }
    }

    /// First value under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// All values under `name`, empty when absent.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.position(name)
            .map(|idx| self.entries[idx].1.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        let idx = self.position(name)?;
        Some(self.entries.remove(idx).1)
    }

    /// Iterate `(name, values)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The form this metadata takes after a trailer round trip.
    ///
    /// Values and names are trimmed, blank values are dropped, and names left
    /// without values (or with a blank name) disappear. Order is preserved.
    pub fn canonicalize(&self) -> Metadata {
        let mut canonical = Metadata::new();
        for (name, values) in self.iter() {
            let name = trailer::trim(name);
            if name.is_empty() {
                continue;
            }
            for value in values.iter().map(|v| trailer::trim(v)).filter(|v| !v.is_empty()) {
                canonical.append(name, value);
            }
        }
        canonical
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Metadata::new();
        metadata.extend(iter);
        metadata
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Metadata {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.append(name, value);
        }
    }
}

impl From<&HeaderMap> for Metadata {
    /// Non-UTF-8 header values are skipped.
    fn from(headers: &HeaderMap) -> Self {
        let mut metadata = Metadata::new();
        for (name, value) in headers.iter() {
            if let Ok(v) = value.to_str() {
                metadata.append(name.as_str(), v);
            }
        }
        metadata
    }
}

impl TryFrom<&Metadata> for HeaderMap {
    type Error = CodecError;

    /// Fails when a name or value is not a legal HTTP header token. Header
    /// names are lowercased by `http`.
    fn try_from(metadata: &Metadata) -> Result<Self, Self::Error> {
        let mut headers = HeaderMap::new();
        for (name, values) in metadata.iter() {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                CodecError::MalformedPayload(format!("invalid header name {name:?}: {e}"))
            })?;
            for value in values {
                let header_value = HeaderValue::from_str(value).map_err(|e| {
                    CodecError::MalformedPayload(format!(
                        "invalid value for header {name:?}: {e}"
                    ))
                })?;
                headers.append(header_name.clone(), header_value);
            }
        }
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_order() {
        let mut metadata = Metadata::new();
        metadata.append("b", "1");
        metadata.append("a", "2");
        metadata.append("b", "3");

        let entries: Vec<_> = metadata.iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ("b", &["1".to_string(), "3".to_string()][..]));
        assert_eq!(entries[1], ("a", &["2".to_string()][..]));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let metadata: Metadata = [("X-Trace", "1"), ("x-trace", "2")].into_iter().collect();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.get("X-Trace"), Some("1"));
        assert_eq!(metadata.get("x-trace"), Some("2"));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut metadata: Metadata = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        metadata.insert("a", "4");

        assert_eq!(metadata.get_all("a"), ["4"]);
        assert_eq!(metadata.keys().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_get_missing_and_remove() {
        let mut metadata: Metadata = [("a", "1")].into_iter().collect();
        assert_eq!(metadata.get("missing"), None);
        assert!(metadata.get_all("missing").is_empty());

        assert_eq!(metadata.remove("a"), Some(vec!["1".to_string()]));
        assert!(metadata.is_empty());
        assert_eq!(metadata.remove("a"), None);
    }

    #[test]
    fn test_parse_lines() {
        let metadata = Metadata::parse("grpc-status: 0\r\ngrpc-message: all good\r\nx-a: 1\r\nx-a: 2");
        assert_eq!(metadata.get("grpc-status"), Some("0"));
        assert_eq!(metadata.get("grpc-message"), Some("all good"));
        assert_eq!(metadata.get_all("x-a"), ["1", "2"]);
    }

    #[test]
    fn test_parse_splits_on_first_separator() {
        let metadata = Metadata::parse("x-url: http: //host: 80");
        assert_eq!(metadata.get("x-url"), Some("http: //host: 80"));
    }

    #[test]
    fn test_parse_trims_and_skips_blank() {
        let metadata = Metadata::parse("  x-a  :   spaced value  \r\nx-b:    \r\n: orphan\r\nno separator\r\n\r\n");
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata.get("x-a"), Some("spaced value"));
    }

    #[test]
    fn test_parse_trims_byte_order_mark() {
        let metadata = Metadata::parse("\u{feff}x-a: \u{feff}1\r\nx-b: \u{feff}");
        assert_eq!(metadata.get("x-a"), Some("1"));
        assert!(!metadata.contains("x-b"));
    }

    #[test]
    fn test_parse_empty() {
        assert!(Metadata::parse("").is_empty());
    }

    #[test]
    fn test_canonicalize() {
        let mut metadata = Metadata::new();
        metadata.append("x-status", "  ok  ");
        metadata.append("x-status", "");
        metadata.append("x-blank", "   ");
        metadata.append("x-bom", "\u{feff}\u{a0}");
        metadata.append("", "nameless");
        metadata.append("x-inner", " a  b ");

        let canonical = metadata.canonicalize();
        let expected: Metadata = [("x-status", "ok"), ("x-inner", "a  b")].into_iter().collect();
        assert_eq!(canonical, expected);
    }

    #[test]
    fn test_header_map_conversions() {
        let mut headers = HeaderMap::new();
        headers.append("grpc-status", HeaderValue::from_static("0"));
        headers.append("x-multi", HeaderValue::from_static("a"));
        headers.append("x-multi", HeaderValue::from_static("b"));

        let metadata = Metadata::from(&headers);
        assert_eq!(metadata.get("grpc-status"), Some("0"));
        assert_eq!(metadata.get_all("x-multi"), ["a", "b"]);

        let back = HeaderMap::try_from(&metadata).unwrap();
        assert_eq!(back, headers);
    }

    #[test]
    fn test_header_map_rejects_illegal_tokens() {
        let metadata: Metadata = [("bad name", "v")].into_iter().collect();
        let err = HeaderMap::try_from(&metadata).unwrap_err();
        assert!(err.is_malformed_payload());

        let metadata: Metadata = [("x-ok", "line\nbreak")].into_iter().collect();
        assert!(HeaderMap::try_from(&metadata).is_err());
    }
}
