//! gRPC-Web trailer encoding.
//!
//! Trailers travel as plain text, one `name: value` line per value, lines
//! joined with CRLF and no trailing separator:
//!
//! ```text
//! grpc-status: 0\r\ngrpc-message: ok\r\nx-request-id: 42
//! ```
//!
//! Trailers are never compressed, whatever the codec's content-encoding.
//!
//! Values are trimmed and blank values are dropped, so a round trip yields
//! [`Metadata::canonicalize`] of the input. Values containing CRLF, and names
//! containing `": "`, are not escaped; the output for such input is undefined.

use bytes::Bytes;

use crate::error::{Code, CodecError, Status};
use crate::metadata::Metadata;

/// Separator between trailer lines.
pub const LINE_SEPARATOR: &str = "\r\n";

/// Separator between a name and its value within a line.
pub const NAME_SEPARATOR: &str = ": ";

/// Trailer carrying the numeric status code.
pub const GRPC_STATUS: &str = "grpc-status";

/// Trailer carrying the status message.
pub const GRPC_MESSAGE: &str = "grpc-message";

/// Strip the whitespace a JavaScript peer's `String.prototype.trim` strips.
///
/// That set is Rust's `White_Space` minus U+0085 (NEL), plus U+FEFF.
pub(crate) fn trim(text: &str) -> &str {
    text.trim_matches(|c: char| c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}'))
}

/// Encode metadata into trailer text bytes.
pub fn encode_trailer(metadata: &Metadata) -> Bytes {
    let lines: Vec<String> = metadata
        .iter()
        .flat_map(|(name, values)| {
            values
                .iter()
                .map(|value| trim(value))
                .filter(|value| !value.is_empty())
                .map(move |value| format!("{name}{NAME_SEPARATOR}{value}"))
        })
        .collect();

    let encoded = Bytes::from(lines.join(LINE_SEPARATOR));
    tracing::trace!(lines = lines.len(), bytes = encoded.len(), "encoded trailer");
    encoded
}

/// Decode trailer text bytes into metadata.
///
/// # Errors
///
/// [`CodecError::MalformedPayload`] when the bytes are not UTF-8.
pub fn decode_trailer(bytes: &[u8]) -> Result<Metadata, CodecError> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        tracing::debug!(len = bytes.len(), error = %e, "trailer is not valid UTF-8");
        CodecError::MalformedPayload(format!("trailer is not valid UTF-8: {e}"))
    })?;
    Ok(Metadata::parse(text))
}

impl Status {
    /// Trailer metadata announcing this status.
    ///
    /// `grpc-message` is only written when a message is present.
    pub fn to_metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(GRPC_STATUS, self.code().as_i32().to_string());
        if let Some(message) = self.message() {
            metadata.insert(GRPC_MESSAGE, message);
        }
        metadata
    }

    /// Read the status out of trailer metadata.
    ///
    /// Returns `None` when `grpc-status` is absent. A status that is not a
    /// known number reads as [`Code::Unknown`].
    pub fn from_metadata(metadata: &Metadata) -> Option<Status> {
        let raw = metadata.get(GRPC_STATUS)?;
        let code = raw
            .trim()
            .parse::<i32>()
            .map(Code::from_i32)
            .unwrap_or(Code::Unknown);

        Some(match metadata.get(GRPC_MESSAGE) {
            Some(message) => Status::new(code, message),
            None => Status::from_code(code),
        })
    }
}
