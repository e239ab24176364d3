//! JSON codecs for `application/grpc-web+json`.
//!
//! - [`JsonCodec`]: the UTF-8 JSON text of the payload, nothing else
//! - [`CompressedJsonCodec`]: the same JSON bytes run through a compressor
//!   (gzip by default), announced via `content-encoding`
//!
//! Neither adds framing: the length-prefixed gRPC-Web frame belongs to the
//! transport.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec::Codec;
use crate::compression::{
    BoxedCompressor, Compression, CompressionEncoding, Compressor, GzipCompressor,
};
use crate::error::CodecError;
use crate::payload::Payload;

/// Content type shared by the JSON codecs.
pub const GRPC_WEB_JSON: &str = "application/grpc-web+json";

/// Serialize a payload to JSON bytes, rejecting [`Payload::Missing`].
pub(crate) fn encode_json<T: Serialize>(payload: &Payload<T>) -> Result<Vec<u8>, CodecError> {
    match payload {
        Payload::Missing => Err(CodecError::InvalidPayload(
            "a payload cannot be missing".into(),
        )),
        Payload::Null => Ok(b"null".to_vec()),
        Payload::Value(value) => serde_json::to_vec(value)
            .map_err(|e| CodecError::InvalidPayload(format!("payload is not JSON-serializable: {e}"))),
    }
}

/// Parse UTF-8 JSON bytes into a payload. `null` becomes [`Payload::Null`].
pub(crate) fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<Payload<T>, CodecError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| CodecError::MalformedPayload(format!("payload is not valid UTF-8: {e}")))?;
    let value: Option<T> = serde_json::from_str(text)
        .map_err(|e| CodecError::MalformedPayload(format!("payload is not valid JSON: {e}")))?;
    Ok(value.into())
}

/// Uncompressed JSON codec.
///
/// # Example
///
/// ```
/// use grpc_web_codec::{Codec, JsonCodec, Payload};
///
/// let codec = JsonCodec;
/// assert_eq!(<JsonCodec as Codec<()>>::content_encoding(&codec), None);
///
/// let err = codec.encode_message("/svc/Method", &Payload::<u32>::Missing).unwrap_err();
/// assert!(err.is_invalid_payload());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    fn encode<T: Serialize>(&self, method: &str, payload: &Payload<T>) -> Result<Bytes, CodecError> {
        let encoded = encode_json(payload).inspect_err(|e| {
            tracing::debug!(method, error = %e, "failed to encode JSON payload");
        })?;
        tracing::trace!(method, bytes = encoded.len(), "encoded JSON payload");
        Ok(Bytes::from(encoded))
    }

    fn decode<T: DeserializeOwned>(&self, method: &str, bytes: &[u8]) -> Result<Payload<T>, CodecError> {
        decode_json(bytes).inspect_err(|e| {
            tracing::debug!(method, len = bytes.len(), error = %e, "failed to decode JSON payload");
        })
    }
}

impl<T> Codec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned,
{
    fn content_type(&self) -> &'static str {
        GRPC_WEB_JSON
    }

    fn content_encoding(&self) -> Option<&'static str> {
        None
    }

    fn encode_request(&self, method: &str, payload: &Payload<T>) -> Result<Bytes, CodecError> {
        self.encode(method, payload)
    }

    fn decode_request(&self, method: &str, bytes: &[u8]) -> Result<Payload<T>, CodecError> {
        self.decode(method, bytes)
    }

    fn encode_message(&self, method: &str, payload: &Payload<T>) -> Result<Bytes, CodecError> {
        self.encode(method, payload)
    }

    fn decode_message(&self, method: &str, bytes: &[u8]) -> Result<Payload<T>, CodecError> {
        self.decode(method, bytes)
    }
}

/// JSON codec whose request and message bytes are compressed.
///
/// Trailers stay uncompressed. Each call compresses on its own; no state is
/// shared between calls or directions.
///
/// # Example
///
/// ```
/// use grpc_web_codec::{Codec, CompressedJsonCodec, Payload};
/// use serde_json::{Value, json};
///
/// let codec = CompressedJsonCodec::gzip();
/// assert_eq!(<CompressedJsonCodec as Codec<Value>>::content_encoding(&codec), Some("gzip"));
///
/// let payload = Payload::Value(json!({"greeting": "hello"}));
/// let bytes = codec.encode_message("/svc/Method", &payload).unwrap();
/// let decoded: Payload<Value> = codec.decode_message("/svc/Method", &bytes).unwrap();
/// assert_eq!(decoded, payload);
/// ```
#[derive(Debug, Clone)]
pub struct CompressedJsonCodec {
    compressor: BoxedCompressor,
}

impl Default for CompressedJsonCodec {
    fn default() -> Self {
        Self::gzip()
    }
}

impl CompressedJsonCodec {
    pub fn new<C: Compressor>(compressor: C) -> Self {
        Self::from_boxed(BoxedCompressor::new(compressor))
    }

    pub fn from_boxed(compressor: BoxedCompressor) -> Self {
        Self { compressor }
    }

    /// Gzip at the default level.
    pub fn gzip() -> Self {
        Self::new(GzipCompressor::default())
    }

    /// Build from a negotiated encoding. Returns `None` for identity, which
    /// is served by [`JsonCodec`].
    pub fn with_encoding(encoding: CompressionEncoding, level: Compression) -> Option<Self> {
        encoding.compressor_with_level(level).map(Self::from_boxed)
    }

    pub fn compressor(&self) -> &BoxedCompressor {
        &self.compressor
    }

    fn encode<T: Serialize>(&self, method: &str, payload: &Payload<T>) -> Result<Bytes, CodecError> {
        let json = encode_json(payload).inspect_err(|e| {
            tracing::debug!(method, error = %e, "failed to encode JSON payload");
        })?;
        let compressed = self.compressor.compress(&json).map_err(|e| {
            tracing::debug!(method, encoding = self.compressor.name(), error = %e, "compression failed");
            CodecError::Compression(e.to_string())
        })?;
        tracing::trace!(
            method,
            encoding = self.compressor.name(),
            json_bytes = json.len(),
            bytes = compressed.len(),
            "encoded compressed JSON payload"
        );
        Ok(compressed)
    }

    fn decode<T: DeserializeOwned>(&self, method: &str, bytes: &[u8]) -> Result<Payload<T>, CodecError> {
        let json = self.compressor.decompress(bytes).map_err(|e| {
            tracing::debug!(method, encoding = self.compressor.name(), len = bytes.len(), error = %e, "decompression failed");
            CodecError::MalformedPayload(format!(
                "payload is not a valid {} stream: {e}",
                self.compressor.name()
            ))
        })?;
        decode_json(&json).inspect_err(|e| {
            tracing::debug!(method, len = json.len(), error = %e, "failed to decode JSON payload");
        })
    }
}

impl<T> Codec<T> for CompressedJsonCodec
where
    T: Serialize + DeserializeOwned,
{
    fn content_type(&self) -> &'static str {
        GRPC_WEB_JSON
    }

    fn content_encoding(&self) -> Option<&'static str> {
        Some(self.compressor.name())
    }

    fn encode_request(&self, method: &str, payload: &Payload<T>) -> Result<Bytes, CodecError> {
        self.encode(method, payload)
    }

    fn decode_request(&self, method: &str, bytes: &[u8]) -> Result<Payload<T>, CodecError> {
        self.decode(method, bytes)
    }

    fn encode_message(&self, method: &str, payload: &Payload<T>) -> Result<Bytes, CodecError> {
        self.encode(method, payload)
    }

    fn decode_message(&self, method: &str, bytes: &[u8]) -> Result<Payload<T>, CodecError> {
        self.decode(method, bytes)
    }
}
