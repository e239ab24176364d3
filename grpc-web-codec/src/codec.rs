//! The codec contract shared by every gRPC-Web wire format.
//!
//! A [`Codec`] turns application payloads into the bytes that fill a gRPC-Web
//! frame body and back, for three independent channels: the call request,
//! each response message, and the response trailers. It also declares the
//! `content-type` and `content-encoding` the transport must announce.
//!
//! Codecs are immutable after construction and may be shared across
//! concurrent calls. Pick one per channel with [`BoxedCodec::negotiate`] or by
//! constructing a concrete codec directly.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::compression::CompressionEncoding;
use crate::error::CodecError;
use crate::json::{CompressedJsonCodec, GRPC_WEB_JSON, JsonCodec};
use crate::metadata::Metadata;
use crate::payload::Payload;
use crate::trailer;

/// Encode/decode contract for payloads of type `T`.
///
/// `method` is the fully-qualified RPC method name. It is informational: a
/// codec may pick a representation per method, the JSON codecs ignore it.
///
/// # Example
///
/// ```
/// use grpc_web_codec::{Codec, JsonCodec, Payload};
/// use serde_json::{Value, json};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode_request("/echo.Echo/Say", &Payload::Value(json!({"a": 1}))).unwrap();
/// assert_eq!(&bytes[..], br#"{"a":1}"#);
///
/// let decoded: Payload<Value> = codec.decode_request("/echo.Echo/Say", &bytes).unwrap();
/// assert_eq!(decoded, Payload::Value(json!({"a": 1})));
/// ```
pub trait Codec<T>: Send + Sync + 'static {
    /// The `content-type` to advertise.
    fn content_type(&self) -> &'static str;

    /// The `content-encoding` to advertise, `None` when uncompressed.
    fn content_encoding(&self) -> Option<&'static str>;

    /// Encode the initial call payload.
    fn encode_request(&self, method: &str, payload: &Payload<T>) -> Result<Bytes, CodecError>;

    /// Decode the initial call payload.
    fn decode_request(&self, method: &str, bytes: &[u8]) -> Result<Payload<T>, CodecError>;

    /// Encode one response message.
    fn encode_message(&self, method: &str, payload: &Payload<T>) -> Result<Bytes, CodecError>;

    /// Decode one response message.
    fn decode_message(&self, method: &str, bytes: &[u8]) -> Result<Payload<T>, CodecError>;

    /// Encode the trailing status metadata. Trailers are plain text whatever
    /// the codec's content-encoding.
    fn encode_trailer(&self, metadata: &Metadata) -> Bytes {
        trailer::encode_trailer(metadata)
    }

    /// Decode the trailing status metadata.
    fn decode_trailer(&self, bytes: &[u8]) -> Result<Metadata, CodecError> {
        trailer::decode_trailer(bytes)
    }
}

/// A type-erased, cheaply cloneable codec.
pub struct BoxedCodec<T>(Arc<dyn Codec<T>>);

impl<T: 'static> BoxedCodec<T> {
    /// Wrap a concrete codec.
    pub fn new<C: Codec<T>>(codec: C) -> Self {
        BoxedCodec(Arc::new(codec))
    }

    /// The `content-type` to advertise.
    pub fn content_type(&self) -> &'static str {
        self.0.content_type()
    }

    /// The `content-encoding` to advertise, `None` when uncompressed.
    pub fn content_encoding(&self) -> Option<&'static str> {
        self.0.content_encoding()
    }

    /// Encode the initial call payload.
    pub fn encode_request(&self, method: &str, payload: &Payload<T>) -> Result<Bytes, CodecError> {
        self.0.encode_request(method, payload)
    }

    /// Decode the initial call payload.
    pub fn decode_request(&self, method: &str, bytes: &[u8]) -> Result<Payload<T>, CodecError> {
        self.0.decode_request(method, bytes)
    }

    /// Encode one response message.
    pub fn encode_message(&self, method: &str, payload: &Payload<T>) -> Result<Bytes, CodecError> {
        self.0.encode_message(method, payload)
    }

    /// Decode one response message.
    pub fn decode_message(&self, method: &str, bytes: &[u8]) -> Result<Payload<T>, CodecError> {
        self.0.decode_message(method, bytes)
    }

    /// Encode the trailing status metadata.
    pub fn encode_trailer(&self, metadata: &Metadata) -> Bytes {
        self.0.encode_trailer(metadata)
    }

    /// Decode the trailing status metadata.
    pub fn decode_trailer(&self, bytes: &[u8]) -> Result<Metadata, CodecError> {
        self.0.decode_trailer(bytes)
    }
}

impl<T> BoxedCodec<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    /// Select the codec matching a peer's declared `content-type` and
    /// `content-encoding`.
    ///
    /// Media type parameters (`; charset=...`) are ignored and the media type
    /// is compared case-insensitively. A missing, empty or `identity`
    /// encoding selects [`JsonCodec`].
    ///
    /// # Errors
    ///
    /// [`CodecError::Unsupported`] for any other content type, or for an
    /// encoding this build cannot decompress.
    pub fn negotiate(content_type: &str, content_encoding: Option<&str>) -> Result<Self, CodecError> {
        let media_type = content_type.split(';').next().unwrap_or_default().trim();
        if !media_type.eq_ignore_ascii_case(GRPC_WEB_JSON) {
            tracing::debug!(content_type, "no codec for content type");
            return Err(CodecError::Unsupported(format!(
                "content type {content_type:?}"
            )));
        }

        let Some(encoding) = CompressionEncoding::from_header(content_encoding) else {
            tracing::debug!(?content_encoding, "no codec for content encoding");
            return Err(CodecError::Unsupported(format!(
                "content encoding {:?}",
                content_encoding.unwrap_or_default()
            )));
        };

        Ok(match encoding.compressor() {
            None => BoxedCodec::new(JsonCodec),
            Some(compressor) => BoxedCodec::new(CompressedJsonCodec::from_boxed(compressor)),
        })
    }
}

impl<T> Clone for BoxedCodec<T> {
    fn clone(&self) -> Self {
        BoxedCodec(Arc::clone(&self.0))
    }
}

impl<T: 'static> std::fmt::Debug for BoxedCodec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedCodec")
            .field("content_type", &self.0.content_type())
            .field("content_encoding", &self.0.content_encoding())
            .finish()
    }
}
