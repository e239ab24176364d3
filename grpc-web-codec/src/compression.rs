//! Byte-stream compressors behind [`CompressedJsonCodec`](crate::CompressedJsonCodec).
//!
//! Two `content-encoding` tokens are understood, both backed by flate2:
//! `gzip` (RFC 1952 members) and `deflate`, which HTTP defines as a zlib
//! stream (RFC 1950) rather than raw DEFLATE.
//!
//! Each call works on one whole buffer. Decoding is strict: the input must
//! be consumed entirely, so a valid stream followed by stray bytes is an
//! error rather than a silently truncated read.

use std::io::{self, Read, Write};
use std::sync::Arc;

use bytes::Bytes;
use flate2::bufread::{MultiGzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};

pub use flate2::Compression;

/// A lossless whole-buffer compressor named by its `content-encoding` token.
pub trait Compressor: Send + Sync + 'static {
    /// The `content-encoding` token, e.g. `"gzip"`.
    fn name(&self) -> &'static str;

    fn compress(&self, data: &[u8]) -> io::Result<Bytes>;

    /// Fails when `data` is not exactly one valid stream of this format.
    fn decompress(&self, data: &[u8]) -> io::Result<Bytes>;
}

/// Shared handle to a compressor chosen at runtime.
#[derive(Clone)]
pub struct BoxedCompressor(Arc<dyn Compressor>);

impl BoxedCompressor {
    pub fn new<C: Compressor>(compressor: C) -> Self {
        BoxedCompressor(Arc::new(compressor))
    }

    /// See [`Compressor::name`].
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// See [`Compressor::compress`].
    pub fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
        self.0.compress(data)
    }

    /// See [`Compressor::decompress`].
    pub fn decompress(&self, data: &[u8]) -> io::Result<Bytes> {
        self.0.decompress(data)
    }
}

impl std::fmt::Debug for BoxedCompressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BoxedCompressor").field(&self.name()).finish()
    }
}

/// `gzip` encoding.
///
/// Output is a single gzip member. Input may hold several concatenated
/// members, which decode to the concatenation of their contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GzipCompressor {
    level: Compression,
}

impl GzipCompressor {
    pub fn new(level: Compression) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Compression {
        self.level
    }
}

impl Compressor for GzipCompressor {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
        let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), self.level);
        encoder.write_all(data)?;
        encoder.finish().map(Bytes::from)
    }

    fn decompress(&self, data: &[u8]) -> io::Result<Bytes> {
        let mut decoder = MultiGzDecoder::new(data);
        let mut plain = Vec::new();
        decoder.read_to_end(&mut plain)?;
        ensure_consumed(self.name(), decoder.into_inner())?;
        Ok(Bytes::from(plain))
    }
}

/// HTTP `deflate` encoding: one zlib stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeflateCompressor {
    level: Compression,
}

impl DeflateCompressor {
    pub fn new(level: Compression) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Compression {
        self.level
    }
}

impl Compressor for DeflateCompressor {
    fn name(&self) -> &'static str {
        "deflate"
    }

    fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), self.level);
        encoder.write_all(data)?;
        encoder.finish().map(Bytes::from)
    }

    fn decompress(&self, data: &[u8]) -> io::Result<Bytes> {
        let mut decoder = ZlibDecoder::new(data);
        let mut plain = Vec::new();
        decoder.read_to_end(&mut plain)?;
        ensure_consumed(self.name(), decoder.into_inner())?;
        Ok(Bytes::from(plain))
    }
}

/// The decoder stops at the end of its stream; whatever it left unread is
/// not part of any stream.
fn ensure_consumed(name: &str, rest: &[u8]) -> io::Result<()> {
    if rest.is_empty() {
        return Ok(());
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("{} trailing bytes after {name} stream", rest.len()),
    ))
}

/// A `content-encoding` this crate can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionEncoding {
    #[default]
    Identity,
    Gzip,
    Deflate,
}

impl CompressionEncoding {
    /// Parse a `content-encoding` header value.
    ///
    /// Absent, blank and `identity` all mean no compression. Returns `None`
    /// for anything else that is not `gzip` or `deflate`.
    pub fn from_header(value: Option<&str>) -> Option<Self> {
        match value.map(str::trim) {
            None | Some("" | "identity") => Some(Self::Identity),
            Some("gzip") => Some(Self::Gzip),
            Some("deflate") => Some(Self::Deflate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// The compressor at flate2's default level, `None` for identity.
    pub fn compressor(&self) -> Option<BoxedCompressor> {
        self.compressor_with_level(Compression::default())
    }

    /// `None` for identity.
    pub fn compressor_with_level(&self, level: Compression) -> Option<BoxedCompressor> {
        match self {
            Self::Identity => None,
            Self::Gzip => Some(BoxedCompressor::new(GzipCompressor::new(level))),
            Self::Deflate => Some(BoxedCompressor::new(DeflateCompressor::new(level))),
        }
    }
}

impl std::fmt::Display for CompressionEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = br#"{"account":"acc-1","memo":"rent rent rent rent rent"}"#;

    #[test]
    fn test_gzip_compress_decompress() {
        let compressor = GzipCompressor::default();
        assert_eq!(compressor.name(), "gzip");

        let compressed = compressor.compress(SAMPLE).unwrap();
        // gzip member magic
        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
        assert_eq!(&compressor.decompress(&compressed).unwrap()[..], SAMPLE);
    }

    #[test]
    fn test_gzip_levels() {
        assert_eq!(GzipCompressor::default().level(), Compression::default());

        for level in [Compression::none(), Compression::fast(), Compression::best()] {
            let compressor = GzipCompressor::new(level);
            let compressed = compressor.compress(SAMPLE).unwrap();
            assert_eq!(&compressor.decompress(&compressed).unwrap()[..], SAMPLE);
        }
    }

    #[test]
    fn test_gzip_decodes_concatenated_members() {
        let gzip = GzipCompressor::default();
        let mut joined = gzip.compress(b"[1,").unwrap().to_vec();
        joined.extend_from_slice(&gzip.compress(b"2]").unwrap());

        assert_eq!(&gzip.decompress(&joined).unwrap()[..], b"[1,2]");
    }

    #[test]
    fn test_gzip_rejects_trailing_garbage() {
        let gzip = GzipCompressor::default();
        let mut data = gzip.compress(br#"{"a":1}"#).unwrap().to_vec();
        data.extend_from_slice(b"GARBAGE");

        assert!(gzip.decompress(&data).is_err());
    }

    #[test]
    fn test_gzip_rejects_truncated_member() {
        let gzip = GzipCompressor::default();
        let data = gzip.compress(SAMPLE).unwrap();
        assert!(gzip.decompress(&data[..data.len() - 4]).is_err());
    }

    #[test]
    fn test_deflate_compress_decompress() {
        let compressor = DeflateCompressor::new(Compression::best());
        assert_eq!(compressor.name(), "deflate");

        let compressed = compressor.compress(SAMPLE).unwrap();
        assert_eq!(&compressor.decompress(&compressed).unwrap()[..], SAMPLE);
    }

    #[test]
    fn test_deflate_rejects_trailing_bytes() {
        let deflate = DeflateCompressor::default();
        let mut data = deflate.compress(SAMPLE).unwrap().to_vec();
        data.push(0);

        let err = deflate.decompress(&data).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("1 trailing bytes after deflate stream"));
    }

    #[test]
    fn test_decompress_invalid_gzip() {
        let compressor = BoxedCompressor::new(GzipCompressor::default());
        assert!(compressor.decompress(b"not valid gzip data").is_err());
    }

    #[test]
    fn test_gzip_does_not_accept_zlib_stream() {
        let zlib = DeflateCompressor::default().compress(SAMPLE).unwrap();
        assert!(GzipCompressor::default().decompress(&zlib).is_err());
    }

    #[test]
    fn test_boxed_compressor_debug() {
        let compressor = BoxedCompressor::new(DeflateCompressor::default());
        assert_eq!(format!("{compressor:?}"), "BoxedCompressor(\"deflate\")");
    }

    #[test]
    fn test_encoding_from_header() {
        for value in [None, Some(""), Some("  "), Some("identity")] {
            assert_eq!(
                CompressionEncoding::from_header(value),
                Some(CompressionEncoding::Identity)
            );
        }
        assert_eq!(
            CompressionEncoding::from_header(Some(" gzip ")),
            Some(CompressionEncoding::Gzip)
        );
        assert_eq!(
            CompressionEncoding::from_header(Some("deflate")),
            Some(CompressionEncoding::Deflate)
        );
        assert_eq!(CompressionEncoding::from_header(Some("br")), None);
        assert_eq!(CompressionEncoding::from_header(Some("GZIP")), None);
    }

    #[test]
    fn test_encoding_compressor() {
        assert!(CompressionEncoding::Identity.compressor().is_none());
        for encoding in [CompressionEncoding::Gzip, CompressionEncoding::Deflate] {
            let compressor = encoding.compressor().unwrap();
            assert_eq!(compressor.name(), encoding.as_str());
            assert_eq!(encoding.to_string(), encoding.as_str());
        }
    }
}
