//! Message codecs for gRPC-Web transports.
//!
//! This crate converts application payloads, response messages and trailer
//! metadata to and from the bytes carried inside gRPC-Web frames, and declares
//! the `content-type` / `content-encoding` the transport announces. Framing,
//! HTTP, and RPC dispatch live elsewhere.
//!
//! ## Modules
//!
//! - [`codec`]: The [`Codec`] contract and codec negotiation
//! - [`json`]: [`JsonCodec`] and [`CompressedJsonCodec`]
//! - [`compression`]: Compressors and encoding configuration
//! - [`trailer`]: Trailer text encoding and status trailers
//! - [`metadata`]: The ordered [`Metadata`] multi-map
//! - [`payload`]: The [`Payload`] value type
//! - [`error`]: [`CodecError`], [`Code`] and [`Status`]

pub mod codec;
pub mod compression;
pub mod error;
pub mod json;
pub mod metadata;
pub mod payload;
pub mod trailer;

pub use codec::*;
pub use compression::*;
pub use error::*;
pub use json::*;
pub use metadata::*;
pub use payload::*;
pub use trailer::*;
