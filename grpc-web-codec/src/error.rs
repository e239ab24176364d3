//! Codec errors and gRPC status types.
//!
//! - [`CodecError`]: Failures raised by encode/decode operations
//! - [`Code`]: gRPC status codes carried in the `grpc-status` trailer
//! - [`Status`]: Code plus optional message, convertible to trailer metadata

use std::str::FromStr;

/// Errors raised by codec operations.
///
/// Every variant is reported straight to the caller. A failed call leaves the
/// codec untouched, so later calls on the same instance are unaffected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The payload has no wire representation (the `Missing` sentinel, or a
    /// value serde_json refuses to serialize).
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Received bytes are not valid UTF-8, JSON, or a valid compressed stream.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The compressor failed while encoding.
    #[error("compression failed: {0}")]
    Compression(String),

    /// No codec matches the peer's content type or encoding.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl CodecError {
    /// The gRPC code a server should answer with when this error ends a call.
    ///
    /// - InvalidPayload / Compression: `Internal` (our own value failed to encode)
    /// - MalformedPayload: `InvalidArgument` (the peer sent bad bytes)
    /// - Unsupported: `Unimplemented`
    pub fn code(&self) -> Code {
        match self {
            CodecError::InvalidPayload(_) | CodecError::Compression(_) => Code::Internal,
            CodecError::MalformedPayload(_) => Code::InvalidArgument,
            CodecError::Unsupported(_) => Code::Unimplemented,
        }
    }

    pub fn is_invalid_payload(&self) -> bool {
        matches!(self, CodecError::InvalidPayload(_))
    }

    pub fn is_malformed_payload(&self) -> bool {
        matches!(self, CodecError::MalformedPayload(_))
    }
}

/// gRPC status codes, as written in the `grpc-status` trailer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Code {
    Ok = 0,
    Canceled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl Code {
    /// Get the snake_case name of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Ok => "ok",
            Code::Canceled => "canceled",
            Code::Unknown => "unknown",
            Code::InvalidArgument => "invalid_argument",
            Code::DeadlineExceeded => "deadline_exceeded",
            Code::NotFound => "not_found",
            Code::AlreadyExists => "already_exists",
            Code::PermissionDenied => "permission_denied",
            Code::ResourceExhausted => "resource_exhausted",
            Code::FailedPrecondition => "failed_precondition",
            Code::Aborted => "aborted",
            Code::OutOfRange => "out_of_range",
            Code::Unimplemented => "unimplemented",
            Code::Internal => "internal",
            Code::Unavailable => "unavailable",
            Code::DataLoss => "data_loss",
            Code::Unauthenticated => "unauthenticated",
        }
    }

    /// The numeric wire value.
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Map a numeric wire value to a code. Out-of-range values become
    /// [`Code::Unknown`], as gRPC clients are required to do.
    pub fn from_i32(value: i32) -> Code {
        match value {
            0 => Code::Ok,
            1 => Code::Canceled,
            2 => Code::Unknown,
            3 => Code::InvalidArgument,
            4 => Code::DeadlineExceeded,
            5 => Code::NotFound,
            6 => Code::AlreadyExists,
            7 => Code::PermissionDenied,
            8 => Code::ResourceExhausted,
            9 => Code::FailedPrecondition,
            10 => Code::Aborted,
            11 => Code::OutOfRange,
            12 => Code::Unimplemented,
            13 => Code::Internal,
            14 => Code::Unavailable,
            15 => Code::DataLoss,
            16 => Code::Unauthenticated,
            _ => Code::Unknown,
        }
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Code`] from a string fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseCodeError(());

impl std::fmt::Display for ParseCodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown status code")
    }
}

impl std::error::Error for ParseCodeError {}

impl FromStr for Code {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(Code::Ok),
            "canceled" | "cancelled" => Ok(Code::Canceled),
            "unknown" => Ok(Code::Unknown),
            "invalid_argument" => Ok(Code::InvalidArgument),
            "deadline_exceeded" => Ok(Code::DeadlineExceeded),
            "not_found" => Ok(Code::NotFound),
            "already_exists" => Ok(Code::AlreadyExists),
            "permission_denied" => Ok(Code::PermissionDenied),
            "resource_exhausted" => Ok(Code::ResourceExhausted),
            "failed_precondition" => Ok(Code::FailedPrecondition),
            "aborted" => Ok(Code::Aborted),
            "out_of_range" => Ok(Code::OutOfRange),
            "unimplemented" => Ok(Code::Unimplemented),
            "internal" => Ok(Code::Internal),
            "unavailable" => Ok(Code::Unavailable),
            "data_loss" => Ok(Code::DataLoss),
            "unauthenticated" => Ok(Code::Unauthenticated),
            _ => Err(ParseCodeError(())),
        }
    }
}

/// The outcome of an RPC, carried in the response trailers.
///
/// # Example
///
/// ```
/// use grpc_web_codec::{Code, Status};
///
/// let status = Status::new(Code::NotFound, "user not found");
/// assert_eq!(status.code(), Code::NotFound);
/// assert_eq!(status.message(), Some("user not found"));
///
/// let metadata = status.to_metadata();
/// assert_eq!(metadata.get("grpc-status"), Some("5"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    code: Code,
    message: Option<String>,
}

impl Status {
    pub fn new<S: Into<String>>(code: Code, message: S) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    pub fn from_code(code: Code) -> Self {
        Self {
            code,
            message: None,
        }
    }

    pub fn ok() -> Self {
        Self::from_code(Code::Ok)
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_ok(&self) -> bool {
        self.code == Code::Ok
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code.as_str())?;
        if let Some(msg) = &self.message {
            write!(f, ": {}", msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for Status {}

impl From<CodecError> for Status {
    fn from(err: CodecError) -> Self {
        Status::new(err.code(), err.to_string())
    }
}
