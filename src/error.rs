use std::fmt;

/// JSON-RPC code the device uses for an unspecified failure.
pub const UNKNOWN_ERROR: i64 = -32000;
/// The control is not supported on this model.
pub const NOT_SUPPORTED: i64 = -32001;
/// The control was accepted but execution failed.
pub const FAILED: i64 = -32002;
/// The control carried invalid data.
pub const INVALID_OPERATION: i64 = -32003;
/// The access token is missing, rejected or expired.
pub const UNAUTHORIZED: i64 = -32010;
/// Standard JSON-RPC "Method not found".
pub const METHOD_NOT_FOUND: i64 = -32601;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("authentication failed: {message}")]
    Authentication { message: String, code: Option<i64> },
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("{0}")]
    Response(#[from] ResponseError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            code: None,
        }
    }

    /// Server-reported code, if the failure came from the device.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Authentication { code, .. } => *code,
            Self::Protocol(_) => None,
            Self::Response(err) => Some(err.code),
        }
    }

    /// Firmware without a given control answers with a "Method not found"
    /// error. Callers enumerating optional peripherals can use this to fall
    /// back to an empty list.
    pub fn is_method_not_found(&self) -> bool {
        match self {
            Self::Response(err) => {
                err.code == METHOD_NOT_FOUND || err.message.contains("Method not found")
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Protocol(ProtocolError::Http(err))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResponseErrorKind {
    Unknown,
    NotSupported,
    Failed,
    InvalidOperation,
    Unauthorized,
    Other,
}

impl ResponseErrorKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            UNKNOWN_ERROR => Self::Unknown,
            NOT_SUPPORTED => Self::NotSupported,
            FAILED => Self::Failed,
            INVALID_OPERATION => Self::InvalidOperation,
            UNAUTHORIZED => Self::Unauthorized,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ResponseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown error",
            Self::NotSupported => "not supported",
            Self::Failed => "control failed",
            Self::InvalidOperation => "invalid operation",
            Self::Unauthorized => "unauthorized",
            Self::Other => "error response",
        };
        f.write_str(s)
    }
}

/// A JSON-RPC error object returned by the device.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{kind}: {message} (code {code})")]
pub struct ResponseError {
    pub kind: ResponseErrorKind,
    pub code: i64,
    pub message: String,
}

impl ResponseError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            kind: ResponseErrorKind::from_code(code),
            code,
            message: message.into(),
        }
    }
}
