pub mod error;
pub mod keys;
pub mod rpc;
pub mod token_cache;
pub mod tv;

pub use error::{Error, ProtocolError, ResponseError, ResponseErrorKind, Result};
pub use keys::RemoteKey;
pub use tv::{ClientConfig, SamsungTV, DEFAULT_PORT};
