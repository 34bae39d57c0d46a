//! Error types.

use thiserror::Error;

/// The error type returned by the server's fallible operations.
///
/// Routing misses, bad methods and the like are HTTP
/// [`Response`](crate::Response) values, not `Error`s. This type surfaces
/// infrastructure failures: binding to a port or accepting a connection.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a [`ClientIpStrategy`](crate::ClientIpStrategy) could not produce an
/// address. The `Display` text is what the debug report prints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientIpError {
    #[error("client ip: header `{0}` is missing")]
    MissingHeader(String),

    #[error("client ip: header `{header}` has invalid value `{value}`")]
    InvalidHeader { header: String, value: String },

    #[error("client ip: no public address found in `{0}`")]
    NoPublicAddress(String),
}

/// A request dump that could not be produced, for reports built from
/// requests captured outside this server (for example, a body stream that
/// broke mid-read). [`Request::dump`](crate::Request::dump) itself cannot
/// fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dump: {0}")]
pub struct DumpError(pub String);
