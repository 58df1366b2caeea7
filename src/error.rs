//! Infrastructure error type.

/// The error type returned by the server's fallible operations.
///
/// Application-level failures (unknown user, rejected name) are expressed as
/// HTTP [`Response`](crate::Response) values through
/// [`UserError`](crate::UserError), not as `Error`s. This type surfaces
/// infrastructure failures: resolving the listen host, binding to a port or
/// accepting a connection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot resolve listen host `{host}`: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("listen host `{0}` resolved to no addresses")]
    NoAddress(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
