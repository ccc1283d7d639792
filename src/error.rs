//! Crate-wide error taxonomy.
//!
//! Every fallible operation in the pipelines returns [`Error`]. The variants
//! map one-to-one onto the failure classes the orchestrators distinguish:
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | [`Validation`](Error::Validation) | Bad input (empty prompt, chunk without embedding) |
//! | [`Connection`](Error::Connection) | Backend unreachable at construction / liveness probe |
//! | [`Store`](Error::Store) | Read/write failure against the history or vector store |
//! | [`Retrieval`](Error::Retrieval) | Query-side retrieval stage failed (embedding or search) |
//! | [`Generation`](Error::Generation) | Generation backend failed or returned an error |
//!
//! Orchestrators never catch and suppress; failures propagate to the HTTP
//! boundary, which renders them as a generic internal error. Startup-time
//! [`Connection`](Error::Connection) failures abort process bootstrap.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input, rejected before any network call.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A backend was unreachable when the client was constructed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A read or write against a backing store failed.
    #[error("store error: {0}")]
    Store(String),

    /// The retrieval stage of the query pipeline failed.
    #[error("retrieval failed: {0}")]
    Retrieval(String),

    /// The generation backend failed or returned an error response.
    #[error("generation failed: {0}")]
    Generation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
