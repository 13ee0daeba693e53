//! Error types for the PetFriends API client.
//!
//! # Design
//! Status codes returned by the service are data, not errors: every facade
//! call yields an `ApiResponse` whatever the status. `ApiError` covers what
//! stops a call from producing one (transport, codec, local photo file) plus
//! the two variants produced by `ApiResponse::expect_status` when a caller
//! insists on a specific outcome.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered 404 where a success was required.
    #[error("resource not found")]
    NotFound,

    /// The service answered with a status other than the one required.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(#[from] ureq::Error),

    /// The request payload could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body did not have the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The photo to upload could not be read.
    #[error("cannot read photo {}: {source}", path.display())]
    Photo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
