//! Error types for the fetch pipeline
//!
//! Every stage after option resolution returns [`FetchSecretError`]. Nothing
//! is retried: the binary prints the error and exits non-zero.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Boxed error returned by the AWS SDK calls
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum FetchSecretError {
    // Credential acquisition
    #[error("Failed to assume role '{role_arn}'")]
    AssumeRole {
        role_arn: String,
        #[source]
        source: BoxError,
    },

    #[error("AWS STS returned no credentials for role '{role_arn}'")]
    MissingCredentials { role_arn: String },

    // Secret retrieval
    #[error("Failed to fetch secret '{secret_id}'")]
    GetSecretValue {
        secret_id: String,
        #[source]
        source: BoxError,
    },

    #[error("Secret '{secret_id}' has no string value")]
    MissingSecretString { secret_id: String },

    // Malformed payload
    #[error("Secret '{secret_id}' is not valid JSON")]
    MalformedPayload {
        secret_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Secret '{secret_id}' must be a JSON object, got {kind}")]
    NotAnObject {
        secret_id: String,
        kind: &'static str,
    },

    // Output
    #[error("Failed to append to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
