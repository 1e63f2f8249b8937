use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_smithy_types::DateTime;
use tracing::info;

use crate::{constants::DEFAULT_AWS_REGION, error::FetchSecretError};

pub mod secrets;
pub mod sts;

/// AWS temporary credentials structure
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime,
}

/// Exchanges a role ARN for temporary credentials.
#[async_trait]
pub trait RoleAssumer: Send + Sync {
    async fn assume_role(&self, role_arn: &str) -> Result<Credentials, FetchSecretError>;
}

/// Returns the raw string payload of a secret.
///
/// `credentials` is `None` when the ambient credential chain should be used.
#[async_trait]
pub trait SecretSource: Send + Sync {
    async fn secret_string(
        &self,
        secret_id: &str,
        credentials: Option<&Credentials>,
    ) -> Result<String, FetchSecretError>;
}

/// Load the shared AWS config, optionally for a named profile.
///
/// Region priority: ENV vars -> config file -> EC2 metadata -> DEFAULT_AWS_REGION
pub async fn load_sdk_config(profile: Option<&str>) -> SdkConfig {
    let loader = |region: Option<Region>| {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = region {
            loader = loader.region(region);
        }
        loader
    };

    let loaded = loader(None).load().await;
    match loaded.region() {
        Some(region) => {
            info!("Using region: {}", region);
            loaded
        }
        None => {
            info!("No region configured, using default {}", DEFAULT_AWS_REGION);
            loader(Some(Region::new(DEFAULT_AWS_REGION))).load().await
        }
    }
}
