use std::time::SystemTime;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_secretsmanager::{
    Client as SecretsManagerClient, Config as SecretsManagerConfig,
    config::{Credentials as StaticCredentials, Region},
};
use serde_json::{Map, Value};
use tracing::{debug, info, trace};

use super::{Credentials, SecretSource};
use crate::{
    constants::{CURRENT_VERSION_STAGE, ROLE_SESSION_NAME},
    error::FetchSecretError,
};

/// Key/value pairs of a secret, in the order they appear in the payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Secret {
    entries: Map<String, Value>,
}

impl Secret {
    /// Parse a secret payload, which must be a JSON object
    pub fn parse(secret_id: &str, payload: &str) -> Result<Self, FetchSecretError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|source| FetchSecretError::MalformedPayload {
                secret_id: secret_id.to_string(),
                source,
            })?;

        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(FetchSecretError::NotAnObject {
                secret_id: secret_id.to_string(),
                kind: json_kind(&other),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Secrets Manager backed [`SecretSource`].
///
/// A client is built per request so that assumed-role credentials never leak
/// into the shared config.
#[derive(Debug, Clone)]
pub struct SecretsManagerSource {
    sdk_config: SdkConfig,
    region: String,
}

impl SecretsManagerSource {
    pub fn new(sdk_config: SdkConfig, region: impl Into<String>) -> Self {
        Self {
            sdk_config,
            region: region.into(),
        }
    }

    pub fn client(&self, credentials: Option<&Credentials>) -> SecretsManagerClient {
        SecretsManagerClient::from_conf(client_config(&self.sdk_config, &self.region, credentials))
    }
}

/// Build the Secrets Manager config pinned to `region`, overriding the
/// credential chain when assumed-role credentials are given
pub fn client_config(
    sdk_config: &SdkConfig,
    region: &str,
    credentials: Option<&Credentials>,
) -> SecretsManagerConfig {
    let mut builder = aws_sdk_secretsmanager::config::Builder::from(sdk_config)
        .region(Region::new(region.to_string()));

    if let Some(creds) = credentials {
        builder = builder.credentials_provider(StaticCredentials::new(
            creds.access_key_id.clone(),
            creds.secret_access_key.clone(),
            Some(creds.session_token.clone()),
            SystemTime::try_from(creds.expiration).ok(),
            ROLE_SESSION_NAME,
        ));
    }

    builder.build()
}

#[async_trait]
impl SecretSource for SecretsManagerSource {
    async fn secret_string(
        &self,
        secret_id: &str,
        credentials: Option<&Credentials>,
    ) -> Result<String, FetchSecretError> {
        debug!("Secrets Manager region: {}", self.region);
        let response = self
            .client(credentials)
            .get_secret_value()
            .secret_id(secret_id)
            .version_stage(CURRENT_VERSION_STAGE)
            .send()
            .await
            .map_err(|e| FetchSecretError::GetSecretValue {
                secret_id: secret_id.to_string(),
                source: e.into(),
            })?;

        response
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| FetchSecretError::MissingSecretString {
                secret_id: secret_id.to_string(),
            })
    }
}

/// Fetch the current version of a secret and parse it
pub async fn fetch_secret<S>(
    source: &S,
    secret_id: &str,
    credentials: Option<&Credentials>,
) -> Result<Secret, FetchSecretError>
where
    S: SecretSource + ?Sized,
{
    info!("Fetching secret: {}", secret_id);
    let payload = source.secret_string(secret_id, credentials).await?;
    let secret = Secret::parse(secret_id, &payload)?;

    debug!("Secret has {} entries", secret.len());
    trace!(
        "Secret keys: {}",
        secret.iter().map(|(k, _)| k).collect::<Vec<_>>().join(", ")
    );
    Ok(secret)
}
