use async_trait::async_trait;
use aws_sdk_sts::Client as StsClient;
use aws_smithy_types::date_time::Format;
use tracing::{debug, info};

use super::{Credentials, RoleAssumer};
use crate::{
    constants::{ROLE_SESSION_DURATION_SECONDS, ROLE_SESSION_NAME},
    error::FetchSecretError,
};

/// Assume role with the fixed session name and minimum duration
pub async fn assume_role(client: &StsClient, role_arn: &str) -> Result<Credentials, FetchSecretError> {
    info!("Assuming role: {}", role_arn);
    debug!("Session name: {}", ROLE_SESSION_NAME);
    debug!("Duration: {} seconds", ROLE_SESSION_DURATION_SECONDS);

    let response = client
        .assume_role()
        .role_arn(role_arn)
        .role_session_name(ROLE_SESSION_NAME)
        .duration_seconds(ROLE_SESSION_DURATION_SECONDS)
        .send()
        .await
        .map_err(|e| FetchSecretError::AssumeRole {
            role_arn: role_arn.to_string(),
            source: e.into(),
        })?;

    let sts_creds = response
        .credentials()
        .ok_or_else(|| FetchSecretError::MissingCredentials {
            role_arn: role_arn.to_string(),
        })?;

    let credentials = Credentials {
        access_key_id: sts_creds.access_key_id().to_string(),
        secret_access_key: sts_creds.secret_access_key().to_string(),
        session_token: sts_creds.session_token().to_string(),
        expiration: *sts_creds.expiration(),
    };

    debug!(
        "Credentials expire at: {}",
        credentials
            .expiration
            .fmt(Format::DateTime)
            .unwrap_or_else(|_| "unknown".to_string())
    );
    Ok(credentials)
}

#[async_trait]
impl RoleAssumer for StsClient {
    async fn assume_role(&self, role_arn: &str) -> Result<Credentials, FetchSecretError> {
        assume_role(self, role_arn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_config::{BehaviorVersion, Region, SdkConfig};
    use aws_sdk_sts::config::{Credentials as StaticCredentials, SharedCredentialsProvider};
    use aws_smithy_http_client::test_util::{CaptureRequestHandler, capture_request};
    use aws_smithy_types::body::SdkBody;

    const ROLE_ARN: &str = "arn:aws:iam::123456789012:role/Reader";

    fn test_client(http_client: CaptureRequestHandler) -> StsClient {
        let config = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("eu-west-1"))
            .credentials_provider(SharedCredentialsProvider::new(StaticCredentials::new(
                "AKIDAMBIENT",
                "ambient-secret",
                None,
                None,
                "test",
            )))
            .http_client(http_client)
            .build();
        StsClient::new(&config)
    }

    fn response(status: u16, body: &str) -> http::Response<SdkBody> {
        http::Response::builder()
            .status(status)
            .body(SdkBody::from(body))
            .unwrap()
    }

    const ASSUME_ROLE_RESPONSE: &str = r#"<AssumeRoleResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <AssumeRoleResult>
    <AssumedRoleUser>
      <AssumedRoleId>AROATEST:FetchSecretsAssumingRole</AssumedRoleId>
      <Arn>arn:aws:sts::123456789012:assumed-role/Reader/FetchSecretsAssumingRole</Arn>
    </AssumedRoleUser>
    <Credentials>
      <AccessKeyId>ASIAASSUMED</AccessKeyId>
      <SecretAccessKey>assumed-secret</SecretAccessKey>
      <SessionToken>assumed-token</SessionToken>
      <Expiration>2030-01-01T00:00:00Z</Expiration>
    </Credentials>
  </AssumeRoleResult>
  <ResponseMetadata>
    <RequestId>c6104cbe-af31-11e0-8154-cbc7ccf896c7</RequestId>
  </ResponseMetadata>
</AssumeRoleResponse>"#;

    #[tokio::test]
    async fn test_assume_role_sends_fixed_session_parameters() {
        let (http_client, request) = capture_request(Some(response(200, ASSUME_ROLE_RESPONSE)));
        let client = test_client(http_client);

        let credentials = assume_role(&client, ROLE_ARN).await.unwrap();

        assert_eq!(credentials.access_key_id, "ASIAASSUMED");
        assert_eq!(credentials.secret_access_key, "assumed-secret");
        assert_eq!(credentials.session_token, "assumed-token");
        assert_eq!(credentials.expiration.secs(), 1_893_456_000);

        let request = request.expect_request();
        let body = std::str::from_utf8(request.body().bytes().unwrap()).unwrap();
        for expected in [
            "Action=AssumeRole",
            "RoleSessionName=FetchSecretsAssumingRole",
            "DurationSeconds=900",
            "RoleArn=arn",
        ] {
            assert!(body.contains(expected), "{expected} missing from {body}");
        }
    }

    #[tokio::test]
    async fn test_assume_role_without_credentials() {
        let (http_client, _request) = capture_request(Some(response(
            200,
            r#"<AssumeRoleResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <AssumeRoleResult></AssumeRoleResult>
  <ResponseMetadata><RequestId>c6104cbe</RequestId></ResponseMetadata>
</AssumeRoleResponse>"#,
        )));
        let client = test_client(http_client);

        let err = assume_role(&client, ROLE_ARN).await.unwrap_err();
        assert!(matches!(
            err,
            FetchSecretError::MissingCredentials { ref role_arn } if role_arn == ROLE_ARN
        ));
    }

    #[tokio::test]
    async fn test_assume_role_access_denied() {
        let (http_client, _request) = capture_request(Some(response(
            403,
            r#"<ErrorResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <Error>
    <Type>Sender</Type>
    <Code>AccessDenied</Code>
    <Message>User is not authorized to perform: sts:AssumeRole</Message>
  </Error>
  <RequestId>c6104cbe</RequestId>
</ErrorResponse>"#,
        )));
        let client = test_client(http_client);

        let err = assume_role(&client, ROLE_ARN).await.unwrap_err();
        assert!(matches!(err, FetchSecretError::AssumeRole { .. }));
    }
}
