/// Region the Secrets Manager client connects to unless `--region` says otherwise
pub const DEFAULT_SECRETS_REGION: &str = "eu-west-1";

/// Region used for STS when the loaded AWS config has none
pub const DEFAULT_AWS_REGION: &str = "eu-west-1";

/// Session name sent with every AssumeRole call
pub const ROLE_SESSION_NAME: &str = "FetchSecretsAssumingRole";

/// Lifetime of assumed-role credentials in seconds (the STS minimum)
pub const ROLE_SESSION_DURATION_SECONDS: i32 = 900;

/// Version stage requested from Secrets Manager
pub const CURRENT_VERSION_STAGE: &str = "AWSCURRENT";
