use anyhow::Result;
use aws_sdk_sts::Client as StsClient;
use tracing::info;

use crate::{
    aws::{self, RoleAssumer, SecretSource, secrets::SecretsManagerSource},
    cli::Options,
    error::FetchSecretError,
    export,
};

#[derive(Debug, Clone)]
pub struct FetchCommand {
    pub options: Options,
}

impl FetchCommand {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Build the AWS clients from the ambient config and run the fetch
    pub async fn execute(self) -> Result<()> {
        let sdk_config = aws::load_sdk_config(self.options.profile.as_deref()).await;
        let sts = StsClient::new(&sdk_config);
        let secrets = SecretsManagerSource::new(sdk_config, &self.options.region);

        let written = run(&self.options, &sts, &secrets).await?;
        info!(
            "Appended {} exports to {}",
            written,
            self.options.output.display()
        );
        Ok(())
    }
}

/// Assume the role (if any), fetch the secret and append its exports.
///
/// The output file is only opened once the secret has been fetched and
/// parsed, so earlier failures leave it untouched.
pub async fn run<A, S>(options: &Options, assumer: &A, source: &S) -> Result<usize, FetchSecretError>
where
    A: RoleAssumer + ?Sized,
    S: SecretSource + ?Sized,
{
    let credentials = match options.role.as_deref() {
        Some(role_arn) => Some(assumer.assume_role(role_arn).await?),
        None => None,
    };

    let secret = aws::secrets::fetch_secret(source, &options.secret, credentials.as_ref()).await?;

    export::append_exports(&options.output, &secret).await
}
