use crate::config::UploaderConfig;
use crate::error::{Result, WormError};
use crate::services::storage::S3ObjectLockStorage;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use std::sync::Arc;
use tracing::{debug, info};

pub async fn setup_storage(config: &UploaderConfig) -> Result<Arc<S3ObjectLockStorage>> {
    config.validate()?;

    let mut loader = aws_config::from_env().region(Region::new(config.region.clone()));

    if let Some(endpoint_url) = &config.endpoint_url {
        info!("☁️  S3 Storage: {} (Region: {})", endpoint_url, config.region);
        loader = loader.endpoint_url(endpoint_url);
    } else {
        info!("☁️  S3 Storage: AWS (Region: {})", config.region);
    }

    if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
        loader = loader.credentials_provider(Credentials::new(
            access_key.clone(),
            secret_key.clone(),
            None,
            None,
            "static",
        ));
    }

    let aws_config = loader.load().await;

    resolve_credentials(aws_config.credentials_provider()).await?;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.force_path_style)
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);
    Ok(Arc::new(S3ObjectLockStorage::new(
        s3_client,
        config.region.clone(),
    )))
}

/// Loads credentials once so a missing or broken chain stops the run before
/// any bucket call is made.
pub async fn resolve_credentials(provider: Option<SharedCredentialsProvider>) -> Result<()> {
    let Some(provider) = provider else {
        return Err(WormError::Configuration(
            "no AWS credentials provider is configured".to_string(),
        ));
    };

    let credentials = provider.provide_credentials().await.map_err(|e| {
        WormError::Configuration(format!(
            "unable to load AWS credentials: {}",
            DisplayErrorContext(&e)
        ))
    })?;
    debug!("🔑 Credentials resolved (access key {})", credentials.access_key_id());
    Ok(())
}
