use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::{ByteStream, DateTime as SmithyDateTime};
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, DefaultRetention as S3DefaultRetention,
    ObjectLockConfiguration, ObjectLockEnabled, ObjectLockMode, ObjectLockRetentionMode,
    ObjectLockRule,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::{Result, WormError};
use crate::models::{
    DefaultRetention, LockConfiguration, ObjectLockStatus, PutObjectOptions, RetentionMode,
};

/// Object-storage operations needed to provision a locked bucket and upload
/// into it. Implementations report every remote failure as
/// [`WormError::Service`].
#[async_trait]
pub trait ObjectLockStorage: Send + Sync {
    async fn create_bucket(&self, bucket: &str, object_lock_enabled: bool) -> Result<()>;
    async fn put_bucket_retention_policy(
        &self,
        bucket: &str,
        retention: DefaultRetention,
    ) -> Result<()>;
    async fn get_bucket_retention_policy(&self, bucket: &str) -> Result<LockConfiguration>;
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: Bytes,
        options: PutObjectOptions,
    ) -> Result<()>;
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectLockStatus>;
}

pub struct S3ObjectLockStorage {
    client: Client,
    region: String,
}

impl S3ObjectLockStorage {
    pub fn new(client: Client, region: String) -> Self {
        Self { client, region }
    }

    /// us-east-1 is the implicit location and must not be sent as a constraint.
    fn bucket_configuration(&self) -> Option<CreateBucketConfiguration> {
        if self.region == "us-east-1" {
            return None;
        }
        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                .build(),
        )
    }
}

fn service_error<E>(operation: &str, err: E) -> WormError
where
    E: std::error::Error + 'static,
{
    let message = format!("{}", DisplayErrorContext(&err));
    tracing::debug!("S3 {} error: {}", operation, message);
    WormError::service(operation, message)
}

fn to_s3_retention_mode(mode: RetentionMode) -> ObjectLockRetentionMode {
    match mode {
        RetentionMode::Governance => ObjectLockRetentionMode::Governance,
        RetentionMode::Compliance => ObjectLockRetentionMode::Compliance,
    }
}

fn to_s3_lock_mode(mode: RetentionMode) -> ObjectLockMode {
    match mode {
        RetentionMode::Governance => ObjectLockMode::Governance,
        RetentionMode::Compliance => ObjectLockMode::Compliance,
    }
}

fn to_smithy_datetime(value: DateTime<Utc>) -> SmithyDateTime {
    SmithyDateTime::from_secs_and_nanos(value.timestamp(), value.timestamp_subsec_nanos())
}

fn from_smithy_datetime(value: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(value.secs(), value.subsec_nanos())
}

#[async_trait]
impl ObjectLockStorage for S3ObjectLockStorage {
    async fn create_bucket(&self, bucket: &str, object_lock_enabled: bool) -> Result<()> {
        self.client
            .create_bucket()
            .bucket(bucket)
            .object_lock_enabled_for_bucket(object_lock_enabled)
            .set_create_bucket_configuration(self.bucket_configuration())
            .send()
            .await
            .map_err(|e| service_error("CreateBucket", e))?;
        Ok(())
    }

    async fn put_bucket_retention_policy(
        &self,
        bucket: &str,
        retention: DefaultRetention,
    ) -> Result<()> {
        let rule = ObjectLockRule::builder()
            .default_retention(
                S3DefaultRetention::builder()
                    .mode(to_s3_retention_mode(retention.mode))
                    .days(retention.days)
                    .build(),
            )
            .build();

        self.client
            .put_object_lock_configuration()
            .bucket(bucket)
            .object_lock_configuration(
                ObjectLockConfiguration::builder()
                    .object_lock_enabled(ObjectLockEnabled::Enabled)
                    .rule(rule)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| service_error("PutObjectLockConfiguration", e))?;
        Ok(())
    }

    async fn get_bucket_retention_policy(&self, bucket: &str) -> Result<LockConfiguration> {
        let output = self
            .client
            .get_object_lock_configuration()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| service_error("GetObjectLockConfiguration", e))?;

        let Some(configuration) = output.object_lock_configuration() else {
            return Ok(LockConfiguration::default());
        };

        let enabled = matches!(
            configuration.object_lock_enabled(),
            Some(ObjectLockEnabled::Enabled)
        );
        let rule = configuration
            .rule()
            .and_then(|rule| rule.default_retention())
            .and_then(|retention| {
                let mode = RetentionMode::parse(retention.mode()?.as_str())?;
                Some(DefaultRetention {
                    mode,
                    days: retention.days().unwrap_or_default(),
                })
            });

        Ok(LockConfiguration { enabled, rule })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: Bytes,
        options: PutObjectOptions,
    ) -> Result<()> {
        let content_length = payload.len() as i64;
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(payload))
            .content_length(content_length)
            .content_type(options.content_type)
            .content_md5(options.content_digest)
            .object_lock_mode(to_s3_lock_mode(options.lock_mode))
            .object_lock_retain_until_date(to_smithy_datetime(options.retain_until))
            .send()
            .await
            .map_err(|e| service_error("PutObject", e))?;
        Ok(())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectLockStatus> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| service_error("HeadObject", e))?;

        Ok(ObjectLockStatus {
            lock_mode: output
                .object_lock_mode()
                .and_then(|mode| RetentionMode::parse(mode.as_str())),
            retain_until: output
                .object_lock_retain_until_date()
                .and_then(from_smithy_datetime),
        })
    }
}
