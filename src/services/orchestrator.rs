use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::config::UploaderConfig;
use crate::error::Result;
use crate::models::{PreparedSummary, RunReport, StepOutcome, UploadRequest};
use crate::services::preparer::{ObjectPreparer, UploadPreparer};
use crate::services::storage::ObjectLockStorage;

/// Provisions a locked bucket, uploads the requested file with a per-object
/// retention lock, and reads the result back.
///
/// Storage failures are logged and the run moves on to the next step. A file
/// that cannot be read or hashed skips the upload and head check. Only a
/// digest failure on an already opened file aborts the run.
pub async fn run(
    storage: &dyn ObjectLockStorage,
    request: &UploadRequest,
    config: &UploaderConfig,
    now: DateTime<Utc>,
) -> Result<RunReport> {
    let preparer = UploadPreparer::from_config(config);
    run_with_preparer(storage, &preparer, request, config, now).await
}

/// [`run`] with the payload source supplied by the caller.
pub async fn run_with_preparer(
    storage: &dyn ObjectLockStorage,
    preparer: &dyn ObjectPreparer,
    request: &UploadRequest,
    config: &UploaderConfig,
    now: DateTime<Utc>,
) -> Result<RunReport> {
    let bucket = request.bucket_name();
    let key = request.object_key();

    let mut report = RunReport {
        create_bucket: StepOutcome::Skipped,
        put_retention: StepOutcome::Skipped,
        get_retention: StepOutcome::Skipped,
        upload: StepOutcome::Skipped,
        head: StepOutcome::Skipped,
        lock_configuration: None,
        prepared: None,
        object_status: None,
    };

    // 1. Bucket with object lock enabled at creation
    report.create_bucket = match storage.create_bucket(bucket, true).await {
        Ok(()) => {
            info!("🪣 Bucket {} created with object lock enabled", bucket);
            StepOutcome::Succeeded
        }
        Err(e) => {
            error!("❌ Could not create bucket {}: {}", bucket, e);
            StepOutcome::Failed(e.to_string())
        }
    };

    // 2. Bucket default retention
    let retention = config.default_retention();
    report.put_retention = match storage.put_bucket_retention_policy(bucket, retention).await {
        Ok(()) => {
            info!(
                "🔒 Default retention set on {}: {} for {} days",
                bucket, retention.mode, retention.days
            );
            StepOutcome::Succeeded
        }
        Err(e) => {
            error!("❌ Could not set default retention on {}: {}", bucket, e);
            StepOutcome::Failed(e.to_string())
        }
    };

    // 3. Read the lock configuration back
    report.get_retention = match storage.get_bucket_retention_policy(bucket).await {
        Ok(configuration) => {
            info!("ObjectLockEnabled: {}", configuration.enabled);
            match &configuration.rule {
                Some(rule) => {
                    info!("DefaultRetention.Mode: {}", rule.mode);
                    info!("DefaultRetention.Days: {}", rule.days);
                }
                None => warn!("⚠️  No default retention rule is configured on {}", bucket),
            }
            report.lock_configuration = Some(configuration);
            StepOutcome::Succeeded
        }
        Err(e) => {
            error!("❌ Could not read lock configuration of {}: {}", bucket, e);
            StepOutcome::Failed(e.to_string())
        }
    };

    // 4. Prepare and upload
    let prepared = match preparer.prepare(request.file_path(), now).await {
        Ok(prepared) => prepared,
        Err(e) if e.is_file_error() => {
            error!("❌ Unable to prepare {}: {}", request.file_path().display(), e);
            return Ok(report);
        }
        Err(e) => {
            error!("💥 Aborting: {}", e);
            return Err(e);
        }
    };

    info!(
        "📄 Prepared {} ({} bytes, {}, MD5 {}), retained until {}",
        prepared.source.display(),
        prepared.size(),
        prepared.content_type,
        prepared.digest_base64,
        prepared.retain_until.to_rfc3339()
    );
    report.prepared = Some(PreparedSummary::from(&prepared));

    let options = prepared.put_options(config.object_lock_mode);
    report.upload = match storage
        .put_object(bucket, key, prepared.payload, options)
        .await
    {
        Ok(()) => {
            info!("✅ Object {} uploaded into bucket {}", key, bucket);
            StepOutcome::Succeeded
        }
        Err(e) => {
            error!("❌ Upload of {} into {} failed: {}", key, bucket, e);
            StepOutcome::Failed(e.to_string())
        }
    };

    // 5. Existence check
    report.head = match storage.head_object(bucket, key).await {
        Ok(status) => {
            info!("✅ Object {} exists in bucket {}", key, bucket);
            info!(
                "ObjectLockMode: {}",
                status
                    .lock_mode
                    .map(|mode| mode.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
            info!(
                "ObjectLockRetainUntilDate: {}",
                status
                    .retain_until
                    .map(|date| date.to_rfc3339())
                    .unwrap_or_else(|| "none".to_string())
            );
            report.object_status = Some(status);
            StepOutcome::Succeeded
        }
        Err(e) => {
            error!("❌ Object {} does not exist in bucket {}: {}", key, bucket, e);
            StepOutcome::Failed(e.to_string())
        }
    };

    Ok(report)
}
