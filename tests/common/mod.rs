use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use worm_upload::error::{Result, WormError};
use worm_upload::models::{
    DefaultRetention, LockConfiguration, ObjectLockStatus, PutObjectOptions,
};
use worm_upload::services::storage::ObjectLockStorage;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateBucket { bucket: String, object_lock: bool },
    PutRetention { bucket: String, retention: DefaultRetention },
    GetRetention { bucket: String },
    PutObject { bucket: String, key: String, payload: Bytes, options: PutObjectOptions },
    HeadObject { bucket: String, key: String },
}

/// In-memory stand-in for an object store that records every call.
#[derive(Default)]
pub struct RecordingStorage {
    pub calls: Mutex<Vec<Call>>,
    failing: HashSet<&'static str>,
    retention: Mutex<HashMap<String, DefaultRetention>>,
    objects: Mutex<HashMap<(String, String), PutObjectOptions>>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the named operation fail, e.g. "CreateBucket".
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn check(&self, operation: &str) -> Result<()> {
        if self.failing.contains(operation) {
            return Err(WormError::service(operation, "simulated failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectLockStorage for RecordingStorage {
    async fn create_bucket(&self, bucket: &str, object_lock_enabled: bool) -> Result<()> {
        self.calls.lock().unwrap().push(Call::CreateBucket {
            bucket: bucket.to_string(),
            object_lock: object_lock_enabled,
        });
        self.check("CreateBucket")
    }

    async fn put_bucket_retention_policy(
        &self,
        bucket: &str,
        retention: DefaultRetention,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(Call::PutRetention {
            bucket: bucket.to_string(),
            retention,
        });
        self.check("PutObjectLockConfiguration")?;
        self.retention
            .lock()
            .unwrap()
            .insert(bucket.to_string(), retention);
        Ok(())
    }

    async fn get_bucket_retention_policy(&self, bucket: &str) -> Result<LockConfiguration> {
        self.calls.lock().unwrap().push(Call::GetRetention {
            bucket: bucket.to_string(),
        });
        self.check("GetObjectLockConfiguration")?;
        Ok(LockConfiguration {
            enabled: true,
            rule: self.retention.lock().unwrap().get(bucket).copied(),
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: Bytes,
        options: PutObjectOptions,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(Call::PutObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            payload,
            options: options.clone(),
        });
        self.check("PutObject")?;
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), options);
        Ok(())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectLockStatus> {
        self.calls.lock().unwrap().push(Call::HeadObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        self.check("HeadObject")?;
        let objects = self.objects.lock().unwrap();
        let options = objects
            .get(&(bucket.to_string(), key.to_string()))
            .ok_or_else(|| WormError::service("HeadObject", "NotFound"))?;
        Ok(ObjectLockStatus {
            lock_mode: Some(options.lock_mode),
            retain_until: Some(options.retain_until),
        })
    }
}
