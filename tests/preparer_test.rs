use chrono::{Duration, TimeZone, Utc};
use std::path::Path;
use tempfile::TempDir;
use worm_upload::error::WormError;
use worm_upload::services::preparer::{ObjectPreparer, UploadPreparer, compute_digest};
use worm_upload::utils::hash::calculate_md5_base64;

fn write_fixture(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_load_file_returns_exact_bytes() {
    let dir = TempDir::new().unwrap();
    let content = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n";
    let path = write_fixture(&dir, "report.pdf", content);

    let payload = UploadPreparer::default().load_file(&path).await.unwrap();
    assert_eq!(payload.as_ref(), content);
    assert_eq!(payload.len(), content.len());
}

#[tokio::test]
async fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.pdf");

    let result = UploadPreparer::default().load_file(&path).await;
    assert!(matches!(result, Err(WormError::FileNotFound(p)) if p == path));
}

#[tokio::test]
async fn test_load_file_over_limit() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "big.bin", b"0123456789");

    let result = UploadPreparer::new(4, 1).load_file(&path).await;
    assert!(matches!(
        result,
        Err(WormError::FileTooLarge { size: 10, max: 4, .. })
    ));
}

#[tokio::test]
async fn test_compute_digest_matches_content() {
    let dir = TempDir::new().unwrap();
    let content: Vec<u8> = (0..50_000u32).map(|i| (i * 7 % 256) as u8).collect();
    let path = write_fixture(&dir, "data.bin", &content);

    let first = compute_digest(&path).await.unwrap();
    let second = compute_digest(&path).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first, calculate_md5_base64(&content));
}

#[tokio::test]
async fn test_compute_digest_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "empty.txt", b"");

    let digest = compute_digest(&path).await.unwrap();
    assert_eq!(digest, "1B2M2Y8AsgTpgAmY7PhCfg==");
}

#[tokio::test]
async fn test_compute_digest_without_file() {
    assert!(matches!(
        compute_digest(Path::new("")).await,
        Err(WormError::NoDigest(_))
    ));

    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone.txt");
    assert!(matches!(
        compute_digest(&missing).await,
        Err(WormError::NoDigest(_))
    ));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_compute_digest_stream_failure_is_fatal() {
    // A directory opens fine on Linux but fails on read.
    let dir = TempDir::new().unwrap();

    let err = compute_digest(dir.path()).await.unwrap_err();
    assert!(matches!(err, WormError::Digest(_)));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_prepare_builds_locked_payload() {
    let dir = TempDir::new().unwrap();
    let content = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";
    let path = write_fixture(&dir, "pixel.png", content);
    let now = Utc.with_ymd_and_hms(2024, 12, 31, 18, 0, 0).unwrap();

    let prepared = UploadPreparer::default().prepare(&path, now).await.unwrap();

    assert_eq!(prepared.payload.as_ref(), content);
    assert_eq!(prepared.content_type, "image/png");
    assert_eq!(prepared.digest_base64, calculate_md5_base64(content));
    assert_eq!(prepared.retain_until, now + Duration::days(1));
    assert_eq!(
        prepared.retain_until,
        Utc.with_ymd_and_hms(2025, 1, 1, 18, 0, 0).unwrap()
    );
    assert!(prepared.retain_until > now);
}

#[tokio::test]
async fn test_prepare_missing_file_produces_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.pdf");

    let result = UploadPreparer::default().prepare(&path, Utc::now()).await;
    assert!(matches!(result, Err(WormError::FileNotFound(_))));
}
