use httpmock::prelude::*;
use httpmock::Method::HEAD;
use middleware_probe::adapters::storage::{TEST_OBJECT, TEST_CONTENT};
use middleware_probe::{DeadlinePolicy, PhaseResult, PhaseStatus, ProbeEngine, ProbeTarget, StorageConfig};

const BUCKET: &str = "probe-bucket";

fn storage_config(server: &MockServer, provider: &str) -> StorageConfig {
    StorageConfig {
        provider: provider.to_string(),
        endpoint: server.base_url(),
        access_key: "probe".to_string(),
        secret_key: "probe-secret".to_string(),
        bucket: BUCKET.to_string(),
        region: "us-east-1".to_string(),
        secure: false,
        use_path_style: true,
        timeout: 5,
    }
}

fn object_path() -> String {
    format!("/{}/{}", BUCKET, TEST_OBJECT)
}

#[tokio::test]
async fn test_minio_full_cycle() {
    let server = MockServer::start_async().await;
    let head = server
        .mock_async(|when, then| {
            when.method(HEAD).path(format!("/{}", BUCKET));
            then.status(200);
        })
        .await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT).path(object_path()).body(TEST_CONTENT);
            then.status(200).header("ETag", "\"5d41402abc4b2a76b9719d911017c592\"");
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path(object_path());
            then.status(204);
        })
        .await;

    let report = ProbeEngine::new(DeadlinePolicy::Explicit)
        .run(ProbeTarget::Storage(storage_config(&server, "minio")))
        .await;

    assert!(report.is_healthy(), "{:?}", report);
    head.assert_async().await;
    put.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_minio_missing_bucket() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(HEAD).path(format!("/{}", BUCKET));
            then.status(404);
        })
        .await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT);
            then.status(200).header("ETag", "\"x\"");
        })
        .await;

    let report = ProbeEngine::new(DeadlinePolicy::Explicit)
        .run(ProbeTarget::Storage(storage_config(&server, "minio")))
        .await;

    assert_eq!(report.connect, PhaseResult::failure("Bucket not exists: probe-bucket"));
    assert_eq!(report.write, PhaseResult::skipped());
    assert_eq!(report.delete, PhaseResult::skipped());
    put.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_minio_denied_is_a_connect_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(HEAD).path(format!("/{}", BUCKET));
            then.status(403);
        })
        .await;

    let report = ProbeEngine::new(DeadlinePolicy::Explicit)
        .run(ProbeTarget::Storage(storage_config(&server, "minio")))
        .await;

    assert_eq!(report.connect.status, PhaseStatus::Failure);
    let error = report.connect.error.unwrap_or_default();
    assert!(error.starts_with("minio connect error:"), "{}", error);
}

#[tokio::test]
async fn test_eager_write_is_attempted_but_not_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(HEAD).path(format!("/{}", BUCKET));
            then.status(404);
        })
        .await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT).path(object_path());
            then.status(200).header("ETag", "\"x\"");
        })
        .await;

    let report = ProbeEngine::new(DeadlinePolicy::Explicit)
        .with_eager_write(true)
        .run(ProbeTarget::Storage(storage_config(&server, "minio")))
        .await;

    put.assert_hits_async(1).await;
    assert_eq!(report.connect.status, PhaseStatus::Failure);
    assert_eq!(report.write, PhaseResult::skipped());
}

#[tokio::test]
async fn test_oss_absent_meta_key_counts_as_reachable() {
    let server = MockServer::start_async().await;
    let head = server
        .mock_async(|when, then| {
            when.method(HEAD).path(format!("/{}/not_exist_key", BUCKET));
            then.status(404);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path(object_path());
            then.status(200).header("ETag", "\"5d41402abc4b2a76b9719d911017c592\"");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path(object_path());
            then.status(204);
        })
        .await;

    let report = ProbeEngine::new(DeadlinePolicy::Explicit)
        .run(ProbeTarget::Storage(storage_config(&server, "oss")))
        .await;

    head.assert_async().await;
    assert!(report.is_healthy(), "{:?}", report);
}

#[tokio::test]
async fn test_oss_upload_failure_skips_delete() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(HEAD);
            then.status(404);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PUT);
            then.status(403).body("<Error><Code>AccessDenied</Code></Error>");
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE);
            then.status(204);
        })
        .await;

    let report = ProbeEngine::new(DeadlinePolicy::Explicit)
        .run(ProbeTarget::Storage(storage_config(&server, "oss")))
        .await;

    assert_eq!(report.connect, PhaseResult::success());
    assert_eq!(report.write.status, PhaseStatus::Failure);
    assert!(report.write.error.as_deref().unwrap_or("").starts_with("oss upload error:"));
    assert_eq!(report.delete, PhaseResult::skipped());
    delete.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_unknown_storage_provider() {
    let server = MockServer::start_async().await;
    let report = ProbeEngine::new(DeadlinePolicy::Explicit)
        .run(ProbeTarget::Storage(storage_config(&server, "gcs")))
        .await;

    assert_eq!(
        report.to_json().unwrap(),
        r#"{"connect":{"success":"false","error":"unsupported provider"},"write":{"success":"skip"},"delete":{"success":"skip"}}"#
    );
}
