//! Integration tests for GitLabClient.
//!
//! Uses wiremock for HTTP mocking. Covers project lookup, pipeline selection,
//! job filtering, artifact download, auth headers and status mapping.

use ferry_gitlab::{GitLabClient, GitLabConfig, GitLabError};
use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GitLabClient {
    let config = GitLabConfig::new(server.uri()).with_token("glpat-test");
    GitLabClient::new(config).expect("client")
}

#[tokio::test]
async fn project_path_is_url_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fsub%2Fapp"))
        .and(header("PRIVATE-TOKEN", "glpat-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "path_with_namespace": "group/sub/app",
            "default_branch": "main"
        })))
        .mount(&server)
        .await;

    let project = client_for(&server).get_project("group/sub/app").await.unwrap();
    assert_eq!(project.id, 42);
    assert_eq!(project.path_with_namespace.as_deref(), Some("group/sub/app"));
    assert_eq!(project.default_branch.as_deref(), Some("main"));
}

#[tokio::test]
async fn missing_project_is_project_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_project("group/ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, GitLabError::ProjectNotFound { ref path } if path == "group/ghost"));
}

#[tokio::test]
async fn latest_pipeline_query_and_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/7/pipelines"))
        .and(query_param("status", "success"))
        .and(query_param("per_page", "1"))
        .and(query_param("order_by", "id"))
        .and(query_param("sort", "desc"))
        .and(query_param("ref", "release"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 900, "ref": "release", "status": "success"}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/8/pipelines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let pipeline = client
        .latest_successful_pipeline(7, Some("release"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pipeline.id, 900);
    assert_eq!(pipeline.git_ref.as_deref(), Some("release"));

    assert!(client
        .latest_successful_pipeline(8, None)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn only_jobs_with_artifacts_are_returned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/7/pipelines/900/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "build", "artifacts": [{"file_type": "archive", "size": 10, "filename": "artifacts.zip"}]},
            {"id": 2, "name": "lint", "artifacts": []},
            {"id": 3, "name": "docs"}
        ])))
        .mount(&server)
        .await;

    let jobs = client_for(&server)
        .jobs_with_artifacts(7, 900)
        .await
        .unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].name, "build");
}

#[tokio::test]
async fn artifact_download_streams_to_disk() {
    let server = MockServer::start().await;
    let payload = vec![7u8; 64 * 1024];
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/7/jobs/1/artifacts"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("artifacts/build/artifacts.zip");
    let size = client_for(&server)
        .download_job_artifacts(7, 1, &dest)
        .await
        .unwrap();

    assert_eq!(size, payload.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), payload);
}

#[tokio::test]
async fn failed_download_leaves_no_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/7/jobs/2/artifacts"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("artifacts/lint/artifacts.zip");
    let err = client_for(&server)
        .download_job_artifacts(7, 2, &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, GitLabError::Status { status: 500, .. }));
    assert!(!dest.exists());
}

#[tokio::test]
async fn basic_auth_preferred_over_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/g%2Fapp"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let basic = GitLabClient::new(
        GitLabConfig::new(server.uri())
            .with_username("bob")
            .with_password("pw")
            .with_token("legacy"),
    )
    .unwrap();
    assert_eq!(basic.get_project("g/app").await.unwrap().id, 5);

    let anonymous = GitLabClient::new(GitLabConfig::new(server.uri())).unwrap();
    assert!(!anonymous.is_authenticated());
    let err = anonymous.get_project("g/app").await.unwrap_err();
    assert!(matches!(err, GitLabError::Unauthorized { .. }));
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/g%2Fapp"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_project("g/app").await.unwrap_err();
    assert!(matches!(err, GitLabError::InvalidResponse { .. }));
}
