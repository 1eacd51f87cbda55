//! Shared fixtures: every upstream service is mounted on one mock server.
//!
//! | Service | Path |
//! |---------|------|
//! | CMS | `/api/v1/blogs/{id}` |
//! | Object store | `/blog/{key}` (path-style, bucket `blog`) |
//! | Repository | `/repos/alice/notes/contents/{path}` |
//! | Deploy hook | `/deploy/hook` |

#![allow(dead_code)]

use blog_mirror::config::MirrorConfig;
use blog_mirror::BlogMirror;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const UPDATED_AT: &str = "2024-01-06T10:00:00.000Z";

/// Configuration pointing every client at the mock server
pub fn config(server: &MockServer) -> MirrorConfig {
    let mut config = MirrorConfig::default();
    config.cms.base_url = Some(format!("{}/api/v1", server.uri()));
    config.cms.api_key = "test-api-key".to_string();
    config.storage.endpoint = server.uri();
    config.storage.bucket = "blog".to_string();
    config.storage.access_key_id = "AKIDEXAMPLE".to_string();
    config.storage.secret_access_key = "secret".to_string();
    config.repository.api_base = server.uri();
    config.repository.repo = "alice/notes".to_string();
    config.repository.token = "ghp_test".to_string();
    config.deploy.hook_url = Some(format!("{}/deploy/hook", server.uri()));
    config
}

pub fn app(server: &MockServer) -> BlogMirror {
    BlogMirror::new(config(server)).unwrap()
}

/// The CMS record used throughout the tests
pub fn hello_world() -> serde_json::Value {
    serde_json::json!({
        "id": "abc123",
        "title": "Hello World",
        "category": {"id": "tech", "name": "Tech"},
        "date": "2024-01-05",
        "publishedAt": "2024-01-05T09:00:00.000Z",
        "updatedAt": UPDATED_AT,
        "body": "<p>Hi there</p>"
    })
}

pub async fn mount_cms_post(server: &MockServer, id: &str, post: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/blogs/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(post))
        .mount(server)
        .await;
}

pub async fn mount_deploy_hook(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/deploy/hook"))
        .respond_with(ResponseTemplate::new(201))
        .expect(times)
        .mount(server)
        .await;
}

/// Requests received for one method and path
pub async fn requests_to(server: &MockServer, http_method: &str, request_path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == http_method && r.url.path() == request_path)
        .collect()
}
