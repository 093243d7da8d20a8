//! Shared fixtures for client tests: canned payloads and mock-server wiring.

#![allow(dead_code)]

use luogu_client::{ClientConfig, LuoguClient};
use serde_json::{Value, json};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate, Times};

pub const CSRF_TOKEN: &str = "1700000000:c2VjcmV0LXRva2Vu";

/// Installs a test subscriber once; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Config pointed at the mock server.
pub fn mock_config(server: &MockServer) -> ClientConfig {
    ClientConfig::with_base_url(server.uri())
}

/// Anonymous client pointed at the mock server.
pub fn mock_client(server: &MockServer) -> LuoguClient {
    init_tracing();
    LuoguClient::new(mock_config(server)).unwrap()
}

/// Wraps `current_data` in a successful content-only envelope.
pub fn ok(current_data: Value) -> Value {
    json!({
        "code": 200,
        "currentTemplate": "",
        "currentData": current_data,
        "currentTitle": "洛谷",
        "currentTheme": null,
        "currentTime": 1_700_000_000,
    })
}

/// A content-only envelope carrying an application error.
///
/// The HTTP status is still 200; only `code` reports the failure.
pub fn error_body(code: i64, message: &str) -> Value {
    json!({
        "code": code,
        "currentTemplate": "InternalError",
        "currentData": {
            "errorType": "LuoguFramework\\HttpFoundation\\Controller\\Exception\\HttpException",
            "errorMessage": message,
            "errorTrace": []
        },
        "currentTitle": "验证错误",
    })
}

pub fn user_data(uid: u64, name: &str, passed: &[&str]) -> Value {
    let passed: Vec<Value> = passed
        .iter()
        .map(|pid| json!({"pid": pid, "title": format!("题目 {pid}"), "difficulty": 1, "type": "P"}))
        .collect();
    json!({
        "user": {
            "uid": uid,
            "name": name,
            "slogan": "",
            "badge": null,
            "isAdmin": false,
            "isBanned": false,
            "color": "Gray",
            "ccfLevel": 0,
            "followingCount": 3,
            "followerCount": 7,
            "ranking": null,
            "registerTime": 1_500_000_000,
            "prize": [],
            "passedProblemCount": passed.len(),
            "submittedProblemCount": passed.len(),
        },
        "passedProblems": passed.clone(),
        "submittedProblems": passed,
    })
}

pub fn problem_data(pid: &str, title: &str, provider: Option<u64>) -> Value {
    json!({
        "problem": {
            "pid": pid,
            "title": title,
            "type": "P",
            "difficulty": 1,
            "fullScore": 100,
            "background": "",
            "description": "输入两个整数 $a, b$，输出它们的和。",
            "inputFormat": "两个以空格分开的整数。",
            "outputFormat": "一个整数。",
            "samples": [["20 30", "50"]],
            "hint": null,
            "attachments": [{
                "id": "7c3d",
                "filename": "data.zip",
                "size": 1024,
                "downloadLink": "https://cdn.luogu.com.cn/upload/7c3d.zip",
                "uploadTime": 1_600_000_000
            }],
            "canEdit": false,
            "limits": {"time": [1000, 1000], "memory": [131072, 131072]},
            "stdCode": "",
            "tags": [1, 2],
            "wantsTranslation": false,
            "totalSubmit": 1_000_000,
            "totalAccepted": 500_000,
            "flag": 13,
            "provider": provider.map(|uid| json!({"uid": uid, "name": "provider", "color": "Purple"})),
        },
        "contest": null,
        "discussions": [],
    })
}

pub fn paste_data(id: &str, data: &str, public: bool, uid: u64) -> Value {
    json!({
        "paste": {
            "id": id,
            "data": data,
            "public": public,
            "time": 1_650_000_000,
            "user": {"uid": uid, "name": "author", "color": "Blue"}
        }
    })
}

/// An HTML page carrying `token` in its csrf meta tag.
pub fn csrf_page(token: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width\">\n\
         <meta name=\"csrf-token\" content=\"{token}\">\n\
         <title>洛谷</title>\n</head>\n<body></body>\n</html>"
    )
}

pub fn json_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// Serves `body` for content-only GETs of `route`, expecting `times` hits.
pub async fn mount_content(server: &MockServer, route: &str, body: Value, times: impl Into<Times>) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("x-luogu-type", "content-only"))
        .respond_with(json_response(body))
        .expect(times)
        .mount(server)
        .await;
}

/// Like [`mount_content`], but each response is held back for `delay`.
pub async fn mount_content_delayed(
    server: &MockServer,
    route: &str,
    body: Value,
    delay: Duration,
    times: impl Into<Times>,
) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(json_response(body).set_delay(delay))
        .expect(times)
        .mount(server)
        .await;
}

/// Serves the CSRF page at `route`, expecting `times` hits.
pub async fn mount_csrf_page(
    server: &MockServer,
    route: &str,
    token: &str,
    times: impl Into<Times>,
) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(csrf_page(token)))
        .expect(times)
        .mount(server)
        .await;
}
