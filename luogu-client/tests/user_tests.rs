mod common;

use common::*;
use luogu_client::{Entity, Identifier, Uid, User};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer};

// ── Fetch ───────────────────────────────────────────────────────

#[tokio::test]
async fn fetches_profile() {
    let server = MockServer::start().await;
    mount_content(&server, "/user/1", ok(user_data(1, "kkksc03", &["P1000"])), 1).await;

    let user = User::fetch(&mock_client(&server), Uid::new(1)).await.unwrap();
    assert_eq!(user.uid(), Uid::new(1));
    assert_eq!(user.name(), "kkksc03");
    assert_eq!(user.profile().follower_count, 7);
    assert_eq!(user.profile().ranking, None);
    assert_eq!(user.profile().passed_problem_count, Some(1));
    assert_eq!(user.identity(), Identifier::Int(1));
    assert_eq!(user.to_string(), "User(1)");
}

#[tokio::test]
async fn problem_lists_stay_unresolved_until_accessed() {
    let server = MockServer::start().await;
    mount_content(&server, "/user/1", ok(user_data(1, "kkksc03", &["P1000", "P1001"])), 1).await;
    mount_content(&server, "/problem/P1001", ok(problem_data("P1001", "A+B Problem", None)), 1)
        .await;

    let user = User::fetch(&mock_client(&server), Uid::new(1)).await.unwrap();
    assert_eq!(user.passed_problems().len(), 2);
    assert_eq!(user.passed_problems().resolved_count(), 0);

    let problem = user.passed_problems().at(1).await.unwrap();
    assert_eq!(problem.title(), "A+B Problem");
    assert!(!user.passed_problems().is_resolved(0));
}

#[tokio::test]
async fn hidden_problem_lists_are_empty() {
    let server = MockServer::start().await;
    let mut data = user_data(2, "private", &[]);
    data["passedProblems"] = json!(null);
    data.as_object_mut().unwrap().remove("submittedProblems");
    mount_content(&server, "/user/2", ok(data), 1).await;

    let user = User::fetch(&mock_client(&server), Uid::new(2)).await.unwrap();
    assert!(user.passed_problems().is_empty());
    assert!(user.submitted_problems().is_empty());
}

// ── Equality ────────────────────────────────────────────────────

#[tokio::test]
async fn same_payload_compares_equal() {
    let server = MockServer::start().await;
    mount_content(&server, "/user/1", ok(user_data(1, "kkksc03", &[])), 2).await;

    let client = mock_client(&server);
    let a = User::fetch(&client, Uid::new(1)).await.unwrap();
    let b = User::fetch(&client, Uid::new(1)).await.unwrap();
    assert!(a == b);
}

#[tokio::test]
async fn differing_payloads_compare_unequal() {
    let server = MockServer::start().await;
    let mut renamed = user_data(1, "kkksc03", &[]);
    renamed["user"]["slogan"] = json!("changed");
    mount_content(&server, "/user/1", ok(user_data(1, "kkksc03", &[])), 1).await;
    mount_content(&server, "/user/10", ok(renamed), 1).await;

    let client = mock_client(&server);
    let a = User::fetch(&client, Uid::new(1)).await.unwrap();
    let b = User::fetch(&client, Uid::new(10)).await.unwrap();
    // Same identity, different payload.
    assert_eq!(a.identity(), b.identity());
    assert!(a != b);
}

// ── Search ──────────────────────────────────────────────────────

#[tokio::test]
async fn search_resolves_matches_lazily() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/search"))
        .and(query_param("keyword", "kkk"))
        .respond_with(json_response(json!({
            "users": [{"uid": 1, "name": "kkksc03"}, null, {"uid": 3, "name": "kkk"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_content(&server, "/user/3", ok(user_data(3, "kkk", &[])), 1).await;

    let matches = User::search(&mock_client(&server), "kkk").await.unwrap();
    assert_eq!(matches.stubs(), &[Uid::new(1), Uid::new(3)]);

    let user: Arc<User> = matches.at(1).await.unwrap();
    assert_eq!(user.name(), "kkk");
    assert!(!matches.is_resolved(0));
}

#[tokio::test]
async fn search_with_no_matches_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/search"))
        .respond_with(json_response(json!({"users": [null]})))
        .mount(&server)
        .await;

    let matches = User::search(&mock_client(&server), "nobody").await.unwrap();
    assert!(matches.is_empty());
}
