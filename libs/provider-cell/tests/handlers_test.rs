use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use provider_cell::router::provider_routes;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn authed(method: Method, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json");

    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn public_page_lists_provider_and_services() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());
    let provider_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("username", "eq.janedoe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::profile_response(&provider_id, "janedoe", "Jane Doe")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .and(query_param("user_id", format!("eq.{}", provider_id)))
        .and(query_param("order", "name.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::service_response(&Uuid::new_v4().to_string(), &provider_id, "Consultation", 60, 5000),
            MockSupabaseResponses::service_response(&Uuid::new_v4().to_string(), &provider_id, "Follow-up", 30, 2500),
        ])))
        .mount(&mock_server)
        .await;

    let response = provider_routes(config.to_arc())
        .oneshot(Request::builder().uri("/janedoe").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["provider"]["full_name"], "Jane Doe");
    assert!(body["provider"].get("email").is_none());
    assert_eq!(body["services"].as_array().unwrap().len(), 2);
    assert_eq!(body["services"][0]["duration"], 60);
}

#[tokio::test]
async fn unknown_username_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let response = provider_routes(config.to_arc())
        .oneshot(Request::builder().uri("/nobody").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn taken_username_is_a_conflict() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());
    let provider = TestUser::provider("owner@example.com");
    let token = JwtTestUtils::create_test_token(&provider, &config.jwt_secret, None);

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("username", "eq.popular"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": Uuid::new_v4() }])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = provider_routes(config.to_arc())
        .oneshot(authed(Method::PUT, "/me/profile", &token, Some(json!({ "username": "Popular" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn profile_update_writes_normalized_username() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());
    let provider = TestUser::provider("owner@example.com");
    let token = JwtTestUtils::create_test_token(&provider, &config.jwt_secret, None);

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{}", provider.id)))
        .and(body_partial_json(json!({ "username": "fresh-name", "full_name": "Jane Doe" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::profile_response(&provider.id, "fresh-name", "Jane Doe")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = provider_routes(config.to_arc())
        .oneshot(authed(
            Method::PUT,
            "/me/profile",
            &token,
            Some(json!({ "username": "Fresh-Name", "full_name": " Jane Doe " })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], "fresh-name");
}

#[tokio::test]
async fn create_service_rejects_negative_price() {
    let config = TestConfig::default();
    let provider = TestUser::provider("owner@example.com");
    let token = JwtTestUtils::create_test_token(&provider, &config.jwt_secret, None);

    let response = provider_routes(config.to_arc())
        .oneshot(authed(
            Method::POST,
            "/me/services",
            &token,
            Some(json!({ "name": "Massage", "duration": 60, "price": -100 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_service_stores_it_under_the_caller() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());
    let provider = TestUser::provider("owner@example.com");
    let token = JwtTestUtils::create_test_token(&provider, &config.jwt_secret, None);
    let service_id = Uuid::new_v4().to_string();

    Mock::given(method("POST"))
        .and(path("/rest/v1/services"))
        .and(body_partial_json(json!({ "user_id": provider.id, "duration": 30, "price": 2500 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::service_response(&service_id, &provider.id, "Trim", 30, 2500)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = provider_routes(config.to_arc())
        .oneshot(authed(Method::POST, "/me/services", &token, Some(json!({ "name": "Trim", "price": 2500 }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], service_id);
}

#[tokio::test]
async fn editing_someone_elses_service_is_forbidden() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());
    let provider = TestUser::provider("owner@example.com");
    let token = JwtTestUtils::create_test_token(&provider, &config.jwt_secret, None);
    let service_id = Uuid::new_v4().to_string();
    let other_provider = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .and(query_param("id", format!("eq.{}", service_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::service_response(&service_id, &other_provider, "Trim", 30, 2500)
        ])))
        .mount(&mock_server)
        .await;

    let response = provider_routes(config.to_arc())
        .oneshot(authed(Method::DELETE, &format!("/me/services/{}", service_id), &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
