use http::StatusCode;
use http::header::COOKIE;
use serde::{Deserialize, Serialize};

use super::*;
use crate::client::{Envelope, RequestMetadata, RestClientError};
use crate::testing::StubTransport;

#[derive(Debug, Deserialize, PartialEq)]
struct LoginOk {
    token: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct LoginConflict {
    code: u32,
}

#[derive(Debug, Deserialize, PartialEq)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Notice {
    message: String,
}

#[derive(Debug, Serialize)]
struct Login {
    user: String,
    password: String,
}

impl RestRequest for Login {
    fn describe() -> Option<RequestMetadata> {
        Some(
            RequestMetadata::post("/users/login")
                .on_status::<LoginOk>(StatusCode::OK)
                .on_status::<LoginConflict>(StatusCode::CONFLICT),
        )
    }
}

#[derive(Debug, Serialize)]
struct GetPost {
    #[serde(skip_serializing)]
    post_id: u32,
}

impl RestRequest for GetPost {
    fn describe() -> Option<RequestMetadata> {
        Some(RequestMetadata::get("/posts/{postId}").with_default_response::<ApiError>())
    }

    fn url_segments(&self) -> UrlSegments {
        UrlSegments::new().add_segment("postId", self.post_id)
    }
}

#[derive(Debug, Serialize)]
struct SearchPosts {
    filters: std::collections::BTreeMap<Vec<u8>, u8>,
}

impl RestRequest for SearchPosts {
    fn describe() -> Option<RequestMetadata> {
        Some(RequestMetadata::get("/posts").with_default_response::<ApiError>())
    }
}

#[derive(Debug, Serialize)]
struct Undeclared;

impl RestRequest for Undeclared {}

fn login() -> Login {
    Login {
        user: "alice".to_string(),
        password: "secret".to_string(),
    }
}

fn client_with(transport: &StubTransport) -> RestClient {
    RestClient::builder()
        .with_base_url("http://api.example.com")
        .with_transport(transport.clone())
        .build()
        .expect("a client")
}

#[tokio::test]
async fn test_status_mapping_selects_the_type() {
    let transport = StubTransport::new().respond_json(StatusCode::CONFLICT, r#"{"code":1}"#);
    let client = client_with(&transport);

    let response = client.request(login()).get_dynamic().await.expect("a response");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        response.downcast::<LoginConflict>().expect("a conflict"),
        LoginConflict { code: 1 }
    );
}

#[tokio::test]
async fn test_await_runs_the_dynamic_form() {
    let transport = StubTransport::new().respond_json(StatusCode::OK, r#"{"token":"abc"}"#);
    let client = client_with(&transport);

    let response = client.request(login()).await.expect("a response");

    assert!(response.is::<LoginOk>());
}

#[tokio::test]
async fn test_typed_call_on_status_mapping_uses_requested_type() {
    let transport = StubTransport::new().respond_json(StatusCode::OK, r#"{"token":"abc"}"#);
    let client = client_with(&transport);

    let ok: LoginOk = client.request(login()).get().await.expect("a token");

    assert_eq!(ok.token, "abc");
}

#[tokio::test]
async fn test_no_matching_response_type() {
    let transport =
        StubTransport::new().respond_json(StatusCode::INTERNAL_SERVER_ERROR, r#"{"oops":true}"#);
    let client = client_with(&transport);

    let result = client.request(login()).get::<LoginOk>().await;

    let Err(RestClientError::NoMatchingResponseType { status, envelope }) = result else {
        panic!("expected no matching type, got {result:?}");
    };
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(envelope.text(), r#"{"oops":true}"#);
}

#[tokio::test]
async fn test_incompatible_default_type() {
    let transport = StubTransport::new().respond_json(StatusCode::OK, r#"{"message":"hi"}"#);
    let client = client_with(&transport);

    let result = client.request(GetPost { post_id: 7 }).get::<LoginOk>().await;

    let Err(RestClientError::IncompatibleResponseType {
        requested,
        declared,
        status,
        payload,
        ..
    }) = result
    else {
        panic!("expected an incompatible type, got {result:?}");
    };
    assert!(requested.ends_with("LoginOk"));
    assert!(declared.ends_with("ApiError"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload, serde_json::json!({}));
}

#[tokio::test]
async fn test_incompatible_default_type_with_the_same_shape() {
    let transport = StubTransport::new().respond_json(StatusCode::OK, r#"{"message":"hi"}"#);
    let client = client_with(&transport);

    let result = client.request(GetPost { post_id: 7 }).get::<Notice>().await;

    let Err(RestClientError::IncompatibleResponseType {
        requested,
        declared,
        envelope,
        ..
    }) = result
    else {
        panic!("expected an incompatible type, got {result:?}");
    };
    assert!(requested.ends_with("Notice"));
    assert!(declared.ends_with("ApiError"));
    assert_eq!(envelope.text(), r#"{"message":"hi"}"#);
}

#[tokio::test]
async fn test_incompatible_default_type_without_payload_snapshot() {
    let transport = StubTransport::new().respond_json(StatusCode::OK, r#"{"message":"hi"}"#);
    let client = client_with(&transport);
    let filters = std::collections::BTreeMap::from([(vec![1_u8], 1_u8)]);

    let result = client.request(SearchPosts { filters }).get::<Notice>().await;

    let Err(RestClientError::IncompatibleResponseType { payload, .. }) = result else {
        panic!("expected an incompatible type, got {result:?}");
    };
    assert_eq!(payload, serde_json::Value::Null);
}

#[tokio::test]
async fn test_default_type_matching_the_request() {
    let transport = StubTransport::new().respond_json(StatusCode::NOT_FOUND, r#"{"message":"no"}"#);
    let client = client_with(&transport);

    let error: ApiError = client
        .request(GetPost { post_id: 7 })
        .get()
        .await
        .expect("the default type");

    assert_eq!(error.message, "no");
    assert_eq!(transport.requests()[0].url().as_str(), "http://api.example.com/posts/7");
}

#[tokio::test]
async fn test_missing_configuration_sends_nothing() {
    let transport = StubTransport::new();
    let client = client_with(&transport);

    let result = client.request(Undeclared).get_dynamic().await;

    assert!(matches!(
        result,
        Err(RestClientError::MissingConfiguration { .. })
    ));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_unresolved_segment_sends_nothing() {
    let transport = StubTransport::new();
    let client = client_with(&transport);
    client
        .registry()
        .register::<Undeclared>(RequestMetadata::get("/customer/{customerId}/range/"));

    let result = client.request(Undeclared).get_dynamic().await;

    assert!(matches!(result, Err(RestClientError::PathUnresolved { .. })));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_call_parameters_reach_the_transport() {
    let transport = StubTransport::new().respond_json(StatusCode::OK, r#"{"message":"ok"}"#);
    let client = client_with(&transport);

    let _: ApiError = client
        .request(GetPost { post_id: 7 })
        .with_url_segment("postId", 8)
        .with_query_param("customerid", 0)
        .with_cookie("session_id", "abc123")
        .with_cookies(CallCookies::new().add_cookie("user_id", 12345))
        .with_header("X-Request-ID", "abc-123")
        .get()
        .await
        .expect("a response");

    let requests = transport.requests();
    let request = &requests[0];
    assert_eq!(request.path(), "/posts/8");
    assert_eq!(request.url().query(), Some("customerid=0"));
    assert_eq!(request.headers()[COOKIE], "session_id=abc123; user_id=12345");
    assert_eq!(request.headers()["x-request-id"], "abc-123");
    assert!(request.body().is_none());
}

#[tokio::test]
async fn test_spawned_calls_resolve_later() {
    let transport = StubTransport::new()
        .with_fallback(Envelope::json(StatusCode::OK, r#"{"token":"abc"}"#));
    let client = client_with(&transport);

    let pending = client.request(login()).spawn::<LoginOk>();
    let dynamic = client.request(login()).spawn_dynamic();

    let ok = pending.await.expect("a token");
    assert_eq!(ok.token, "abc");
    let response = dynamic.await.expect("a response");
    assert!(response.is::<LoginOk>());
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_unserializable_parameter_sends_nothing() {
    let transport = StubTransport::new().respond_json(StatusCode::OK, r#"{"message":"ok"}"#);
    let client = client_with(&transport);
    let signature = std::collections::BTreeMap::from([(vec![1_u8], 1_u8)]);

    let result = client
        .request(GetPost { post_id: 7 })
        .with_header("X-Signature", signature)
        .get::<ApiError>()
        .await;

    assert!(matches!(
        result,
        Err(RestClientError::SerializationError { .. })
    ));
    assert_eq!(transport.request_count(), 0);
}
