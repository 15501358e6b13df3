use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::extract::{ConnectInfo, Path, Query};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;

use restcast_core::{RestClient, RestClientBuilder};

#[derive(Debug, Deserialize)]
struct LoginForm {
    user: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct RangeEcho {
    customer: String,
    query: HashMap<String, String>,
    cookie: Option<String>,
    tenant: Option<String>,
}

async fn ip(ConnectInfo(peer): ConnectInfo<SocketAddr>) -> Json<serde_json::Value> {
    Json(json!({ "origin": peer.ip().to_string() }))
}

async fn login(Json(form): Json<LoginForm>) -> impl IntoResponse {
    if form.password == "secret" {
        let token = format!("token-{}", form.user);
        (StatusCode::OK, Json(json!({ "token": token })))
    } else {
        (StatusCode::CONFLICT, Json(json!({ "code": 1 })))
    }
}

async fn range(
    Path(customer): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<RangeEcho> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string)
    };
    Json(RangeEcho {
        customer,
        query,
        cookie: header("cookie"),
        tenant: header("x-tenant"),
    })
}

async fn legacy_ip() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "json")],
        r#"{"origin":"127.0.0.1"}"#,
    )
}

async fn slow() -> Json<serde_json::Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({ "origin": "late" }))
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

fn router() -> Router {
    Router::new()
        .route("/ip", get(ip))
        .route("/users/login", post(login))
        .route("/customer/{customerId}/range/", get(range))
        .route("/legacy/ip", get(legacy_ip))
        .route("/slow", get(slow))
        .route("/sessions/current", axum::routing::delete(no_content))
}

/// A local HTTP server and the base URL to reach it.
#[derive(Debug)]
pub struct TestApp {
    pub base_url: String,
}

impl TestApp {
    pub async fn start() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("binding test listener")?;
        let addr = listener.local_addr()?;
        info!(%addr, "launching server");

        tokio::spawn(async move {
            let service = router().into_make_service_with_connect_info::<SocketAddr>();
            if let Err(error) = axum::serve(listener, service).await {
                tracing::error!(%error, "test server stopped");
            }
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
        })
    }

    pub fn builder(&self) -> RestClientBuilder {
        RestClient::builder().with_base_url(&self.base_url)
    }

    pub fn client(&self) -> anyhow::Result<RestClient> {
        self.builder().build().context("building client")
    }
}
