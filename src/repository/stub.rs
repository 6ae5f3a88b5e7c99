//! Recording HTTP server standing in for Google APIs in adapter tests

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode, Uri},
    Json, Router,
};
use serde_json::{json, Value};
use std::{collections::VecDeque, sync::Arc};
use tokio::sync::Mutex;

/// A request as the server saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct Exchange {
    replies: VecDeque<(StatusCode, Value)>,
    requests: Vec<Recorded>,
}

type Shared = Arc<Mutex<Exchange>>;

pub struct StubServer {
    pub base_url: String,
    exchange: Shared,
}

impl StubServer {
    /// Serve `replies` in order, one per request, on an ephemeral port
    pub async fn spawn(replies: Vec<(u16, Value)>) -> Self {
        let exchange: Shared = Arc::new(Mutex::new(Exchange {
            replies: replies
                .into_iter()
                .map(|(status, body)| (StatusCode::from_u16(status).unwrap(), body))
                .collect(),
            requests: Vec::new(),
        }));

        let app = Router::new().fallback(answer).with_state(exchange.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub listener");
        let addr = listener.local_addr().expect("No local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Stub server failed");
        });

        Self {
            base_url: format!("http://{}/v1", addr),
            exchange,
        }
    }

    pub async fn requests(&self) -> Vec<Recorded> {
        self.exchange.lock().await.requests.clone()
    }
}

async fn answer(
    State(exchange): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    let mut exchange = exchange.lock().await;
    exchange.requests.push(Recorded {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        bearer,
        body: serde_json::from_slice(&body).ok(),
    });

    let (status, reply) = exchange.replies.pop_front().unwrap_or((
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": { "code": 500, "message": "no reply queued" } }),
    ));
    (status, Json(reply))
}
