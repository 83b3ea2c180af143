#![allow(dead_code)]

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use axum_server::tls_rustls::RustlsConfig;
use samsungtv::{ClientConfig, SamsungTV};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A request as the simulated TV saw it.
#[derive(Clone, Debug)]
pub struct Seen {
    pub body: Value,
    pub received: Instant,
}

#[derive(Clone, Default)]
struct DeviceState {
    replies: Arc<Mutex<HashMap<String, (StatusCode, String)>>>,
    seen: Arc<Mutex<Vec<Seen>>>,
    latency: Duration,
}

/// Answers JSON-RPC requests with canned bodies, keyed by method name.
/// Unknown methods get `{"result": null}`.
pub struct FakeTV {
    state: DeviceState,
    pub url: String,
}

async fn handle(State(state): State<DeviceState>, Json(body): Json<Value>) -> impl IntoResponse {
    let method = body["method"].as_str().unwrap_or_default().to_string();
    state.seen.lock().unwrap().push(Seen {
        body,
        received: Instant::now(),
    });
    if !state.latency.is_zero() {
        tokio::time::sleep(state.latency).await;
    }
    let (status, reply) = state
        .replies
        .lock()
        .unwrap()
        .get(&method)
        .cloned()
        .unwrap_or_else(|| (StatusCode::OK, json!({"result": null}).to_string()));
    (status, [(header::CONTENT_TYPE, "application/json")], reply)
}

impl FakeTV {
    pub async fn start() -> Self {
        Self::start_with_latency(Duration::ZERO).await
    }

    pub async fn start_with_latency(latency: Duration) -> Self {
        let (state, app) = Self::router(latency);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            state,
            url: format!("http://{addr}/"),
        }
    }

    /// Serves HTTPS with a freshly generated self-signed certificate, the
    /// way real TVs do.
    pub async fn start_tls() -> Self {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let cert = rcgen::generate_simple_self_signed(vec!["127.0.0.1".to_string()]).unwrap();
        let tls = RustlsConfig::from_pem(
            cert.cert.pem().into_bytes(),
            cert.key_pair.serialize_pem().into_bytes(),
        )
        .await
        .unwrap();

        let (state, app) = Self::router(Duration::ZERO);
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum_server::from_tcp_rustls(listener, tls)
                .serve(app.into_make_service())
                .await
                .unwrap();
        });
        Self {
            state,
            url: format!("https://{addr}/"),
        }
    }

    fn router(latency: Duration) -> (DeviceState, Router) {
        let state = DeviceState {
            latency,
            ..Default::default()
        };
        let app = Router::new()
            .route("/", post(handle))
            .with_state(state.clone());
        (state, app)
    }

    pub fn reply(&self, method: &str, body: Value) {
        self.reply_raw(method, StatusCode::OK, &body.to_string());
    }

    pub fn reply_raw(&self, method: &str, status: StatusCode, body: &str) {
        self.state
            .replies
            .lock()
            .unwrap()
            .insert(method.to_string(), (status, body.to_string()));
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.state.seen.lock().unwrap().clone()
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new("fake-tv").with_endpoint(&self.url)
    }

    pub fn connect(&self, token: Option<&str>) -> SamsungTV {
        SamsungTV::connect(self.config().with_access_token(token.map(str::to_string))).unwrap()
    }
}
