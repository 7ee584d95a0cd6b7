// Stub prediction service for HTTP backend tests

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Canned response for one route.
#[derive(Clone)]
pub struct Canned {
    pub status: u16,
    pub body: String,
}

impl Canned {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

impl IntoResponse for Canned {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

#[derive(Clone)]
struct ServiceState {
    predict: Canned,
    health: Canned,
    requests: Arc<Mutex<Vec<String>>>,
}

/// Serves `POST /predict` and `GET /health` with canned responses on a random local port.
pub struct MockService {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl MockService {
    pub async fn start(predict: Canned, health: Canned) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = ServiceState {
            predict,
            health,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/predict", post(handle_predict))
            .route("/health", get(handle_health))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url,
            requests,
            handle,
        }
    }

    /// Requests received so far, as the request line followed by the body.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_predict(State(state): State<ServiceState>, body: String) -> Canned {
    state.requests.lock().push(format!("POST /predict\n{}", body));
    state.predict
}

async fn handle_health(State(state): State<ServiceState>) -> Canned {
    state.requests.lock().push("GET /health\n".to_string());
    state.health
}
