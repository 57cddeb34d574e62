//! Integration test harness
//!
//! `MockUpstream` serves an OpenAI-compatible text and image API plus the
//! image hosting on a random local port, with a scripted outcome per image
//! request.
//!
//! # Example
//!
//! ```rust,ignore
//! let upstream = MockUpstream::start(Script::default()).await;
//! let config = upstream.config(temp_dir.path());
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path as UrlPath, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use colorbook::Config;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const API_KEY: &str = "sk-test-key";

/// What the upstream does for one image request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageBehavior {
    /// Return a URL that downloads fine
    Url,
    /// Return a URL whose download answers 404
    BrokenUrl,
    /// Return an empty `data` array
    Empty,
    /// Return the image inline as base64
    Inline,
}

/// Scripted upstream responses
#[derive(Debug, Clone)]
pub struct Script {
    pub themes_text: String,
    pub description: String,
    /// Behavior per image request in order; requests past the end get `Url`
    pub images: Vec<ImageBehavior>,
    /// Answer every text request with a 500
    pub fail_chat: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            themes_text: "- Dinosaurs\n- Under the Sea\n- Space Adventure".to_string(),
            description: "A friendly T-Rex waving hello".to_string(),
            images: Vec::new(),
            fail_chat: false,
        }
    }
}

#[derive(Default)]
struct Recorded {
    chat_prompts: Vec<String>,
    image_requests: Vec<Value>,
}

struct MockState {
    script: Script,
    base_url: String,
    recorded: Mutex<Recorded>,
}

/// Mock text/image API running in a background task
pub struct MockUpstream {
    pub addr: SocketAddr,
    state: Arc<MockState>,
    _handle: JoinHandle<()>,
}

/// Deterministic bytes for the image served at `index`
pub fn image_bytes(index: usize) -> Vec<u8> {
    format!("PNG-{}-", index).repeat(64 * index).into_bytes()
}

impl MockUpstream {
    pub async fn start(script: Script) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock upstream");
        let addr = listener.local_addr().expect("local addr");

        let state = Arc::new(MockState {
            script,
            base_url: format!("http://{}", addr),
            recorded: Mutex::new(Recorded::default()),
        });

        let router = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .route("/v1/images/generations", post(image_generations))
            .route("/files/{name}", get(serve_file))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("Mock upstream error: {}", e);
            }
        });

        Self {
            addr,
            state,
            _handle: handle,
        }
    }

    /// Configuration pointing at this upstream
    pub fn config(&self, output_dir: &Path) -> Config {
        Config {
            api_key: Some(API_KEY.to_string()),
            api_base_url: format!("http://{}/v1", self.addr),
            output_dir: output_dir.to_path_buf(),
            ..Config::default()
        }
    }

    pub fn chat_prompts(&self) -> Vec<String> {
        self.state.recorded.lock().unwrap().chat_prompts.clone()
    }

    pub fn image_requests(&self) -> Vec<Value> {
        self.state.recorded.lock().unwrap().image_requests.clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", API_KEY))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"message": "Incorrect API key provided"}})),
    )
        .into_response()
}

async fn chat_completions(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let prompt = body["messages"][0]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let content = if prompt.contains("list of") {
        state.script.themes_text.clone()
    } else {
        state.script.description.clone()
    };
    state.recorded.lock().unwrap().chat_prompts.push(prompt);

    if state.script.fail_chat {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"message": "The server had an error"}})),
        )
            .into_response();
    }

    Json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

async fn image_generations(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let index = {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.image_requests.push(body);
        recorded.image_requests.len()
    };

    let behavior = state
        .script
        .images
        .get(index - 1)
        .copied()
        .unwrap_or(ImageBehavior::Url);

    let data = match behavior {
        ImageBehavior::Url => json!([{"url": format!("{}/files/{}.png", state.base_url, index)}]),
        ImageBehavior::BrokenUrl => {
            json!([{"url": format!("{}/files/missing-{}.png", state.base_url, index)}])
        }
        ImageBehavior::Empty => json!([]),
        ImageBehavior::Inline => {
            use base64::{engine::general_purpose::STANDARD, Engine};
            json!([{"b64_json": STANDARD.encode(image_bytes(index))}])
        }
    };

    Json(json!({"created": 1700000000, "data": data})).into_response()
}

async fn serve_file(UrlPath(name): UrlPath<String>) -> Response {
    let index = name
        .strip_suffix(".png")
        .and_then(|stem| stem.parse::<usize>().ok());

    match index {
        Some(index) => (
            StatusCode::OK,
            [("content-type", "image/png")],
            image_bytes(index),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Image not found").into_response(),
    }
}
