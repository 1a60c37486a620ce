//! A local stand-in for the Tenderly API.
#![allow(dead_code)]

use govsim::{config::TenderlyConfig, tenderly::TenderlyClient};
use http_body_util::{BodyExt, Full};
use hyper::{
    Request, Response, StatusCode,
    body::{Bytes, Incoming},
    server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

const SIMULATION: &str = include_str!("../assets/tenderly/simulation.json");

/// A request received by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Path of the request.
    pub path: String,
    /// Value of the `X-Access-Key` header.
    pub access_key: Option<String>,
    /// JSON body, `Null` if empty.
    pub body: Value,
}

#[derive(Debug)]
struct Responses {
    status: StatusCode,
    encoded_states: Value,
}

/// Handle of a running stub.
#[derive(Debug)]
pub struct TenderlyStub {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl TenderlyStub {
    /// Answers `simulate` with the recorded simulation fixture and `encode-states` with
    /// `encoded_states`.
    pub async fn spawn(encoded_states: Value) -> Self {
        Self::spawn_with(StatusCode::OK, encoded_states).await
    }

    /// Answers every request with `status`.
    pub async fn failing(status: StatusCode) -> Self {
        Self::spawn_with(status, Value::Null).await
    }

    async fn spawn_with(status: StatusCode, encoded_states: Value) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responses = Arc::new(Responses { status, encoded_states });

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((tcp, _)) = listener.accept().await {
                let responses = Arc::clone(&responses);
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        respond(req, Arc::clone(&responses), Arc::clone(&recorded))
                    });
                    let io = TokioIo::new(tcp);
                    let _ = http1::Builder::new().serve_connection(io, service).await;
                });
            }
        });

        Self { base_url, requests }
    }

    /// A client for project `gov/sims` pointed at the stub.
    pub fn client(&self) -> TenderlyClient {
        let config = TenderlyConfig {
            user: "gov".to_string(),
            project: "sims".to_string(),
            access_key: "secret".to_string(),
        };
        TenderlyClient::new(&config).unwrap().with_base_url(&self.base_url)
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The request whose path ends with `suffix`.
    pub fn request(&self, suffix: &str) -> RecordedRequest {
        self.requests()
            .into_iter()
            .find(|request| request.path.ends_with(suffix))
            .unwrap_or_else(|| panic!("no request to {suffix}"))
    }
}

async fn respond(
    req: Request<Incoming>,
    responses: Arc<Responses>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let path = req.uri().path().to_string();
    let access_key = req
        .headers()
        .get("x-access-key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = req.collect().await?.to_bytes();
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    requests.lock().unwrap().push(RecordedRequest { path: path.clone(), access_key, body });

    let (status, body) = if !responses.status.is_success() {
        (responses.status, json!({ "error": { "message": "request rejected" } }).to_string())
    } else if path.ends_with("/simulate") {
        (StatusCode::OK, SIMULATION.to_string())
    } else if path.ends_with("/contracts/encode-states") {
        (StatusCode::OK, responses.encoded_states.to_string())
    } else if path.ends_with("/share") {
        (StatusCode::OK, "{}".to_string())
    } else {
        (StatusCode::NOT_FOUND, String::new())
    };

    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap())
}
