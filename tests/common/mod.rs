#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use event_board::{
    config::Config,
    store::{EventStore, InMemoryEventStore},
    AppState,
};
use fake::{
    faker::{address::en::CityName, lorem::en::Sentence},
    Fake,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "----event-board-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryEventStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryEventStore::new());
        let router = Self::router_with(store.clone());
        Self { router, store }
    }

    pub fn router_with(store: Arc<dyn EventStore>) -> Router {
        Self::router_with_env(store, &[])
    }

    /// Router backed by `store`, configured from `vars` on top of the memory backend.
    pub fn router_with_env(store: Arc<dyn EventStore>, vars: &[(&str, &str)]) -> Router {
        let mut env = HashMap::from([("STORE_BACKEND".to_string(), "memory".to_string())]);
        env.extend(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let config = Config::from_source(Some(env)).unwrap();
        event_board::app(AppState::new(store, config))
    }

    pub async fn send(&self, req: Request<Body>) -> Response {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn post_form(&self, form: MultipartForm) -> Response {
        self.send(form.into_request("/api/events")).await
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn parse_body(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    /// A form with every required field filled in.
    pub fn valid() -> Self {
        Self::valid_except("")
    }

    /// Like [`MultipartForm::valid`] but leaves out `skipped`.
    pub fn valid_except(skipped: &str) -> Self {
        let title: String = Sentence(2..5).fake();
        let city: String = CityName().fake();
        let fields = [
            ("title", title.as_str()),
            ("description", "Evening talks followed by open discussion"),
            ("location", city.as_str()),
            ("date", "2026-11-05T18:30:00Z"),
            ("maxParticipants", "40"),
        ];

        fields
            .into_iter()
            .filter(|(name, _)| *name != skipped)
            .fold(Self::default(), |form, (name, value)| form.text(name, value))
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(
        mut self,
        name: &str,
        filename: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Self {
        let mut head = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
        );
        if let Some(content_type) = content_type {
            head.push_str(&format!("Content-Type: {content_type}\r\n"));
        }
        head.push_str("\r\n");

        self.body.extend_from_slice(head.as_bytes());
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}
