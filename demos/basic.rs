//! Minimal reqbridge example: a legacy-style handler on a hyper server.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl 'http://localhost:3000/greet?name=alice'
//!   curl -X POST http://localhost:3000/greet \
//!        -H 'accept-language: fr-CA,fr;q=0.9' \
//!        -d 'name=bob'
//!   curl http://localhost:3000/session

use http::StatusCode;
use reqbridge::{LegacyRequest, Response, Router, Server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .route("/greet", greet)
        .route("/session", session);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET or POST /greet
//
// `name` may come from the query string or a urlencoded body; the query wins.
fn greet(req: &dyn LegacyRequest) -> Response {
    let name = req.parameter("name").unwrap_or("stranger");
    Response::text(format!(
        "{} {} from {}: hello, {name} [{}]\n",
        req.method(),
        req.request_url(),
        req.remote_addr().unwrap_or_default(),
        req.locale(),
    ))
}

// GET /session
//
// Sessions have no backing store; the legacy surface answers with nothing.
fn session(req: &dyn LegacyRequest) -> Response {
    if req.session(false).is_none() {
        return Response::builder()
            .status(StatusCode::NOT_IMPLEMENTED)
            .text("sessions are not available\n");
    }
    Response::status(StatusCode::OK)
}
