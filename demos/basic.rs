//! Minimal tsuji example: typed user routes, a literal override and a
//! catch-all file route.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42          # constrained {id:int}
//!   curl http://localhost:3000/users/alice       # falls back to {name}
//!   curl http://localhost:3000/users/me          # literal beats both
//!   curl http://localhost:3000/files/css/site.css
//!   curl -X PUT http://localhost:3000/users/42   # 405, Allow: GET, DELETE

use http::StatusCode;
use tracing_subscriber::EnvFilter;
use tsuji::{Request, Response, Router, Server};

#[tokio::main]
async fn main() -> Result<(), tsuji::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app = Router::new()
        .get("/users/{id:int}",  get_user)
        .get("/users/{name}",    get_user_by_name)
        .get("/users/me",        whoami)
        .post("/users",          create_user)
        .delete("/users/{id}",   delete_user)
        .get("/files/{*path}",   get_file);

    Server::bind(([0, 0, 0, 0], 3000)).serve(app).await
}

// GET /users/{id:int}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("0");
    Response::json(format!(r#"{{"id":{id},"name":"alice"}}"#))
}

// GET /users/{name}
async fn get_user_by_name(req: Request) -> Response {
    let name = req.param("name").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":7,"name":"{name}"}}"#))
}

// GET /users/me
async fn whoami(_req: Request) -> &'static str {
    "you"
}

// POST /users
async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }
    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(r#"{"id":99,"name":"new_user"}"#)
}

// DELETE /users/{id} → 204 No Content
async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

// GET /files/{*path}
async fn get_file(req: Request) -> String {
    format!("file: {}", req.param("path").unwrap_or_default())
}
