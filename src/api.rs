//! `/api/usuarios` routes over the shared [`UserDirectory`](crate::UserDirectory).
//!
//! | Method | Path | Success | Failure |
//! |---|---|---|---|
//! | GET    | `/api/usuarios`      | 200, all users        | |
//! | GET    | `/api/usuarios/{id}` | 200, one user         | 404 |
//! | POST   | `/api/usuarios`      | 200, created user     | 400 |
//! | PUT    | `/api/usuarios/{id}` | 200, updated user     | 404, 400 |
//! | DELETE | `/api/usuarios/{id}` | 200, removed user     | 404 |
//!
//! Failures carry a plain-text message.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::directory::{SharedDirectory, User, UserError};
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::router::Router;
use crate::status::Status;
use crate::validation::name_field;

pub const USERS: &str = "/api/usuarios";
pub const USER: &str = "/api/usuarios/{id}";

/// Registers the user routes on `router`, each closing over `directory`.
pub fn routes(router: Router, directory: SharedDirectory) -> Router {
    router
        .get(USERS, inject(&directory, list))
        .get(USER, inject(&directory, show))
        .post(USERS, inject(&directory, create))
        .put(USER, inject(&directory, update))
        .delete(USER, inject(&directory, remove))
}

/// Adapts `f(directory, request)` to the `Fn(Request)` shape the router
/// stores, cloning the directory handle into every request.
fn inject<F, Fut>(
    directory: &SharedDirectory,
    f: F,
) -> impl Fn(Request) -> Fut + Send + Sync + 'static
where
    F: Fn(SharedDirectory, Request) -> Fut + Copy + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let directory = Arc::clone(directory);
    move |req| f(Arc::clone(&directory), req)
}

async fn list(directory: SharedDirectory, _req: Request) -> Response {
    let users: Vec<User> = directory.read().await.list().to_vec();
    Json(users).into_response()
}

async fn show(directory: SharedDirectory, req: Request) -> Response {
    let id = id_param(&req);
    let dir = directory.read().await;
    match dir.find(id) {
        Some(user) => Json(user).into_response(),
        None => UserError::NotFound(id.to_owned()).into_response(),
    }
}

async fn create(directory: SharedDirectory, req: Request) -> Response {
    let body = match body(&req) {
        Ok(body) => body,
        Err(res) => return res,
    };
    let result = match name_field(&body) {
        Ok(name) => directory.write().await.create(name),
        Err(e) => Err(e.into()),
    };
    json_result(result)
}

async fn update(directory: SharedDirectory, req: Request) -> Response {
    let id = id_param(&req);
    let mut dir = directory.write().await;
    // Unknown ids are reported before the body is judged.
    if dir.find(id).is_none() {
        return UserError::NotFound(id.to_owned()).into_response();
    }
    let body = match body(&req) {
        Ok(body) => body,
        Err(res) => return res,
    };
    let result = name_field(&body)
        .map_err(UserError::from)
        .and_then(|name| dir.update(id, name));
    json_result(result)
}

async fn remove(directory: SharedDirectory, req: Request) -> Response {
    let id = id_param(&req);
    let result = directory.write().await.remove(id);
    json_result(result)
}

fn id_param(req: &Request) -> &str {
    req.param("id").unwrap_or_default()
}

/// Parses the JSON body. A non-JSON `content-type` is answered with `415`, a
/// malformed body with `400` and the parser's message.
fn body(req: &Request) -> Result<Value, Response> {
    if !req.is_json() {
        return Err(Response::builder()
            .status(Status::UnsupportedMediaType)
            .text("expected an application/json body"));
    }
    req.json::<Value>().map_err(|e| {
        Response::builder()
            .status(Status::BadRequest)
            .text(format!("invalid JSON body: {e}"))
    })
}

fn json_result(result: Result<User, UserError>) -> Response {
    result.map(Json).into_response()
}
