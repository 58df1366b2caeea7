//! # usuarios
//!
//! An in-memory user directory served as a small JSON REST API.
//!
//! Every mutating endpoint follows the same lifecycle: look the user up,
//! validate the input, mutate the directory, respond. Nothing is persisted;
//! the directory starts from a fixed seed of four users on every run.
//!
//! The HTTP side is a thin layer over hyper:
//!
//! - Radix-tree routing via [`matchit`], one tree per method
//! - A fallback handler serving static assets from a public directory
//! - Graceful shutdown on SIGTERM / Ctrl-C, draining in-flight requests
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use usuarios::{Server, UserDirectory};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), usuarios::Error> {
//!     let app = usuarios::app(UserDirectory::seeded().shared(), "public");
//!     Server::bind("127.0.0.1:3000".parse().unwrap())
//!         .await?
//!         .serve(app)
//!         .await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod config;
pub mod directory;
pub mod middleware;
pub mod static_files;
pub mod validation;

use std::path::PathBuf;

pub use config::Config;
pub use directory::{SharedDirectory, User, UserDirectory, UserError, UserId};
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use method::Method;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::{BODY_LIMIT, Server};
pub use status::Status;
pub use validation::ValidationError;

/// The full application: user API routes plus static assets from
/// `public_dir` for every other path.
pub fn app(directory: SharedDirectory, public_dir: impl Into<PathBuf>) -> Router {
    api::routes(Router::new(), directory).fallback(static_files::serve_dir(public_dir))
}
