//! Static assets served from a public directory.
//!
//! Registered as the router fallback, so API routes always win. `/` and any
//! path ending in `/` resolve to `index.html`. Paths that try to climb out of
//! the root with `..` are answered with `404`, same as a missing file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::handler::Handler;
use crate::method::Method;
use crate::request::Request;
use crate::response::{ContentType, Response};
use crate::status::Status;

/// A fallback handler serving files below `root`.
pub fn serve_dir(root: impl Into<PathBuf>) -> impl Handler {
    let root: Arc<Path> = Arc::from(root.into());
    move |req: Request| {
        let root = Arc::clone(&root);
        async move { serve(&root, &req).await }
    }
}

async fn serve(root: &Path, req: &Request) -> Response {
    if !matches!(req.method(), Method::Get | Method::Head) {
        return Response::status(Status::NotFound);
    }
    let Some(path) = resolve(root, req.path()) else {
        return Response::status(Status::NotFound);
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let content_type = path.extension()
                .and_then(|ext| ext.to_str())
                .map_or(ContentType::OctetStream, ContentType::from_extension);
            let res = Response::builder().bytes(content_type, bytes);
            if req.method() == Method::Head { res.without_body() } else { res }
        }
        Err(e) => {
            debug!(path = %path.display(), "static file unavailable: {e}");
            Response::status(Status::NotFound)
        }
    }
}

/// Maps a request path onto a file below `root`, or `None` if the path is
/// not allowed. Segments are percent-decoded before they are checked.
fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for raw in request_path.split('/').filter(|s| !s.is_empty()) {
        let segment = percent_decode_str(raw).decode_utf8().ok()?;
        if segment == "." {
            continue;
        }
        if segment == ".." || segment.contains(['/', '\\', '\0']) {
            return None;
        }
        path.push(&*segment);
    }
    if request_path.is_empty() || request_path.ends_with('/') {
        path.push("index.html");
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_maps_to_index() {
        let root = Path::new("/srv/public");
        assert_eq!(resolve(root, "/"), Some(root.join("index.html")));
        assert_eq!(resolve(root, "/docs/"), Some(root.join("docs").join("index.html")));
    }

    #[test]
    fn nested_file() {
        let root = Path::new("/srv/public");
        assert_eq!(resolve(root, "/css/site.css"), Some(root.join("css").join("site.css")));
    }

    #[test]
    fn encoded_names_are_decoded() {
        let root = Path::new("/srv/public");
        assert_eq!(resolve(root, "/mi%20foto.png"), Some(root.join("mi foto.png")));
    }

    #[test]
    fn parent_segments_are_refused() {
        let root = Path::new("/srv/public");
        assert_eq!(resolve(root, "/../etc/passwd"), None);
        assert_eq!(resolve(root, "/css/../../secret"), None);
        assert_eq!(resolve(root, "/a\\..\\b"), None);
        assert_eq!(resolve(root, "/%2e%2e/etc/passwd"), None);
        assert_eq!(resolve(root, "/css%2F..%2F..%2Fsecret"), None);
    }

    #[tokio::test]
    async fn serves_file_with_content_type() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>Usuarios</h1>").unwrap();

        let req = Request::new(Method::Get, "/", Vec::new(), Vec::new());
        let res = serve(dir.path(), &req).await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
        assert_eq!(res.body(), b"<h1>Usuarios</h1>");
    }

    #[tokio::test]
    async fn missing_file_and_wrong_method_are_404() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), "1").unwrap();

        let missing = Request::new(Method::Get, "/nope.js", Vec::new(), Vec::new());
        assert_eq!(serve(dir.path(), &missing).await.status_code(), 404);

        let post = Request::new(Method::Post, "/app.js", Vec::new(), Vec::new());
        assert_eq!(serve(dir.path(), &post).await.status_code(), 404);
    }
}
