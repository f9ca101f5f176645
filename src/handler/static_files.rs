//! Static file serving module
//!
//! Resolves request paths under the configured root, detects the MIME type and
//! builds cache-validated responses.

use crate::config::StaticFilesConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Why a static file could not be loaded
#[derive(Debug)]
pub enum LoadError {
    /// Missing, or outside the static root
    NotFound,
    /// Present but unreadable
    Failed(io::Error),
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Failed(e)
        }
    }
}

/// Serve the file a request path points at
pub async fn serve(
    ctx: &RequestContext<'_>,
    config: &StaticFilesConfig,
) -> Response<Full<Bytes>> {
    match load_file(&config.root, ctx.path, &config.index_files).await {
        Ok((content, content_type)) => {
            let etag = cache::generate_etag(&content);
            if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
                return http::build_304_response(&etag);
            }
            http::response::build_file_response(
                Bytes::from(content),
                content_type,
                &etag,
                ctx.is_head,
            )
        }
        Err(LoadError::NotFound) => http::build_404_response(),
        Err(LoadError::Failed(e)) => {
            logger::log_error(&format!("Failed to read static file '{}': {e}", ctx.path));
            http::build_500_response()
        }
    }
}

/// Load a static file, returning its bytes and content type
pub async fn load_file(
    root: &str,
    request_path: &str,
    index_files: &[String],
) -> Result<(Vec<u8>, &'static str), LoadError> {
    let file_path = resolve_path(root, request_path, index_files).await?;
    let content = fs::read(&file_path).await?;
    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    Ok((content, content_type))
}

/// Map a request path to a canonical file path inside `root`
///
/// Directory requests (including `/`) resolve to the first existing index
/// file. Paths escaping the root are reported as not found.
pub async fn resolve_path(
    root: &str,
    request_path: &str,
    index_files: &[String],
) -> Result<PathBuf, LoadError> {
    let relative = request_path.trim_start_matches('/');

    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static root not found or inaccessible '{root}': {e}"
            ));
            return Err(LoadError::NotFound);
        }
    };

    let mut file_path = Path::new(root).join(relative);

    if relative.is_empty() || relative.ends_with('/') || is_dir(&file_path).await {
        for index_file in index_files {
            let candidate = file_path.join(index_file);
            if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
                file_path = candidate;
                break;
            }
        }
    }

    let canonical = fs::canonicalize(&file_path).await?;
    if !canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path} -> {}",
            canonical.display()
        ));
        return Err(LoadError::NotFound);
    }

    Ok(canonical)
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    struct TestRoot {
        base: PathBuf,
        root: PathBuf,
    }

    impl TestRoot {
        fn new(tag: &str) -> Self {
            let base = std::env::temp_dir().join(format!(
                "polyfun-relay-static-{tag}-{}",
                std::process::id()
            ));
            let root = base.join("public");
            std::fs::create_dir_all(root.join("js")).unwrap();
            std::fs::create_dir_all(root.join("empty")).unwrap();
            std::fs::write(root.join("index.html"), "<h1>PolyFun</h1>").unwrap();
            std::fs::write(root.join("js/app.js"), "console.log(1)").unwrap();
            std::fs::write(base.join("secret.txt"), "keep out").unwrap();
            Self { base, root }
        }

        fn config(&self) -> StaticFilesConfig {
            StaticFilesConfig {
                root: self.root.to_string_lossy().into_owned(),
                index_files: vec!["index.html".to_string()],
            }
        }
    }

    impl Drop for TestRoot {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.base).ok();
        }
    }

    fn ctx(path: &str) -> RequestContext<'_> {
        RequestContext {
            path,
            is_head: false,
            if_none_match: None,
        }
    }

    async fn body_of(response: Response<Full<Bytes>>) -> Vec<u8> {
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let root = TestRoot::new("index");
        let response = serve(&ctx("/"), &root.config()).await;
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "text/html");
        assert_eq!(body_of(response).await, b"<h1>PolyFun</h1>");
    }

    #[tokio::test]
    async fn test_nested_asset_content_type() {
        let root = TestRoot::new("nested");
        let response = serve(&ctx("/js/app.js"), &root.config()).await;
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "text/javascript");
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let root = TestRoot::new("missing");
        let response = serve(&ctx("/nope.css"), &root.config()).await;
        assert_eq!(response.status(), 404);
        assert_eq!(body_of(response).await, b"Not found");
    }

    #[tokio::test]
    async fn test_traversal_is_blocked() {
        let root = TestRoot::new("traversal");
        let response = serve(&ctx("/../secret.txt"), &root.config()).await;
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_directory_without_index_is_500() {
        let root = TestRoot::new("dir");
        let response = serve(&ctx("/empty/"), &root.config()).await;
        assert_eq!(response.status(), 500);
        assert_eq!(body_of(response).await, b"Server error");
    }

    #[tokio::test]
    async fn test_etag_revalidation() {
        let root = TestRoot::new("etag");
        let first = serve(&ctx("/index.html"), &root.config()).await;
        let etag = first.headers()["etag"].to_str().unwrap().to_string();

        let mut revalidate = ctx("/index.html");
        revalidate.if_none_match = Some(etag);
        let second = serve(&revalidate, &root.config()).await;
        assert_eq!(second.status(), 304);
    }

    #[tokio::test]
    async fn test_head_has_headers_only() {
        let root = TestRoot::new("head");
        let mut head = ctx("/index.html");
        head.is_head = true;
        let response = serve(&head, &root.config()).await;
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-length"], "16");
        assert!(body_of(response).await.is_empty());
    }
}
