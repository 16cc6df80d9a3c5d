//! Static file serving module
//!
//! Serves everything outside `/todos` from the configured directory, with
//! index files, MIME detection and `ETag` revalidation.

use hyper::body::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::StaticFilesConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, HttpResponse};
use crate::logger;

/// Serve the file addressed by `ctx.path`, or 404
pub async fn serve(ctx: &RequestContext<'_>, config: &StaticFilesConfig) -> HttpResponse {
    match load_from_directory(&config.dir, ctx.path, &config.index_files).await {
        Some((content, content_type)) => {
            let etag = cache::generate_etag(&content);
            if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
                return http::build_304_response(&etag);
            }
            http::response::build_cached_response(
                Bytes::from(content),
                content_type,
                &etag,
                ctx.is_head,
            )
        }
        None => http::build_404_response(),
    }
}

/// Resolve `path` under `static_dir`, trying index files for directories.
///
/// Returns `None` for missing files and for anything that resolves
/// outside `static_dir`.
pub async fn load_from_directory(
    static_dir: &str,
    path: &str,
    index_files: &[String],
) -> Option<(Vec<u8>, &'static str)> {
    let root = match fs::canonicalize(static_dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{static_dir}': {e}"
            ));
            return None;
        }
    };

    let relative = path.trim_start_matches('/');
    let mut file_path = root.join(relative);

    if relative.is_empty() || relative.ends_with('/') || is_dir(&file_path).await {
        file_path = find_index(&file_path, index_files).await?;
    }

    // Missing files are a plain 404
    let resolved = fs::canonicalize(&file_path).await.ok()?;
    if !resolved.starts_with(&root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            resolved.display()
        ));
        return None;
    }

    match fs::read(&resolved).await {
        Ok(content) => Some((content, mime::content_type_for(&resolved))),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                resolved.display()
            ));
            None
        }
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn find_index(dir: &Path, index_files: &[String]) -> Option<PathBuf> {
    for name in index_files {
        let candidate = dir.join(name);
        if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TempSite(PathBuf);

    impl TempSite {
        fn new(name: &str) -> Self {
            let root = std::env::temp_dir().join(format!("todos-static-{name}-{}", std::process::id()));
            std::fs::create_dir_all(root.join("public/css")).unwrap();
            std::fs::write(root.join("public/index.html"), "<h1>todos</h1>").unwrap();
            std::fs::write(root.join("public/css/app.css"), "body{}").unwrap();
            std::fs::write(root.join("secret.txt"), "nope").unwrap();
            Self(root)
        }

        fn public(&self) -> String {
            self.0.join("public").to_string_lossy().into_owned()
        }
    }

    impl Drop for TempSite {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn index_files() -> Vec<String> {
        vec!["index.html".to_string()]
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let site = TempSite::new("index");
        let (content, content_type) = load_from_directory(&site.public(), "/", &index_files())
            .await
            .unwrap();
        assert_eq!(content, b"<h1>todos</h1>");
        assert_eq!(content_type, "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn test_nested_file() {
        let site = TempSite::new("nested");
        let (content, content_type) =
            load_from_directory(&site.public(), "/css/app.css", &index_files())
                .await
                .unwrap();
        assert_eq!(content, b"body{}");
        assert_eq!(content_type, "text/css; charset=utf-8");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let site = TempSite::new("missing");
        assert!(load_from_directory(&site.public(), "/nope.js", &index_files())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_traversal_blocked() {
        let site = TempSite::new("traversal");
        assert!(load_from_directory(&site.public(), "/../secret.txt", &index_files())
            .await
            .is_none());
    }
}
