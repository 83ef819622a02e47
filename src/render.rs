//! Request rendering.
//!
//! Every incoming path produces exactly one [`RenderedDocument`]: the
//! template is read from disk, handed to the dev-middleware transform hook,
//! and the stylesheet link is spliced over the placeholder marker. Failures
//! fold into a 500 document carrying the diagnostic trace; nothing
//! propagates past [`PreviewRenderer::render`], so one bad request never
//! affects the next.

use std::error::Error as _;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use thiserror::Error;
use tokio::fs;

use crate::config::{CSS_PLACEHOLDER, ServerConfig};
use crate::engine::{HtmlTransform, TransformError};

/// Errors that can occur while rendering the preview document.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The template file could not be read.
    #[error("failed to read template {}", .path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dev-middleware transform step rejected the template.
    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl RenderError {
    /// Diagnostic trace rendered into the 500 response body.
    pub fn trace(&self) -> String {
        let mut out = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            out.push_str("\ncaused by: ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}

/// Outcome of a render attempt for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

/// Renders the preview document for every request path.
pub struct PreviewRenderer {
    config: ServerConfig,
    transform: Arc<dyn HtmlTransform>,
}

impl PreviewRenderer {
    pub fn new(config: ServerConfig, transform: Arc<dyn HtmlTransform>) -> Self {
        Self { config, transform }
    }

    /// Render the document for `raw_path`. Failures become a 500 document
    /// whose body is the diagnostic trace, logged to the error console on
    /// the way out.
    pub async fn render(&self, raw_path: &str) -> RenderedDocument {
        match self.try_render(raw_path).await {
            Ok(body) => RenderedDocument {
                status: StatusCode::OK,
                content_type: "text/html",
                body,
            },
            Err(mut err) => {
                if let RenderError::Transform(transform_err) = &mut err {
                    self.transform.fix_stacktrace(transform_err);
                }
                let trace = err.trace();
                tracing::error!("{trace}");
                RenderedDocument {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    content_type: "text/plain",
                    body: trace,
                }
            }
        }
    }

    async fn try_render(&self, raw_path: &str) -> Result<String, RenderError> {
        let url = raw_path.replacen(self.config.base_path.as_str(), "", 1);

        // Re-read on every request: a single-document dev tool, no caching.
        let template = fs::read_to_string(&self.config.template_path)
            .await
            .map_err(|source| RenderError::TemplateRead {
                path: self.config.template_path.clone(),
                source,
            })?;

        let template = self.transform.transform_index_html(&url, template)?;
        Ok(inject_stylesheet(&template, &self.config.stylesheet_href))
    }
}

/// Replace the first placeholder occurrence with a stylesheet link tag.
/// A document without the marker is returned unchanged.
fn inject_stylesheet(html: &str, href: &str) -> String {
    let link = format!(r#"<link rel="stylesheet" type="text/css" href="{href}">"#);
    html.replacen(CSS_PLACEHOLDER, &link, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    use tempfile::TempDir;

    // Passes the template through untouched.
    struct Identity;

    impl HtmlTransform for Identity {
        fn transform_index_html(&self, _url: &str, html: String) -> Result<String, TransformError> {
            Ok(html)
        }
    }

    // Rejects requests for one specific url, succeeds for all others.
    struct FailingOn(&'static str);

    impl HtmlTransform for FailingOn {
        fn transform_index_html(&self, url: &str, html: String) -> Result<String, TransformError> {
            if url == self.0 {
                Err(TransformError::new(format!("asset resolution failed for {url}")))
            } else {
                Ok(html)
            }
        }
    }

    // Prefixes the document with the request url so tests can observe it.
    struct RecordingUrl;

    impl HtmlTransform for RecordingUrl {
        fn transform_index_html(&self, url: &str, html: String) -> Result<String, TransformError> {
            Ok(format!("<!--url:{url}-->{html}"))
        }
    }

    // Always fails, and corrects the diagnostic via the fixup hook.
    struct FixesTraces;

    impl HtmlTransform for FixesTraces {
        fn transform_index_html(&self, _url: &str, _html: String) -> Result<String, TransformError> {
            Err(TransformError::new("raw position 0:0"))
        }

        fn fix_stacktrace(&self, error: &mut TransformError) {
            error.message = error.message.replace("0:0", "12:4");
        }
    }

    fn renderer_for(template: &str, dir: &TempDir, transform: Arc<dyn HtmlTransform>) -> PreviewRenderer {
        let template_path = dir.path().join("index.html");
        std::fs::write(&template_path, template).unwrap();
        let config = ServerConfig::new("/style.css")
            .unwrap()
            .with_template_path(template_path);
        PreviewRenderer::new(config, transform)
    }

    #[tokio::test]
    async fn injects_stylesheet_link_over_placeholder() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer_for(
            "<!DOCTYPE html><body><!--css-placeholder--></body>",
            &dir,
            Arc::new(Identity),
        );

        let doc = renderer.render("/").await;
        assert_eq!(doc.status, StatusCode::OK);
        assert_eq!(doc.content_type, "text/html");
        assert_eq!(
            doc.body,
            r#"<!DOCTYPE html><body><link rel="stylesheet" type="text/css" href="/style.css"></body>"#
        );
    }

    #[tokio::test]
    async fn missing_placeholder_leaves_document_unchanged() {
        let dir = TempDir::new().unwrap();
        let template = "<!DOCTYPE html><body><p>no marker here</p></body>";
        let renderer = renderer_for(template, &dir, Arc::new(Identity));

        let doc = renderer.render("/").await;
        assert_eq!(doc.status, StatusCode::OK);
        assert_eq!(doc.body, template);
    }

    #[tokio::test]
    async fn only_first_placeholder_occurrence_is_replaced() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer_for(
            "<head><!--css-placeholder--></head><body><!--css-placeholder--></body>",
            &dir,
            Arc::new(Identity),
        );

        let doc = renderer.render("/").await;
        assert_eq!(doc.body.matches("<link").count(), 1);
        assert_eq!(doc.body.matches(CSS_PLACEHOLDER).count(), 1);
        assert!(doc.body.starts_with("<head><link"));
    }

    #[tokio::test]
    async fn render_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer_for(
            "<html><!--css-placeholder--></html>",
            &dir,
            Arc::new(Identity),
        );

        let first = renderer.render("/some/path").await;
        let second = renderer.render("/some/path").await;
        assert_eq!(first.body, second.body);
    }

    #[tokio::test]
    async fn base_path_is_stripped_before_transform() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer_for("<html></html>", &dir, Arc::new(RecordingUrl));

        let doc = renderer.render("/some/path").await;
        assert!(doc.body.starts_with("<!--url:some/path-->"));
    }

    #[tokio::test]
    async fn transform_failure_produces_500_trace() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer_for("<html></html>", &dir, Arc::new(FailingOn("boom")));

        let doc = renderer.render("/boom").await;
        assert_eq!(doc.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(doc.content_type, "text/plain");
        assert!(doc.body.contains("asset resolution failed for boom"));
    }

    #[tokio::test]
    async fn failed_request_does_not_affect_subsequent_requests() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer_for(
            "<html><!--css-placeholder--></html>",
            &dir,
            Arc::new(FailingOn("boom")),
        );

        let failed = renderer.render("/boom").await;
        assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);

        let doc = renderer.render("/fine").await;
        assert_eq!(doc.status, StatusCode::OK);
        assert!(doc.body.contains(r#"href="/style.css""#));
    }

    #[tokio::test]
    async fn missing_template_produces_500_naming_path() {
        let missing = Path::new("/definitely/not/here/index.html");
        let config = ServerConfig::new("/style.css")
            .unwrap()
            .with_template_path(missing);
        let renderer = PreviewRenderer::new(config, Arc::new(Identity));

        let doc = renderer.render("/").await;
        assert_eq!(doc.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(doc.body.contains("/definitely/not/here/index.html"));
        assert!(doc.body.contains("caused by:"));
    }

    #[tokio::test]
    async fn fix_stacktrace_corrects_reported_trace() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer_for("<html></html>", &dir, Arc::new(FixesTraces));

        let doc = renderer.render("/").await;
        assert!(doc.body.contains("raw position 12:4"));
        assert!(!doc.body.contains("0:0"));
    }

    #[test]
    fn inject_handles_empty_href() {
        let out = inject_stylesheet("<!--css-placeholder-->", "");
        assert_eq!(out, r#"<link rel="stylesheet" type="text/css" href="">"#);
    }
}
