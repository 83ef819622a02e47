//! Dev-middleware engine boundary.
//!
//! The live-reload pipeline touches the served document in two places: the
//! tower layer rewrites responses on the way out, and the per-request
//! [`HtmlTransform`] hook rewrites the template before the stylesheet is
//! injected. The hook is a trait so the renderer can be exercised with
//! fakes that have no real middleware behind them.

use thiserror::Error;

/// Failure raised by the HTML transform step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transform error: {message}")]
pub struct TransformError {
    pub message: String,
}

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Per-request HTML hook of the dev-middleware pipeline.
pub trait HtmlTransform: Send + Sync {
    /// Rewrite the template for the request at `url`.
    fn transform_index_html(&self, url: &str, html: String) -> Result<String, TransformError>;

    /// Rewrite engine diagnostics before they are reported, e.g. to correct
    /// positions in a mapped trace. No-op by default.
    fn fix_stacktrace(&self, _error: &mut TransformError) {}
}

/// Production transform hook.
///
/// The reload client script is injected by the tower layer as the response
/// streams out, so there is nothing left to rewrite per request; the hook
/// keeps the seam in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveReloadTransform;

impl LiveReloadTransform {
    pub fn new() -> Self {
        Self
    }
}

impl HtmlTransform for LiveReloadTransform {
    fn transform_index_html(&self, _url: &str, html: String) -> Result<String, TransformError> {
        Ok(html)
    }
}
