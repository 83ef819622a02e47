use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Port the preview server binds to.
pub const PORT: u16 = 5173;

/// Base path the server is mounted under.
pub const BASE_PATH: &str = "/";

/// Whether to open the first advertised URL in the OS browser after bind.
pub const AUTO_OPEN: bool = false;

/// Marker in the template that is replaced with the stylesheet link tag.
pub const CSS_PLACEHOLDER: &str = "<!--css-placeholder-->";

/// Server configuration, resolved once at startup. Immutable afterwards.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub base_path: String,
    pub auto_open: bool,
    /// Stylesheet reference injected into the preview page, verbatim.
    pub stylesheet_href: String,
    /// Template served for every request, re-read on each render.
    pub template_path: PathBuf,
}

impl ServerConfig {
    /// Build the configuration for the given stylesheet argument. The
    /// template lives in a `preview` directory next to the executable.
    pub fn new(stylesheet_href: impl Into<String>) -> io::Result<Self> {
        Ok(Self {
            port: PORT,
            base_path: BASE_PATH.to_string(),
            auto_open: AUTO_OPEN,
            stylesheet_href: stylesheet_href.into(),
            template_path: default_template_path()?,
        })
    }

    /// Override the template location.
    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = path.into();
        self
    }

    /// Local file backing the stylesheet href, if the href names one on
    /// disk. Hrefs are root-relative, so the leading slash is dropped and
    /// the rest resolved against the working directory. Remote URLs never
    /// map to a file.
    pub fn stylesheet_file(&self) -> Option<PathBuf> {
        if self.stylesheet_href.contains("://") {
            return None;
        }
        let path = PathBuf::from(self.stylesheet_href.trim_start_matches('/'));
        path.is_file().then_some(path)
    }

    /// Route at which the backing stylesheet file is mounted.
    pub fn stylesheet_route(&self) -> String {
        format!("/{}", self.stylesheet_href.trim_start_matches('/'))
    }
}

fn default_template_path() -> io::Result<PathBuf> {
    let exe = env::current_exe()?;
    let dir = exe.parent().unwrap_or_else(|| Path::new("."));
    Ok(dir.join("preview").join("index.html"))
}
