use minijinja::Environment;
use serde_json::Value as JsonValue;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Serves files from a base directory, with optional minijinja rendering
/// for HTML.
///
/// Files are re-read on every load, so templates and assets can be edited
/// while the server runs. Lookups never escape the base directory: only
/// normal path components are accepted.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }

    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    fn content_type(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "html" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "json" => "application/json",
            "txt" => "text/plain",
            "svg" => "image/svg+xml",
            "ico" => "image/x-icon",
            "png" => "image/png",
            _ => "application/octet-stream",
        }
    }

    /// Load a file by URL path.
    ///
    /// HTML files are rendered through minijinja when a context is given;
    /// everything else is returned verbatim with its content type.
    pub fn load(
        &self,
        url_path: &str,
        ctx: Option<&JsonValue>,
    ) -> io::Result<(Vec<u8>, &'static str)> {
        let path = self
            .map_path(url_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.exists() || !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        if path.extension().and_then(|s| s.to_str()) == Some("html") {
            if let Some(ctx_val) = ctx {
                let source = fs::read_to_string(&path)?;
                let mut env = Environment::new();
                // The .html name keeps minijinja's HTML auto-escaping on.
                env.add_template("page.html", &source)
                    .map_err(io::Error::other)?;
                let tmpl = env.get_template("page.html").map_err(io::Error::other)?;
                let rendered = tmpl.render(ctx_val).map_err(io::Error::other)?;
                return Ok((rendered.into_bytes(), Self::content_type(&path)));
            }
        }
        let bytes = fs::read(&path)?;
        Ok((bytes, Self::content_type(&path)))
    }

    /// Render an HTML template to a string with the given context.
    pub fn render(&self, name: &str, ctx: &JsonValue) -> io::Result<String> {
        let (bytes, _) = self.load(name, Some(ctx))?;
        String::from_utf8(bytes).map_err(io::Error::other)
    }
}
