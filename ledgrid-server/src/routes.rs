use std::path::{Path, PathBuf};

use crate::http::{HttpError, Method, Request, Response};
use crate::socket::{SocketEvent, SocketStub};

/// Routes requests to static files under two roots and to the socket stub.
///
/// - `POST /socket/<event>` → [`SocketStub`]
/// - `GET /images/<path>` → `images_dir`
/// - `GET /<path>` → `public_dir` (directories serve `index.html`)
///
/// Anything else is a 404.
pub struct Router {
    public_dir: PathBuf,
    images_dir: PathBuf,
    socket: SocketStub,
}

impl Router {
    pub fn new(public_dir: impl Into<PathBuf>, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
            images_dir: images_dir.into(),
            socket: SocketStub::default(),
        }
    }

    pub fn socket(&self) -> &SocketStub {
        &self.socket
    }

    pub async fn route(&self, req: &Request) -> Result<Response, HttpError> {
        match req.method {
            Method::Post => {
                let event = req
                    .path
                    .strip_prefix("/socket/")
                    .and_then(SocketEvent::from_name)
                    .ok_or(HttpError::NotFound)?;
                let reply = self.socket.handle(event, &req.body)?;
                Ok(Response::json(200, &reply))
            }
            Method::Get | Method::Head => self.serve_static(&req.path).await,
            Method::Other => Err(HttpError::NotFound),
        }
    }

    async fn serve_static(&self, path: &str) -> Result<Response, HttpError> {
        let (root, rel) = match path.strip_prefix("/images/") {
            Some(rest) => (&self.images_dir, rest),
            None => (&self.public_dir, path.trim_start_matches('/')),
        };
        let mut file = resolve_path(root, rel).ok_or(HttpError::NotFound)?;

        let is_dir = tokio::fs::metadata(&file)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if is_dir {
            file.push("index.html");
        }

        match tokio::fs::read(&file).await {
            Ok(body) => Ok(Response::ok(content_type(&file), body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(HttpError::NotFound),
            Err(e) => Err(HttpError::Io(e)),
        }
    }
}

/// Join a URL path onto a root, refusing anything that could escape it.
pub fn resolve_path(root: &Path, rel: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in rel.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains(['\\', '\0', ':']) => return None,
            s => path.push(s),
        }
    }
    Some(path)
}

pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("wasm") => "application/wasm",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
