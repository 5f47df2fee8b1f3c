//! Minimal HTTP/1.1 request parsing and response writing.
//!
//! One request per connection; every response closes the connection.

use serde_json::json;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest request body accepted (a full frame is well under this).
pub const MAX_BODY: usize = 64 * 1024;
/// Byte budget shared by the request line and all header lines.
pub const MAX_HEAD: usize = 8 * 1024;
const MAX_HEADERS: usize = 64;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Internal server error: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpError {
    pub fn status(&self) -> u16 {
        match self {
            HttpError::NotFound => 404,
            HttpError::BadRequest(_) => 400,
            HttpError::PayloadTooLarge => 413,
            HttpError::Io(_) => 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Other,
}

#[derive(Debug)]
pub struct Request {
    pub method: Method,
    /// Path without the query string.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Read one request. Returns `Ok(None)` if the peer closed before sending
/// a request line.
pub async fn read_request<R>(reader: &mut R) -> Result<Option<Request>, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    let mut budget = MAX_HEAD;
    let Some(line) = read_head_line(reader, &mut budget).await? else {
        return Ok(None);
    };

    let mut parts = line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v)) if v.starts_with("HTTP/1.") => (m, t),
        _ => {
            return Err(HttpError::BadRequest(format!(
                "malformed request line '{}'",
                line.trim_end()
            )))
        }
    };
    let method = match method {
        "GET" => Method::Get,
        "HEAD" => Method::Head,
        "POST" => Method::Post,
        _ => Method::Other,
    };
    let path = target.split(['?', '#']).next().unwrap_or("/").to_string();

    let mut headers = Vec::new();
    loop {
        let Some(line) = read_head_line(reader, &mut budget).await? else {
            return Err(HttpError::BadRequest("connection closed in headers".into()));
        };
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if headers.len() == MAX_HEADERS {
            return Err(HttpError::BadRequest("too many headers".into()));
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| HttpError::BadRequest(format!("malformed header '{line}'")))?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    let mut request = Request {
        method,
        path,
        headers,
        body: Vec::new(),
    };

    if let Some(len) = request.header("content-length") {
        let len: usize = len
            .parse()
            .map_err(|_| HttpError::BadRequest(format!("invalid content-length '{len}'")))?;
        if len > MAX_BODY {
            return Err(HttpError::PayloadTooLarge);
        }
        let mut body = vec![0u8; len];
        reader.read_exact(&mut body).await?;
        request.body = body;
    }

    Ok(Some(request))
}

/// Read one `\n`-terminated line of the request head, charging its length
/// against `budget`. `Ok(None)` means end of stream.
async fn read_head_line<R>(reader: &mut R, budget: &mut usize) -> Result<Option<String>, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    if *budget == 0 {
        return Err(HttpError::PayloadTooLarge);
    }
    let mut buf = Vec::new();
    let n = (&mut *reader)
        .take(*budget as u64)
        .read_until(b'\n', &mut buf)
        .await?;
    if n == 0 {
        return Ok(None);
    }
    if n == *budget && !buf.ends_with(b"\n") {
        return Err(HttpError::PayloadTooLarge);
    }
    *budget -= n;
    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| HttpError::BadRequest("request head is not valid UTF-8".into()))
}

#[derive(Debug)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            body,
        }
    }

    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string().into_bytes(),
        }
    }

    /// `{"error": {"message": ...}}` with the error's status code.
    pub fn error(err: &HttpError) -> Self {
        Self::json(err.status(), &json!({ "error": { "message": err.to_string() } }))
    }

    pub async fn write_to<W>(&self, writer: &mut W, include_body: bool) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            reason(self.status),
            self.content_type,
            self.body.len()
        );
        writer.write_all(head.as_bytes()).await?;
        if include_body {
            writer.write_all(&self.body).await?;
        }
        writer.flush().await
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
