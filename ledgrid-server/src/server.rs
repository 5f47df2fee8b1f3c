use std::sync::Arc;

use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};

use crate::http::{read_request, Method, Response};
use crate::routes::Router;

/// Accept connections forever, one task per connection.
pub async fn serve(listener: TcpListener, router: Arc<Router>) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let router = Arc::clone(&router);
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, &router).await {
                log::warn!("connection from {peer} failed: {err}");
            }
        });
    }
}

pub async fn handle_connection(mut stream: TcpStream, router: &Router) -> std::io::Result<()> {
    let (read, mut write) = stream.split();
    let mut reader = BufReader::new(read);

    let (response, include_body) = match read_request(&mut reader).await {
        Ok(Some(req)) => {
            let response = match router.route(&req).await {
                Ok(response) => response,
                Err(err) => {
                    if err.status() >= 500 {
                        log::error!("{:?} {}: {}", req.method, req.path, err);
                    }
                    Response::error(&err)
                }
            };
            log::debug!("{:?} {} -> {}", req.method, req.path, response.status);
            (response, req.method != Method::Head)
        }
        Ok(None) => return Ok(()),
        Err(err) => {
            log::debug!("rejected request: {err}");
            (Response::error(&err), true)
        }
    };

    response.write_to(&mut write, include_body).await
}
