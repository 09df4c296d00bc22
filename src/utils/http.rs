// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::redirect::{Attempt, Policy};

use crate::error::Result;
use crate::models::CrawlerConfig;

/// Create the asynchronous HTTP client shared by every target in a run.
///
/// Redirects are followed only while they stay on the host of the first
/// URL in the chain.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let max_redirects = config.max_redirects;
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(Policy::custom(move |attempt| {
            same_host_redirect(attempt, max_redirects)
        }))
        .build()?;
    Ok(client)
}

fn same_host_redirect(attempt: Attempt<'_>, max_redirects: usize) -> reqwest::redirect::Action {
    if attempt.previous().len() > max_redirects {
        return attempt.error("too many redirects");
    }

    let origin = attempt.previous().first().and_then(|u| u.host_str());
    if origin.is_some() && origin == attempt.url().host_str() {
        attempt.follow()
    } else {
        log::debug!("Refusing off-domain redirect to {}", attempt.url());
        attempt.stop()
    }
}

/// Loopback HTTP server answering every request from a route function.
#[cfg(test)]
pub(crate) mod test_server {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Raw HTTP/1.1 response that closes the connection.
    pub fn response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
        let mut out = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n",
            body.len()
        );
        for (name, value) in headers {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        out.push_str("\r\n");
        out.push_str(body);
        out
    }

    pub fn redirect(location: &str) -> String {
        response("302 Found", &[("Location", location)], "")
    }

    /// Bind `127.0.0.1` on a free port. `route` gets the request path and
    /// the bound port and returns the raw response.
    pub async fn serve<F>(route: F) -> SocketAddr
    where
        F: Fn(&str, u16) -> String + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let route = Arc::new(route);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let route = Arc::clone(&route);
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }

                    let request = String::from_utf8_lossy(&request);
                    let path = request.split_whitespace().nth(1).unwrap_or("/");
                    let reply = route(path, addr.port());
                    let _ = socket.write_all(reply.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        addr
    }
}
