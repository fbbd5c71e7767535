//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use spot_router::config::RouterConfig;

/// A raw-TCP upstream that records the request heads it receives.
#[allow(dead_code)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request heads received so far, lowercased.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Start a programmable upstream on an ephemeral port. `f` receives the
/// request path and returns the status and JSON body to send.
#[allow(dead_code)]
pub async fn start_programmable_upstream<F, Fut>(f: F) -> MockUpstream
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        let path = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();
                        recorded.lock().unwrap().push(head.to_lowercase());

                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockUpstream { addr, requests }
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// GDAX-shaped ticker body.
#[allow(dead_code)]
pub fn gdax_ticker(price: &str) -> String {
    format!(
        r#"{{"trade_id":40240431,"price":"{}","size":"0.01668154","bid":"8371.57","ask":"8371.58","volume":"17210.40916422","time":"2018-03-23T05:23:59.807000Z"}}"#,
        price
    )
}

/// Bitfinex-shaped ticker body.
#[allow(dead_code)]
pub fn bitfinex_ticker(price: &str) -> String {
    format!(
        r#"{{"mid":"244.755","bid":"244.75","ask":"244.76","last_price":"{}","low":"244.2","high":"248.19","volume":"7842.11542563","timestamp":"1444253422.348340958"}}"#,
        price
    )
}

/// Upstream answering every path with `status` and `body` after `delay`.
#[allow(dead_code)]
pub async fn start_fixed_upstream(status: u16, body: String, delay: Duration) -> MockUpstream {
    start_programmable_upstream(move |_path| {
        let body = body.clone();
        async move {
            tokio::time::sleep(delay).await;
            (status, body)
        }
    })
    .await
}

/// Default config pointed at the two mock upstreams.
#[allow(dead_code)]
pub fn test_config(gdax: &MockUpstream, bitfinex: &MockUpstream) -> RouterConfig {
    let mut config = RouterConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.providers.gdax.base_url = gdax.base_url();
    config.providers.bitfinex.base_url = bitfinex.base_url();
    config.timeouts.upstream_ms = 2000;
    config
}
