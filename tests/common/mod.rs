//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use common_service::lifecycle::Shutdown;
use common_service::observability::{LogWriter, Logger, MemorySink, Severity};
use common_service::HttpServer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A logger writing plain JSON lines into memory.
pub fn capture_logger(threshold: Severity) -> (Logger, MemorySink) {
    let sink = MemorySink::new();
    (Logger::new(threshold, LogWriter::plain(sink.clone())), sink)
}

/// Start a mock backend that answers every request with `status` and `body`.
#[allow(dead_code)]
pub async fn start_mock_backend(status: &'static str, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// A running service bound to an ephemeral port.
#[allow(dead_code)]
pub struct TestService {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server should stop")
            .unwrap()
            .unwrap();
    }
}

/// Serve `server` on 127.0.0.1 with an ephemeral port.
#[allow(dead_code)]
pub async fn start_service(server: HttpServer) -> TestService {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestService {
        addr,
        shutdown,
        handle,
    }
}
