//! Live-socket tests: a bound server driven by raw TCP clients.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;

use http1d::http::HttpServer;
use http1d::{Request, Response, ServerConfig};

async fn echo(request: Request) -> Response {
    Response::ok().with_body(format!("{} {}", request.method, request.uri))
}

async fn start_server(config: ServerConfig) -> (std::net::SocketAddr, http1d::Shutdown) {
    let server = HttpServer::bind(config, echo).await.expect("bind");
    let addr = server.local_addr();
    let shutdown = server.shutdown_handle();
    tokio::spawn(server.run());
    (addr, shutdown)
}

fn loopback_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}

/// Read one full response: the header section, then exactly the body that
/// `Content-Length` promises.
async fn read_response(stream: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let read = stream.read(&mut chunk).await.expect("read headers");
        assert_ne!(read, 0, "connection closed before headers completed");
        raw.extend_from_slice(&chunk[..read]);
    };

    let headers = String::from_utf8(raw[..header_end].to_vec()).expect("utf8 headers");
    let body_len: usize = headers
        .lines()
        .find_map(|line| line.strip_prefix("Content-Length: "))
        .expect("Content-Length header")
        .trim()
        .parse()
        .expect("length value");

    while raw.len() < header_end + body_len {
        let read = stream.read(&mut chunk).await.expect("read body");
        assert_ne!(read, 0, "connection closed before body completed");
        raw.extend_from_slice(&chunk[..read]);
    }
    String::from_utf8(raw).expect("utf8 response")
}

#[tokio::test]
async fn serves_a_request_over_tcp() {
    let (addr, shutdown) = start_server(loopback_config()).await;
    let mut client = TcpStream::connect(addr).await.expect("connect");

    client
        .write_all(b"GET /hello HTTP/1.1\r\nConnection: close\r\n\r\n")
        .await
        .expect("write");
    let response = read_response(&mut client).await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Connection: close\r\n"));
    assert!(response.ends_with("GET /hello"));

    shutdown.trigger();
}

#[tokio::test]
async fn keepalive_serves_two_requests_on_one_connection() {
    let (addr, shutdown) = start_server(loopback_config()).await;
    let mut client = TcpStream::connect(addr).await.expect("connect");

    client
        .write_all(b"GET /first HTTP/1.1\r\n\r\n")
        .await
        .expect("write first");
    let first = read_response(&mut client).await;
    assert!(first.contains("Connection: keep-alive\r\n"));
    assert!(first.ends_with("GET /first"));

    client
        .write_all(b"GET /second HTTP/1.1\r\nConnection: close\r\n\r\n")
        .await
        .expect("write second");
    let second = read_response(&mut client).await;
    assert!(second.contains("Connection: close\r\n"));
    assert!(second.ends_with("GET /second"));

    shutdown.trigger();
}

#[tokio::test]
async fn close_directive_ends_the_connection() {
    let (addr, shutdown) = start_server(loopback_config()).await;
    let mut client = TcpStream::connect(addr).await.expect("connect");

    client
        .write_all(b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n")
        .await
        .expect("write");
    let _response = read_response(&mut client).await;

    // The server side closed; reading again yields end of stream.
    let mut rest = Vec::new();
    let read = time::timeout(Duration::from_secs(5), client.read_to_end(&mut rest))
        .await
        .expect("close timed out")
        .expect("read");
    assert_eq!(read, 0);

    shutdown.trigger();
}

#[tokio::test]
async fn reuse_cap_forces_a_close() {
    let mut config = loopback_config();
    config.recv.max_requests_per_connection = 1;
    let (addr, shutdown) = start_server(config).await;
    let mut client = TcpStream::connect(addr).await.expect("connect");

    client
        .write_all(b"GET / HTTP/1.1\r\n\r\n")
        .await
        .expect("write");
    let response = read_response(&mut client).await;
    assert!(response.contains("Connection: close\r\n"));

    shutdown.trigger();
}

#[tokio::test]
async fn malformed_request_is_answered_with_400() {
    let (addr, shutdown) = start_server(loopback_config()).await;
    let mut client = TcpStream::connect(addr).await.expect("connect");

    client
        .write_all(b"NOT A REQUEST AT ALL\r\n\r\n")
        .await
        .expect("write");
    let response = read_response(&mut client).await;
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));

    shutdown.trigger();
}

#[tokio::test]
async fn shutdown_drains_and_stops() {
    let config = loopback_config();
    let server = HttpServer::bind(config, echo).await.expect("bind");
    let addr = server.local_addr();
    let shutdown = server.shutdown_handle();
    let run = tokio::spawn(server.run());

    let mut client = TcpStream::connect(addr).await.expect("connect");
    client
        .write_all(b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n")
        .await
        .expect("write");
    let _response = read_response(&mut client).await;
    drop(client);

    shutdown.trigger();
    time::timeout(Duration::from_secs(5), run)
        .await
        .expect("run did not stop")
        .expect("task")
        .expect("run");
}
