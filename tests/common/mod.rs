#![allow(dead_code)]

use std::time::Duration;

use nexus::{ai::Gemini, config::AiConfig};
use serde_json::Value;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::oneshot,
};

pub struct Captured {
    pub request_line: String,
    pub body: Value,
}

pub async fn stub(status: &'static str, body: String) -> (String, oneshot::Receiver<Captured>) {
    stub_after(Duration::ZERO, status, body).await
}

/// Serves a single HTTP request, answering with `status` and `body` once
/// `delay` has passed.
pub async fn stub_after(delay: Duration, status: &'static str, body: String) -> (String, oneshot::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1beta", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        let header_end = loop {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
        let content_length: usize = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        while raw.len() < header_end + content_length {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before body");
            raw.extend_from_slice(&buf[..n]);
        }

        tokio::time::sleep(delay).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        let _ = tx.send(Captured {
            request_line: head.lines().next().unwrap_or_default().to_owned(),
            body: serde_json::from_slice(&raw[header_end..header_end + content_length]).unwrap_or(Value::Null),
        });
    });

    (base_url, rx)
}

pub fn gemini(base_url: &str) -> Gemini {
    Gemini::new(&AiConfig {
        api_key: Some("test-key".to_owned()),
        model: "test-model".to_owned(),
        base_url: base_url.to_owned(),
    })
}
