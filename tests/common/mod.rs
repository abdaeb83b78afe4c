//! 集成测试公共辅助：本地搜索服务 + 图片服务。

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use search_collage::collage::CollageConfig;

pub struct LocalApi {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl LocalApi {
    pub fn search_url(&self) -> String {
        format!("http://{}/api/", self.addr)
    }

    pub fn recorded(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

/// 启动本地服务：`/api/` 返回 `total` 个 hit，下标在 `failing` 内的图片地址返回 404。
/// 图片尺寸依下标变化，便于覆盖不同的缩放高度。
pub fn spawn_api(total: usize, failing: Vec<usize>) -> LocalApi {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local api failed");
    let addr = listener.local_addr().expect("read local addr failed");
    let requests = Arc::new(Mutex::new(Vec::new()));
    let failing = Arc::new(failing);

    let recorded = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            let recorded = Arc::clone(&recorded);
            let failing = Arc::clone(&failing);
            thread::spawn(move || serve(stream, addr, total, &failing, &recorded));
        }
    });

    LocalApi { addr, requests }
}

fn serve(
    mut stream: TcpStream,
    addr: SocketAddr,
    total: usize,
    failing: &[usize],
    recorded: &Mutex<Vec<String>>,
) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }

    let head = String::from_utf8_lossy(&head);
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    if let Ok(mut guard) = recorded.lock() {
        guard.push(target.clone());
    }

    let (status, content_type, body) = if target.starts_with("/api/") {
        let hits: Vec<serde_json::Value> = (0..total)
            .map(|i| {
                let path = if failing.contains(&i) { "missing" } else { "img" };
                serde_json::json!({ "previewURL": format!("http://{}/{}/{}", addr, path, i) })
            })
            .collect();
        let body = serde_json::json!({ "total": total, "hits": hits }).to_string();
        (200, "application/json", body.into_bytes())
    } else if let Some(index) = target.strip_prefix("/img/") {
        let index: u32 = index.parse().unwrap_or(0);
        let height = 40 + (index % 5) * 15;
        (200, "image/png", png_bytes(60, height, [30, 90 + (index * 7 % 150) as u8, 200]))
    } else {
        (404, "text/plain", b"not found".to_vec())
    };

    let reason = if status < 400 { "OK" } else { "Not Found" };
    let header = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        content_type,
        body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(&body);
    let _ = stream.flush();
}

pub fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("failed to encode test image");
    cursor.into_inner()
}

pub fn config_for(api: &LocalApi) -> CollageConfig {
    let mut config = CollageConfig::default();
    config.api_key = "integration-key".to_string();
    config.search_base_url = api.search_url();
    config.use_system_proxy = false;
    config.download_timeout = 5;
    config.connect_timeout = 2;
    config.stream_first_byte_timeout_ms = 3_000;
    config.stream_chunk_timeout_ms = 3_000;
    config
}
