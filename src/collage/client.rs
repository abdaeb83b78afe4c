//! # 共享连接池模块
//!
//! ## 设计思路
//!
//! 搜索与所有并发下载共享同一个 `reqwest::Client`（内部即连接池）。
//! 连接池在服务启动时打开一次，在服务停止时关闭一次：
//! - `HttpPool::open`：按配置构建客户端
//! - `HttpPool::close`：显式关闭
//! - `Drop`：任何异常退出路径上兜底释放
//!
//! 所有请求都通过 `HttpPool::get` 发出，并计入 `requests_issued`，便于诊断与测试。

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::{CollageConfig, CollageError};

const MAX_REDIRECTS: usize = 5;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// 共享 HTTP 连接池。
pub struct HttpPool {
    client: reqwest::Client,
    opened_at: Instant,
    requests_issued: AtomicU64,
    closed: AtomicBool,
}

impl HttpPool {
    /// 根据配置打开连接池。
    pub fn open(config: &CollageConfig) -> Result<Self, CollageError> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .pool_idle_timeout(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));

        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| CollageError::Network(format!("无法创建 HTTP 客户端：{}", e)))?;

        log::info!(
            "🔌 连接池已打开 - timeout={}s connect_timeout={}s",
            config.download_timeout,
            config.connect_timeout
        );

        Ok(Self {
            client,
            opened_at: Instant::now(),
            requests_issued: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        })
    }

    /// 构建一个 GET 请求，并计入请求数。
    pub(crate) fn get(&self, url: reqwest::Url) -> reqwest::RequestBuilder {
        self.requests_issued.fetch_add(1, Ordering::Relaxed);
        self.client.get(url)
    }

    /// 自打开以来发出的请求总数。
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued.load(Ordering::Relaxed)
    }

    /// 显式关闭连接池。
    pub fn close(self) {
        self.closed.store(true, Ordering::SeqCst);
        log::info!(
            "🔌 连接池已关闭 - requests={} uptime={}s",
            self.requests_issued(),
            self.opened_at.elapsed().as_secs()
        );
    }
}

impl Drop for HttpPool {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::SeqCst) {
            log::warn!(
                "⚠️ 连接池未显式关闭，随 Drop 释放 - requests={}",
                self.requests_issued()
            );
        }
    }
}

/// 日志中只保留 scheme/host/port/path，避免泄露 `key` 等查询参数。
pub(crate) fn redact_url_for_log(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return "<invalid-url>".to_string();
    };

    let host = parsed.host_str().unwrap_or("<unknown-host>");
    let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();

    format!("{}://{}{}{}", parsed.scheme(), host, port, parsed.path())
}
