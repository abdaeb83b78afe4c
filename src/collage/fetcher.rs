//! # 并发下载模块
//!
//! ## 设计思路
//!
//! 对一批 `ImageReference` 同时发起下载，全部请求共享同一个连接池。
//! 单张图片失败（非 2xx、超时、传输错误、空内容、非图片内容）只记录日志并丢弃，
//! 既不影响其它下载，也不会作为错误返回给调用方。不做重试。
//!
//! ## 实现思路
//!
//! - 用 `join_all` 在当前协作式调度器上复用所有下载，结果按输入顺序返回，
//!   过滤失败项后得到“输入顺序的子序列”，与各请求实际完成顺序无关。
//! - 默认不限制在途请求数；配置 `max_concurrent_downloads` 后通过信号量限流。
//! - 单个下载沿用流式读取：首包/分块超时、体积上限、魔数签名探测。

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::Semaphore;

use super::client::{HttpPool, redact_url_for_log};
use super::{CollageConfig, CollageError, ImageBuffer, ImageReference};

const SIGNATURE_SNIFF_LIMIT: usize = 4096;
const BUFFER_INITIAL_CAPACITY: usize = 16 * 1024;

/// 并发下载器。
pub struct ConcurrentFetcher {
    pool: Arc<HttpPool>,
    max_file_size: u64,
    first_byte_timeout: Duration,
    chunk_timeout: Duration,
    max_concurrent: Option<usize>,
}

impl ConcurrentFetcher {
    pub fn new(pool: Arc<HttpPool>, config: &CollageConfig) -> Self {
        Self {
            pool,
            max_file_size: config.max_file_size,
            first_byte_timeout: Duration::from_millis(config.stream_first_byte_timeout_ms),
            chunk_timeout: Duration::from_millis(config.stream_chunk_timeout_ms),
            max_concurrent: config.max_concurrent_downloads,
        }
    }

    /// 并发下载全部图片，仅返回成功项，保持输入相对顺序。
    pub async fn fetch_all(&self, refs: &[ImageReference]) -> Vec<ImageBuffer> {
        let start = Instant::now();
        let limiter = self.max_concurrent.map(Semaphore::new);
        let limiter = limiter.as_ref();

        let downloads = refs.iter().map(|reference| async move {
            let _permit = match limiter {
                Some(semaphore) => match semaphore.acquire().await {
                    Ok(permit) => Some(permit),
                    Err(_) => return None,
                },
                None => None,
            };

            match self.fetch_one(reference).await {
                Ok(buffer) => Some(buffer),
                Err(err) => {
                    log::warn!(
                        "⚠️ 图片下载失败，已丢弃 - #{} {} code={} {}",
                        reference.position(),
                        redact_url_for_log(reference.url()),
                        err.code(),
                        err
                    );
                    None
                }
            }
        });

        let buffers: Vec<ImageBuffer> = join_all(downloads).await.into_iter().flatten().collect();

        log::info!(
            "📥 下载完成 - 成功={}/{} elapsed={}ms",
            buffers.len(),
            refs.len(),
            start.elapsed().as_millis()
        );

        buffers
    }

    async fn fetch_one(&self, reference: &ImageReference) -> Result<ImageBuffer, CollageError> {
        let url = reqwest::Url::parse(reference.url())
            .map_err(|e| CollageError::InvalidFormat(format!("URL 格式错误：{}", e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(CollageError::InvalidFormat("仅支持 HTTP/HTTPS".to_string()));
        }

        let mut response = self
            .pool
            .get(url)
            .send()
            .await
            .map_err(Self::map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollageError::Network(format!(
                "HTTP {}: {}",
                status.as_u16(),
                Self::status_message(status.as_u16())
            )));
        }

        let declared_len = response.content_length();
        if let Some(len) = declared_len {
            if len > self.max_file_size {
                return Err(CollageError::ResourceLimit(format!(
                    "文件过大：{:.2} MB（限制：{:.2} MB）",
                    len as f64 / 1024.0 / 1024.0,
                    self.max_file_size as f64 / 1024.0 / 1024.0
                )));
            }
        }

        let initial_capacity = declared_len
            .filter(|len| *len > 0)
            .map(|len| len.min(self.max_file_size) as usize)
            .unwrap_or(BUFFER_INITIAL_CAPACITY);
        let mut buffer = Vec::with_capacity(initial_capacity);
        let mut mime = None;
        let mut received_first_chunk = false;

        loop {
            let read_timeout = if received_first_chunk {
                self.chunk_timeout
            } else {
                self.first_byte_timeout
            };

            let next_chunk = tokio::time::timeout(read_timeout, response.chunk())
                .await
                .map_err(|_| {
                    if received_first_chunk {
                        CollageError::Timeout("下载数据流读取超时".to_string())
                    } else {
                        CollageError::Timeout("下载首包超时".to_string())
                    }
                })?
                .map_err(|e| CollageError::Network(format!("下载失败：{}", e.without_url())))?;

            let Some(chunk) = next_chunk else {
                break;
            };
            received_first_chunk = true;

            if (buffer.len() + chunk.len()) as u64 > self.max_file_size {
                return Err(CollageError::ResourceLimit("下载后文件超过大小限制".to_string()));
            }
            buffer.extend_from_slice(&chunk);

            if mime.is_none() {
                mime = sniff_image(&buffer, false)?;
            }
        }

        let mime = match mime {
            Some(mime) => mime,
            None => sniff_image(&buffer, true)?
                .ok_or_else(|| CollageError::InvalidFormat("无法识别图片类型".to_string()))?,
        };

        log::debug!(
            "✅ 下载完成 - #{} {} {} bytes",
            reference.position(),
            mime,
            buffer.len()
        );

        Ok(ImageBuffer::new(reference.position(), buffer))
    }

    fn map_reqwest_error(e: reqwest::Error) -> CollageError {
        let e = e.without_url();
        if e.is_timeout() {
            CollageError::Timeout(format!("请求超时：{}", e))
        } else if e.is_connect() {
            CollageError::Network(format!("无法连接：{}", e))
        } else {
            CollageError::Network(format!("请求失败：{}", e))
        }
    }

    fn status_message(code: u16) -> &'static str {
        match code {
            404 => "未找到",
            403 => "访问被拒绝",
            429 => "请求过多",
            500..=599 => "服务器错误",
            _ => "请求失败",
        }
    }
}

/// 按魔数识别已收到的字节。
///
/// `Ok(Some(mime))` 表示已确认是图片；`Ok(None)` 表示字节不足，需要继续读取。
/// `finished` 为真时数据流已结束，无法识别即视为失败。
fn sniff_image(bytes: &[u8], finished: bool) -> Result<Option<&'static str>, CollageError> {
    match infer::get(bytes) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => Ok(Some(kind.mime_type())),
        Some(kind) => Err(CollageError::InvalidFormat(format!("下载内容不是图片：{}", kind.mime_type()))),
        None if bytes.is_empty() && finished => {
            Err(CollageError::InvalidFormat("响应体为空".to_string()))
        }
        None if finished || bytes.len() >= SIGNATURE_SNIFF_LIMIT => Err(CollageError::InvalidFormat(
            format!("前 {} 字节内无法识别图片类型", bytes.len().min(SIGNATURE_SNIFF_LIMIT)),
        )),
        None => Ok(None),
    }
}
