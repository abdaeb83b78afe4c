//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `CollageConfig`，由外层服务在构造时显式传入，
//! 不存在进程级全局配置。布局参数单独抽成 `LayoutConfig`，拼图器只依赖它。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的配置（4 列、列宽 300、间距 10、白色背景）。
//! - `LayoutConfig::validate` 在任何计算开始前拒绝非法布局。
//! - `DecodeFailurePolicy` 决定损坏图片是中止本次请求还是像下载失败一样被丢弃。

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use super::CollageError;

/// 单次搜索允许请求的最大图片数量（搜索服务上限）。
pub const MAX_SEARCH_COUNT: u32 = 200;

pub const DEFAULT_SEARCH_BASE_URL: &str = "https://pixabay.com/api/";

/// 单张图片（解码、缩放后）以及拼图画布的默认像素上限。
pub const DEFAULT_MAX_PIXELS: u64 = 40_000_000;

/// 拼图布局参数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// 列数，至少 1。
    pub columns_count: u32,
    /// 每列宽度（像素），必须大于 0。
    pub column_width: u32,
    /// 图片之间以及画布边缘的间距（像素）。
    pub gap: u32,
    /// 背景色 RGB。
    pub background: [u8; 3],
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns_count: 4,
            column_width: 300,
            gap: 10,
            background: [255, 255, 255],
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), CollageError> {
        if self.columns_count == 0 {
            return Err(CollageError::InvalidArgument("columns_count 必须至少为 1".to_string()));
        }
        if self.column_width == 0 {
            return Err(CollageError::InvalidArgument("column_width 必须大于 0".to_string()));
        }
        if self.checked_canvas_width().is_none() {
            return Err(CollageError::InvalidArgument(format!(
                "画布宽度溢出：columns_count={} column_width={} gap={}",
                self.columns_count, self.column_width, self.gap
            )));
        }
        Ok(())
    }

    /// 溢出时返回 `None`。
    pub fn checked_canvas_width(&self) -> Option<u32> {
        let columns = self.columns_count.checked_mul(self.column_width)?;
        let gaps = self.gap.checked_mul(self.columns_count.checked_add(1)?)?;
        columns.checked_add(gaps)
    }

    /// 画布宽度：`columns_count * column_width + gap * (columns_count + 1)`。
    ///
    /// 调用前须通过 `validate`，否则可能溢出。
    pub fn canvas_width(&self) -> u32 {
        self.columns_count * self.column_width + self.gap * (self.columns_count + 1)
    }

    /// 第 `column` 列左上角的横坐标。
    pub fn column_x(&self, column: usize) -> u32 {
        self.gap + column as u32 * (self.column_width + self.gap)
    }
}

/// 下载成功但无法解码的图片如何处理。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeFailurePolicy {
    /// 视为异常负载，整次请求失败。
    #[default]
    Abort,
    /// 与下载失败一致，静默丢弃该图。
    Skip,
}

/// 拼图服务配置。
///
/// 字段覆盖了搜索、下载、解码、排版与编码五个阶段。
#[derive(Debug, Clone)]
pub struct CollageConfig {
    /// 搜索服务地址。
    pub search_base_url: String,
    /// 搜索服务密钥。
    pub api_key: String,
    /// 未指定数量时的默认请求数量。
    pub default_count: u32,
    /// 单个请求的总超时时间（秒）。
    pub download_timeout: u64,
    /// 建立连接（TCP/TLS）超时时间（秒）。
    pub connect_timeout: u64,
    /// 下载首包超时时间（毫秒）。
    pub stream_first_byte_timeout_ms: u64,
    /// 下载分块读取超时时间（毫秒）。
    pub stream_chunk_timeout_ms: u64,
    /// 单张图片允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 单次抓取内同时在途的下载数上限；`None` 表示不设上限。
    pub max_concurrent_downloads: Option<usize>,
    /// 是否使用系统代理（环境变量 `HTTP_PROXY` 等）。
    pub use_system_proxy: bool,
    /// 像素上限（`width * height`），同时约束解码结果、缩放结果与拼图画布。
    pub max_decoded_pixels: u64,
    pub decode_failure: DecodeFailurePolicy,
    /// 缩放滤镜，默认高质量 Lanczos3。
    pub resize_filter: FilterType,
    /// JPEG 输出质量（1~100）。
    pub jpeg_quality: u8,
    pub layout: LayoutConfig,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            search_base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            api_key: String::new(),
            default_count: 16,
            download_timeout: 30,
            connect_timeout: 8,
            stream_first_byte_timeout_ms: 10_000,
            stream_chunk_timeout_ms: 15_000,
            max_file_size: 10 * 1024 * 1024,
            max_concurrent_downloads: None,
            use_system_proxy: true,
            max_decoded_pixels: DEFAULT_MAX_PIXELS,
            decode_failure: DecodeFailurePolicy::Abort,
            resize_filter: FilterType::Lanczos3,
            jpeg_quality: 90,
            layout: LayoutConfig::default(),
        }
    }
}

impl CollageConfig {
    /// 校验整体配置，服务启动前调用一次。
    pub fn validate(&self) -> Result<(), CollageError> {
        self.layout.validate()?;

        if !(1..=MAX_SEARCH_COUNT).contains(&self.default_count) {
            return Err(CollageError::InvalidArgument(format!(
                "default_count 必须在 1~{} 之间（当前：{}）",
                MAX_SEARCH_COUNT, self.default_count
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(CollageError::InvalidArgument(format!(
                "jpeg_quality 必须在 1~100 之间（当前：{}）",
                self.jpeg_quality
            )));
        }
        if let Some(limit) = self.max_concurrent_downloads {
            if limit == 0 || limit > MAX_SEARCH_COUNT as usize {
                return Err(CollageError::InvalidArgument(format!(
                    "max_concurrent_downloads 必须在 1~{} 之间（当前：{}）",
                    MAX_SEARCH_COUNT, limit
                )));
            }
        }
        if self.download_timeout == 0 || self.connect_timeout == 0 {
            return Err(CollageError::InvalidArgument("超时时间必须大于 0".to_string()));
        }

        Ok(())
    }
}
