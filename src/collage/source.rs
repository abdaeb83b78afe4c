//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“流水线中间结果”解耦：
//! - `SearchQuery` 表示调用方的查询语义（已校验）
//! - `ImageReference` 表示搜索结果中的一张预览图地址
//! - `ImageBuffer` 表示已下载但未解码的字节
//! - `DecodedImage` 表示可直接参与排版的 RGB 像素
//! - `CollageDelivery` 表示交付给外部协作方的最终结果

use bytes::Bytes;
use image::RgbImage;

use super::CollageError;
use super::config::MAX_SEARCH_COUNT;

/// 已校验的搜索请求。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    count: u32,
}

impl SearchQuery {
    /// 构造并校验查询：`1 <= count <= 200`，文本不能为空白。
    pub fn new(text: impl Into<String>, count: u32) -> Result<Self, CollageError> {
        let text = text.into();

        if text.trim().is_empty() {
            return Err(CollageError::InvalidArgument("查询文本不能为空".to_string()));
        }
        if count == 0 {
            return Err(CollageError::InvalidArgument("请求数量至少为 1".to_string()));
        }
        if count > MAX_SEARCH_COUNT {
            return Err(CollageError::InvalidArgument(format!(
                "一次最多只能请求 {} 张图片（请求了：{}）",
                MAX_SEARCH_COUNT, count
            )));
        }

        Ok(Self { text, count })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// 一张远程预览图的地址。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// 在搜索结果中的位置（仅用于日志）。
    pub(crate) position: usize,
    pub(crate) url: String,
}

impl ImageReference {
    pub fn new(position: usize, url: impl Into<String>) -> Self {
        Self {
            position,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

/// 下载阶段输出：一张成功下载的图片原始字节。
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub(crate) position: usize,
    pub(crate) bytes: Bytes,
}

impl ImageBuffer {
    pub fn new(position: usize, bytes: impl Into<Bytes>) -> Self {
        Self {
            position,
            bytes: bytes.into(),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// 解码阶段输出：不可变的 RGB 图像。
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: RgbImage,
}

impl DecodedImage {
    pub fn new(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}

/// 交付给外部消息协作方的结果：编码后的图片与附带文案。
#[derive(Debug, Clone)]
pub struct CollageDelivery {
    /// JPEG 字节。
    pub image: Vec<u8>,
    pub caption: String,
    /// 实际参与拼图的图片数量（使用占位图时为 0）。
    pub image_count: usize,
    /// 是否使用了占位图。
    pub placeholder: bool,
}

/// 回复文案：`***{query}***!`。
pub fn caption_for(text: &str) -> String {
    format!("***{}***!", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_query_accepts_bounds() {
        assert!(SearchQuery::new("cats", 1).is_ok());
        assert!(SearchQuery::new("cats", 200).is_ok());
    }

    #[test]
    fn search_query_rejects_out_of_range_count() {
        assert!(matches!(
            SearchQuery::new("cats", 0),
            Err(CollageError::InvalidArgument(_))
        ));
        assert!(matches!(
            SearchQuery::new("cats", 250),
            Err(CollageError::InvalidArgument(_))
        ));
    }

    #[test]
    fn search_query_rejects_blank_text() {
        assert!(matches!(
            SearchQuery::new("   ", 10),
            Err(CollageError::InvalidArgument(_))
        ));
    }

    #[test]
    fn caption_wraps_query_text() {
        assert_eq!(caption_for("cats"), "***cats***!");
    }
}
