//! # 编码与占位图模块
//!
//! 画布统一编码为固定质量的 JPEG 交付。占位图由外部提供（文件），
//! 未提供时使用与布局同色的空白图。

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};

use super::{CollageError, LayoutConfig};

/// 将 RGB 图像编码为 JPEG。
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, CollageError> {
    if !(1..=100).contains(&quality) {
        return Err(CollageError::InvalidArgument(format!(
            "JPEG 质量必须在 1~100 之间（当前：{}）",
            quality
        )));
    }

    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    encoder
        .encode_image(image)
        .map_err(|e| CollageError::Encode(format!("JPEG 编码失败：{}", e)))?;

    Ok(bytes)
}

/// 从文件加载占位图。
pub fn load_placeholder(path: &Path) -> Result<RgbImage, CollageError> {
    if !path.exists() {
        return Err(CollageError::FileSystem(format!("占位图不存在：{}", path.display())));
    }

    let image = image::open(path)
        .map_err(|e| CollageError::FileSystem(format!("无法打开占位图：{}", e)))?;

    log::info!(
        "🖼️ 占位图已加载 - {} {}x{}",
        path.display(),
        image.width(),
        image.height()
    );

    Ok(image.to_rgb8())
}

/// 空白占位图：一列宽的背景色方块。
pub fn blank_placeholder(layout: &LayoutConfig) -> RgbImage {
    let side = layout.column_width.max(1);
    RgbImage::from_pixel(side, side, Rgb(layout.background))
}
