//! # 解码模块
//!
//! ## 设计思路
//!
//! 将“字节 → RGB 图像”的过程集中管理。先读 header 尺寸做像素上限检查，
//! 再进行完整解码，降低异常输入触发高内存开销的风险。
//!
//! 损坏图片的处理由 `DecodeFailurePolicy` 决定：
//! - `Abort`：返回错误，整次请求失败
//! - `Skip`：记录日志后丢弃，与下载失败一致

use std::io::Cursor;

use image::ImageReader;

use super::{CollageError, DecodeFailurePolicy, DecodedImage, ImageBuffer};

/// 解码单张图片。
pub fn decode_image(buffer: &ImageBuffer, max_decoded_pixels: u64) -> Result<DecodedImage, CollageError> {
    let (width, height) = inspect_dimensions(buffer.bytes())?;
    validate_pixel_limit(width, height, max_decoded_pixels)?;

    let decoded = image::load_from_memory(buffer.bytes())
        .map_err(|e| CollageError::Decode(format!("图片解码失败：{}", e)))?;

    Ok(DecodedImage::new(decoded.to_rgb8()))
}

/// 按策略批量解码，保持输入顺序。
pub fn decode_all(
    buffers: &[ImageBuffer],
    policy: DecodeFailurePolicy,
    max_decoded_pixels: u64,
) -> Result<Vec<DecodedImage>, CollageError> {
    let mut decoded = Vec::with_capacity(buffers.len());

    for buffer in buffers {
        match decode_image(buffer, max_decoded_pixels) {
            Ok(image) => decoded.push(image),
            Err(err) => match policy {
                DecodeFailurePolicy::Abort => {
                    log::error!("❌ 图片解码失败，中止本次拼图 - #{} {}", buffer.position(), err);
                    return Err(err);
                }
                DecodeFailurePolicy::Skip => {
                    log::warn!("⚠️ 图片解码失败，已丢弃 - #{} {}", buffer.position(), err);
                }
            },
        }
    }

    Ok(decoded)
}

/// 仅通过图片头信息读取宽高。
fn inspect_dimensions(bytes: &[u8]) -> Result<(u32, u32), CollageError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CollageError::Decode(format!("无法识别图片格式：{}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| CollageError::Decode(format!("无法读取图片尺寸：{}", e)))
}

fn validate_pixel_limit(width: u32, height: u32, max_decoded_pixels: u64) -> Result<(), CollageError> {
    if width == 0 || height == 0 {
        return Err(CollageError::Decode(format!("图片尺寸无效：{}x{}", width, height)));
    }

    let pixels = width as u64 * height as u64;
    if pixels > max_decoded_pixels {
        return Err(CollageError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, max_decoded_pixels
        )));
    }

    Ok(())
}
