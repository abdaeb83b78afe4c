//! # 拼图模块
//!
//! ## 设计思路
//!
//! 纯同步、无 I/O、调用之间无状态。输入为非空的已解码图片列表，输出一张画布：
//! 1. 等比缩放到列宽（高质量滤镜，结果确定）
//! 2. 贪心分配到各列（见 `layout`）
//! 3. 背景填充后逐列自上而下粘贴
//!
//! 空输入直接拒绝：空拼图没有意义，占位图替换由上层编排负责。
//! 缩放结果与画布面积都受像素上限约束，超限返回 `ResourceLimit`。

use fast_image_resize as fr;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use super::layout::{ColumnPlan, assign_columns};
use super::config::DEFAULT_MAX_PIXELS;
use super::{CollageError, DecodedImage, LayoutConfig};

/// 拼图结果画布。
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbImage,
    plan: ColumnPlan,
}

impl Canvas {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// 本次拼图使用的列分配。
    pub fn plan(&self) -> &ColumnPlan {
        &self.plan
    }
}

/// 拼图器。
#[derive(Debug, Clone)]
pub struct CollageComposer {
    layout: LayoutConfig,
    filter: FilterType,
    max_pixels: u64,
}

impl CollageComposer {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            filter: FilterType::Lanczos3,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// 缩放结果与画布共用的像素上限。
    pub fn with_pixel_limit(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// 生成拼图画布。
    pub fn compose(&self, images: &[DecodedImage]) -> Result<Canvas, CollageError> {
        if images.is_empty() {
            return Err(CollageError::InvalidArgument("拼图至少需要一张图片".to_string()));
        }
        self.layout.validate()?;

        let resized = images
            .iter()
            .map(|image| self.resize_to_column_width(image))
            .collect::<Result<Vec<_>, _>>()?;

        let heights: Vec<u32> = resized.iter().map(|image| image.height()).collect();
        let plan = assign_columns(&heights, self.layout.columns_count as usize, self.layout.gap)?;

        let width = self.layout.canvas_width();
        let height = u32::try_from(plan.total_height())
            .map_err(|_| CollageError::ResourceLimit("拼图画布高度溢出".to_string()))?;
        self.check_pixels("拼图画布", width, height)?;

        let mut canvas = RgbImage::from_pixel(width, height, Rgb(self.layout.background));

        for (column, members) in plan.columns.iter().enumerate() {
            let x = self.layout.column_x(column) as i64;
            let mut y = self.layout.gap as i64;
            for &index in members {
                let image = &resized[index];
                imageops::replace(&mut canvas, image, x, y);
                y += image.height() as i64 + self.layout.gap as i64;
            }
        }

        log::debug!(
            "🧩 拼图完成 - images={} columns={} canvas={}x{}",
            images.len(),
            self.layout.columns_count,
            width,
            height
        );

        Ok(Canvas { image: canvas, plan })
    }

    /// 等比缩放到列宽，高度向下取整且至少 1 像素。
    pub fn resize_to_column_width(&self, image: &DecodedImage) -> Result<RgbImage, CollageError> {
        let target_width = self.layout.column_width;
        let (width, height) = (image.width(), image.height());

        if width == 0 || height == 0 {
            return Err(CollageError::InvalidArgument(format!("图片尺寸无效：{}x{}", width, height)));
        }
        if width == target_width {
            return Ok(image.pixels().clone());
        }

        let scaled = (height as u64 * target_width as u64 / width as u64).max(1);
        let target_height = u32::try_from(scaled)
            .map_err(|_| CollageError::ResourceLimit(format!("缩放后高度溢出：{}", scaled)))?;
        self.check_pixels("缩放结果", target_width, target_height)?;

        match Self::resize_with_fast_image_resize(image.pixels(), target_width, target_height, self.filter) {
            Ok(resized) => Ok(resized),
            Err(err) => {
                log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::resize：{}", err);
                Ok(imageops::resize(image.pixels(), target_width, target_height, self.filter))
            }
        }
    }

    fn check_pixels(&self, what: &str, width: u32, height: u32) -> Result<(), CollageError> {
        let pixels = width as u64 * height as u64;
        if pixels > self.max_pixels {
            return Err(CollageError::ResourceLimit(format!(
                "{}过大：{}x{} = {} 像素（限制：{} 像素）",
                what, width, height, pixels, self.max_pixels
            )));
        }
        Ok(())
    }

    fn resize_with_fast_image_resize(
        image: &RgbImage,
        target_width: u32,
        target_height: u32,
        filter: FilterType,
    ) -> Result<RgbImage, CollageError> {
        let src_image = fr::images::Image::from_vec_u8(
            image.width(),
            image.height(),
            image.as_raw().clone(),
            fr::PixelType::U8x3,
        )
        .map_err(|e| CollageError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x3);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(Self::to_fast_filter(filter)));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| CollageError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

        RgbImage::from_raw(target_width, target_height, dst_image.into_vec())
            .ok_or_else(|| CollageError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
    }

    fn to_fast_filter(filter: FilterType) -> fr::FilterType {
        match filter {
            FilterType::Nearest => fr::FilterType::Box,
            FilterType::Triangle => fr::FilterType::Bilinear,
            FilterType::CatmullRom => fr::FilterType::CatmullRom,
            FilterType::Gaussian => fr::FilterType::Mitchell,
            FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }
}
