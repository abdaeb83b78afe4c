//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `CollageHandler` 只负责流程编排，处理链路固定为：
//! 1. 校验查询并搜索（一次请求，失败即中止）
//! 2. 并发下载（单张失败静默丢弃）
//! 3. 解码 + 拼图 + JPEG 编码
//!
//! 下载结果为空（或解码后为空）时使用外部提供的占位图，拼图器本身从不处理空输入。
//!
//! ## 实现思路
//!
//! - 第 3 步为 CPU 密集型，放到 `spawn_blocking` 执行，避免阻塞协作式 I/O 调度。
//! - 记录 `resolve/fetch/render/total` 阶段耗时，便于性能诊断。

use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;

use super::client::HttpPool;
use super::composer::CollageComposer;
use super::decoder::decode_all;
use super::encoder::encode_jpeg;
use super::fetcher::ConcurrentFetcher;
use super::resolver::UrlResolver;
use super::source::caption_for;
use super::{CollageConfig, CollageDelivery, CollageError, DecodeFailurePolicy, ImageBuffer, SearchQuery};

/// 渲染阶段输出。
struct RenderedCollage {
    bytes: Vec<u8>,
    image_count: usize,
    placeholder: bool,
}

/// 渲染阶段需要的全部参数（可整体移入后台线程）。
#[derive(Clone)]
struct RenderPlan {
    composer: CollageComposer,
    placeholder: Arc<RgbImage>,
    decode_failure: DecodeFailurePolicy,
    max_decoded_pixels: u64,
    jpeg_quality: u8,
}

/// 拼图流水线编排器。
pub struct CollageHandler {
    resolver: UrlResolver,
    fetcher: ConcurrentFetcher,
    render: RenderPlan,
    default_count: u32,
}

impl CollageHandler {
    /// 基于共享连接池与配置创建编排器。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use search_collage::collage::{CollageConfig, CollageHandler, HttpPool};
    ///
    /// let config = CollageConfig::default();
    /// let pool = Arc::new(HttpPool::open(&config)?);
    /// let placeholder = image::RgbImage::new(300, 300);
    /// let handler = CollageHandler::new(pool, &config, placeholder)?;
    /// # Ok::<(), search_collage::collage::CollageError>(())
    /// ```
    pub fn new(
        pool: Arc<HttpPool>,
        config: &CollageConfig,
        placeholder: RgbImage,
    ) -> Result<Self, CollageError> {
        config.validate()?;

        Ok(Self {
            resolver: UrlResolver::new(Arc::clone(&pool), config),
            fetcher: ConcurrentFetcher::new(pool, config),
            render: RenderPlan {
                composer: CollageComposer::new(config.layout.clone())
                    .with_filter(config.resize_filter)
                    .with_pixel_limit(config.max_decoded_pixels),
                placeholder: Arc::new(placeholder),
                decode_failure: config.decode_failure,
                max_decoded_pixels: config.max_decoded_pixels,
                jpeg_quality: config.jpeg_quality,
            },
            default_count: config.default_count,
        })
    }

    /// 处理主入口：查询 → 搜索 → 下载 → 拼图 → 编码。
    ///
    /// `count` 为空时使用配置的默认数量。
    pub async fn build_collage(
        &self,
        text: &str,
        count: Option<u32>,
    ) -> Result<CollageDelivery, CollageError> {
        let query = SearchQuery::new(text, count.unwrap_or(self.default_count))?;
        let total_start = Instant::now();

        let resolve_start = Instant::now();
        let references = self.resolver.resolve(&query).await?;
        let resolve_elapsed = resolve_start.elapsed();

        let fetch_start = Instant::now();
        let buffers = self.fetcher.fetch_all(&references).await;
        let fetch_elapsed = fetch_start.elapsed();

        let render_start = Instant::now();
        let rendered = self.render_off_loop(buffers).await?;
        let render_elapsed = render_start.elapsed();

        log::info!(
            "✅ 拼图处理完成 - q={:?} images={}/{} placeholder={} resolve={}ms fetch={}ms render={}ms total={}ms",
            query.text(),
            rendered.image_count,
            references.len(),
            rendered.placeholder,
            resolve_elapsed.as_millis(),
            fetch_elapsed.as_millis(),
            render_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(CollageDelivery {
            image: rendered.bytes,
            caption: caption_for(query.text()),
            image_count: rendered.image_count,
            placeholder: rendered.placeholder,
        })
    }

    async fn render_off_loop(&self, buffers: Vec<ImageBuffer>) -> Result<RenderedCollage, CollageError> {
        let plan = self.render.clone();

        tokio::task::spawn_blocking(move || render(&plan, &buffers))
            .await
            .map_err(|e| CollageError::Worker(format!("渲染线程执行失败：{}", e)))?
    }
}

fn render(plan: &RenderPlan, buffers: &[ImageBuffer]) -> Result<RenderedCollage, CollageError> {
    let decoded = decode_all(buffers, plan.decode_failure, plan.max_decoded_pixels)?;

    if decoded.is_empty() {
        log::warn!("⚠️ 未获取到任何可用图片，使用占位图");
        return Ok(RenderedCollage {
            bytes: encode_jpeg(&plan.placeholder, plan.jpeg_quality)?,
            image_count: 0,
            placeholder: true,
        });
    }

    let canvas = plan.composer.compose(&decoded)?;
    let bytes = encode_jpeg(canvas.image(), plan.jpeg_quality)?;

    Ok(RenderedCollage {
        bytes,
        image_count: decoded.len(),
        placeholder: false,
    })
}
