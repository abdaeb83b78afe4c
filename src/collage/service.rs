//! # 服务层
//!
//! ## 设计思路
//!
//! `CollageService` 持有服务生命周期内唯一的连接池与编排器：
//! 1. `start`：校验配置、打开连接池、构建编排器
//! 2. `handle_query*`：每次查询复用同一连接池
//! 3. `shutdown`：显式释放连接池
//!
//! 若服务在未调用 `shutdown` 的情况下被丢弃（例如错误路径提前返回），
//! 连接池仍会随 `Drop` 释放。

use std::sync::Arc;

use image::RgbImage;

use super::client::HttpPool;
use super::handler::CollageHandler;
use super::{CollageConfig, CollageDelivery, CollageError};

/// 拼图服务。
pub struct CollageService {
    pool: Arc<HttpPool>,
    handler: CollageHandler,
}

impl CollageService {
    /// 启动服务：打开连接池并构建处理链路。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use search_collage::collage::{CollageConfig, CollageService};
    ///
    /// # async fn demo() -> Result<(), search_collage::collage::CollageError> {
    /// let mut config = CollageConfig::default();
    /// config.api_key = "your-key".into();
    /// let service = CollageService::start(config, image::RgbImage::new(300, 300))?;
    /// let delivery = service.handle_query("cats").await?;
    /// println!("{} ({} bytes)", delivery.caption, delivery.image.len());
    /// service.shutdown();
    /// # Ok(())
    /// # }
    /// ```
    pub fn start(config: CollageConfig, placeholder: RgbImage) -> Result<Self, CollageError> {
        config.validate()?;

        let pool = Arc::new(HttpPool::open(&config)?);
        let handler = CollageHandler::new(Arc::clone(&pool), &config, placeholder)?;

        log::info!(
            "🚀 拼图服务已启动 - columns={} column_width={} gap={} default_count={} max_concurrent={:?}",
            config.layout.columns_count,
            config.layout.column_width,
            config.layout.gap,
            config.default_count,
            config.max_concurrent_downloads
        );

        Ok(Self { pool, handler })
    }

    /// 使用默认数量处理一次查询。
    pub async fn handle_query(&self, text: &str) -> Result<CollageDelivery, CollageError> {
        self.handler.build_collage(text, None).await
    }

    pub async fn handle_query_with_count(
        &self,
        text: &str,
        count: Option<u32>,
    ) -> Result<CollageDelivery, CollageError> {
        self.handler.build_collage(text, count).await
    }

    /// 共享连接池（只读）。
    pub fn pool(&self) -> &HttpPool {
        &self.pool
    }

    /// 停止服务并释放连接池。
    pub fn shutdown(self) {
        let Self { pool, handler } = self;
        drop(handler);

        match Arc::try_unwrap(pool) {
            Ok(pool) => pool.close(),
            Err(shared) => log::warn!(
                "⚠️ 连接池仍被 {} 处引用，将在最后一个引用释放时关闭",
                Arc::strong_count(&shared) - 1
            ),
        }

        log::info!("🛑 拼图服务已停止");
    }
}
