//! # 拼图模块（collage）
//!
//! ## 设计思路
//!
//! 该模块将“搜索 → 并发下载 → 解码 → 排版拼图 → 编码交付”按职责拆分为多个子模块，
//! 避免单文件膨胀与耦合。
//!
//! - `service`：服务生命周期（连接池的打开与释放）
//! - `handler`：编排整条处理流水线
//! - `resolver`：一次搜索请求 → 有序预览图地址
//! - `fetcher`：共享连接池上的并发下载，单张失败静默丢弃
//! - `decoder`：字节 → RGB 图像，像素上限与损坏策略
//! - `layout`：小根堆贪心列分配
//! - `composer`：缩放 + 分配 + 绘制
//! - `encoder`：JPEG 编码与占位图
//! - `client/config/error/source`：连接池、配置、错误、中间数据模型
//!
//! ## 调用链
//!
//! ```text
//! CollageService::handle_query
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ resolver.rs（搜索，失败即中止）
//!    ├─ fetcher.rs（join_all 并发下载，保持输入顺序）
//!    └─ spawn_blocking
//!         ├─ decoder.rs
//!         ├─ composer.rs ── layout.rs
//!         └─ encoder.rs（结果为空时编码占位图）
//!    ↓
//! CollageDelivery（JPEG + 文案）
//! ```

mod client;
mod composer;
mod config;
mod decoder;
mod encoder;
mod error;
mod fetcher;
mod handler;
pub mod layout;
mod resolver;
mod service;
mod source;

#[cfg(test)]
mod test_support;

pub use client::HttpPool;
pub use composer::{Canvas, CollageComposer};
pub use config::{
    CollageConfig, DEFAULT_MAX_PIXELS, DEFAULT_SEARCH_BASE_URL, DecodeFailurePolicy, LayoutConfig,
    MAX_SEARCH_COUNT,
};
pub use decoder::{decode_all, decode_image};
pub use encoder::{blank_placeholder, encode_jpeg, load_placeholder};
pub use error::CollageError;
pub use fetcher::ConcurrentFetcher;
pub use handler::CollageHandler;
pub use resolver::UrlResolver;
pub use service::CollageService;
pub use source::{
    CollageDelivery, DecodedImage, ImageBuffer, ImageReference, SearchQuery, caption_for,
};
