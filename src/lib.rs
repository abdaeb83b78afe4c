//! # 搜索拼图服务：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              外层入口（CLI / 聊天机器人等）              │
//! │                                                          │
//! │   main ── Settings（JSON + 环境变量）── CollageConfig    │
//! │     │                                                    │
//! └─────┼────────────────────────────────────────────────────┘
//!       ↕ Result<CollageDelivery, CollageError>
//! ┌─────┼────────────────────────────────────────────────────┐
//! │     ↕                 collage                            │
//! │                                                          │
//! │  CollageService ── HttpPool（生命周期内唯一连接池）     │
//! │     │                                                    │
//! │     └─ CollageHandler                                    │
//! │          ├─ UrlResolver       搜索 → 有序预览图地址      │
//! │          ├─ ConcurrentFetcher 并发下载，失败静默丢弃     │
//! │          ├─ decoder           字节 → RGB                 │
//! │          ├─ CollageComposer   缩放 + 贪心分列 + 绘制     │
//! │          └─ encoder           JPEG / 占位图              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 应用级错误类型 `AppError` |
//! | [`collage`] | 搜索、下载、解码、拼图、编码的完整流水线 |
//! | [`settings`] | 设置文件与环境变量覆盖，生成 `CollageConfig` |

pub mod collage;
pub mod error;
pub mod settings;
