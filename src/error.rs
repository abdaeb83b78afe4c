//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 拼图流水线内部使用 `CollageError`；外层入口（设置加载、文件输出）
//! 统一使用 `AppError`，通过 `From` 转换无需手动 map。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `CollageError` 与 `std::io::Error` 提供 `From` 转换。

use crate::collage::CollageError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 拼图流水线错误（搜索 / 下载 / 解码 / 编码）
    #[error("{0}")]
    Collage(#[from] CollageError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件或环境变量无效
    #[error("设置无效: {0}")]
    Settings(String),
}
