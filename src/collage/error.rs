//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载拼图链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 注意：单张图片的下载失败（`Network` / `Timeout` / `InvalidFormat` / `ResourceLimit`）
//! 只会在抓取器内部记录日志并被丢弃，不会上抛给调用方。

/// 拼图处理统一错误类型。
///
/// 该类型会在二进制入口被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum CollageError {
    /// 调用方参数非法（数量越界、空查询、空拼图输入、布局非法）。
    #[error("参数错误：{0}")]
    InvalidArgument(String),

    /// 搜索阶段失败，整次请求中止。
    #[error("搜索失败：{0}")]
    Fetch(String),

    #[error("网络错误：{0}")]
    Network(String),

    #[error("超时错误：{0}")]
    Timeout(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("后台任务失败：{0}")]
    Worker(String),
}

impl CollageError {
    /// 稳定错误码，便于日志检索。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "E_INVALID_ARGUMENT",
            Self::Fetch(_) => "E_FETCH",
            Self::Network(_) => "E_NETWORK",
            Self::Timeout(_) => "E_TIMEOUT",
            Self::Decode(_) => "E_DECODE",
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::Encode(_) => "E_ENCODE",
            Self::FileSystem(_) => "E_FILE_SYSTEM",
            Self::Worker(_) => "E_WORKER",
        }
    }

    /// 错误所属阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "validate",
            Self::Fetch(_) => "resolve",
            Self::Network(_) | Self::Timeout(_) | Self::InvalidFormat(_) => "download",
            Self::ResourceLimit(_) | Self::Decode(_) => "decode",
            Self::Encode(_) => "encode",
            Self::FileSystem(_) => "placeholder",
            Self::Worker(_) => "render",
        }
    }
}
