//! # 设置加载
//!
//! 设置来源按优先级从低到高：内置默认值 → `settings.json` → 环境变量。
//! 所有字段都是可选的，缺省时沿用 `CollageConfig::default()`。
//!
//! 支持的环境变量：
//! - `PIXABAY_API_KEY`：搜索服务密钥（必需，文件中也可提供）
//! - `PIXABAY_BASE_URL`：搜索服务地址
//! - `COLLAGE_COUNT`：默认请求数量

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::collage::{CollageConfig, DecodeFailurePolicy, LayoutConfig};
use crate::error::AppError;

pub const ENV_API_KEY: &str = "PIXABAY_API_KEY";
pub const ENV_BASE_URL: &str = "PIXABAY_BASE_URL";
pub const ENV_DEFAULT_COUNT: &str = "COLLAGE_COUNT";

/// 设置文件内容。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_key: Option<String>,
    pub search_base_url: Option<String>,
    pub default_count: Option<u32>,
    pub download_timeout: Option<u64>,
    pub connect_timeout: Option<u64>,
    pub max_concurrent_downloads: Option<usize>,
    pub use_system_proxy: Option<bool>,
    pub decode_failure: Option<DecodeFailurePolicy>,
    pub jpeg_quality: Option<u8>,
    pub layout: Option<LayoutConfig>,
    /// 结果为空时使用的占位图文件。
    pub placeholder_path: Option<PathBuf>,
}

impl Settings {
    /// 加载设置：提供路径时读取文件，再叠加进程环境变量。
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)?;
        let settings = serde_json::from_str::<Self>(&content)
            .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;

        log::info!("⚙️ 已读取设置文件: {}", path.display());
        Ok(settings)
    }

    pub fn apply_env(&mut self) -> Result<(), AppError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// 使用给定的变量查找函数覆盖设置，空值视为未设置。
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = var(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(url) = var(ENV_BASE_URL) {
            self.search_base_url = Some(url);
        }
        if let Some(count) = var(ENV_DEFAULT_COUNT) {
            let count = count.trim().parse::<u32>().map_err(|e| {
                AppError::Settings(format!("{} 不是有效数字 ({}): {}", ENV_DEFAULT_COUNT, count, e))
            })?;
            self.default_count = Some(count);
        }

        Ok(())
    }

    /// 生成服务配置；缺少密钥时报错。
    pub fn into_config(self) -> Result<CollageConfig, AppError> {
        let mut config = CollageConfig::default();

        config.api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::Settings(format!("缺少搜索服务密钥，请设置 {}", ENV_API_KEY)))?;

        if let Some(url) = self.search_base_url {
            config.search_base_url = url;
        }
        if let Some(count) = self.default_count {
            config.default_count = count;
        }
        if let Some(timeout) = self.download_timeout {
            config.download_timeout = timeout;
        }
        if let Some(timeout) = self.connect_timeout {
            config.connect_timeout = timeout;
        }
        if self.max_concurrent_downloads.is_some() {
            config.max_concurrent_downloads = self.max_concurrent_downloads;
        }
        if let Some(proxy) = self.use_system_proxy {
            config.use_system_proxy = proxy;
        }
        if let Some(policy) = self.decode_failure {
            config.decode_failure = policy;
        }
        if let Some(quality) = self.jpeg_quality {
            config.jpeg_quality = quality;
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }

        config.validate()?;
        Ok(config)
    }
}
