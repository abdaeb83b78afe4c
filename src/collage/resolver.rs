//! # 搜索解析模块
//!
//! ## 设计思路
//!
//! 每次查询只向搜索服务发出一次请求，把 `hits[].previewURL` 按原顺序转换为 `ImageReference`。
//! 搜索阶段任何失败（传输错误、非 2xx、响应体无法解析）都会中止整条流水线。
//!
//! ## 实现思路
//!
//! - 请求格式：`GET {base_url}?key={api_key}&q={query}&per_page={count}`
//! - 缺失或为空的 `previewURL` 直接跳过；响应缺少 `hits` 字段视为格式错误
//! - 结果超过 `count` 时截断，保证 `len <= count`

use std::sync::Arc;

use serde::Deserialize;

use super::client::{HttpPool, redact_url_for_log};
use super::{CollageConfig, CollageError, ImageReference, SearchQuery};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "previewURL", default)]
    preview_url: Option<String>,
}

/// 搜索解析器。
pub struct UrlResolver {
    pool: Arc<HttpPool>,
    base_url: String,
    api_key: String,
}

impl UrlResolver {
    pub fn new(pool: Arc<HttpPool>, config: &CollageConfig) -> Self {
        Self {
            pool,
            base_url: config.search_base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// 解析查询得到有序的预览图地址列表。
    pub async fn resolve(&self, query: &SearchQuery) -> Result<Vec<ImageReference>, CollageError> {
        let url = self.build_search_url(query)?;
        let redacted = redact_url_for_log(url.as_str());
        log::debug!("🔎 发送搜索请求 - {} q={:?} per_page={}", redacted, query.text(), query.count());

        let response = self
            .pool
            .get(url)
            .send()
            .await
            .map_err(|e| CollageError::Fetch(format!("搜索请求失败（{}）：{}", redacted, e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollageError::Fetch(format!(
                "搜索服务返回 HTTP {}",
                status.as_u16()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CollageError::Fetch(format!("读取搜索响应失败：{}", e.without_url())))?;

        let references = Self::parse_hits(&body, query.count())?;

        log::info!(
            "🔎 搜索完成 - q={:?} 请求={} 返回={}",
            query.text(),
            query.count(),
            references.len()
        );

        Ok(references)
    }

    fn build_search_url(&self, query: &SearchQuery) -> Result<reqwest::Url, CollageError> {
        let per_page = query.count().to_string();
        reqwest::Url::parse_with_params(
            &self.base_url,
            &[
                ("key", self.api_key.as_str()),
                ("q", query.text()),
                ("per_page", per_page.as_str()),
            ],
        )
        .map_err(|e| CollageError::InvalidArgument(format!("搜索服务地址无效：{}", e)))
    }

    fn parse_hits(body: &[u8], count: u32) -> Result<Vec<ImageReference>, CollageError> {
        let parsed: SearchResponse = serde_json::from_slice(body)
            .map_err(|e| CollageError::Fetch(format!("搜索响应格式错误：{}", e)))?;

        Ok(parsed
            .hits
            .into_iter()
            .filter_map(|hit| hit.preview_url)
            .filter(|url| !url.trim().is_empty())
            .take(count as usize)
            .enumerate()
            .map(|(position, url)| ImageReference::new(position, url))
            .collect())
    }
}
