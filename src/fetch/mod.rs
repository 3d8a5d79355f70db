//! 页面抓取层
//!
//! 对外暴露统一的抓取入口，内部按配置分派到两种策略：
//! - `static_http`: 直接 HTTP 请求，取响应体原文
//! - `rendered`: 无头浏览器渲染后捕获，适用于客户端脚本生成的页面

pub mod rendered;
pub mod static_http;

use tracing::{debug, info, warn};

use crate::config::{Config, FetchStrategy};
use crate::error::{AppError, AppResult};
use crate::models::SourceDocument;

/// 校验 URL 是否为合法的绝对 http/https 地址
///
/// 在发起任何网络请求之前执行，非法输入直接返回 InvalidUrl
pub fn validate_url(url: &str) -> AppResult<reqwest::Url> {
    let parsed = reqwest::Url::parse(url).map_err(|_| AppError::invalid_url(url))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::invalid_url(url));
    }
    Ok(parsed)
}

/// 抓取商品页面，返回原始文档
pub async fn fetch_document(url: &str, config: &Config) -> AppResult<SourceDocument> {
    let parsed = validate_url(url)?;

    let html = match config.fetch_strategy {
        FetchStrategy::Static => {
            info!("📥 使用静态策略抓取: {}", parsed);
            static_http::fetch_html(parsed.as_str()).await?
        }
        FetchStrategy::Rendered => {
            info!("🖥️ 使用渲染策略抓取: {}", parsed);
            rendered::fetch_rendered_html(parsed.as_str(), config).await?
        }
    };

    debug!("页面抓取完成，共 {} 字节", html.len());
    Ok(SourceDocument::new(html, Some(parsed.to_string())))
}

/// 将资源链接解析为绝对地址
///
/// 本身已是绝对地址则原样返回，否则基于页面地址拼接
pub fn resolve_asset_url(base: Option<&str>, asset: &str) -> Option<String> {
    if let Ok(absolute) = reqwest::Url::parse(asset) {
        return Some(absolute.to_string());
    }
    let base = reqwest::Url::parse(base?).ok()?;
    match base.join(asset) {
        Ok(resolved) => Some(resolved.to_string()),
        Err(e) => {
            warn!("无法解析资源链接 {}: {}", asset, e);
            None
        }
    }
}

/// 抓取二进制资源（商品图片等）
///
/// 图片只是锦上添花，任何失败都软降级为 None，绝不中断流水线
pub async fn fetch_binary(asset_url: &str) -> Option<Vec<u8>> {
    let url = match validate_url(asset_url) {
        Ok(u) => u,
        Err(_) => {
            warn!("资源链接非法，跳过下载: {}", asset_url);
            return None;
        }
    };

    let response = match static_http::client().get(url.as_str()).send().await {
        Ok(r) => r,
        Err(e) => {
            warn!("下载资源 {} 失败: {}", asset_url, e);
            return None;
        }
    };

    if !response.status().is_success() {
        warn!("下载资源 {} 返回状态码 {}", asset_url, response.status());
        return None;
    }

    match response.bytes().await {
        Ok(bytes) => {
            debug!("资源下载完成: {} ({} 字节)", asset_url, bytes.len());
            Some(bytes.to_vec())
        }
        Err(e) => {
            warn!("读取资源 {} 响应体失败: {}", asset_url, e);
            None
        }
    }
}
