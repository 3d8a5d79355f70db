use tracing::{debug, error};

use crate::error::{AppError, AppResult};

/// 请求使用的桌面浏览器 User-Agent，部分电商站点会拒绝默认标识
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 构造请求客户端
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// 静态策略：单次 HTTP GET，原样返回响应体
///
/// 非 2xx 状态码或网络失败直接报错，不做重试
pub async fn fetch_html(url: &str) -> AppResult<String> {
    let response = client().get(url).send().await.map_err(|e| {
        error!("请求 {} 失败: {}", url, e);
        AppError::request_failed(url, e)
    })?;

    let status = response.status();
    if !status.is_success() {
        error!("请求 {} 返回状态码 {}", url, status);
        return Err(AppError::bad_status(url, status.as_u16()));
    }

    debug!("请求成功: {} ({})", url, status);
    response.text().await.map_err(|e| {
        error!("读取 {} 响应体失败: {}", url, e);
        AppError::request_failed(url, e)
    })
}
