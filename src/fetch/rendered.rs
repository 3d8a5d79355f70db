use std::path::Path;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, FetchError};

/// 渲染策略：在隔离的无头浏览器会话中加载页面并捕获渲染后的标记
///
/// 无论捕获成功与否，浏览器进程都会被关闭并等待退出，
/// 避免失败路径上泄漏外部进程
pub async fn fetch_rendered_html(url: &str, config: &Config) -> AppResult<String> {
    let mut browser = launch_headless_browser(config).await?;

    let result = capture_page_html(&browser, url, config.settle_ms).await;

    shutdown_browser(&mut browser).await;
    result
}

/// 启动无头浏览器
async fn launch_headless_browser(config: &Config) -> AppResult<Browser> {
    info!("🚀 启动无头浏览器...");

    // 配置无头浏览器
    let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
        "--disable-gpu",           // Windows 无头模式必须禁用 GPU
        "--no-sandbox",            // 禁用沙盒，防止权限问题导致的崩溃
        "--disable-dev-shm-usage", // 防止共享内存不足
        "--remote-debugging-port=0", // 让浏览器自动选择端口
    ]);
    if let Some(path) = &config.chrome_executable {
        builder = builder.chrome_executable(Path::new(path));
    }
    let browser_config = builder.build().map_err(|e| {
        error!("配置无头浏览器失败: {}", e);
        AppError::Fetch(FetchError::BrowserConfigFailed { message: e })
    })?;

    // 启动浏览器
    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动无头浏览器失败: {}", e);
        AppError::Fetch(FetchError::BrowserLaunchFailed {
            source: Box::new(e),
        })
    })?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(Duration::from_millis(300)).await;

    Ok(browser)
}

/// 导航到目标页面，等待固定时长让客户端脚本执行，然后捕获标记
async fn capture_page_html(browser: &Browser, url: &str, settle_ms: u64) -> AppResult<String> {
    let page = browser.new_page(url).await.map_err(|e| {
        error!("创建页面并导航到 {} 失败: {}", url, e);
        AppError::Fetch(FetchError::PageCreationFailed {
            url: url.to_string(),
            source: Box::new(e),
        })
    })?;
    info!("✅ 无头浏览器已导航到: {}", url);

    // 固定等待，不做 DOM 变更检测
    debug!("等待 {} 毫秒让页面渲染完成", settle_ms);
    sleep(Duration::from_millis(settle_ms)).await;

    let html = page.content().await.map_err(|e| {
        error!("捕获页面内容失败: {}", e);
        AppError::Fetch(FetchError::CaptureFailed {
            source: Box::new(e),
        })
    })?;

    debug!("页面捕获成功，共 {} 字节", html.len());
    Ok(html)
}

/// 关闭浏览器并等待进程退出，成功和失败路径都会执行
async fn shutdown_browser(browser: &mut Browser) {
    if let Err(e) = browser.close().await {
        warn!("关闭浏览器失败: {}", e);
    }
    if let Err(e) = browser.wait().await {
        warn!("等待浏览器进程退出失败: {}", e);
    }
    debug!("浏览器会话已清理");
}
